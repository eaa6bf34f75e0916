use std::fmt;

use serde::{Deserialize, Serialize};

use crate::routing::Intent;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SpecialistId {
    Triage,
    CustomerService,
    Conference,
    Networking,
}

pub mod tool_names {
    pub const GET_BOOKING_DETAILS: &str = "get_booking_details";
    pub const UPDATE_SEAT: &str = "update_seat";
    pub const DISPLAY_SEAT_MAP: &str = "display_seat_map";
    pub const FLIGHT_STATUS: &str = "flight_status_tool";
    pub const CANCEL_FLIGHT: &str = "cancel_flight";
    pub const FAQ_LOOKUP: &str = "faq_lookup_tool";
    pub const CONFERENCE_SESSIONS: &str = "get_conference_sessions";
    pub const ALL_SPEAKERS: &str = "get_all_speakers";
    pub const ALL_TRACKS: &str = "get_all_tracks";
    pub const ALL_ROOMS: &str = "get_all_rooms";
    pub const SEARCH_BUSINESSES: &str = "search_businesses";
    pub const USER_BUSINESSES: &str = "get_user_businesses";
    pub const DISPLAY_BUSINESS_FORM: &str = "display_business_form";
    pub const ADD_BUSINESS: &str = "add_business";
}

pub const INPUT_GUARDRAILS: [&str; 2] = ["relevance", "jailbreak"];

impl SpecialistId {
    pub const ALL: [SpecialistId; 4] =
        [Self::Triage, Self::CustomerService, Self::Conference, Self::Networking];

    /// Specialist bound to an intent; unmatched messages go to triage.
    pub fn for_intent(intent: Intent) -> Self {
        match intent {
            Intent::CustomerService => Self::CustomerService,
            Intent::Conference => Self::Conference,
            Intent::Networking => Self::Networking,
            Intent::Unmatched => Self::Triage,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Triage => "TriageAgent",
            Self::CustomerService => "CustomerServiceAgent",
            Self::Conference => "ConferenceAgent",
            Self::Networking => "NetworkingAgent",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Self::Triage => "Greets users and routes requests to the right specialist.",
            Self::CustomerService => {
                "Handles bookings, seat changes, flight status, cancellations and airline FAQs."
            }
            Self::Conference => "Answers Aviation Tech Summit 2025 schedule questions.",
            Self::Networking => "Searches and registers businesses in the summit directory.",
        }
    }

    pub fn tools(self) -> &'static [&'static str] {
        use tool_names::*;

        match self {
            Self::Triage => &[],
            Self::CustomerService => &[
                GET_BOOKING_DETAILS,
                UPDATE_SEAT,
                DISPLAY_SEAT_MAP,
                FLIGHT_STATUS,
                CANCEL_FLIGHT,
                FAQ_LOOKUP,
            ],
            Self::Conference => &[CONFERENCE_SESSIONS, ALL_SPEAKERS, ALL_TRACKS, ALL_ROOMS],
            Self::Networking => {
                &[SEARCH_BUSINESSES, USER_BUSINESSES, DISPLAY_BUSINESS_FORM, ADD_BUSINESS]
            }
        }
    }

    pub fn handoffs(self) -> Vec<SpecialistId> {
        match self {
            Self::Triage => vec![Self::CustomerService, Self::Conference, Self::Networking],
            _ => vec![Self::Triage],
        }
    }

    /// System instructions handed to the language model when it phrases a reply.
    pub fn instructions(self) -> &'static str {
        match self {
            Self::Triage => {
                "You are the triage assistant for an airline customer service and Aviation Tech \
                 Summit 2025 chatbot. Greet the user, answer simple questions, and explain that \
                 you can help with bookings, seats, flight status, cancellations, the conference \
                 schedule, and business networking."
            }
            Self::CustomerService => {
                "You are the airline customer service assistant. Use the tool result to answer \
                 questions about bookings, seat changes, flight status, cancellations, and airline \
                 policies. Never invent booking data that is not in the tool result."
            }
            Self::Conference => {
                "You are the schedule assistant for the Aviation Tech Summit 2025. Use the tool \
                 result to describe sessions, speakers, tracks, and rooms."
            }
            Self::Networking => {
                "You are the networking assistant for the Aviation Tech Summit 2025. Use the tool \
                 result to describe businesses in the directory or the outcome of a registration."
            }
        }
    }

    pub fn profile(self) -> SpecialistProfile {
        SpecialistProfile {
            name: self.name().to_string(),
            description: self.description().to_string(),
            handoffs: self.handoffs().into_iter().map(|id| id.name().to_string()).collect(),
            tools: self.tools().iter().map(|tool| (*tool).to_string()).collect(),
            input_guardrails: INPUT_GUARDRAILS.iter().map(|name| (*name).to_string()).collect(),
        }
    }
}

impl fmt::Display for SpecialistId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Static description of a specialist for client-side display.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpecialistProfile {
    pub name: String,
    pub description: String,
    pub handoffs: Vec<String>,
    pub tools: Vec<String>,
    pub input_guardrails: Vec<String>,
}

pub fn specialist_directory() -> Vec<SpecialistProfile> {
    SpecialistId::ALL.into_iter().map(SpecialistId::profile).collect()
}
