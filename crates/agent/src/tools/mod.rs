//! Specialist tools. Each tool reads its arguments from a JSON object, falls back to the
//! conversation context for identifiers the user gave earlier, and may update the context.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

use concierge_core::domain::context::ConversationContext;
use concierge_core::errors::DomainError;
use concierge_db::repositories::{
    BookingRepository, BusinessRepository, FlightRepository, RepositoryError, ScheduleRepository,
    SqlBookingRepository, SqlBusinessRepository, SqlFlightRepository, SqlScheduleRepository,
};
use concierge_db::DbPool;

pub mod booking;
pub mod faq;
pub mod flight;
pub mod networking;
pub mod schedule;

pub use booking::{CancelFlightTool, DisplaySeatMapTool, GetBookingDetailsTool, UpdateSeatTool};
pub use faq::FaqLookupTool;
pub use flight::FlightStatusTool;
pub use networking::{
    AddBusinessTool, DisplayBusinessFormTool, GetUserBusinessesTool, SearchBusinessesTool,
};
pub use schedule::{AllRoomsTool, AllSpeakersTool, AllTracksTool, ConferenceSessionsTool};

#[derive(Debug, Error)]
pub enum ToolError {
    #[error("missing required argument `{0}`")]
    MissingArgument(&'static str),
    #[error("unknown tool `{0}`")]
    UnknownTool(String),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error(transparent)]
    Domain(#[from] DomainError),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ToolOutput {
    pub text: String,
    /// Client widget to open alongside the reply, named after the tool that asked for it.
    pub ui_trigger: Option<&'static str>,
}

impl ToolOutput {
    pub fn text(text: impl Into<String>) -> Self {
        Self { text: text.into(), ui_trigger: None }
    }

    pub fn with_trigger(mut self, trigger: &'static str) -> Self {
        self.ui_trigger = Some(trigger);
        self
    }
}

#[async_trait]
pub trait Tool: Send + Sync {
    fn name(&self) -> &'static str;
    fn description(&self) -> &'static str;
    async fn execute(
        &self,
        input: &Value,
        context: &mut ConversationContext,
    ) -> Result<ToolOutput, ToolError>;
}

/// Record store handles shared by the tools.
#[derive(Clone)]
pub struct RecordStores {
    pub bookings: Arc<dyn BookingRepository>,
    pub flights: Arc<dyn FlightRepository>,
    pub schedule: Arc<dyn ScheduleRepository>,
    pub businesses: Arc<dyn BusinessRepository>,
}

impl RecordStores {
    pub fn sql(pool: DbPool) -> Self {
        Self {
            bookings: Arc::new(SqlBookingRepository::new(pool.clone())),
            flights: Arc::new(SqlFlightRepository::new(pool.clone())),
            schedule: Arc::new(SqlScheduleRepository::new(pool.clone())),
            businesses: Arc::new(SqlBusinessRepository::new(pool)),
        }
    }

    /// Uses one store for every table, as the in-memory store does.
    pub fn shared<S>(store: Arc<S>) -> Self
    where
        S: BookingRepository + FlightRepository + ScheduleRepository + BusinessRepository + 'static,
    {
        Self {
            bookings: store.clone(),
            flights: store.clone(),
            schedule: store.clone(),
            businesses: store,
        }
    }
}

#[derive(Default)]
pub struct ToolRegistry {
    tools: HashMap<String, Box<dyn Tool>>,
}

impl ToolRegistry {
    /// Registry holding every specialist tool.
    pub fn standard(stores: &RecordStores) -> Self {
        let mut registry = Self::default();
        registry.register(GetBookingDetailsTool::new(stores.bookings.clone()));
        registry.register(UpdateSeatTool::new(stores.bookings.clone()));
        registry.register(DisplaySeatMapTool::new(stores.bookings.clone()));
        registry.register(CancelFlightTool::new(stores.bookings.clone()));
        registry.register(FlightStatusTool::new(stores.flights.clone()));
        registry.register(FaqLookupTool);
        registry.register(ConferenceSessionsTool::new(stores.schedule.clone()));
        registry.register(AllSpeakersTool::new(stores.schedule.clone()));
        registry.register(AllTracksTool::new(stores.schedule.clone()));
        registry.register(AllRoomsTool::new(stores.schedule.clone()));
        registry.register(SearchBusinessesTool::new(stores.businesses.clone()));
        registry.register(GetUserBusinessesTool::new(stores.businesses.clone()));
        registry.register(DisplayBusinessFormTool);
        registry.register(AddBusinessTool::new(stores.businesses.clone()));
        registry
    }

    pub fn register<T>(&mut self, tool: T)
    where
        T: Tool + 'static,
    {
        self.tools.insert(tool.name().to_string(), Box::new(tool));
    }

    pub fn get(&self, name: &str) -> Option<&dyn Tool> {
        self.tools.get(name).map(|tool| tool.as_ref())
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    pub async fn execute(
        &self,
        name: &str,
        input: &Value,
        context: &mut ConversationContext,
    ) -> Result<ToolOutput, ToolError> {
        let tool = self.get(name).ok_or_else(|| ToolError::UnknownTool(name.to_string()))?;
        tool.execute(input, context).await
    }
}

/// Trimmed, non-empty string argument.
pub(crate) fn string_arg(input: &Value, key: &str) -> Option<String> {
    input
        .get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

/// String argument with a context fallback; missing in both is an error.
pub(crate) fn required_arg(
    input: &Value,
    key: &'static str,
    fallback: Option<&String>,
) -> Result<String, ToolError> {
    string_arg(input, key)
        .or_else(|| fallback.filter(|value| !value.trim().is_empty()).cloned())
        .ok_or(ToolError::MissingArgument(key))
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::Arc;

    use concierge_core::domain::booking::{BookingRecord, CustomerRecord, FlightRecord};
    use concierge_core::domain::business::BusinessRecord;
    use concierge_core::domain::conference::ConferenceSession;
    use concierge_core::domain::context::{BusinessDetails, UserDetails};
    use concierge_db::InMemoryRecordStore;

    use super::RecordStores;

    pub fn customer() -> CustomerRecord {
        CustomerRecord {
            id: 1,
            name: Some("Ada Okafor".to_string()),
            email: Some("ada@skyward.test".to_string()),
            account_number: Some("ACC-1001".to_string()),
            user_id: Some("u-1001".to_string()),
        }
    }

    pub fn flight() -> FlightRecord {
        FlightRecord {
            id: 10,
            flight_number: "FLT-123".to_string(),
            origin: Some("NYC".to_string()),
            destination: Some("LAX".to_string()),
            current_status: Some("Delayed".to_string()),
            gate: Some("A10".to_string()),
            terminal: Some("1".to_string()),
            delay_minutes: 30,
        }
    }

    pub fn session(id: i64, speaker: &str, room: &str, track: &str) -> ConferenceSession {
        ConferenceSession {
            id,
            topic: Some(format!("Topic {id}")),
            speaker_name: Some(speaker.to_string()),
            conference_date: Some("2025-06-10".to_string()),
            start_time: Some(format!("{:02}:00", 8 + id)),
            conference_room_name: Some(room.to_string()),
            track_name: Some(track.to_string()),
        }
    }

    pub fn business(id: i64, company: &str, industry: &str, location: &str) -> BusinessRecord {
        BusinessRecord {
            id,
            user_id: Some("u-1001".to_string()),
            organization_id: Some("ORG-100".to_string()),
            owner_name: Some("Ada Okafor".to_string()),
            details: BusinessDetails {
                company_name: company.to_string(),
                industry_sector: industry.to_string(),
                location: location.to_string(),
                position_title: "CTO".to_string(),
                user_name: "Ada Okafor".to_string(),
                email: "ada@skyward.test".to_string(),
                ..BusinessDetails::default()
            },
            is_active: true,
        }
    }

    pub fn store() -> Arc<InMemoryRecordStore> {
        Arc::new(
            InMemoryRecordStore::default()
                .with_user(UserDetails {
                    user_id: Some("u-1001".to_string()),
                    registration_id: Some("R-1001".to_string()),
                    user_name: Some("Ada Okafor".to_string()),
                    ..UserDetails::default()
                })
                .with_customer(customer())
                .with_flight(flight())
                .with_booking(BookingRecord {
                    id: 5,
                    confirmation_number: "CONF001".to_string(),
                    customer_id: Some(1),
                    flight_id: Some(10),
                    seat_number: Some("12A".to_string()),
                    booking_status: Some("Confirmed".to_string()),
                    customer: Some(customer()),
                    flight: Some(flight()),
                })
                .with_session(session(1, "Dr. Amara Nwosu", "Main Hall", "Keynotes"))
                .with_session(session(2, "Lena Fischer", "Room A", "Sustainability"))
                .with_session(session(3, "Dr. Amara Nwosu", "Room A", "Policy"))
                .with_business(business(1, "Skyward Labs", "Fintech", "NYC"))
                .with_business(business(2, "JetStream Analytics", "Tech", "LAX")),
        )
    }

    pub fn stores() -> RecordStores {
        RecordStores::shared(store())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use concierge_core::domain::context::ConversationContext;
    use concierge_core::specialists::SpecialistId;

    use super::test_support::stores;
    use super::{required_arg, ToolError, ToolRegistry};

    #[test]
    fn standard_registry_covers_every_specialist_tool() {
        let registry = ToolRegistry::standard(&stores());

        for specialist in SpecialistId::ALL {
            for tool in specialist.tools() {
                assert!(registry.get(tool).is_some(), "{tool} is not registered");
            }
        }
        assert_eq!(registry.len(), 14);
    }

    #[tokio::test]
    async fn unknown_tools_are_rejected() {
        let registry = ToolRegistry::standard(&stores());
        let mut context = ConversationContext::default();

        let result = registry.execute("book_hotel", &json!({}), &mut context).await;

        assert!(matches!(result, Err(ToolError::UnknownTool(name)) if name == "book_hotel"));
    }

    #[test]
    fn required_arg_prefers_input_then_context() {
        let fallback = Some("CONF002".to_string());

        let from_input =
            required_arg(&json!({ "confirmation_number": " CONF001 " }), "confirmation_number", fallback.as_ref());
        assert_eq!(from_input.ok().as_deref(), Some("CONF001"));

        let from_context = required_arg(&json!({}), "confirmation_number", fallback.as_ref());
        assert_eq!(from_context.ok().as_deref(), Some("CONF002"));

        let missing = required_arg(&json!({ "confirmation_number": "" }), "confirmation_number", None);
        assert!(matches!(missing, Err(ToolError::MissingArgument("confirmation_number"))));
    }
}
