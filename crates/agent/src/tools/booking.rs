use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tracing::info;

use concierge_core::domain::booking::{BookingRecord, BOOKING_STATUS_CANCELLED};
use concierge_core::domain::context::ConversationContext;
use concierge_core::specialists::tool_names;
use concierge_db::repositories::BookingRepository;

use super::{required_arg, string_arg, Tool, ToolError, ToolOutput};

pub const SEAT_MAP_TRIGGER: &str = tool_names::DISPLAY_SEAT_MAP;

fn not_found(confirmation_number: &str) -> ToolOutput {
    ToolOutput::text(format!("No booking found for confirmation number {confirmation_number}"))
}

fn display(value: Option<&str>) -> &str {
    value.unwrap_or("unknown")
}

/// Copies the booking, its passenger and its flight into the context.
fn remember_booking(context: &mut ConversationContext, booking: &BookingRecord) {
    let customer = booking.customer.as_ref();

    context.confirmation_number = Some(booking.confirmation_number.clone());
    context.booking_id = Some(booking.id);
    context.customer_id = booking.customer_id;
    context.passenger_name = customer.and_then(|customer| customer.name.clone());
    context.customer_email = customer.and_then(|customer| customer.email.clone());
    if let Some(account_number) = customer.and_then(|customer| customer.account_number.clone()) {
        context.account_number = Some(account_number);
    }
    context.flight_id = booking.flight_id;
    context.flight_number = booking.flight.as_ref().map(|flight| flight.flight_number.clone());
    context.seat_number = booking.seat_number.clone();
    context.customer_bookings = vec![booking.summary()];
}

pub struct GetBookingDetailsTool {
    bookings: Arc<dyn BookingRepository>,
}

impl GetBookingDetailsTool {
    pub fn new(bookings: Arc<dyn BookingRepository>) -> Self {
        Self { bookings }
    }
}

#[async_trait]
impl Tool for GetBookingDetailsTool {
    fn name(&self) -> &'static str {
        tool_names::GET_BOOKING_DETAILS
    }

    fn description(&self) -> &'static str {
        "Looks up a booking by confirmation number and remembers it for the conversation."
    }

    async fn execute(
        &self,
        input: &Value,
        context: &mut ConversationContext,
    ) -> Result<ToolOutput, ToolError> {
        let confirmation_number =
            required_arg(input, "confirmation_number", context.confirmation_number.as_ref())?;

        let Some(booking) = self.bookings.find_by_confirmation(&confirmation_number).await? else {
            return Ok(not_found(&confirmation_number));
        };
        remember_booking(context, &booking);

        let flight = booking.flight.as_ref();
        Ok(ToolOutput::text(format!(
            "Booking Details for Confirmation {}:\nPassenger: {}\nFlight: {}\nSeat: {}\nStatus: {}\nOrigin: {}\nDestination: {}",
            booking.confirmation_number,
            display(context.passenger_name.as_deref()),
            display(context.flight_number.as_deref()),
            display(context.seat_number.as_deref()),
            display(booking.booking_status.as_deref()),
            display(flight.and_then(|flight| flight.origin.as_deref())),
            display(flight.and_then(|flight| flight.destination.as_deref())),
        )))
    }
}

pub struct UpdateSeatTool {
    bookings: Arc<dyn BookingRepository>,
}

impl UpdateSeatTool {
    pub fn new(bookings: Arc<dyn BookingRepository>) -> Self {
        Self { bookings }
    }
}

#[async_trait]
impl Tool for UpdateSeatTool {
    fn name(&self) -> &'static str {
        tool_names::UPDATE_SEAT
    }

    fn description(&self) -> &'static str {
        "Moves the passenger on a booking to a new seat."
    }

    async fn execute(
        &self,
        input: &Value,
        context: &mut ConversationContext,
    ) -> Result<ToolOutput, ToolError> {
        let confirmation_number =
            required_arg(input, "confirmation_number", context.confirmation_number.as_ref())?;
        let new_seat = string_arg(input, "new_seat")
            .map(|seat| seat.to_ascii_uppercase())
            .ok_or(ToolError::MissingArgument("new_seat"))?;

        if !self.bookings.update_seat(&confirmation_number, &new_seat).await? {
            return Ok(not_found(&confirmation_number));
        }

        info!(
            event_name = "tool.update_seat.applied",
            confirmation_number = %confirmation_number,
            seat_number = %new_seat,
            "seat updated"
        );
        context.confirmation_number = Some(confirmation_number.clone());
        context.seat_number = Some(new_seat.clone());
        for booking in &mut context.customer_bookings {
            if booking.confirmation_number.as_deref() == Some(confirmation_number.as_str()) {
                booking.seat_number = Some(new_seat.clone());
            }
        }

        Ok(ToolOutput::text(format!(
            "Seat updated to {new_seat} for confirmation number {confirmation_number}"
        )))
    }
}

pub struct DisplaySeatMapTool {
    bookings: Arc<dyn BookingRepository>,
}

impl DisplaySeatMapTool {
    pub fn new(bookings: Arc<dyn BookingRepository>) -> Self {
        Self { bookings }
    }
}

#[async_trait]
impl Tool for DisplaySeatMapTool {
    fn name(&self) -> &'static str {
        tool_names::DISPLAY_SEAT_MAP
    }

    fn description(&self) -> &'static str {
        "Opens the interactive seat map for the flight on a booking."
    }

    async fn execute(
        &self,
        input: &Value,
        context: &mut ConversationContext,
    ) -> Result<ToolOutput, ToolError> {
        let confirmation_number =
            required_arg(input, "confirmation_number", context.confirmation_number.as_ref())?;

        let Some(booking) = self.bookings.find_by_confirmation(&confirmation_number).await? else {
            return Ok(not_found(&confirmation_number));
        };
        remember_booking(context, &booking);

        let flight_number = display(context.flight_number.as_deref()).to_string();
        let current_seat = display(context.seat_number.as_deref()).to_string();
        Ok(ToolOutput::text(format!(
            "Here is the seat map for flight {flight_number}. Your current seat is {current_seat}. \
             Choose a seat and tell me its number to switch."
        ))
        .with_trigger(SEAT_MAP_TRIGGER))
    }
}

pub struct CancelFlightTool {
    bookings: Arc<dyn BookingRepository>,
}

impl CancelFlightTool {
    pub fn new(bookings: Arc<dyn BookingRepository>) -> Self {
        Self { bookings }
    }
}

#[async_trait]
impl Tool for CancelFlightTool {
    fn name(&self) -> &'static str {
        tool_names::CANCEL_FLIGHT
    }

    fn description(&self) -> &'static str {
        "Cancels the booking identified by a confirmation number."
    }

    async fn execute(
        &self,
        input: &Value,
        context: &mut ConversationContext,
    ) -> Result<ToolOutput, ToolError> {
        let confirmation_number =
            required_arg(input, "confirmation_number", context.confirmation_number.as_ref())?;

        let Some(booking) = self.bookings.find_by_confirmation(&confirmation_number).await? else {
            return Ok(not_found(&confirmation_number));
        };
        if booking.is_cancelled() {
            return Ok(ToolOutput::text(format!(
                "Booking {} is already cancelled.",
                booking.confirmation_number
            )));
        }

        if !self.bookings.update_status(&booking.confirmation_number, BOOKING_STATUS_CANCELLED).await? {
            return Ok(not_found(&confirmation_number));
        }

        info!(
            event_name = "tool.cancel_flight.applied",
            confirmation_number = %booking.confirmation_number,
            "booking cancelled"
        );
        context.confirmation_number = Some(booking.confirmation_number.clone());
        for summary in &mut context.customer_bookings {
            if summary.confirmation_number.as_deref() == Some(booking.confirmation_number.as_str()) {
                summary.booking_status = Some(BOOKING_STATUS_CANCELLED.to_string());
            }
        }

        Ok(ToolOutput::text(format!("Booking {} has been cancelled.", booking.confirmation_number)))
    }
}
