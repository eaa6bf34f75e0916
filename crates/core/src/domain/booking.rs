use serde::{Deserialize, Serialize};

use crate::domain::context::BookingSummary;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerRecord {
    pub id: i64,
    pub name: Option<String>,
    pub email: Option<String>,
    pub account_number: Option<String>,
    pub user_id: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlightRecord {
    pub id: i64,
    pub flight_number: String,
    pub origin: Option<String>,
    pub destination: Option<String>,
    pub current_status: Option<String>,
    pub gate: Option<String>,
    pub terminal: Option<String>,
    pub delay_minutes: i64,
}

/// A booking row with its customer and flight joined in.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingRecord {
    pub id: i64,
    pub confirmation_number: String,
    pub customer_id: Option<i64>,
    pub flight_id: Option<i64>,
    pub seat_number: Option<String>,
    pub booking_status: Option<String>,
    pub customer: Option<CustomerRecord>,
    pub flight: Option<FlightRecord>,
}

pub const BOOKING_STATUS_CANCELLED: &str = "Cancelled";

impl BookingRecord {
    pub fn summary(&self) -> BookingSummary {
        let customer = self.customer.as_ref();
        let flight = self.flight.as_ref();

        BookingSummary {
            id: Some(self.id),
            confirmation_number: Some(self.confirmation_number.clone()),
            customer_id: self.customer_id,
            flight_id: self.flight_id,
            flight_number: flight.map(|flight| flight.flight_number.clone()),
            seat_number: self.seat_number.clone(),
            booking_status: self.booking_status.clone(),
            origin: flight.and_then(|flight| flight.origin.clone()),
            destination: flight.and_then(|flight| flight.destination.clone()),
            customer_name: customer.and_then(|customer| customer.name.clone()),
            customer_email: customer.and_then(|customer| customer.email.clone()),
            account_number: customer.and_then(|customer| customer.account_number.clone()),
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.booking_status
            .as_deref()
            .is_some_and(|status| status.eq_ignore_ascii_case(BOOKING_STATUS_CANCELLED))
    }
}
