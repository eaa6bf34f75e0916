use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::errors::DomainError;

/// One booking as shown to the user, flattened from the booking, customer and flight rows.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BookingSummary {
    pub id: Option<i64>,
    pub confirmation_number: Option<String>,
    pub customer_id: Option<i64>,
    pub flight_id: Option<i64>,
    pub flight_number: Option<String>,
    pub seat_number: Option<String>,
    pub booking_status: Option<String>,
    pub origin: Option<String>,
    pub destination: Option<String>,
    pub customer_name: Option<String>,
    pub customer_email: Option<String>,
    pub account_number: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UserDetails {
    pub user_id: Option<String>,
    pub registration_id: Option<String>,
    pub organization_id: Option<String>,
    pub user_name: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub registered_email: Option<String>,
}

/// Business profile submitted through the networking form. Field names follow the form's
/// camelCase keys because the same document is stored verbatim in `ib_businesses.details`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct BusinessDetails {
    pub company_name: String,
    pub industry_sector: String,
    pub location: String,
    pub position_title: String,
    #[serde(alias = "user_name")]
    pub user_name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub_sector: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub establishment_year: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub legal_structure: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brief_description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub products_or_services: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub annual_turnover_range: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub direct_employment: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub indirect_employment: Option<String>,
}

impl BusinessDetails {
    pub const REQUIRED_FIELDS: [&'static str; 6] =
        ["companyName", "industrySector", "location", "positionTitle", "userName", "email"];

    /// Names of required fields that are blank.
    pub fn missing_required_fields(&self) -> Vec<&'static str> {
        let values = [
            &self.company_name,
            &self.industry_sector,
            &self.location,
            &self.position_title,
            &self.user_name,
            &self.email,
        ];
        Self::REQUIRED_FIELDS
            .iter()
            .zip(values)
            .filter(|(_, value)| value.trim().is_empty())
            .map(|(name, _)| *name)
            .collect()
    }
}

/// Everything known about the current user and conversation.
///
/// The schema is closed: unknown keys are rejected both when deserializing and when
/// setting fields by name through [`ConversationContext::set_field`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConversationContext {
    pub confirmation_number: Option<String>,
    pub account_number: Option<String>,
    pub registration_id: Option<String>,
    pub user_id: Option<String>,
    pub organization_id: Option<String>,
    pub passenger_name: Option<String>,
    pub customer_id: Option<i64>,
    pub customer_email: Option<String>,
    pub flight_number: Option<String>,
    pub flight_id: Option<i64>,
    pub seat_number: Option<String>,
    pub booking_id: Option<i64>,
    #[serde(default)]
    pub customer_bookings: Vec<BookingSummary>,
    pub user_details: Option<UserDetails>,
    pub business_details: Option<BusinessDetails>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ContextField {
    ConfirmationNumber,
    AccountNumber,
    RegistrationId,
    UserId,
    OrganizationId,
    PassengerName,
    CustomerId,
    CustomerEmail,
    FlightNumber,
    FlightId,
    SeatNumber,
    BookingId,
    CustomerBookings,
    UserDetails,
    BusinessDetails,
}

impl ContextField {
    pub const ALL: [ContextField; 15] = [
        Self::ConfirmationNumber,
        Self::AccountNumber,
        Self::RegistrationId,
        Self::UserId,
        Self::OrganizationId,
        Self::PassengerName,
        Self::CustomerId,
        Self::CustomerEmail,
        Self::FlightNumber,
        Self::FlightId,
        Self::SeatNumber,
        Self::BookingId,
        Self::CustomerBookings,
        Self::UserDetails,
        Self::BusinessDetails,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::ConfirmationNumber => "confirmation_number",
            Self::AccountNumber => "account_number",
            Self::RegistrationId => "registration_id",
            Self::UserId => "user_id",
            Self::OrganizationId => "organization_id",
            Self::PassengerName => "passenger_name",
            Self::CustomerId => "customer_id",
            Self::CustomerEmail => "customer_email",
            Self::FlightNumber => "flight_number",
            Self::FlightId => "flight_id",
            Self::SeatNumber => "seat_number",
            Self::BookingId => "booking_id",
            Self::CustomerBookings => "customer_bookings",
            Self::UserDetails => "user_details",
            Self::BusinessDetails => "business_details",
        }
    }
}

impl fmt::Display for ContextField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ContextField {
    type Err = DomainError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|field| field.as_str() == value)
            .ok_or_else(|| DomainError::UnknownContextField(value.to_string()))
    }
}

impl ConversationContext {
    /// Builds a context from a JSON object, rejecting undeclared keys.
    pub fn from_value(value: Value) -> Result<Self, DomainError> {
        if let Value::Object(map) = &value {
            for key in map.keys() {
                key.parse::<ContextField>()?;
            }
        }

        serde_json::from_value(value).map_err(|error| DomainError::InvalidContextValue {
            field: "<context>".to_string(),
            reason: error.to_string(),
        })
    }

    /// Sets one field by its serialized name. Unknown names fail with
    /// [`DomainError::UnknownContextField`]; the context is untouched on any error.
    pub fn set_field(&mut self, key: &str, value: Value) -> Result<(), DomainError> {
        let field = key.parse::<ContextField>()?;

        let mut map = self.snapshot();
        map.insert(field.as_str().to_string(), value);

        let updated = serde_json::from_value::<Self>(Value::Object(map)).map_err(|error| {
            DomainError::InvalidContextValue {
                field: field.as_str().to_string(),
                reason: error.to_string(),
            }
        })?;
        *self = updated;
        Ok(())
    }

    /// Public fields as a JSON object, unset fields included as `null`.
    pub fn snapshot(&self) -> Map<String, Value> {
        match serde_json::to_value(self) {
            Ok(Value::Object(map)) => map,
            _ => Map::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}
