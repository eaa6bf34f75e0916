use async_trait::async_trait;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, Sqlite};
use thiserror::Error;

use concierge_core::domain::booking::{BookingRecord, CustomerRecord, FlightRecord};
use concierge_core::domain::business::{BusinessFilter, BusinessRecord, NewBusiness};
use concierge_core::domain::conference::ConferenceSession;
use concierge_core::domain::context::{ConversationContext, UserDetails};

pub mod booking;
pub mod business;
pub mod context;
pub mod customer;
pub mod flight;
pub mod memory;
pub mod schedule;
pub mod user;

pub use booking::SqlBookingRepository;
pub use business::SqlBusinessRepository;
pub use context::{context_from_account, context_from_user, SqlContextStore};
pub use customer::SqlCustomerRepository;
pub use flight::SqlFlightRepository;
pub use memory::InMemoryRecordStore;
pub use schedule::SqlScheduleRepository;
pub use user::SqlUserRepository;

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("decode error: {0}")]
    Decode(String),
}

/// Identity lookups used to seed a conversation context.
#[async_trait]
pub trait ContextStore: Send + Sync {
    async fn lookup_by_registration_id(
        &self,
        registration_id: &str,
    ) -> Result<Option<ConversationContext>, RepositoryError>;

    async fn lookup_by_account_number(
        &self,
        account_number: &str,
    ) -> Result<Option<ConversationContext>, RepositoryError>;
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_by_registration_id(
        &self,
        registration_id: &str,
    ) -> Result<Option<UserDetails>, RepositoryError>;
}

#[async_trait]
pub trait CustomerRepository: Send + Sync {
    async fn find_by_account_number(
        &self,
        account_number: &str,
    ) -> Result<Option<CustomerRecord>, RepositoryError>;
}

#[async_trait]
pub trait BookingRepository: Send + Sync {
    async fn find_by_confirmation(
        &self,
        confirmation_number: &str,
    ) -> Result<Option<BookingRecord>, RepositoryError>;

    async fn list_for_customer(&self, customer_id: i64)
        -> Result<Vec<BookingRecord>, RepositoryError>;

    /// Returns `false` when no booking carries the confirmation number.
    async fn update_seat(
        &self,
        confirmation_number: &str,
        seat_number: &str,
    ) -> Result<bool, RepositoryError>;

    async fn update_status(
        &self,
        confirmation_number: &str,
        booking_status: &str,
    ) -> Result<bool, RepositoryError>;
}

#[async_trait]
pub trait FlightRepository: Send + Sync {
    async fn find_by_number(&self, flight_number: &str)
        -> Result<Option<FlightRecord>, RepositoryError>;
}

#[async_trait]
pub trait ScheduleRepository: Send + Sync {
    /// Sessions ordered by date, start time and id.
    async fn list_sessions(&self, limit: u32) -> Result<Vec<ConferenceSession>, RepositoryError>;
    async fn list_speakers(&self) -> Result<Vec<String>, RepositoryError>;
    async fn list_tracks(&self) -> Result<Vec<String>, RepositoryError>;
    async fn list_rooms(&self) -> Result<Vec<String>, RepositoryError>;
}

#[async_trait]
pub trait BusinessRepository: Send + Sync {
    /// Active businesses matching every filter entry. Filters must already be canonical.
    async fn search(&self, filter: &BusinessFilter) -> Result<Vec<BusinessRecord>, RepositoryError>;
    async fn list_for_user(&self, user_id: &str) -> Result<Vec<BusinessRecord>, RepositoryError>;
    async fn insert(&self, business: NewBusiness) -> Result<BusinessRecord, RepositoryError>;
}

pub(crate) fn column<'r, T>(row: &'r SqliteRow, name: &str) -> Result<T, RepositoryError>
where
    T: sqlx::Decode<'r, Sqlite> + sqlx::Type<Sqlite>,
{
    row.try_get(name).map_err(|error| RepositoryError::Decode(error.to_string()))
}
