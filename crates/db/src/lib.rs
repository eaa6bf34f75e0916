pub mod connection;
pub mod fixtures;
pub mod migrations;
pub mod repositories;

pub use connection::{connect, connect_with_config, connect_with_settings, DbPool};
pub use fixtures::{DemoSeedDataset, SeedResult, TableSeedInfo, VerificationResult};
pub use repositories::{
    BookingRepository, BusinessRepository, ContextStore, CustomerRepository, FlightRepository,
    InMemoryRecordStore, RepositoryError, ScheduleRepository, SqlBookingRepository,
    SqlBusinessRepository, SqlContextStore, SqlCustomerRepository, SqlFlightRepository,
    SqlScheduleRepository, SqlUserRepository, UserRepository,
};
