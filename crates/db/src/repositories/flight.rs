use sqlx::sqlite::SqliteRow;

use concierge_core::domain::booking::FlightRecord;

use super::{column, FlightRepository, RepositoryError};
use crate::DbPool;

pub struct SqlFlightRepository {
    pool: DbPool,
}

impl SqlFlightRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn row_to_flight(row: &SqliteRow) -> Result<FlightRecord, RepositoryError> {
    Ok(FlightRecord {
        id: column(row, "id")?,
        flight_number: column(row, "flight_number")?,
        origin: column(row, "origin")?,
        destination: column(row, "destination")?,
        current_status: column(row, "current_status")?,
        gate: column(row, "gate")?,
        terminal: column(row, "terminal")?,
        delay_minutes: column(row, "delay_minutes")?,
    })
}

#[async_trait::async_trait]
impl FlightRepository for SqlFlightRepository {
    async fn find_by_number(
        &self,
        flight_number: &str,
    ) -> Result<Option<FlightRecord>, RepositoryError> {
        let row = sqlx::query(
            "SELECT id, flight_number, origin, destination, current_status, gate, terminal,
                    delay_minutes
             FROM flights WHERE flight_number = ? COLLATE NOCASE",
        )
        .bind(flight_number)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(row_to_flight).transpose()
    }
}
