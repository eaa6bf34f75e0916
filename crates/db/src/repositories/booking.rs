use sqlx::sqlite::SqliteRow;

use concierge_core::domain::booking::{BookingRecord, CustomerRecord, FlightRecord};

use super::{column, BookingRepository, RepositoryError};
use crate::DbPool;

const BOOKING_SELECT: &str = "SELECT b.id, b.confirmation_number, b.customer_id, b.flight_id,
        b.seat_number, b.booking_status,
        c.id AS c_id, c.name AS c_name, c.email AS c_email,
        c.account_number AS c_account_number, c.user_id AS c_user_id,
        f.id AS f_id, f.flight_number AS f_flight_number, f.origin AS f_origin,
        f.destination AS f_destination, f.current_status AS f_current_status,
        f.gate AS f_gate, f.terminal AS f_terminal, f.delay_minutes AS f_delay_minutes
    FROM bookings b
    LEFT JOIN customers c ON c.id = b.customer_id
    LEFT JOIN flights f ON f.id = b.flight_id";

pub struct SqlBookingRepository {
    pool: DbPool,
}

impl SqlBookingRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn row_to_booking(row: &SqliteRow) -> Result<BookingRecord, RepositoryError> {
    let customer = match column::<Option<i64>>(row, "c_id")? {
        Some(id) => Some(CustomerRecord {
            id,
            name: column(row, "c_name")?,
            email: column(row, "c_email")?,
            account_number: column(row, "c_account_number")?,
            user_id: column(row, "c_user_id")?,
        }),
        None => None,
    };

    let flight = match column::<Option<i64>>(row, "f_id")? {
        Some(id) => Some(FlightRecord {
            id,
            flight_number: column::<Option<String>>(row, "f_flight_number")?.unwrap_or_default(),
            origin: column(row, "f_origin")?,
            destination: column(row, "f_destination")?,
            current_status: column(row, "f_current_status")?,
            gate: column(row, "f_gate")?,
            terminal: column(row, "f_terminal")?,
            delay_minutes: column::<Option<i64>>(row, "f_delay_minutes")?.unwrap_or(0),
        }),
        None => None,
    };

    Ok(BookingRecord {
        id: column(row, "id")?,
        confirmation_number: column(row, "confirmation_number")?,
        customer_id: column(row, "customer_id")?,
        flight_id: column(row, "flight_id")?,
        seat_number: column(row, "seat_number")?,
        booking_status: column(row, "booking_status")?,
        customer,
        flight,
    })
}

#[async_trait::async_trait]
impl BookingRepository for SqlBookingRepository {
    async fn find_by_confirmation(
        &self,
        confirmation_number: &str,
    ) -> Result<Option<BookingRecord>, RepositoryError> {
        let row = sqlx::query(&format!(
            "{BOOKING_SELECT} WHERE b.confirmation_number = ? COLLATE NOCASE"
        ))
        .bind(confirmation_number)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(row_to_booking).transpose()
    }

    async fn list_for_customer(
        &self,
        customer_id: i64,
    ) -> Result<Vec<BookingRecord>, RepositoryError> {
        let rows = sqlx::query(&format!("{BOOKING_SELECT} WHERE b.customer_id = ? ORDER BY b.id"))
            .bind(customer_id)
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(row_to_booking).collect()
    }

    async fn update_seat(
        &self,
        confirmation_number: &str,
        seat_number: &str,
    ) -> Result<bool, RepositoryError> {
        let result = sqlx::query(
            "UPDATE bookings SET seat_number = ? WHERE confirmation_number = ? COLLATE NOCASE",
        )
        .bind(seat_number)
        .bind(confirmation_number)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn update_status(
        &self,
        confirmation_number: &str,
        booking_status: &str,
    ) -> Result<bool, RepositoryError> {
        let result = sqlx::query(
            "UPDATE bookings SET booking_status = ? WHERE confirmation_number = ? COLLATE NOCASE",
        )
        .bind(booking_status)
        .bind(confirmation_number)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use concierge_core::domain::booking::BOOKING_STATUS_CANCELLED;

    use super::SqlBookingRepository;
    use crate::fixtures::seeded_test_pool;
    use crate::repositories::BookingRepository;

    #[tokio::test]
    async fn booking_lookup_joins_customer_and_flight() {
        let repo = SqlBookingRepository::new(seeded_test_pool().await);

        let booking = repo.find_by_confirmation("CONF001").await.expect("query").expect("booking");

        assert_eq!(booking.seat_number.as_deref(), Some("12A"));
        let customer = booking.customer.as_ref().expect("customer joined");
        assert_eq!(customer.account_number.as_deref(), Some("ACC-1001"));
        let flight = booking.flight.as_ref().expect("flight joined");
        assert_eq!(flight.flight_number, "FLT-123");
        assert_eq!(booking.summary().destination.as_deref(), Some("LAX"));
    }

    #[tokio::test]
    async fn customer_bookings_are_listed_in_id_order() {
        let repo = SqlBookingRepository::new(seeded_test_pool().await);

        let bookings = repo.list_for_customer(1).await.expect("query");
        let numbers: Vec<_> =
            bookings.iter().map(|booking| booking.confirmation_number.as_str()).collect();

        assert_eq!(numbers, vec!["CONF001", "CONF002"]);
    }

    #[tokio::test]
    async fn seat_and_status_updates_report_missing_bookings() {
        let repo = SqlBookingRepository::new(seeded_test_pool().await);

        assert!(repo.update_seat("CONF003", "1A").await.expect("update"));
        assert!(!repo.update_seat("NOPE", "1A").await.expect("update"));
        assert!(repo.update_status("CONF003", BOOKING_STATUS_CANCELLED).await.expect("update"));

        let booking = repo.find_by_confirmation("CONF003").await.expect("query").expect("booking");
        assert_eq!(booking.seat_number.as_deref(), Some("1A"));
        assert!(booking.is_cancelled());
    }
}
