use concierge_db::migrations::run_pending;
use concierge_db::repositories::{BookingRepository, ContextStore, ScheduleRepository};
use concierge_db::{
    connect_with_settings, DemoSeedDataset, SqlBookingRepository, SqlContextStore,
    SqlScheduleRepository,
};

type SeedContractTestResult<T = ()> = Result<T, String>;

async fn seeded_pool() -> SeedContractTestResult<concierge_db::DbPool> {
    let pool = connect_with_settings("sqlite::memory:", 1, 30)
        .await
        .map_err(|error| format!("connect failed: {error}"))?;
    run_pending(&pool).await.map_err(|error| format!("migrations failed: {error}"))?;
    DemoSeedDataset::load(&pool).await.map_err(|error| format!("seed failed: {error}"))?;
    Ok(pool)
}

#[tokio::test]
async fn demo_seed_supports_the_login_flows() -> SeedContractTestResult {
    let pool = seeded_pool().await?;
    let store = SqlContextStore::new(pool.clone());

    let attendee = store
        .lookup_by_registration_id("R-1001")
        .await
        .map_err(|error| error.to_string())?
        .ok_or("seeded registration should resolve")?;
    if attendee.user_id.as_deref() != Some("u-1001") {
        return Err(format!("unexpected user id {:?}", attendee.user_id));
    }

    let passenger = store
        .lookup_by_account_number("ACC-1001")
        .await
        .map_err(|error| error.to_string())?
        .ok_or("seeded account should resolve")?;
    if passenger.user_id != attendee.user_id {
        return Err("account ACC-1001 should belong to registration R-1001".to_string());
    }
    Ok(())
}

#[tokio::test]
async fn demo_seed_covers_every_specialist_table() -> SeedContractTestResult {
    let pool = seeded_pool().await?;

    let bookings = SqlBookingRepository::new(pool.clone());
    let booking = bookings
        .find_by_confirmation("CONF002")
        .await
        .map_err(|error| error.to_string())?
        .ok_or("CONF002 should be seeded")?;
    if booking.flight.map(|flight| flight.delay_minutes) != Some(45) {
        return Err("CONF002 should be on the delayed flight".to_string());
    }

    let schedule = SqlScheduleRepository::new(pool.clone());
    let sessions = schedule.list_sessions(5).await.map_err(|error| error.to_string())?;
    if sessions.len() != 5 {
        return Err(format!("expected 5 sessions, got {}", sessions.len()));
    }

    let verification = DemoSeedDataset::verify(&pool).await.map_err(|error| error.to_string())?;
    if !verification.all_present {
        return Err(format!("verification failed: {:?}", verification.failed_checks()));
    }
    Ok(())
}
