use crate::connection::DbPool;
use crate::repositories::RepositoryError;

/// Seeded rows per table, keyed by primary key.
const SEED_TABLES: &[SeedTableContract] = &[
    SeedTableContract {
        table: "users",
        key_column: "id",
        keys: &["u-1001", "u-1002"],
        description: "summit registrations R-1001 and R-1002",
    },
    SeedTableContract {
        table: "customers",
        key_column: "id",
        keys: &["1", "2"],
        description: "airline accounts ACC-1001 and ACC-2002",
    },
    SeedTableContract {
        table: "flights",
        key_column: "id",
        keys: &["1", "2", "3"],
        description: "flights FLT-123, FLT-456 and FLT-789",
    },
    SeedTableContract {
        table: "bookings",
        key_column: "id",
        keys: &["1", "2", "3"],
        description: "bookings CONF001, CONF002 and CONF003",
    },
    SeedTableContract {
        table: "conference_schedules",
        key_column: "id",
        keys: &["1", "2", "3", "4", "5", "6"],
        description: "two days of summit sessions",
    },
    SeedTableContract {
        table: "ib_businesses",
        key_column: "id",
        keys: &["1", "2", "3"],
        description: "networking directory with one inactive entry",
    },
];

struct SeedTableContract {
    table: &'static str,
    key_column: &'static str,
    keys: &'static [&'static str],
    description: &'static str,
}

/// Deterministic demo records for the airline and summit tables.
pub struct DemoSeedDataset;

impl DemoSeedDataset {
    pub const SQL: &str = include_str!("../../../config/fixtures/demo_seed.sql");

    /// Loads the demo rows. Rows that already exist are left untouched.
    pub async fn load(pool: &DbPool) -> Result<SeedResult, RepositoryError> {
        let mut tx = pool.begin().await?;
        sqlx::query(Self::SQL).execute(&mut *tx).await?;
        tx.commit().await?;

        let tables_seeded = SEED_TABLES
            .iter()
            .map(|contract| TableSeedInfo {
                table: contract.table,
                rows: contract.keys.len(),
                description: contract.description,
            })
            .collect();

        Ok(SeedResult { tables_seeded })
    }

    /// Checks that every seeded row is present and that the booking joins resolve.
    pub async fn verify(pool: &DbPool) -> Result<VerificationResult, RepositoryError> {
        let mut checks = Vec::new();

        for contract in SEED_TABLES {
            let keys = sql_array_from_ids(contract.keys);
            let present: i64 = sqlx::query_scalar(&format!(
                "SELECT COUNT(1) FROM {} WHERE CAST({} AS TEXT) IN {keys}",
                contract.table, contract.key_column
            ))
            .fetch_one(pool)
            .await?;
            checks.push((contract.table, present == contract.keys.len() as i64));
        }

        let joined: i64 = sqlx::query_scalar(
            "SELECT COUNT(1) FROM bookings b
             JOIN customers c ON c.id = b.customer_id
             JOIN flights f ON f.id = b.flight_id
             WHERE b.confirmation_number IN ('CONF001', 'CONF002', 'CONF003')",
        )
        .fetch_one(pool)
        .await?;
        checks.push(("booking-joins", joined == 3));

        let registration_link: i64 = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM customers c JOIN users u ON u.id = c.user_id
                           WHERE c.account_number = 'ACC-1001' AND u.registration_id = 'R-1001')",
        )
        .fetch_one(pool)
        .await?;
        checks.push(("account-registration-link", registration_link == 1));

        let all_present = checks.iter().all(|(_, ok)| *ok);
        Ok(VerificationResult { all_present, checks })
    }
}

fn sql_array_from_ids(ids: &[&str]) -> String {
    let quoted = ids.iter().map(|id| format!("'{}'", id.replace('\'', "''"))).collect::<Vec<_>>();
    format!("({})", quoted.join(", "))
}

#[derive(Clone, Debug)]
pub struct TableSeedInfo {
    pub table: &'static str,
    pub rows: usize,
    pub description: &'static str,
}

#[derive(Clone, Debug)]
pub struct SeedResult {
    pub tables_seeded: Vec<TableSeedInfo>,
}

#[derive(Clone, Debug)]
pub struct VerificationResult {
    pub all_present: bool,
    pub checks: Vec<(&'static str, bool)>,
}

impl VerificationResult {
    pub fn failed_checks(&self) -> Vec<&'static str> {
        self.checks.iter().filter(|(_, ok)| !ok).map(|(name, _)| *name).collect()
    }
}

#[cfg(test)]
pub(crate) async fn seeded_test_pool() -> DbPool {
    let pool = crate::connect_with_settings("sqlite::memory:", 1, 30).await.expect("connect");
    crate::migrations::run_pending(&pool).await.expect("migrate");
    DemoSeedDataset::load(&pool).await.expect("seed");
    pool
}
