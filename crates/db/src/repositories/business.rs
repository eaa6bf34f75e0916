use sqlx::sqlite::SqliteRow;
use sqlx::{QueryBuilder, Sqlite};

use concierge_core::domain::business::{BusinessFilter, BusinessRecord, FilterMatch, NewBusiness};
use concierge_core::domain::context::BusinessDetails;

use super::{column, BusinessRepository, RepositoryError};
use crate::DbPool;

const BUSINESS_SELECT: &str = "SELECT b.id, b.user_id, b.organization_id, b.details, b.is_active,
        u.user_name AS owner_name
    FROM ib_businesses b
    LEFT JOIN users u ON u.id = b.user_id";

/// SQL expression holding the value a canonical filter key is compared with.
fn filter_column(key: &str) -> Option<&'static str> {
    match key {
        "companyName" => Some("json_extract(b.details, '$.companyName')"),
        "industrySector" => Some("json_extract(b.details, '$.industrySector')"),
        "subSector" => Some("json_extract(b.details, '$.subSector')"),
        "location" => Some("json_extract(b.details, '$.location')"),
        "name" => Some("COALESCE(u.user_name, json_extract(b.details, '$.userName'))"),
        _ => None,
    }
}

/// `%value%` with LIKE wildcards in the value escaped by `\`.
fn contains_pattern(value: &str) -> String {
    let escaped = value
        .to_lowercase()
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{escaped}%")
}

fn push_filter(query_builder: &mut QueryBuilder<'_, Sqlite>, filter: &BusinessFilter) {
    for (key, value) in filter {
        let (Some(column), Some(mode)) = (filter_column(key), FilterMatch::for_key(key)) else {
            query_builder.push(" AND 0 = 1");
            continue;
        };
        query_builder.push(format!(" AND LOWER({column})"));
        match mode {
            FilterMatch::Exact => {
                query_builder.push(" = ");
                query_builder.push_bind(value.to_lowercase());
            }
            FilterMatch::Contains => {
                query_builder.push(" LIKE ");
                query_builder.push_bind(contains_pattern(value));
                query_builder.push(" ESCAPE '\\'");
            }
        }
    }
}

pub struct SqlBusinessRepository {
    pool: DbPool,
}

impl SqlBusinessRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<BusinessRecord>, RepositoryError> {
        let row = sqlx::query(&format!("{BUSINESS_SELECT} WHERE b.id = ?"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(row_to_business).transpose()
    }
}

fn row_to_business(row: &SqliteRow) -> Result<BusinessRecord, RepositoryError> {
    let details_json: String = column(row, "details")?;
    let details: BusinessDetails = serde_json::from_str(&details_json)
        .map_err(|error| RepositoryError::Decode(error.to_string()))?;

    Ok(BusinessRecord {
        id: column(row, "id")?,
        user_id: column(row, "user_id")?,
        organization_id: column(row, "organization_id")?,
        owner_name: column(row, "owner_name")?,
        details,
        is_active: column(row, "is_active")?,
    })
}

#[async_trait::async_trait]
impl BusinessRepository for SqlBusinessRepository {
    async fn search(&self, filter: &BusinessFilter) -> Result<Vec<BusinessRecord>, RepositoryError> {
        let mut query_builder = QueryBuilder::<Sqlite>::new(BUSINESS_SELECT);
        query_builder.push(" WHERE b.is_active = 1");
        push_filter(&mut query_builder, filter);
        query_builder.push(" ORDER BY b.id");

        let rows = query_builder.build().fetch_all(&self.pool).await?;
        rows.iter().map(row_to_business).collect()
    }

    async fn list_for_user(&self, user_id: &str) -> Result<Vec<BusinessRecord>, RepositoryError> {
        let rows = sqlx::query(&format!("{BUSINESS_SELECT} WHERE b.user_id = ? ORDER BY b.id"))
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(row_to_business).collect()
    }

    async fn insert(&self, business: NewBusiness) -> Result<BusinessRecord, RepositoryError> {
        let details = serde_json::to_string(&business.details)
            .map_err(|error| RepositoryError::Decode(error.to_string()))?;

        let result = sqlx::query(
            "INSERT INTO ib_businesses (user_id, organization_id, details, is_active)
             VALUES (?, ?, ?, 1)",
        )
        .bind(&business.user_id)
        .bind(&business.organization_id)
        .bind(details)
        .execute(&self.pool)
        .await?;

        let id = result.last_insert_rowid();
        self.find_by_id(id).await?.ok_or_else(|| {
            RepositoryError::Decode(format!("inserted business {id} could not be read back"))
        })
    }
}
