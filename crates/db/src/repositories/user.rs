use sqlx::sqlite::SqliteRow;

use concierge_core::domain::context::UserDetails;

use super::{column, RepositoryError, UserRepository};
use crate::DbPool;

pub struct SqlUserRepository {
    pool: DbPool,
}

impl SqlUserRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn row_to_user(row: &SqliteRow) -> Result<UserDetails, RepositoryError> {
    let email: Option<String> = column(row, "email")?;

    Ok(UserDetails {
        user_id: Some(column(row, "id")?),
        registration_id: Some(column(row, "registration_id")?),
        organization_id: column(row, "organization_id")?,
        user_name: column(row, "user_name")?,
        first_name: column(row, "first_name")?,
        last_name: column(row, "last_name")?,
        registered_email: email.clone(),
        email,
    })
}

#[async_trait::async_trait]
impl UserRepository for SqlUserRepository {
    async fn find_by_registration_id(
        &self,
        registration_id: &str,
    ) -> Result<Option<UserDetails>, RepositoryError> {
        let row = sqlx::query(
            "SELECT id, registration_id, organization_id, user_name, first_name, last_name, email
             FROM users WHERE registration_id = ?",
        )
        .bind(registration_id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(row_to_user).transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::SqlUserRepository;
    use crate::fixtures::seeded_test_pool;
    use crate::repositories::UserRepository;

    #[tokio::test]
    async fn finds_seeded_user_by_registration_id() {
        let repo = SqlUserRepository::new(seeded_test_pool().await);

        let user = repo.find_by_registration_id("R-1001").await.expect("query").expect("user");

        assert_eq!(user.user_id.as_deref(), Some("u-1001"));
        assert_eq!(user.organization_id.as_deref(), Some("ORG-100"));
        assert_eq!(user.registered_email, user.email);
        assert!(repo.find_by_registration_id("R-404").await.expect("query").is_none());
    }
}
