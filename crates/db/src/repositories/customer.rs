use sqlx::sqlite::SqliteRow;

use concierge_core::domain::booking::CustomerRecord;

use super::{column, CustomerRepository, RepositoryError};
use crate::DbPool;

pub struct SqlCustomerRepository {
    pool: DbPool,
}

impl SqlCustomerRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn row_to_customer(row: &SqliteRow) -> Result<CustomerRecord, RepositoryError> {
    Ok(CustomerRecord {
        id: column(row, "id")?,
        name: column(row, "name")?,
        email: column(row, "email")?,
        account_number: column(row, "account_number")?,
        user_id: column(row, "user_id")?,
    })
}

#[async_trait::async_trait]
impl CustomerRepository for SqlCustomerRepository {
    async fn find_by_account_number(
        &self,
        account_number: &str,
    ) -> Result<Option<CustomerRecord>, RepositoryError> {
        let row = sqlx::query(
            "SELECT id, name, email, account_number, user_id FROM customers WHERE account_number = ?",
        )
        .bind(account_number)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(row_to_customer).transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::SqlCustomerRepository;
    use crate::fixtures::seeded_test_pool;
    use crate::repositories::CustomerRepository;

    #[tokio::test]
    async fn finds_customer_by_account_number() {
        let repo = SqlCustomerRepository::new(seeded_test_pool().await);

        let customer = repo.find_by_account_number("ACC-2002").await.expect("query").expect("row");

        assert_eq!(customer.id, 2);
        assert_eq!(customer.name.as_deref(), Some("Carlos Diaz"));
        assert_eq!(customer.user_id, None);
    }
}
