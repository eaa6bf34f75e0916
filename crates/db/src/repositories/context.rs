use concierge_core::domain::booking::{BookingRecord, CustomerRecord};
use concierge_core::domain::context::{ConversationContext, UserDetails};

use super::{
    BookingRepository, ContextStore, CustomerRepository, RepositoryError, SqlBookingRepository,
    SqlCustomerRepository, SqlUserRepository, UserRepository,
};
use crate::DbPool;

/// Context seeded from a summit registration.
pub fn context_from_user(user: UserDetails) -> ConversationContext {
    ConversationContext {
        user_id: user.user_id.clone(),
        registration_id: user.registration_id.clone(),
        organization_id: user.organization_id.clone(),
        user_details: Some(user),
        ..ConversationContext::default()
    }
}

/// Context seeded from an airline account. The first booking fills the single-booking
/// fields; every booking is listed in `customer_bookings`.
pub fn context_from_account(
    customer: CustomerRecord,
    bookings: &[BookingRecord],
) -> ConversationContext {
    let mut context = ConversationContext {
        account_number: customer.account_number.clone(),
        customer_id: Some(customer.id),
        passenger_name: customer.name.clone(),
        customer_email: customer.email.clone(),
        user_id: customer.user_id.clone(),
        customer_bookings: bookings.iter().map(BookingRecord::summary).collect(),
        ..ConversationContext::default()
    };

    if let Some(first) = bookings.first() {
        context.confirmation_number = Some(first.confirmation_number.clone());
        context.booking_id = Some(first.id);
        context.flight_id = first.flight_id;
        context.flight_number = first.flight.as_ref().map(|flight| flight.flight_number.clone());
        context.seat_number = first.seat_number.clone();
    }

    context
}

pub struct SqlContextStore {
    users: SqlUserRepository,
    customers: SqlCustomerRepository,
    bookings: SqlBookingRepository,
}

impl SqlContextStore {
    pub fn new(pool: DbPool) -> Self {
        Self {
            users: SqlUserRepository::new(pool.clone()),
            customers: SqlCustomerRepository::new(pool.clone()),
            bookings: SqlBookingRepository::new(pool),
        }
    }
}

#[async_trait::async_trait]
impl ContextStore for SqlContextStore {
    async fn lookup_by_registration_id(
        &self,
        registration_id: &str,
    ) -> Result<Option<ConversationContext>, RepositoryError> {
        let user = self.users.find_by_registration_id(registration_id).await?;
        Ok(user.map(context_from_user))
    }

    async fn lookup_by_account_number(
        &self,
        account_number: &str,
    ) -> Result<Option<ConversationContext>, RepositoryError> {
        let Some(customer) = self.customers.find_by_account_number(account_number).await? else {
            return Ok(None);
        };
        let bookings = self.bookings.list_for_customer(customer.id).await?;
        Ok(Some(context_from_account(customer, &bookings)))
    }
}

#[cfg(test)]
mod tests {
    use super::SqlContextStore;
    use crate::fixtures::seeded_test_pool;
    use crate::repositories::ContextStore;

    #[tokio::test]
    async fn registration_lookup_fills_identity_and_user_details() {
        let store = SqlContextStore::new(seeded_test_pool().await);

        let context =
            store.lookup_by_registration_id("R-1002").await.expect("lookup").expect("context");

        assert_eq!(context.user_id.as_deref(), Some("u-1002"));
        assert_eq!(context.registration_id.as_deref(), Some("R-1002"));
        assert_eq!(context.organization_id.as_deref(), Some("ORG-200"));
        let details = context.user_details.as_ref().expect("user details");
        assert_eq!(details.first_name.as_deref(), Some("Ben"));
        assert!(context.customer_bookings.is_empty());
    }

    #[tokio::test]
    async fn account_lookup_lists_bookings_and_selects_the_first() {
        let store = SqlContextStore::new(seeded_test_pool().await);

        let context =
            store.lookup_by_account_number("ACC-1001").await.expect("lookup").expect("context");

        assert_eq!(context.passenger_name.as_deref(), Some("Ada Okafor"));
        assert_eq!(context.customer_id, Some(1));
        assert_eq!(context.user_id.as_deref(), Some("u-1001"));
        assert_eq!(context.confirmation_number.as_deref(), Some("CONF001"));
        assert_eq!(context.flight_number.as_deref(), Some("FLT-123"));
        assert_eq!(context.customer_bookings.len(), 2);
        assert_eq!(context.customer_bookings[1].origin.as_deref(), Some("SFO"));
    }

    #[tokio::test]
    async fn unknown_keys_yield_none() {
        let store = SqlContextStore::new(seeded_test_pool().await);

        assert!(store.lookup_by_registration_id("R-404").await.expect("lookup").is_none());
        assert!(store.lookup_by_account_number("ACC-404").await.expect("lookup").is_none());
    }
}
