use std::sync::Arc;

use tracing::{debug, warn};

use concierge_core::domain::context::ConversationContext;
use concierge_core::domain::hints::ContextHints;
use concierge_db::repositories::ContextStore;

/// Builds the conversation context for one message from caller hints and the record store.
#[derive(Clone)]
pub struct ContextResolver {
    store: Arc<dyn ContextStore>,
}

impl ContextResolver {
    pub fn new(store: Arc<dyn ContextStore>) -> Self {
        Self { store }
    }

    /// Registration lookup first, then account lookup; each found context replaces the
    /// working one, so the account wins. Scalar hints are re-applied last. A failed lookup
    /// is logged and leaves the working context as it was.
    pub async fn resolve(&self, hints: &ContextHints) -> ConversationContext {
        let mut context = ConversationContext::default();

        if let Some(registration_id) = hints.registration_id.as_deref() {
            match self.store.lookup_by_registration_id(registration_id).await {
                Ok(Some(found)) => context = found,
                Ok(None) => debug!(
                    event_name = "context.lookup.not_found",
                    key = "registration_id",
                    registration_id,
                    "no user for registration id"
                ),
                Err(error) => warn!(
                    event_name = "context.lookup.failed",
                    key = "registration_id",
                    registration_id,
                    error = %error,
                    "registration lookup failed; continuing without it"
                ),
            }
        }

        if let Some(account_number) = hints.account_number.as_deref() {
            match self.store.lookup_by_account_number(account_number).await {
                Ok(Some(found)) => context = found,
                Ok(None) => debug!(
                    event_name = "context.lookup.not_found",
                    key = "account_number",
                    account_number,
                    "no customer for account number"
                ),
                Err(error) => warn!(
                    event_name = "context.lookup.failed",
                    key = "account_number",
                    account_number,
                    error = %error,
                    "account lookup failed; continuing without it"
                ),
            }
        }

        apply_scalar_hints(&mut context, hints);
        context
    }

    /// Context made from the hints alone, without touching the store.
    pub fn from_hints(hints: &ContextHints) -> ConversationContext {
        let mut context = ConversationContext::default();
        apply_scalar_hints(&mut context, hints);
        context.account_number = hints.account_number.clone();
        context
    }
}

// Account numbers are never re-applied; only a found account sets one.
fn apply_scalar_hints(context: &mut ConversationContext, hints: &ContextHints) {
    if let Some(value) = &hints.confirmation_number {
        context.confirmation_number = Some(value.clone());
    }
    if let Some(value) = &hints.user_id {
        context.user_id = Some(value.clone());
    }
    if let Some(value) = &hints.organization_id {
        context.organization_id = Some(value.clone());
    }
    if let Some(value) = &hints.registration_id {
        context.registration_id = Some(value.clone());
    }
    if let Some(details) = &hints.business_details {
        context.business_details = Some(details.clone());
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;

    use concierge_core::domain::context::ConversationContext;
    use concierge_core::domain::hints::ContextHints;
    use concierge_db::repositories::{ContextStore, RepositoryError};

    use super::ContextResolver;

    struct FixedStore {
        registration: Option<ConversationContext>,
        account: Option<ConversationContext>,
        fail_registration: bool,
    }

    #[async_trait]
    impl ContextStore for FixedStore {
        async fn lookup_by_registration_id(
            &self,
            _registration_id: &str,
        ) -> Result<Option<ConversationContext>, RepositoryError> {
            if self.fail_registration {
                return Err(RepositoryError::Decode("store offline".to_string()));
            }
            Ok(self.registration.clone())
        }

        async fn lookup_by_account_number(
            &self,
            _account_number: &str,
        ) -> Result<Option<ConversationContext>, RepositoryError> {
            Ok(self.account.clone())
        }
    }

    fn registration_context() -> ConversationContext {
        ConversationContext {
            user_id: Some("u-reg".to_string()),
            registration_id: Some("R-1".to_string()),
            passenger_name: Some("From Registration".to_string()),
            ..ConversationContext::default()
        }
    }

    fn account_context() -> ConversationContext {
        ConversationContext {
            user_id: Some("u-acc".to_string()),
            account_number: Some("ACC-1".to_string()),
            confirmation_number: Some("CONF001".to_string()),
            ..ConversationContext::default()
        }
    }

    fn resolver(store: FixedStore) -> ContextResolver {
        ContextResolver::new(Arc::new(store))
    }

    #[tokio::test]
    async fn account_lookup_replaces_registration_lookup() {
        let resolver = resolver(FixedStore {
            registration: Some(registration_context()),
            account: Some(account_context()),
            fail_registration: false,
        });
        let hints = ContextHints {
            registration_id: Some("R-1".to_string()),
            account_number: Some("ACC-1".to_string()),
            ..ContextHints::default()
        };

        let context = resolver.resolve(&hints).await;

        assert_eq!(context.user_id.as_deref(), Some("u-acc"));
        assert_eq!(context.passenger_name, None);
        assert_eq!(context.registration_id.as_deref(), Some("R-1"));
    }

    #[tokio::test]
    async fn scalar_hints_override_lookups() {
        let resolver = resolver(FixedStore {
            registration: None,
            account: Some(account_context()),
            fail_registration: false,
        });
        let hints = ContextHints {
            account_number: Some("ACC-1".to_string()),
            confirmation_number: Some("CONF777".to_string()),
            user_id: Some("u-hint".to_string()),
            organization_id: Some("ORG-9".to_string()),
            ..ContextHints::default()
        };

        let context = resolver.resolve(&hints).await;

        assert_eq!(context.confirmation_number.as_deref(), Some("CONF777"));
        assert_eq!(context.user_id.as_deref(), Some("u-hint"));
        assert_eq!(context.organization_id.as_deref(), Some("ORG-9"));
        assert_eq!(context.account_number.as_deref(), Some("ACC-1"));
    }

    #[tokio::test]
    async fn missing_account_keeps_registration_context() {
        let resolver = resolver(FixedStore {
            registration: Some(registration_context()),
            account: None,
            fail_registration: false,
        });
        let hints = ContextHints {
            registration_id: Some("R-1".to_string()),
            account_number: Some("ACC-404".to_string()),
            ..ContextHints::default()
        };

        let context = resolver.resolve(&hints).await;

        assert_eq!(context.user_id.as_deref(), Some("u-reg"));
        assert_eq!(context.account_number, None);
    }

    #[tokio::test]
    async fn failed_lookup_still_yields_a_context() {
        let resolver = resolver(FixedStore {
            registration: Some(registration_context()),
            account: None,
            fail_registration: true,
        });
        let hints = ContextHints {
            registration_id: Some("R-1".to_string()),
            user_id: Some("u-hint".to_string()),
            ..ContextHints::default()
        };

        let context = resolver.resolve(&hints).await;

        assert_eq!(context.registration_id.as_deref(), Some("R-1"));
        assert_eq!(context.user_id.as_deref(), Some("u-hint"));
        assert_eq!(context.passenger_name, None);
    }

    #[test]
    fn from_hints_copies_hints_without_lookups() {
        let context = ContextResolver::from_hints(&ContextHints {
            registration_id: Some("R-1".to_string()),
            account_number: Some("ACC-1".to_string()),
            ..ContextHints::default()
        });

        assert_eq!(context.registration_id.as_deref(), Some("R-1"));
        assert_eq!(context.account_number.as_deref(), Some("ACC-1"));
        assert_eq!(context.user_id, None);
    }
}
