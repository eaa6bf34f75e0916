use serde::{Deserialize, Serialize};

use crate::domain::context::BusinessDetails;

/// Caller-supplied identity fragments used to resolve a conversation context.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextHints {
    #[serde(default)]
    pub confirmation_number: Option<String>,
    #[serde(default)]
    pub account_number: Option<String>,
    #[serde(default)]
    pub registration_id: Option<String>,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub organization_id: Option<String>,
    #[serde(default)]
    pub business_details: Option<BusinessDetails>,
}

impl ContextHints {
    /// Trims every scalar hint and drops the ones that end up empty; clients send `""`
    /// for fields the user has not filled in.
    pub fn sanitized(self) -> Self {
        Self {
            confirmation_number: clean(self.confirmation_number),
            account_number: clean(self.account_number),
            registration_id: clean(self.registration_id),
            user_id: clean(self.user_id),
            organization_id: clean(self.organization_id),
            business_details: self.business_details,
        }
    }
}

fn clean(value: Option<String>) -> Option<String> {
    value.map(|value| value.trim().to_string()).filter(|value| !value.is_empty())
}
