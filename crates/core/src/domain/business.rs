use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::domain::context::BusinessDetails;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BusinessRecord {
    pub id: i64,
    pub user_id: Option<String>,
    pub organization_id: Option<String>,
    pub owner_name: Option<String>,
    pub details: BusinessDetails,
    pub is_active: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewBusiness {
    pub user_id: Option<String>,
    pub organization_id: Option<String>,
    pub details: BusinessDetails,
}

/// Directory search criteria keyed by canonical field name (`companyName`,
/// `industrySector`, `subSector`, `location`, `name`).
pub type BusinessFilter = BTreeMap<String, String>;

/// How a filter value is compared with the stored field. Both modes ignore ASCII case.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FilterMatch {
    /// Canonicalized vocabularies (`industrySector`, `location`) must match exactly.
    Exact,
    /// Free text (company, sub-sector, owner name) matches on a substring.
    Contains,
}

impl FilterMatch {
    /// Match mode for a canonical filter key; `None` for keys the directory does not know.
    pub fn for_key(key: &str) -> Option<Self> {
        match key {
            "industrySector" | "location" => Some(Self::Exact),
            "companyName" | "subSector" | "name" => Some(Self::Contains),
            _ => None,
        }
    }

    pub fn accepts(self, actual: &str, expected: &str) -> bool {
        match self {
            Self::Exact => actual.eq_ignore_ascii_case(expected),
            Self::Contains => {
                actual.to_ascii_lowercase().contains(&expected.to_ascii_lowercase())
            }
        }
    }
}

impl BusinessRecord {
    /// Evaluates a canonical filter against this record. Unknown filter keys never match.
    pub fn matches(&self, filter: &BusinessFilter) -> bool {
        filter.iter().all(|(key, expected)| {
            let actual = match key.as_str() {
                "companyName" => Some(self.details.company_name.as_str()),
                "industrySector" => Some(self.details.industry_sector.as_str()),
                "subSector" => self.details.sub_sector.as_deref(),
                "location" => Some(self.details.location.as_str()),
                "name" => self.owner_name.as_deref().or(Some(self.details.user_name.as_str())),
                _ => None,
            };
            match (FilterMatch::for_key(key), actual) {
                (Some(mode), Some(actual)) => mode.accepts(actual, expected),
                _ => false,
            }
        })
    }
}
