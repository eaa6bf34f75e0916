use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::DomainError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    CustomerService,
    Conference,
    Networking,
    Unmatched,
}

impl Intent {
    /// Intents that carry keywords, in routing order.
    pub const ROUTABLE: [Intent; 3] = [Self::CustomerService, Self::Conference, Self::Networking];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::CustomerService => "customer_service",
            Self::Conference => "conference",
            Self::Networking => "networking",
            Self::Unmatched => "unmatched",
        }
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Intent {
    type Err = DomainError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "customer_service" => Ok(Self::CustomerService),
            "conference" => Ok(Self::Conference),
            "networking" => Ok(Self::Networking),
            "unmatched" => Ok(Self::Unmatched),
            other => Err(DomainError::InvalidKeywordTable(format!(
                "unknown intent `{other}` (expected customer_service|conference|networking)"
            ))),
        }
    }
}

const DEFAULT_KEYWORDS: &[(Intent, &[&str])] = &[
    (
        Intent::CustomerService,
        &[
            "flight",
            "booking",
            "cancel",
            "seat",
            "status",
            "check-in",
            "reservation",
            "ticket",
            "change",
            "delay",
            "departure",
            "arrival",
        ],
    ),
    (
        Intent::Conference,
        &[
            "session",
            "speaker",
            "track",
            "room",
            "schedule",
            "conference",
            "talk",
            "presentation",
            "event",
            "agenda",
            "summit",
        ],
    ),
    (
        Intent::Networking,
        &[
            "business",
            "company",
            "networking",
            "profile",
            "industry",
            "fintech",
            "tech",
            "startup",
            "register business",
        ],
    ),
];

/// Ordered intent to keyword mapping. Both the intent order and the keyword order inside
/// each intent decide ties.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KeywordTable {
    entries: Vec<(Intent, Vec<String>)>,
}

impl Default for KeywordTable {
    fn default() -> Self {
        Self {
            entries: DEFAULT_KEYWORDS
                .iter()
                .map(|(intent, keywords)| {
                    (*intent, keywords.iter().map(|keyword| (*keyword).to_string()).collect())
                })
                .collect(),
        }
    }
}

impl KeywordTable {
    pub fn new(entries: Vec<(Intent, Vec<String>)>) -> Result<Self, DomainError> {
        let mut validated: Vec<(Intent, Vec<String>)> = Vec::with_capacity(entries.len());

        for (intent, keywords) in entries {
            if intent == Intent::Unmatched {
                return Err(DomainError::InvalidKeywordTable(
                    "`unmatched` cannot carry keywords".to_string(),
                ));
            }
            if validated.iter().any(|(existing, _)| *existing == intent) {
                return Err(DomainError::InvalidKeywordTable(format!(
                    "intent `{intent}` is declared more than once"
                )));
            }

            let keywords = keywords
                .into_iter()
                .map(|keyword| keyword.trim().to_lowercase())
                .filter(|keyword| !keyword.is_empty())
                .collect::<Vec<_>>();
            if keywords.is_empty() {
                return Err(DomainError::InvalidKeywordTable(format!(
                    "intent `{intent}` has no keywords"
                )));
            }

            validated.push((intent, keywords));
        }

        Ok(Self { entries: validated })
    }

    /// Replaces the keyword list of one intent, keeping its position in the table.
    /// Intents missing from the table are appended.
    pub fn with_keywords(&self, intent: Intent, keywords: Vec<String>) -> Result<Self, DomainError> {
        let mut entries = self.entries.clone();
        match entries.iter_mut().find(|(existing, _)| *existing == intent) {
            Some(entry) => entry.1 = keywords,
            None => entries.push((intent, keywords)),
        }
        Self::new(entries)
    }

    pub fn entries(&self) -> &[(Intent, Vec<String>)] {
        &self.entries
    }

    pub fn keywords_for(&self, intent: Intent) -> &[String] {
        self.entries
            .iter()
            .find(|(existing, _)| *existing == intent)
            .map(|(_, keywords)| keywords.as_slice())
            .unwrap_or(&[])
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RouteDecision {
    pub intent: Intent,
    pub keyword: Option<String>,
}

#[derive(Clone, Debug, Default)]
pub struct IntentRouter {
    table: KeywordTable,
}

impl IntentRouter {
    pub fn new(table: KeywordTable) -> Self {
        Self { table }
    }

    pub fn table(&self) -> &KeywordTable {
        &self.table
    }

    pub fn route(&self, message: &str) -> Intent {
        self.route_decision(message).intent
    }

    /// First keyword found as a substring selects its intent; no scoring across intents.
    pub fn route_decision(&self, message: &str) -> RouteDecision {
        let message = message.to_lowercase();

        for (intent, keywords) in &self.table.entries {
            if let Some(keyword) = keywords.iter().find(|keyword| message.contains(keyword.as_str()))
            {
                return RouteDecision { intent: *intent, keyword: Some(keyword.clone()) };
            }
        }

        RouteDecision { intent: Intent::Unmatched, keyword: None }
    }
}
