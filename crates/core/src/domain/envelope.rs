use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::audit::AuditEvent;
use crate::specialists::SpecialistProfile;

/// Identity reported when the pipeline failed and a degraded reply is returned.
pub const SYSTEM_IDENTITY: &str = "System";

pub const DEGRADED_REPLY: &str = "I'm sorry, there was an error. Please try again.";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuardrailCheck {
    pub id: String,
    pub name: String,
    pub input: String,
    pub reasoning: String,
    pub passed: bool,
    pub timestamp: DateTime<Utc>,
}

impl GuardrailCheck {
    pub fn new(
        name: impl Into<String>,
        input: impl Into<String>,
        reasoning: impl Into<String>,
        passed: bool,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            input: input.into(),
            reasoning: reasoning.into(),
            passed,
            timestamp: Utc::now(),
        }
    }
}

/// Reply handed to the transport layer for one inbound message.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplyEnvelope {
    #[serde(rename = "response")]
    pub reply: String,
    #[serde(rename = "agent")]
    pub specialist: String,
    pub conversation_id: String,
    pub context: Map<String, Value>,
    #[serde(rename = "agents")]
    pub directory: Vec<SpecialistProfile>,
    pub events: Vec<AuditEvent>,
    pub guardrails: Vec<GuardrailCheck>,
    /// Client widget to open with this reply, named after the tool that requested it.
    #[serde(default)]
    pub tool_trigger: Option<String>,
}

impl ReplyEnvelope {
    pub fn degraded() -> Self {
        Self {
            reply: DEGRADED_REPLY.to_string(),
            specialist: SYSTEM_IDENTITY.to_string(),
            conversation_id: "error".to_string(),
            context: Map::new(),
            directory: Vec::new(),
            events: Vec::new(),
            guardrails: Vec::new(),
            tool_trigger: None,
        }
    }

    pub fn is_degraded(&self) -> bool {
        self.specialist == SYSTEM_IDENTITY
    }
}
