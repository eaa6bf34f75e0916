//! Conversation runtime for the airline and Aviation Tech Summit concierge.
//!
//! One inbound message flows through:
//! 1. **Context resolution** (`resolver`) - caller hints plus record-store lookups
//! 2. **Routing** - keyword table from `concierge_core::routing`
//! 3. **Guardrails** (`guardrails`) - relevance and jailbreak checks
//! 4. **Specialist run** (`runner`) - deterministic tool selection, optional LLM phrasing
//! 5. **Envelope** (`runtime`) - reply, context snapshot and directory for the caller
//!
//! Tools never let the language model decide record contents; it only rephrases tool output.

pub mod conversation;
pub mod guardrails;
pub mod llm;
pub mod resolver;
pub mod runner;
pub mod runtime;
pub mod tools;

pub use guardrails::{GuardrailPolicy, GuardrailVerdict};
pub use llm::{build_llm_client, LlmClient, LlmError};
pub use resolver::ContextResolver;
pub use runner::{AgentRunner, RunnerError, RunnerReply, SpecialistRunner};
pub use runtime::AgentRuntime;
pub use tools::{RecordStores, ToolRegistry};
