pub mod audit;
pub mod config;
pub mod domain;
pub mod errors;
pub mod normalize;
pub mod routing;
pub mod specialists;

pub use audit::{AuditCategory, AuditEvent, AuditOutcome, AuditSink, InMemoryAuditSink};
pub use config::{AppConfig, ConfigError, ConfigOverrides, LlmProvider, LoadOptions, LogFormat};
pub use domain::booking::{BookingRecord, CustomerRecord, FlightRecord};
pub use domain::business::{BusinessFilter, BusinessRecord, NewBusiness};
pub use domain::conference::ConferenceSession;
pub use domain::context::{
    BookingSummary, BusinessDetails, ContextField, ConversationContext, UserDetails,
};
pub use domain::envelope::{GuardrailCheck, ReplyEnvelope, SYSTEM_IDENTITY};
pub use domain::hints::ContextHints;
pub use errors::{ApplicationError, DomainError, InterfaceError};
pub use routing::{Intent, IntentRouter, KeywordTable, RouteDecision};
pub use specialists::{specialist_directory, SpecialistId, SpecialistProfile};
