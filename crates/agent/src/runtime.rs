use std::sync::Arc;

use anyhow::{Context as _, Result};
use tracing::{error, info, warn};
use uuid::Uuid;

use concierge_core::audit::{AuditCategory, AuditEvent, AuditOutcome, AuditSink};
use concierge_core::domain::envelope::ReplyEnvelope;
use concierge_core::domain::hints::ContextHints;
use concierge_core::routing::{Intent, IntentRouter};
use concierge_core::specialists::{specialist_directory, SpecialistId};

use crate::guardrails::GuardrailPolicy;
use crate::resolver::ContextResolver;
use crate::runner::AgentRunner;

pub const GREETING_REPLY: &str = "Hello! I can help you with Aviation Tech Summit 2025. Ask me \
about sessions, speakers, tracks, or rooms.";

pub const INITIAL_CONVERSATION_ID: &str = "initial";

pub fn conversation_id(hints: &ContextHints) -> String {
    format!("conv_{}", hints.registration_id.as_deref().unwrap_or("default"))
}

/// Handles one inbound message end to end: resolve context, route, run the specialist
/// and assemble the reply. Holds no per-conversation state.
pub struct AgentRuntime {
    router: IntentRouter,
    resolver: ContextResolver,
    runner: Arc<dyn AgentRunner>,
    guardrails: GuardrailPolicy,
    audit: Option<Arc<dyn AuditSink>>,
}

impl AgentRuntime {
    pub fn new(
        router: IntentRouter,
        resolver: ContextResolver,
        runner: Arc<dyn AgentRunner>,
        guardrails: GuardrailPolicy,
    ) -> Self {
        Self { router, resolver, runner, guardrails, audit: None }
    }

    pub fn with_audit_sink(mut self, sink: Arc<dyn AuditSink>) -> Self {
        self.audit = Some(sink);
        self
    }

    /// Never fails: any error after the empty-message check yields the degraded envelope.
    pub async fn handle(&self, message: &str, hints: ContextHints) -> ReplyEnvelope {
        let hints = hints.sanitized();
        let correlation_id = Uuid::new_v4().to_string();

        if message.trim().is_empty() {
            return Self::greeting(&hints);
        }

        match self.try_handle(message, &hints, &correlation_id).await {
            Ok(envelope) => envelope,
            Err(failure) => {
                error!(
                    event_name = "runtime.message.failed",
                    correlation_id = %correlation_id,
                    conversation_id = %conversation_id(&hints),
                    error = %format!("{failure:#}"),
                    "message handling failed; returning degraded reply"
                );
                ReplyEnvelope::degraded()
            }
        }
    }

    fn greeting(hints: &ContextHints) -> ReplyEnvelope {
        ReplyEnvelope {
            reply: GREETING_REPLY.to_string(),
            specialist: SpecialistId::Triage.name().to_string(),
            conversation_id: INITIAL_CONVERSATION_ID.to_string(),
            context: ContextResolver::from_hints(hints).snapshot(),
            directory: specialist_directory(),
            events: Vec::new(),
            guardrails: Vec::new(),
            tool_trigger: None,
        }
    }

    async fn try_handle(
        &self,
        message: &str,
        hints: &ContextHints,
        correlation_id: &str,
    ) -> Result<ReplyEnvelope> {
        let conversation_id = conversation_id(hints);
        let mut context = self.resolver.resolve(hints).await;

        let decision = self.router.route_decision(message);
        let specialist = SpecialistId::for_intent(decision.intent);
        info!(
            event_name = "routing.intent_selected",
            correlation_id,
            conversation_id = %conversation_id,
            specialist = %specialist,
            intent = %decision.intent,
            keyword = decision.keyword.as_deref().unwrap_or(""),
            "intent routed"
        );

        let mut events = vec![AuditEvent::new(
            &conversation_id,
            correlation_id,
            "routing.intent_selected",
            AuditCategory::Routing,
            specialist.name(),
            AuditOutcome::Success,
        )
        .with_metadata("intent", decision.intent.as_str())
        .with_metadata("keyword", decision.keyword.clone().unwrap_or_default())];

        let verdict = self.guardrails.evaluate(message, decision.intent != Intent::Unmatched);
        let (reply, tool_trigger) = match verdict.blocked_reply {
            Some(blocked) => {
                let tripped = verdict
                    .checks
                    .iter()
                    .filter(|check| !check.passed)
                    .map(|check| check.name.as_str())
                    .collect::<Vec<_>>()
                    .join(",");
                warn!(
                    event_name = "guardrail.tripped",
                    correlation_id,
                    conversation_id = %conversation_id,
                    specialist = %specialist,
                    guardrails = %tripped,
                    "input guardrail blocked the message"
                );
                events.push(
                    AuditEvent::new(
                        &conversation_id,
                        correlation_id,
                        "guardrail.tripped",
                        AuditCategory::Guardrail,
                        specialist.name(),
                        AuditOutcome::Rejected,
                    )
                    .with_metadata("guardrails", tripped),
                );
                (blocked.to_string(), None)
            }
            None => {
                let reply = self
                    .runner
                    .run(specialist, message, &mut context)
                    .await
                    .with_context(|| format!("{specialist} failed to handle the message"))?;
                info!(
                    event_name = "runner.completed",
                    correlation_id,
                    conversation_id = %conversation_id,
                    specialist = %specialist,
                    tool_trigger = reply.tool_trigger.as_deref().unwrap_or(""),
                    "specialist replied"
                );
                events.push(AuditEvent::new(
                    &conversation_id,
                    correlation_id,
                    "runner.completed",
                    AuditCategory::Runner,
                    specialist.name(),
                    AuditOutcome::Success,
                ));
                (reply.text, reply.tool_trigger)
            }
        };

        if let Some(sink) = &self.audit {
            for event in &events {
                sink.emit(event.clone());
            }
        }

        Ok(ReplyEnvelope {
            reply,
            specialist: specialist.name().to_string(),
            conversation_id,
            context: context.snapshot(),
            directory: specialist_directory(),
            events,
            guardrails: verdict.checks,
            tool_trigger,
        })
    }
}
