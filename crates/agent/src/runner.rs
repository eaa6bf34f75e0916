//! Specialist execution: pick one tool for the message, run it against the conversation
//! context, and turn its output into the reply text.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Map, Value};
use thiserror::Error;
use tracing::{debug, info};

use concierge_core::domain::context::ConversationContext;
use concierge_core::specialists::{tool_names, SpecialistId};

use crate::conversation::{normalize_text, MessageSignals, SignalExtractor};
use crate::llm::{CompletionRequest, LlmClient, LlmError};
use crate::tools::{RecordStores, ToolError, ToolRegistry};

pub const TRIAGE_REPLY: &str = "I can help with flight bookings, seat changes, flight status, \
cancellations, the Aviation Tech Summit 2025 schedule, and business networking. What would you \
like to do?";

const FAQ_WORDS: &[&str] = &[
    "bag", "luggage", "policy", "policies", "wifi", "wi-fi", "check-in", "aircraft", "plane",
    "meal", "refund",
];
const FLIGHT_STATUS_WORDS: &[&str] =
    &["status", "delay", "delayed", "gate", "terminal", "departure", "arrival", "on time"];
const SEAT_MAP_WORDS: &[&str] = &["map", "available", "options", "choose", "pick", "show"];

#[derive(Debug, Error)]
pub enum RunnerError {
    #[error(transparent)]
    Tool(#[from] ToolError),
    #[error(transparent)]
    Llm(#[from] LlmError),
}

/// Reply text plus the client widget a tool asked to open, if any.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RunnerReply {
    pub text: String,
    pub tool_trigger: Option<String>,
}

impl RunnerReply {
    pub fn text(text: impl Into<String>) -> Self {
        Self { text: text.into(), tool_trigger: None }
    }

    pub fn with_trigger(mut self, trigger: Option<&str>) -> Self {
        self.tool_trigger = trigger.map(str::to_string);
        self
    }
}

#[async_trait]
pub trait AgentRunner: Send + Sync {
    async fn run(
        &self,
        specialist: SpecialistId,
        message: &str,
        context: &mut ConversationContext,
    ) -> Result<RunnerReply, RunnerError>;
}

#[derive(Clone, Debug, PartialEq)]
pub struct ToolCall {
    pub tool: &'static str,
    pub input: Value,
}

/// Chooses the single tool a specialist runs for a message. Triage has no tools.
pub fn plan_tool_call(
    specialist: SpecialistId,
    message: &str,
    signals: &MessageSignals,
    context: &ConversationContext,
) -> Option<ToolCall> {
    let text = normalize_text(message);
    let mentions = |words: &[&str]| words.iter().any(|word| text.contains(word));

    let call = |tool: &'static str, input: Value| Some(ToolCall { tool, input });

    match specialist {
        SpecialistId::Triage => None,
        SpecialistId::CustomerService => {
            let confirmation = json!({ "confirmation_number": signals.confirmation_number });
            if text.contains("cancel") {
                call(tool_names::CANCEL_FLIGHT, confirmation)
            } else if text.contains("seat") && signals.seat_number.is_some() {
                call(
                    tool_names::UPDATE_SEAT,
                    json!({
                        "confirmation_number": signals.confirmation_number,
                        "new_seat": signals.seat_number,
                    }),
                )
            } else if text.contains("seat") && (mentions(SEAT_MAP_WORDS) || text.contains("change"))
            {
                call(tool_names::DISPLAY_SEAT_MAP, confirmation)
            } else if mentions(FAQ_WORDS) {
                call(tool_names::FAQ_LOOKUP, json!({ "question": message }))
            } else if mentions(FLIGHT_STATUS_WORDS)
                || (signals.flight_number.is_some() && signals.confirmation_number.is_none())
            {
                call(tool_names::FLIGHT_STATUS, json!({ "flight_number": signals.flight_number }))
            } else {
                call(tool_names::GET_BOOKING_DETAILS, confirmation)
            }
        }
        SpecialistId::Conference => {
            if text.contains("speaker") {
                call(tool_names::ALL_SPEAKERS, json!({}))
            } else if text.contains("track") {
                call(tool_names::ALL_TRACKS, json!({}))
            } else if text.contains("room") {
                call(tool_names::ALL_ROOMS, json!({}))
            } else {
                call(tool_names::CONFERENCE_SESSIONS, json!({}))
            }
        }
        SpecialistId::Networking => {
            let registering = text.contains("register") || text.contains("add ");
            if text.contains("form") || (registering && context.business_details.is_none()) {
                call(tool_names::DISPLAY_BUSINESS_FORM, json!({}))
            } else if registering {
                call(tool_names::ADD_BUSINESS, json!({}))
            } else if text.contains("my business") || text.contains("my compan") {
                call(tool_names::USER_BUSINESSES, json!({}))
            } else {
                let mut filter = Map::new();
                if let Some(industry) = &signals.industry {
                    filter.insert("industry".to_string(), json!(industry));
                }
                if let Some(location) = &signals.location {
                    filter.insert("location".to_string(), json!(location));
                }
                if let Some(company) = &signals.company_name {
                    filter.insert("companyName".to_string(), json!(company));
                }
                call(tool_names::SEARCH_BUSINESSES, Value::Object(filter))
            }
        }
    }
}

/// Question asked back when a tool lacks an argument the user has not given yet.
pub fn follow_up_question(argument: &str) -> String {
    match argument {
        "confirmation_number" => "Could you share your booking confirmation number?".to_string(),
        "new_seat" => {
            "Which seat would you like? Please give a seat number such as 14C.".to_string()
        }
        "flight_number" => "Which flight number should I check?".to_string(),
        "user_id" => {
            "Please sign in with your registration ID so I can find your businesses.".to_string()
        }
        other => format!("Could you tell me the {}?", other.replace('_', " ")),
    }
}

/// Runs specialists with the tool registry and, when configured, a language model that
/// phrases the final reply.
pub struct SpecialistRunner {
    tools: ToolRegistry,
    extractor: SignalExtractor,
    llm: Option<Arc<dyn LlmClient>>,
}

impl SpecialistRunner {
    pub fn new(tools: ToolRegistry, llm: Option<Arc<dyn LlmClient>>) -> Self {
        Self { tools, extractor: SignalExtractor::new(), llm }
    }

    pub fn with_stores(stores: &RecordStores, llm: Option<Arc<dyn LlmClient>>) -> Self {
        Self::new(ToolRegistry::standard(stores), llm)
    }

    pub fn tools(&self) -> &ToolRegistry {
        &self.tools
    }

    async fn phrase(
        &self,
        specialist: SpecialistId,
        user: String,
        fallback: String,
    ) -> Result<String, RunnerError> {
        let Some(llm) = self.llm.as_ref() else {
            return Ok(fallback);
        };
        let request = CompletionRequest { system: specialist.instructions(), user: &user };
        Ok(llm.complete(&request).await?)
    }
}

#[async_trait]
impl AgentRunner for SpecialistRunner {
    async fn run(
        &self,
        specialist: SpecialistId,
        message: &str,
        context: &mut ConversationContext,
    ) -> Result<RunnerReply, RunnerError> {
        let signals = self.extractor.extract(message);
        debug!(event_name = "runner.signals", specialist = %specialist, signals = ?signals);

        let Some(call) = plan_tool_call(specialist, message, &signals, context) else {
            let text = self.phrase(specialist, message.to_string(), TRIAGE_REPLY.to_string()).await?;
            return Ok(RunnerReply::text(text));
        };

        let output = match self.tools.execute(call.tool, &call.input, context).await {
            Ok(output) => output,
            Err(ToolError::MissingArgument(argument)) => {
                info!(
                    event_name = "runner.tool.needs_input",
                    specialist = %specialist,
                    tool = call.tool,
                    argument,
                    "asking the user for a missing argument"
                );
                return Ok(RunnerReply::text(follow_up_question(argument)));
            }
            Err(error) => return Err(error.into()),
        };

        info!(
            event_name = "runner.tool.completed",
            specialist = %specialist,
            tool = call.tool,
            ui_trigger = output.ui_trigger,
            "tool executed"
        );

        let prompt = format!("User message: {message}\n\nResult of {}:\n{}", call.tool, output.text);
        let text = self.phrase(specialist, prompt, output.text).await?;
        Ok(RunnerReply::text(text).with_trigger(output.ui_trigger))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;
    use serde_json::json;

    use concierge_core::domain::context::{BusinessDetails, ConversationContext};
    use concierge_core::specialists::{tool_names, SpecialistId};

    use super::{
        plan_tool_call, AgentRunner, RunnerError, RunnerReply, SpecialistRunner, TRIAGE_REPLY,
    };
    use crate::conversation::SignalExtractor;
    use crate::llm::{CompletionRequest, LlmClient, LlmError};
    use crate::tools::test_support::stores;

    #[derive(Default)]
    struct RecordingLlm {
        prompts: Mutex<Vec<(String, String)>>,
        fail: bool,
    }

    #[async_trait]
    impl LlmClient for RecordingLlm {
        fn provider(&self) -> &'static str {
            "recording"
        }

        async fn complete(&self, request: &CompletionRequest<'_>) -> Result<String, LlmError> {
            if self.fail {
                return Err(LlmError::EmptyResponse);
            }
            if let Ok(mut prompts) = self.prompts.lock() {
                prompts.push((request.system.to_string(), request.user.to_string()));
            }
            Ok("phrased reply".to_string())
        }
    }

    fn planned(specialist: SpecialistId, message: &str) -> &'static str {
        let signals = SignalExtractor::new().extract(message);
        plan_tool_call(specialist, message, &signals, &ConversationContext::default())
            .map(|call| call.tool)
            .unwrap_or("none")
    }

    #[test]
    fn customer_service_plans_follow_the_request() {
        let cs = SpecialistId::CustomerService;
        assert_eq!(planned(cs, "Please cancel booking CONF001"), tool_names::CANCEL_FLIGHT);
        assert_eq!(planned(cs, "Change my seat to 14C"), tool_names::UPDATE_SEAT);
        assert_eq!(planned(cs, "I want to change my seat"), tool_names::DISPLAY_SEAT_MAP);
        assert_eq!(planned(cs, "Is flight FLT-123 delayed?"), tool_names::FLIGHT_STATUS);
        assert_eq!(planned(cs, "What is the baggage allowance?"), tool_names::FAQ_LOOKUP);
        assert_eq!(planned(cs, "Show my booking CONF001"), tool_names::GET_BOOKING_DETAILS);
    }

    #[test]
    fn conference_and_networking_plans() {
        let conference = SpecialistId::Conference;
        let networking = SpecialistId::Networking;
        assert_eq!(planned(conference, "Who are the speakers?"), tool_names::ALL_SPEAKERS);
        assert_eq!(planned(conference, "What sessions are on?"), tool_names::CONFERENCE_SESSIONS);
        assert_eq!(
            planned(networking, "I want to register my business"),
            tool_names::DISPLAY_BUSINESS_FORM
        );
        assert_eq!(planned(networking, "List my businesses"), tool_names::USER_BUSINESSES);
        assert_eq!(planned(SpecialistId::Triage, "hello"), "none");

        let signals = SignalExtractor::new().extract("Find fintech companies in New York");
        let call = plan_tool_call(
            SpecialistId::Networking,
            "Find fintech companies in New York",
            &signals,
            &ConversationContext::default(),
        )
        .expect("search planned");
        assert_eq!(call.tool, tool_names::SEARCH_BUSINESSES);
        assert_eq!(call.input, json!({ "industry": "fintech", "location": "New York" }));
    }

    #[test]
    fn registration_with_known_details_adds_the_business() {
        let context = ConversationContext {
            business_details: Some(BusinessDetails::default()),
            ..ConversationContext::default()
        };
        let signals = SignalExtractor::new().extract("Please register my business");

        let call =
            plan_tool_call(SpecialistId::Networking, "Please register my business", &signals, &context)
                .expect("planned");

        assert_eq!(call.tool, tool_names::ADD_BUSINESS);
    }

    #[tokio::test]
    async fn tool_output_is_the_reply_without_an_llm() {
        let runner = SpecialistRunner::with_stores(&stores(), None);
        let mut context = ConversationContext::default();

        let reply = runner
            .run(SpecialistId::CustomerService, "Change my seat to 3b on CONF001", &mut context)
            .await
            .expect("run");

        assert_eq!(reply, RunnerReply::text("Seat updated to 3B for confirmation number CONF001"));
        assert_eq!(context.seat_number.as_deref(), Some("3B"));
    }

    #[tokio::test]
    async fn missing_arguments_become_questions() {
        let runner = SpecialistRunner::with_stores(&stores(), None);
        let mut context = ConversationContext::default();

        let reply = runner
            .run(SpecialistId::CustomerService, "Please cancel my booking", &mut context)
            .await
            .expect("run");

        assert_eq!(reply.text, "Could you share your booking confirmation number?");
        assert_eq!(reply.tool_trigger, None);
    }

    #[tokio::test]
    async fn triage_replies_with_help() {
        let runner = SpecialistRunner::with_stores(&stores(), None);

        let reply = runner
            .run(SpecialistId::Triage, "hello", &mut ConversationContext::default())
            .await
            .expect("run");

        assert_eq!(reply.text, TRIAGE_REPLY);
    }

    #[tokio::test]
    async fn llm_phrases_the_reply_with_specialist_instructions() {
        let llm = Arc::new(RecordingLlm::default());
        let runner = SpecialistRunner::with_stores(&stores(), Some(llm.clone()));

        let reply = runner
            .run(
                SpecialistId::Conference,
                "Which rooms are used?",
                &mut ConversationContext::default(),
            )
            .await
            .expect("run");

        assert_eq!(reply.text, "phrased reply");
        let prompts = llm.prompts.lock().expect("prompts").clone();
        assert_eq!(prompts.len(), 1);
        assert_eq!(prompts[0].0, SpecialistId::Conference.instructions());
        assert!(prompts[0].1.contains("Result of get_all_rooms"));
        assert!(prompts[0].1.contains("Main Hall"));
    }

    #[tokio::test]
    async fn widget_tools_pass_their_trigger_through() {
        let llm = Arc::new(RecordingLlm::default());
        let runner = SpecialistRunner::with_stores(&stores(), Some(llm));

        let reply = runner
            .run(
                SpecialistId::Networking,
                "I want to register my business",
                &mut ConversationContext::default(),
            )
            .await
            .expect("run");

        assert_eq!(reply.text, "phrased reply");
        assert_eq!(reply.tool_trigger.as_deref(), Some(tool_names::DISPLAY_BUSINESS_FORM));
    }

    #[tokio::test]
    async fn llm_failures_surface_as_runner_errors() {
        let llm = Arc::new(RecordingLlm { fail: true, ..RecordingLlm::default() });
        let runner = SpecialistRunner::with_stores(&stores(), Some(llm));

        let result = runner
            .run(SpecialistId::Triage, "hi", &mut ConversationContext::default())
            .await;

        assert!(matches!(result, Err(RunnerError::Llm(LlmError::EmptyResponse))));
    }
}
