use std::sync::Arc;

use concierge_agent::{
    build_llm_client, AgentRuntime, ContextResolver, GuardrailPolicy, RecordStores,
    SpecialistRunner,
};
use concierge_core::config::AppConfig;
use concierge_core::domain::envelope::ReplyEnvelope;
use concierge_core::domain::hints::ContextHints;
use concierge_core::routing::IntentRouter;
use concierge_db::{DbPool, SqlContextStore};

use crate::commands::{migrated_pool, prepare, CommandResult, StepFailure};

/// Identity flags accepted by `concierge chat`.
#[derive(Clone, Debug, Default)]
pub struct ChatHints {
    pub registration_id: Option<String>,
    pub account_number: Option<String>,
    pub confirmation_number: Option<String>,
}

impl From<ChatHints> for ContextHints {
    fn from(hints: ChatHints) -> Self {
        ContextHints {
            registration_id: hints.registration_id,
            account_number: hints.account_number,
            confirmation_number: hints.confirmation_number,
            ..ContextHints::default()
        }
    }
}

/// Prints the reply envelope as JSON. A degraded reply exits with code 7.
pub fn run(message: &str, hints: ChatHints) -> CommandResult {
    let (config, runtime) = match prepare("chat") {
        Ok(prepared) => prepared,
        Err(failure) => return failure,
    };

    let result = runtime.block_on(async {
        let pool = migrated_pool(&config).await?;
        let envelope = conversation_runtime(&config, pool.clone())?
            .handle(message, hints.into())
            .await;
        pool.close().await;
        Ok::<ReplyEnvelope, StepFailure>(envelope)
    });

    match result {
        Ok(envelope) => match serde_json::to_string_pretty(&envelope) {
            Ok(output) => CommandResult {
                exit_code: if envelope.is_degraded() { 7 } else { 0 },
                output,
            },
            Err(error) => CommandResult::failure("chat", "serialization", error.to_string(), 8),
        },
        Err((error_class, message, exit_code)) => {
            CommandResult::failure("chat", error_class, message, exit_code)
        }
    }
}

fn conversation_runtime(config: &AppConfig, pool: DbPool) -> Result<AgentRuntime, StepFailure> {
    let llm = build_llm_client(&config.llm).map_err(|error| ("llm_setup", error.to_string(), 6u8))?;
    let table =
        config.keyword_table().map_err(|error| ("config_validation", error.to_string(), 2u8))?;

    let stores = RecordStores::sql(pool.clone());
    Ok(AgentRuntime::new(
        IntentRouter::new(table),
        ContextResolver::new(Arc::new(SqlContextStore::new(pool))),
        Arc::new(SpecialistRunner::with_stores(&stores, llm)),
        GuardrailPolicy::from_config(&config.guardrails),
    ))
}
