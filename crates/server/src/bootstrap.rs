use std::sync::Arc;

use concierge_agent::{
    build_llm_client, AgentRuntime, ContextResolver, GuardrailPolicy, LlmError, RecordStores,
    SpecialistRunner,
};
use concierge_core::config::{AppConfig, ConfigError};
use concierge_core::routing::IntentRouter;
use concierge_db::{connect_with_config, migrations, DbPool, SqlContextStore};
use thiserror::Error;
use tracing::info;

pub struct Application {
    pub config: AppConfig,
    pub db_pool: DbPool,
    pub stores: RecordStores,
    pub runtime: Arc<AgentRuntime>,
}

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("database connection failed: {0}")]
    DatabaseConnect(#[source] sqlx::Error),
    #[error("database migration failed: {0}")]
    Migration(#[source] sqlx::migrate::MigrateError),
    #[error("llm client setup failed: {0}")]
    Llm(#[from] LlmError),
}

pub async fn bootstrap_with_config(config: AppConfig) -> Result<Application, BootstrapError> {
    info!(
        event_name = "system.bootstrap.start",
        correlation_id = "bootstrap",
        "starting application bootstrap"
    );

    let db_pool =
        connect_with_config(&config.database).await.map_err(BootstrapError::DatabaseConnect)?;
    info!(
        event_name = "system.bootstrap.database_connected",
        correlation_id = "bootstrap",
        "database connection established"
    );

    migrations::run_pending(&db_pool).await.map_err(BootstrapError::Migration)?;
    info!(
        event_name = "system.bootstrap.migrations_applied",
        correlation_id = "bootstrap",
        "database migrations applied"
    );

    let llm = build_llm_client(&config.llm)?;
    info!(
        event_name = "system.bootstrap.llm_ready",
        correlation_id = "bootstrap",
        provider = llm.as_ref().map(|client| client.provider()).unwrap_or("disabled"),
        "reply phrasing configured"
    );

    let stores = RecordStores::sql(db_pool.clone());
    let runtime = AgentRuntime::new(
        IntentRouter::new(config.keyword_table()?),
        ContextResolver::new(Arc::new(SqlContextStore::new(db_pool.clone()))),
        Arc::new(SpecialistRunner::with_stores(&stores, llm)),
        GuardrailPolicy::from_config(&config.guardrails),
    );

    Ok(Application { config, db_pool, stores, runtime: Arc::new(runtime) })
}
