use std::sync::Arc;

use thiserror::Error;
use tracing::info;
use ventura_agent::runtime::AssistantRuntime;
use ventura_core::config::{AppConfig, ConfigError};
use ventura_core::errors::AssistantError;
use ventura_db::repositories::{SessionRepository, SqlPlatformRepository, SqlSessionRepository};
use ventura_db::{connect_with_settings, migrations, DbPool};

pub struct Application {
    pub config: AppConfig,
    pub db_pool: DbPool,
    pub runtime: Arc<AssistantRuntime>,
    pub sessions: Arc<dyn SessionRepository>,
}

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("database connection failed: {0}")]
    DatabaseConnect(#[source] sqlx::Error),
    #[error("database migration failed: {0}")]
    Migration(#[source] sqlx::migrate::MigrateError),
    #[error("assistant runtime could not be built: {0}")]
    Assistant(#[from] AssistantError),
}

pub async fn bootstrap_with_config(config: AppConfig) -> Result<Application, BootstrapError> {
    info!(
        event_name = "system.bootstrap.start",
        correlation_id = "bootstrap",
        "starting application bootstrap"
    );

    let db_pool = connect_with_settings(
        &config.database.url,
        config.database.max_connections,
        config.database.timeout_secs,
    )
    .await
    .map_err(BootstrapError::DatabaseConnect)?;
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

    let runtime = AssistantRuntime::from_config(
        &config,
        Arc::new(SqlPlatformRepository::new(db_pool.clone())),
    )?;
    info!(
        event_name = "system.bootstrap.runtime_ready",
        correlation_id = "bootstrap",
        model = %config.llm.model,
        model_configured = runtime.has_model(),
        "assistant runtime initialized"
    );

    Ok(Application {
        sessions: Arc::new(SqlSessionRepository::new(db_pool.clone())),
        runtime: Arc::new(runtime),
        db_pool,
        config,
    })
}
