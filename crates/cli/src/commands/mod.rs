pub mod config;
pub mod doctor;
pub mod migrate;
pub mod seed;

use serde::Serialize;
use tokio::runtime::Runtime;
use ventura_core::config::{AppConfig, LoadOptions};
use ventura_db::{connect_with_settings, migrations, DbPool};

#[derive(Debug, Clone)]
pub struct CommandResult {
    pub exit_code: u8,
    pub output: String,
}

#[derive(Debug, Serialize)]
struct CommandOutcome {
    command: String,
    status: String,
    error_class: Option<String>,
    message: String,
}

impl CommandResult {
    pub fn success(command: &str, message: impl Into<String>) -> Self {
        let payload = CommandOutcome {
            command: command.to_string(),
            status: "ok".to_string(),
            error_class: None,
            message: message.into(),
        };
        Self { exit_code: 0, output: serialize_payload(payload) }
    }

    pub fn failure(
        command: &str,
        error_class: &str,
        message: impl Into<String>,
        exit_code: u8,
    ) -> Self {
        let payload = CommandOutcome {
            command: command.to_string(),
            status: "error".to_string(),
            error_class: Some(error_class.to_string()),
            message: message.into(),
        };
        Self { exit_code, output: serialize_payload(payload) }
    }
}

/// `(error_class, message, exit_code)` carried out of a command's async body.
pub(crate) type StepFailure = (&'static str, String, u8);

/// Loads config and a current-thread runtime, mapping failures to the shared
/// exit codes (2 config, 3 runtime).
pub(crate) fn prepare(command: &str) -> Result<(AppConfig, Runtime), CommandResult> {
    let config = AppConfig::load(LoadOptions::default()).map_err(|error| {
        CommandResult::failure(
            command,
            "config_validation",
            format!("configuration issue: {error}"),
            2,
        )
    })?;

    let runtime =
        tokio::runtime::Builder::new_current_thread().enable_all().build().map_err(|error| {
            CommandResult::failure(
                command,
                "runtime_init",
                format!("failed to initialize async runtime: {error}"),
                3,
            )
        })?;

    Ok((config, runtime))
}

/// Connects with the configured pool settings and applies pending migrations.
pub(crate) async fn migrated_pool(config: &AppConfig) -> Result<DbPool, StepFailure> {
    let pool = connect_with_settings(
        &config.database.url,
        config.database.max_connections,
        config.database.timeout_secs,
    )
    .await
    .map_err(|error| ("db_connectivity", error.to_string(), 4u8))?;

    if let Err(error) = migrations::run_pending(&pool).await {
        pool.close().await;
        return Err(("migration", error.to_string(), 5u8));
    }

    Ok(pool)
}

fn serialize_payload(payload: CommandOutcome) -> String {
    serde_json::to_string(&payload).unwrap_or_else(|error| {
        format!(
            "{{\"command\":\"unknown\",\"status\":\"error\",\"error_class\":\"serialization\",\"message\":\"{}\"}}",
            error.to_string().replace('\\', "\\\\").replace('"', "\\\"")
        )
    })
}

#[cfg(test)]
mod tests {
    use serde_json::Value;

    use super::CommandResult;

    #[test]
    fn failure_payload_carries_error_class_and_exit_code() {
        let result = CommandResult::failure("seed", "db_connectivity", "no \"db\"", 4);

        assert_eq!(result.exit_code, 4);
        let payload: Value = serde_json::from_str(&result.output).expect("json");
        assert_eq!(payload["status"], "error");
        assert_eq!(payload["error_class"], "db_connectivity");
        assert_eq!(payload["message"], "no \"db\"");
    }

    #[test]
    fn success_payload_has_null_error_class() {
        let payload: Value =
            serde_json::from_str(&CommandResult::success("migrate", "done").output).expect("json");

        assert_eq!(payload["status"], "ok");
        assert!(payload["error_class"].is_null());
    }
}
