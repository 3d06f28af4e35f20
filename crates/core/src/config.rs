use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub llm: LlmConfig,
    pub assistant: AssistantConfig,
    pub server: ServerConfig,
    pub logging: LoggingConfig,
}

#[derive(Clone, Debug)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub timeout_secs: u64,
}

#[derive(Clone, Debug)]
pub struct LlmConfig {
    pub api_key: Option<SecretString>,
    pub base_url: String,
    pub model: String,
    pub timeout_secs: u64,
    pub referer: String,
    pub title: String,
}

#[derive(Clone, Debug)]
pub struct AssistantConfig {
    pub platform_name: String,
    pub capability_timeout_ms: u64,
}

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub bind_address: String,
    pub port: u16,
    pub graceful_shutdown_secs: u64,
}

#[derive(Clone, Debug)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    pub database_url: Option<String>,
    pub log_level: Option<String>,
    pub llm_api_key: Option<String>,
    pub llm_base_url: Option<String>,
    pub llm_model: Option<String>,
    pub server_port: Option<u16>,
}

#[derive(Clone, Debug, Default)]
pub struct LoadOptions {
    pub config_path: Option<PathBuf>,
    pub require_file: bool,
    pub overrides: ConfigOverrides,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("could not parse config file `{path}`: {source}")]
    ParseFile { path: PathBuf, source: toml::de::Error },
    #[error("required config file was not found: `{0}`")]
    MissingConfigFile(PathBuf),
    #[error("environment variable interpolation failed for `{var}`")]
    MissingEnvInterpolation { var: String },
    #[error("unterminated environment interpolation expression")]
    UnterminatedInterpolation,
    #[error("invalid environment override for `{key}`: `{value}`")]
    InvalidEnvOverride { key: String, value: String },
    #[error("configuration validation failed: {0}")]
    Validation(String),
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database: DatabaseConfig {
                url: "sqlite://ventura.db".to_string(),
                max_connections: 5,
                timeout_secs: 30,
            },
            llm: LlmConfig {
                api_key: None,
                base_url: "https://openrouter.ai/api/v1".to_string(),
                model: "openai/gpt-4o-mini".to_string(),
                timeout_secs: 60,
                referer: "http://localhost:3000".to_string(),
                title: "Ventura Assistant".to_string(),
            },
            assistant: AssistantConfig {
                platform_name: "Ventura".to_string(),
                capability_timeout_ms: 5_000,
            },
            server: ServerConfig {
                bind_address: "127.0.0.1".to_string(),
                port: 8080,
                graceful_shutdown_secs: 15,
            },
            logging: LoggingConfig { level: "info".to_string(), format: LogFormat::Compact },
        }
    }
}

fn secret_value(value: String) -> SecretString {
    value.into()
}

impl std::str::FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "compact" => Ok(Self::Compact),
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(ConfigError::Validation(format!(
                "unsupported log format `{other}` (expected compact|pretty|json)"
            ))),
        }
    }
}

impl LlmConfig {
    /// True when an API key is present and non-blank.
    pub fn has_credential(&self) -> bool {
        self.api_key.as_ref().map(|key| !key.expose_secret().trim().is_empty()).unwrap_or(false)
    }
}

impl AppConfig {
    pub fn load(options: LoadOptions) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        let maybe_path = resolve_config_path(options.config_path.as_deref());

        if let Some(path) = maybe_path {
            let patch = read_patch(&path)?;
            config.apply_patch(patch);
        } else if options.require_file {
            let expected = options.config_path.unwrap_or_else(|| PathBuf::from("ventura.toml"));
            return Err(ConfigError::MissingConfigFile(expected));
        }

        config.apply_env_overrides()?;
        config.apply_overrides(options.overrides);
        config.validate()?;

        Ok(config)
    }

    fn apply_patch(&mut self, patch: ConfigPatch) {
        if let Some(database) = patch.database {
            merge(&mut self.database.url, database.url);
            merge(&mut self.database.max_connections, database.max_connections);
            merge(&mut self.database.timeout_secs, database.timeout_secs);
        }

        if let Some(llm) = patch.llm {
            if let Some(key) = llm.api_key {
                self.llm.api_key = Some(secret_value(key));
            }
            merge(&mut self.llm.base_url, llm.base_url);
            merge(&mut self.llm.model, llm.model);
            merge(&mut self.llm.timeout_secs, llm.timeout_secs);
            merge(&mut self.llm.referer, llm.referer);
            merge(&mut self.llm.title, llm.title);
        }

        if let Some(assistant) = patch.assistant {
            merge(&mut self.assistant.platform_name, assistant.platform_name);
            merge(&mut self.assistant.capability_timeout_ms, assistant.capability_timeout_ms);
        }

        if let Some(server) = patch.server {
            merge(&mut self.server.bind_address, server.bind_address);
            merge(&mut self.server.port, server.port);
            merge(&mut self.server.graceful_shutdown_secs, server.graceful_shutdown_secs);
        }

        if let Some(logging) = patch.logging {
            merge(&mut self.logging.level, logging.level);
            merge(&mut self.logging.format, logging.format);
        }
    }

    /// `VENTURA_*` variables; blank values are treated as unset.
    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        merge(&mut self.database.url, read_env("VENTURA_DATABASE_URL"));
        merge(
            &mut self.database.max_connections,
            env_number("VENTURA_DATABASE_MAX_CONNECTIONS")?,
        );
        merge(&mut self.database.timeout_secs, env_number("VENTURA_DATABASE_TIMEOUT_SECS")?);

        if let Some(key) =
            read_env("VENTURA_LLM_API_KEY").or_else(|| read_env("OPENROUTER_API_KEY"))
        {
            self.llm.api_key = Some(secret_value(key));
        }
        merge(&mut self.llm.base_url, read_env("VENTURA_LLM_BASE_URL"));
        merge(&mut self.llm.model, read_env("VENTURA_LLM_MODEL"));
        merge(&mut self.llm.timeout_secs, env_number("VENTURA_LLM_TIMEOUT_SECS")?);
        merge(&mut self.llm.referer, read_env("VENTURA_LLM_REFERER"));
        merge(&mut self.llm.title, read_env("VENTURA_LLM_TITLE"));

        merge(&mut self.assistant.platform_name, read_env("VENTURA_ASSISTANT_PLATFORM_NAME"));
        merge(
            &mut self.assistant.capability_timeout_ms,
            env_number("VENTURA_ASSISTANT_CAPABILITY_TIMEOUT_MS")?,
        );

        merge(&mut self.server.bind_address, read_env("VENTURA_SERVER_BIND_ADDRESS"));
        merge(&mut self.server.port, env_number("VENTURA_SERVER_PORT")?);
        merge(
            &mut self.server.graceful_shutdown_secs,
            env_number("VENTURA_SERVER_GRACEFUL_SHUTDOWN_SECS")?,
        );

        merge(
            &mut self.logging.level,
            read_env("VENTURA_LOGGING_LEVEL").or_else(|| read_env("VENTURA_LOG_LEVEL")),
        );
        if let Some(format) =
            read_env("VENTURA_LOGGING_FORMAT").or_else(|| read_env("VENTURA_LOG_FORMAT"))
        {
            self.logging.format = format.parse()?;
        }

        Ok(())
    }

    fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        merge(&mut self.database.url, overrides.database_url);
        merge(&mut self.logging.level, overrides.log_level);
        if let Some(key) = overrides.llm_api_key {
            self.llm.api_key = Some(secret_value(key));
        }
        merge(&mut self.llm.base_url, overrides.llm_base_url);
        merge(&mut self.llm.model, overrides.llm_model);
        merge(&mut self.server.port, overrides.server_port);
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_database(&self.database)?;
        validate_llm(&self.llm)?;
        validate_assistant(&self.assistant)?;
        validate_server(&self.server)?;
        validate_logging(&self.logging)?;
        Ok(())
    }
}

fn resolve_config_path(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        return path.exists().then_some(path.to_path_buf());
    }

    [PathBuf::from("ventura.toml"), PathBuf::from("config/ventura.toml")]
        .into_iter()
        .find(|path| path.exists())
}

fn read_patch(path: &Path) -> Result<ConfigPatch, ConfigError> {
    let raw = fs::read_to_string(path)
        .map_err(|source| ConfigError::ReadFile { path: path.to_path_buf(), source })?;

    let interpolated = interpolate_env_vars(&raw)?;
    toml::from_str::<ConfigPatch>(&interpolated)
        .map_err(|source| ConfigError::ParseFile { path: path.to_path_buf(), source })
}

fn interpolate_env_vars(input: &str) -> Result<String, ConfigError> {
    let mut output = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '$' && matches!(chars.peek(), Some('{')) {
            chars.next();
            let mut key = String::new();

            loop {
                match chars.next() {
                    Some('}') => break,
                    Some(next) => key.push(next),
                    None => return Err(ConfigError::UnterminatedInterpolation),
                }
            }

            let value = env::var(&key)
                .map_err(|_| ConfigError::MissingEnvInterpolation { var: key.clone() })?;
            output.push_str(&value);
            continue;
        }

        output.push(ch);
    }

    Ok(output)
}

fn validate_database(database: &DatabaseConfig) -> Result<(), ConfigError> {
    let url = database.url.trim();
    let sqlite_url =
        url.starts_with("sqlite://") || url.starts_with("sqlite::") || url == ":memory:";
    if !sqlite_url {
        return Err(ConfigError::Validation(
            "database.url must be a sqlite URL (`sqlite://...`, `sqlite::...`, or `:memory:`)"
                .to_string(),
        ));
    }

    if database.max_connections == 0 {
        return Err(ConfigError::Validation(
            "database.max_connections must be greater than zero".to_string(),
        ));
    }

    if database.timeout_secs == 0 || database.timeout_secs > 300 {
        return Err(ConfigError::Validation(
            "database.timeout_secs must be in range 1..=300".to_string(),
        ));
    }

    Ok(())
}

// An unset api_key is reported per request, not at startup.
fn validate_llm(llm: &LlmConfig) -> Result<(), ConfigError> {
    if llm.timeout_secs == 0 || llm.timeout_secs > 300 {
        return Err(ConfigError::Validation(
            "llm.timeout_secs must be in range 1..=300".to_string(),
        ));
    }

    let base_url = llm.base_url.trim();
    if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
        return Err(ConfigError::Validation(
            "llm.base_url must start with http:// or https://".to_string(),
        ));
    }

    if llm.model.trim().is_empty() {
        return Err(ConfigError::Validation("llm.model must not be empty".to_string()));
    }

    Ok(())
}

fn validate_assistant(assistant: &AssistantConfig) -> Result<(), ConfigError> {
    if assistant.capability_timeout_ms == 0 || assistant.capability_timeout_ms > 60_000 {
        return Err(ConfigError::Validation(
            "assistant.capability_timeout_ms must be in range 1..=60000".to_string(),
        ));
    }

    if assistant.platform_name.trim().is_empty() {
        return Err(ConfigError::Validation(
            "assistant.platform_name must not be empty".to_string(),
        ));
    }

    Ok(())
}

fn validate_server(server: &ServerConfig) -> Result<(), ConfigError> {
    if server.port == 0 {
        return Err(ConfigError::Validation("server.port must be greater than zero".to_string()));
    }

    if server.graceful_shutdown_secs == 0 {
        return Err(ConfigError::Validation(
            "server.graceful_shutdown_secs must be greater than zero".to_string(),
        ));
    }

    Ok(())
}

fn validate_logging(logging: &LoggingConfig) -> Result<(), ConfigError> {
    let level = logging.level.trim().to_ascii_lowercase();
    match level.as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
        _ => Err(ConfigError::Validation(
            "logging.level must be one of trace|debug|info|warn|error".to_string(),
        )),
    }
}

fn read_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn merge<T>(slot: &mut T, value: Option<T>) {
    if let Some(value) = value {
        *slot = value;
    }
}

fn env_number<T: std::str::FromStr>(key: &str) -> Result<Option<T>, ConfigError> {
    read_env(key)
        .map(|value| {
            value.trim().parse::<T>().map_err(|_| ConfigError::InvalidEnvOverride {
                key: key.to_string(),
                value,
            })
        })
        .transpose()
}

#[derive(Debug, Default, Deserialize)]
struct ConfigPatch {
    database: Option<DatabasePatch>,
    llm: Option<LlmPatch>,
    assistant: Option<AssistantPatch>,
    server: Option<ServerPatch>,
    logging: Option<LoggingPatch>,
}

#[derive(Debug, Default, Deserialize)]
struct DatabasePatch {
    url: Option<String>,
    max_connections: Option<u32>,
    timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct LlmPatch {
    api_key: Option<String>,
    base_url: Option<String>,
    model: Option<String>,
    timeout_secs: Option<u64>,
    referer: Option<String>,
    title: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct AssistantPatch {
    platform_name: Option<String>,
    capability_timeout_ms: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct ServerPatch {
    bind_address: Option<String>,
    port: Option<u16>,
    graceful_shutdown_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct LoggingPatch {
    level: Option<String>,
    format: Option<LogFormat>,
}

#[cfg(test)]
mod tests {
    use std::env;
    use std::fs;
    use std::io;
    use std::sync::{Mutex, OnceLock};

    use secrecy::ExposeSecret;
    use tempfile::TempDir;

    use super::{AppConfig, ConfigError, ConfigOverrides, LoadOptions, LogFormat};

    static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

    const MANAGED_VARS: &[&str] = &[
        "VENTURA_DATABASE_URL",
        "VENTURA_LLM_API_KEY",
        "OPENROUTER_API_KEY",
        "VENTURA_LLM_TIMEOUT_SECS",
        "VENTURA_ASSISTANT_CAPABILITY_TIMEOUT_MS",
        "VENTURA_LOG_LEVEL",
        "VENTURA_LOG_FORMAT",
        "TEST_VENTURA_API_KEY",
    ];

    fn env_lock() -> &'static Mutex<()> {
        ENV_LOCK.get_or_init(|| Mutex::new(()))
    }

    fn clear_vars(vars: &[&str]) {
        for var in vars {
            env::remove_var(var);
        }
    }

    fn ensure(condition: bool, message: &'static str) -> Result<(), String> {
        if condition {
            Ok(())
        } else {
            Err(message.to_string())
        }
    }

    #[test]
    fn defaults_load_without_credential() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;
        clear_vars(MANAGED_VARS);

        let config = AppConfig::load(LoadOptions::default())
            .map_err(|err| format!("config load failed: {err}"))?;

        ensure(!config.llm.has_credential(), "default config should not carry a credential")?;
        ensure(
            config.assistant.capability_timeout_ms == 5_000,
            "default capability timeout should be 5s",
        )?;
        ensure(
            matches!(config.logging.format, LogFormat::Compact),
            "default logging format should be compact",
        )
    }

    #[test]
    fn file_load_supports_env_interpolation() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;
        clear_vars(MANAGED_VARS);
        env::set_var("TEST_VENTURA_API_KEY", "sk-or-from-env");

        let result = (|| -> Result<(), String> {
            let dir = TempDir::new().map_err(|err: io::Error| err.to_string())?;
            let path = dir.path().join("ventura.toml");
            fs::write(
                &path,
                r#"
[llm]
api_key = "${TEST_VENTURA_API_KEY}"
model = "anthropic/claude-3-haiku"
"#,
            )
            .map_err(|err| err.to_string())?;

            let config =
                AppConfig::load(LoadOptions { config_path: Some(path), ..LoadOptions::default() })
                    .map_err(|err| format!("config load failed: {err}"))?;

            ensure(
                config.llm.api_key.as_ref().map(|key| key.expose_secret() == "sk-or-from-env")
                    == Some(true),
                "api key should be interpolated from environment",
            )?;
            ensure(
                config.llm.model == "anthropic/claude-3-haiku",
                "model should be loaded from file",
            )?;
            Ok(())
        })();

        clear_vars(MANAGED_VARS);
        result
    }

    #[test]
    fn missing_interpolation_variable_is_reported() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;
        clear_vars(MANAGED_VARS);

        let dir = TempDir::new().map_err(|err: io::Error| err.to_string())?;
        let path = dir.path().join("ventura.toml");
        fs::write(&path, "[llm]\napi_key = \"${TEST_VENTURA_API_KEY}\"\n")
            .map_err(|err| err.to_string())?;

        let error =
            match AppConfig::load(LoadOptions { config_path: Some(path), ..LoadOptions::default() })
            {
                Ok(_) => return Err("expected interpolation failure".to_string()),
                Err(error) => error,
            };

        ensure(
            matches!(error, ConfigError::MissingEnvInterpolation { ref var } if var == "TEST_VENTURA_API_KEY"),
            "error should name the missing variable",
        )
    }

    #[test]
    fn precedence_defaults_file_env_overrides() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;
        clear_vars(MANAGED_VARS);
        env::set_var("VENTURA_DATABASE_URL", "sqlite://from-env.db");
        env::set_var("VENTURA_LLM_API_KEY", "sk-from-env");

        let result = (|| -> Result<(), String> {
            let dir = TempDir::new().map_err(|err: io::Error| err.to_string())?;
            let path = dir.path().join("ventura.toml");
            fs::write(
                &path,
                r#"
[database]
url = "sqlite://from-file.db"

[llm]
api_key = "sk-from-file"

[logging]
level = "warn"
"#,
            )
            .map_err(|err| err.to_string())?;

            let config = AppConfig::load(LoadOptions {
                config_path: Some(path),
                overrides: ConfigOverrides {
                    database_url: Some("sqlite://from-override.db".to_string()),
                    log_level: Some("debug".to_string()),
                    ..ConfigOverrides::default()
                },
                ..LoadOptions::default()
            })
            .map_err(|err| format!("config load failed: {err}"))?;

            ensure(
                config.database.url == "sqlite://from-override.db",
                "override database url should win",
            )?;
            ensure(config.logging.level == "debug", "overridden log level should be debug")?;
            ensure(
                config.llm.api_key.as_ref().map(|key| key.expose_secret() == "sk-from-env")
                    == Some(true),
                "env api key should win over file and defaults",
            )?;
            Ok(())
        })();

        clear_vars(MANAGED_VARS);
        result
    }

    #[test]
    fn openrouter_key_is_accepted_as_fallback() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;
        clear_vars(MANAGED_VARS);
        env::set_var("OPENROUTER_API_KEY", "sk-or-fallback");

        let result = AppConfig::load(LoadOptions::default())
            .map_err(|err| format!("config load failed: {err}"))
            .and_then(|config| {
                ensure(config.llm.has_credential(), "fallback key should count as credential")
            });

        clear_vars(MANAGED_VARS);
        result
    }

    #[test]
    fn validation_fails_fast_with_actionable_error() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;
        clear_vars(MANAGED_VARS);
        env::set_var("VENTURA_ASSISTANT_CAPABILITY_TIMEOUT_MS", "0");

        let result = (|| -> Result<(), String> {
            let error = match AppConfig::load(LoadOptions::default()) {
                Ok(_) => {
                    return Err("expected validation failure but config load succeeded".to_string())
                }
                Err(error) => error,
            };
            let has_message = matches!(
                error,
                ConfigError::Validation(ref message)
                    if message.contains("assistant.capability_timeout_ms")
            );
            ensure(has_message, "validation failure should mention the capability timeout")
        })();

        clear_vars(MANAGED_VARS);
        result
    }

    #[test]
    fn invalid_numeric_env_override_is_rejected() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;
        clear_vars(MANAGED_VARS);
        env::set_var("VENTURA_LLM_TIMEOUT_SECS", "soon");

        let result = match AppConfig::load(LoadOptions::default()) {
            Ok(_) => Err("expected env override failure".to_string()),
            Err(error) => ensure(
                matches!(error, ConfigError::InvalidEnvOverride { ref key, .. } if key == "VENTURA_LLM_TIMEOUT_SECS"),
                "error should name the env key",
            ),
        };

        clear_vars(MANAGED_VARS);
        result
    }

    #[test]
    fn secret_values_are_not_leaked_by_debug() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;
        clear_vars(MANAGED_VARS);
        env::set_var("VENTURA_LLM_API_KEY", "sk-secret-value");

        let result = (|| -> Result<(), String> {
            let config = AppConfig::load(LoadOptions::default())
                .map_err(|err| format!("config load failed: {err}"))?;
            let debug = format!("{config:?}");

            ensure(!debug.contains("sk-secret-value"), "debug output should not contain api key")
        })();

        clear_vars(MANAGED_VARS);
        result
    }
}
