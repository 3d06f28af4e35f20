use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use secrecy::ExposeSecret;
use toml::Value;
use ventura_core::config::{AppConfig, LoadOptions};

/// One reported setting: dotted key, rendered value and the env var that can
/// override it.
struct Field {
    key: &'static str,
    value: String,
    env_key: &'static str,
}

pub fn run() -> String {
    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => return format!("config validation failed: {error}"),
    };

    let config_file_path = detect_config_path();
    let config_file_doc = load_config_file_doc(config_file_path.as_deref());

    let mut lines = vec!["effective config (source precedence: env > file > default):".to_string()];
    for field in fields(&config) {
        let source = field_source(
            field.key,
            field.env_key,
            config_file_doc.as_ref(),
            config_file_path.as_deref(),
        );
        lines.push(render_line(field.key, &field.value, source));
    }

    lines.join("\n")
}

fn fields(config: &AppConfig) -> Vec<Field> {
    let field =
        |key: &'static str, value: String, env_key: &'static str| Field { key, value, env_key };

    vec![
        field("database.url", config.database.url.clone(), "VENTURA_DATABASE_URL"),
        field(
            "database.max_connections",
            config.database.max_connections.to_string(),
            "VENTURA_DATABASE_MAX_CONNECTIONS",
        ),
        field(
            "database.timeout_secs",
            config.database.timeout_secs.to_string(),
            "VENTURA_DATABASE_TIMEOUT_SECS",
        ),
        field(
            "llm.api_key",
            redact_key(config.llm.api_key.as_ref().map(|key| key.expose_secret())),
            "VENTURA_LLM_API_KEY",
        ),
        field("llm.base_url", config.llm.base_url.clone(), "VENTURA_LLM_BASE_URL"),
        field("llm.model", config.llm.model.clone(), "VENTURA_LLM_MODEL"),
        field("llm.timeout_secs", config.llm.timeout_secs.to_string(), "VENTURA_LLM_TIMEOUT_SECS"),
        field("llm.referer", config.llm.referer.clone(), "VENTURA_LLM_REFERER"),
        field("llm.title", config.llm.title.clone(), "VENTURA_LLM_TITLE"),
        field(
            "assistant.platform_name",
            config.assistant.platform_name.clone(),
            "VENTURA_ASSISTANT_PLATFORM_NAME",
        ),
        field(
            "assistant.capability_timeout_ms",
            config.assistant.capability_timeout_ms.to_string(),
            "VENTURA_ASSISTANT_CAPABILITY_TIMEOUT_MS",
        ),
        field(
            "server.bind_address",
            config.server.bind_address.clone(),
            "VENTURA_SERVER_BIND_ADDRESS",
        ),
        field("server.port", config.server.port.to_string(), "VENTURA_SERVER_PORT"),
        field(
            "server.graceful_shutdown_secs",
            config.server.graceful_shutdown_secs.to_string(),
            "VENTURA_SERVER_GRACEFUL_SHUTDOWN_SECS",
        ),
        field("logging.level", config.logging.level.clone(), "VENTURA_LOGGING_LEVEL"),
        field("logging.format", format!("{:?}", config.logging.format), "VENTURA_LOGGING_FORMAT"),
    ]
}

fn detect_config_path() -> Option<PathBuf> {
    [PathBuf::from("ventura.toml"), PathBuf::from("config/ventura.toml")]
        .into_iter()
        .find(|path| path.exists())
}

fn load_config_file_doc(path: Option<&Path>) -> Option<Value> {
    let path = path?;
    let raw = fs::read_to_string(path).ok()?;
    raw.parse::<Value>().ok()
}

fn field_source(
    key_path: &str,
    env_key: &str,
    config_file_doc: Option<&Value>,
    config_file_path: Option<&Path>,
) -> String {
    if env::var_os(env_key).is_some() {
        return format!("env ({env_key})");
    }

    if let Some(doc) = config_file_doc {
        if contains_path(doc, key_path) {
            let file_path = config_file_path
                .map(|path| path.display().to_string())
                .unwrap_or_else(|| "config file".to_string());
            return format!("file ({file_path})");
        }
    }

    "default".to_string()
}

fn contains_path(root: &Value, key_path: &str) -> bool {
    let mut current = root;
    for key in key_path.split('.') {
        let Some(next) = current.get(key) else {
            return false;
        };
        current = next;
    }
    true
}

fn render_line(key: &str, value: &str, source: String) -> String {
    format!("- {key} = {value} (source: {source})")
}

/// Keeps only the vendor prefix of a key such as `sk-or-v1-...`.
fn redact_key(key: Option<&str>) -> String {
    let Some(key) = key.map(str::trim) else {
        return "<unset>".to_string();
    };
    if key.is_empty() {
        return "<empty>".to_string();
    }

    match key.split_once('-') {
        Some((prefix, _)) => format!("{prefix}-***"),
        None => "<redacted>".to_string(),
    }
}
