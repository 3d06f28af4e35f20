use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use ventura_core::config::LlmConfig;
use ventura_core::domain::conversation::ConversationTurn;
use ventura_core::errors::AssistantError;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ModelRequest {
    pub model: String,
    pub messages: Vec<ConversationTurn>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ModelResponse {
    pub content: String,
    /// Provider usage object, passed through untouched.
    pub usage: Option<Value>,
}

#[async_trait]
pub trait LlmClient: Send + Sync {
    fn model(&self) -> &str;

    async fn complete(&self, request: &ModelRequest) -> Result<ModelResponse, AssistantError>;
}

/// Chat-completions client for OpenRouter and other OpenAI-compatible gateways.
pub struct OpenRouterClient {
    client: Client,
    api_key: SecretString,
    base_url: String,
    model: String,
    referer: String,
    title: String,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
    #[serde(default)]
    usage: Option<Value>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

impl OpenRouterClient {
    /// Fails with a configuration error when no API key is set.
    pub fn from_config(config: &LlmConfig) -> Result<Self, AssistantError> {
        let api_key = config
            .api_key
            .clone()
            .filter(|key| !key.expose_secret().trim().is_empty())
            .ok_or_else(|| AssistantError::Configuration("llm.api_key is not set".to_owned()))?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|error| AssistantError::Internal(format!("http client: {error}")))?;

        Ok(Self {
            client,
            api_key,
            base_url: config.base_url.trim_end_matches('/').to_owned(),
            model: config.model.clone(),
            referer: config.referer.clone(),
            title: config.title.clone(),
        })
    }
}

#[async_trait]
impl LlmClient for OpenRouterClient {
    fn model(&self) -> &str {
        &self.model
    }

    async fn complete(&self, request: &ModelRequest) -> Result<ModelResponse, AssistantError> {
        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(self.api_key.expose_secret())
            .header("HTTP-Referer", &self.referer)
            .header("X-Title", &self.title)
            .json(request)
            .send()
            .await
            .map_err(|error| AssistantError::Upstream {
                status: error.status().map(|status| status.as_u16()),
                message: if error.is_timeout() {
                    "request timed out".to_owned()
                } else {
                    format!("transport failure: {error}")
                },
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(
                event_name = "assistant.model.rejected",
                status = status.as_u16(),
                model = %self.model,
                body = %body.chars().take(512).collect::<String>(),
                "model provider returned an error status"
            );
            return Err(AssistantError::Upstream {
                status: Some(status.as_u16()),
                message: status.to_string(),
            });
        }

        let payload: ChatCompletionResponse =
            response.json().await.map_err(|error| AssistantError::Upstream {
                status: Some(status.as_u16()),
                message: format!("unreadable completion payload: {error}"),
            })?;

        let content = payload
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| AssistantError::Upstream {
                status: Some(status.as_u16()),
                message: "completion carried no choices".to_owned(),
            })?;

        Ok(ModelResponse { content, usage: payload.usage })
    }
}

/// Canned-reply client that records every request it receives.
#[derive(Default)]
pub struct ScriptedLlmClient {
    reply: Option<Result<ModelResponse, AssistantError>>,
    requests: Mutex<Vec<ModelRequest>>,
}

impl ScriptedLlmClient {
    pub fn replying(content: impl Into<String>, usage: Option<Value>) -> Self {
        Self {
            reply: Some(Ok(ModelResponse { content: content.into(), usage })),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(error: AssistantError) -> Self {
        Self { reply: Some(Err(error)), requests: Mutex::new(Vec::new()) }
    }

    pub fn requests(&self) -> Vec<ModelRequest> {
        self.requests.lock().map(|requests| requests.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl LlmClient for ScriptedLlmClient {
    fn model(&self) -> &str {
        "scripted"
    }

    async fn complete(&self, request: &ModelRequest) -> Result<ModelResponse, AssistantError> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(request.clone());
        }
        self.reply.clone().unwrap_or_else(|| {
            Err(AssistantError::Internal("scripted client has no reply".to_owned()))
        })
    }
}
