use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::Serialize;
use serde_json::Value;
use tracing::{info, warn};

use ventura_core::config::AppConfig;
use ventura_core::domain::caller::Caller;
use ventura_core::domain::conversation::ConversationTurn;
use ventura_core::errors::AssistantError;
use ventura_db::repositories::PlatformReadRepository;

use crate::capabilities::CapabilityRegistry;
use crate::context::ContextAssembler;
use crate::formatter::ResponseFormatter;
use crate::intent::IntentDetector;
use crate::llm::{LlmClient, ModelRequest, OpenRouterClient};
use crate::orchestrator::RetrievalOrchestrator;
use crate::prompt::PromptBuilder;

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct AssistantReply {
    pub content: String,
    pub usage: Option<Value>,
}

/// One assistant turn end to end: detect, retrieve, prompt, call the model,
/// format. Shared across requests behind an `Arc`.
pub struct AssistantRuntime {
    detector: IntentDetector,
    orchestrator: RetrievalOrchestrator,
    assembler: ContextAssembler,
    prompt_builder: PromptBuilder,
    formatter: ResponseFormatter,
    model: Option<Arc<dyn LlmClient>>,
}

impl AssistantRuntime {
    pub fn new(
        repository: Arc<dyn PlatformReadRepository>,
        model: Option<Arc<dyn LlmClient>>,
        platform_name: impl Into<String>,
        capability_timeout: Duration,
    ) -> Self {
        let registry = Arc::new(CapabilityRegistry::new(repository, capability_timeout));
        Self {
            detector: IntentDetector::new(),
            orchestrator: RetrievalOrchestrator::new(registry),
            assembler: ContextAssembler::new(),
            prompt_builder: PromptBuilder::new(platform_name),
            formatter: ResponseFormatter::new(),
            model,
        }
    }

    /// Builds the OpenRouter client when a key is configured. Without one the
    /// runtime still starts and every turn fails with a configuration error.
    pub fn from_config(
        config: &AppConfig,
        repository: Arc<dyn PlatformReadRepository>,
    ) -> Result<Self, AssistantError> {
        let model: Option<Arc<dyn LlmClient>> = if config.llm.has_credential() {
            Some(Arc::new(OpenRouterClient::from_config(&config.llm)?))
        } else {
            warn!(
                event_name = "assistant.model.unconfigured",
                "llm.api_key is not set; assistant turns will fail until it is configured"
            );
            None
        };

        Ok(Self::new(
            repository,
            model,
            config.assistant.platform_name.clone(),
            Duration::from_millis(config.assistant.capability_timeout_ms),
        ))
    }

    pub fn has_model(&self) -> bool {
        self.model.is_some()
    }

    pub async fn respond(
        &self,
        caller: &Caller,
        transcript: &[ConversationTurn],
    ) -> Result<AssistantReply, AssistantError> {
        let model = self.model.as_ref().ok_or_else(|| {
            AssistantError::Configuration("no model client is configured".to_owned())
        })?;
        let started = Instant::now();

        let signals = self.detector.detect(caller, transcript);
        let outputs = self.orchestrator.retrieve(&signals).await;
        let context = self.assembler.assemble(&outputs);

        let request = ModelRequest {
            model: model.model().to_owned(),
            messages: self.prompt_builder.build(caller, &context, transcript),
        };
        let response = model.complete(&request).await?;
        let content = self.formatter.format(&response.content);

        info!(
            event_name = "assistant.turn.completed",
            user_id = caller.user_id.0,
            signals = signals.len(),
            context_fragments = context.fragments().len(),
            elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
            "assistant turn completed"
        );

        Ok(AssistantReply { content, usage: response.usage })
    }
}
