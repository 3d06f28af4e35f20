//! Assistant runtime for the Ventura gateway.
//!
//! A turn flows through these stages:
//! 1. **Intent detection** (`intent`): keyword and pattern triggers over the
//!    latest user message produce typed `IntentSignal`s.
//! 2. **Retrieval** (`orchestrator`, `capabilities`): signalled capabilities
//!    run concurrently against the platform store; failures degrade to empty
//!    results.
//! 3. **Context and prompt** (`context`, `prompt`): non-empty results are
//!    rendered into a delimited block inside one system message.
//! 4. **Model call** (`llm`): a single chat-completions request.
//! 5. **Formatting** (`formatter`): markdown is reduced to display-safe text.
//!
//! The model never chooses what to retrieve; retrieval is decided locally
//! before the call.

pub mod capabilities;
pub mod context;
pub mod formatter;
pub mod intent;
pub mod llm;
pub mod orchestrator;
pub mod prompt;
pub mod runtime;

pub use capabilities::{CapabilityId, CapabilityOutput, CapabilityRegistry, IntentSignal};
pub use intent::IntentDetector;
pub use llm::{LlmClient, ModelRequest, ModelResponse, OpenRouterClient, ScriptedLlmClient};
pub use runtime::{AssistantReply, AssistantRuntime};
