use std::sync::Arc;

use futures::future::join_all;
use tracing::info;

use crate::capabilities::{CapabilityOutput, CapabilityRegistry, IntentSignal};

/// Runs every signalled capability concurrently and hands the results back in
/// detection order.
#[derive(Clone)]
pub struct RetrievalOrchestrator {
    registry: Arc<CapabilityRegistry>,
}

impl RetrievalOrchestrator {
    pub fn new(registry: Arc<CapabilityRegistry>) -> Self {
        Self { registry }
    }

    pub async fn retrieve(&self, signals: &[IntentSignal]) -> Vec<CapabilityOutput> {
        if signals.is_empty() {
            return Vec::new();
        }

        let outputs = join_all(signals.iter().map(|signal| self.registry.execute(signal))).await;

        info!(
            event_name = "assistant.retrieval.completed",
            signals = signals.len(),
            non_empty = outputs.iter().filter(|output| !output.is_empty()).count(),
            "platform retrieval completed"
        );
        outputs
    }
}
