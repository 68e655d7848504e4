//! Pipeline configuration.

use serde::{Deserialize, Serialize};

/// Tunables for the routing pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Maximum number of trailing dialogue messages rendered into a
    /// classifier prompt. Older messages are dropped from the transcript
    /// to bound context size; state is never truncated.
    #[serde(default = "default_max_context_messages")]
    pub max_context_messages: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_context_messages: default_max_context_messages(),
        }
    }
}

fn default_max_context_messages() -> usize {
    50
}
