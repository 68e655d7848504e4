//! Agent router: assign the specialized agent for the current topic.
//!
//! Unlike the continuity and resurfacing stages there is no closed-world
//! default here; a turn cannot complete without a valid agent, so oracle
//! failures and out-of-catalog answers are fatal.

use std::sync::Arc;

use tracing::{debug, error};

use router_oracle::Oracle;
use router_types::{AgentCatalog, AgentId, Message, Topic};

use crate::config::PipelineConfig;
use crate::error::PipelineError;
use crate::prompts;
use crate::transcript::{format_dialogue, sanitize_label, tail};

/// Chooses the handling agent for the resolved topic.
pub struct AgentRouter<O> {
    oracle: Arc<O>,
    max_context_messages: usize,
}

impl<O: Oracle> AgentRouter<O> {
    /// Create a router over the given oracle.
    pub fn new(oracle: Arc<O>, config: &PipelineConfig) -> Self {
        Self {
            oracle,
            max_context_messages: config.max_context_messages,
        }
    }

    /// Select exactly one agent from the catalog for this topic.
    pub async fn route(
        &self,
        topic: &Topic,
        message: &Message,
        catalog: &AgentCatalog,
    ) -> Result<AgentId, PipelineError> {
        let transcript = format_dialogue(tail(topic.messages(), self.max_context_messages), false);
        let prompt = prompts::routing_prompt(&transcript, &message.content, catalog);

        let answer = match self.oracle.classify(&prompt).await {
            Ok(answer) => answer,
            Err(e) => {
                error!(error = %e, "Routing oracle failed, turn cannot proceed");
                return Err(PipelineError::Routing(e));
            }
        };

        let label = sanitize_label(&answer);
        let spec = catalog.get(&label).ok_or_else(|| {
            error!(answer = %answer, "Routing answer names no catalog agent");
            PipelineError::InvalidRoute(answer.clone())
        })?;

        debug!(topic = %topic.id(), agent = %spec.id, "Routed topic to agent");
        Ok(spec.id.clone())
    }
}
