//! Continuity classifier: SAME_TOPIC vs DIFFERENT_TOPIC for the newest
//! message against the current topic.

use std::sync::Arc;

use tracing::{debug, warn};

use router_oracle::Oracle;
use router_types::{AgentCatalog, Message, Topic};

use crate::config::PipelineConfig;
use crate::prompts::{self, DIFFERENT_TOPIC, SAME_TOPIC};
use crate::transcript::{format_dialogue, sanitize_label, tail};

/// Decides whether a new message continues the current topic.
///
/// Fails closed: an oracle error or an answer outside the two canonical
/// labels counts as a topic break, never as a crash and never as a silent
/// continuation.
pub struct ContinuityClassifier<O> {
    oracle: Arc<O>,
    max_context_messages: usize,
}

impl<O: Oracle> ContinuityClassifier<O> {
    /// Create a classifier over the given oracle.
    pub fn new(oracle: Arc<O>, config: &PipelineConfig) -> Self {
        Self {
            oracle,
            max_context_messages: config.max_context_messages,
        }
    }

    /// True if the message continues `topic`.
    pub async fn check(&self, topic: &Topic, message: &Message, catalog: &AgentCatalog) -> bool {
        let transcript = format_dialogue(tail(topic.messages(), self.max_context_messages), false);
        let prompt = prompts::continuity_prompt(&transcript, &message.content, catalog);

        match self.oracle.classify(&prompt).await {
            Ok(answer) => {
                let label = sanitize_label(&answer);
                if label.eq_ignore_ascii_case(SAME_TOPIC) {
                    debug!(topic = %topic.id(), "Message continues current topic");
                    true
                } else if label.eq_ignore_ascii_case(DIFFERENT_TOPIC) {
                    debug!(topic = %topic.id(), "Message breaks from current topic");
                    false
                } else {
                    warn!(answer = %answer, "Continuity answer outside enumeration, treating as topic break");
                    false
                }
            }
            Err(e) => {
                warn!(error = %e, "Continuity oracle failed, treating as topic break");
                false
            }
        }
    }
}
