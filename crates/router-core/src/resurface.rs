//! Resurfacing classifier: reattach a message to a previously seen topic,
//! or declare it a new one.

use std::sync::Arc;

use tracing::{debug, warn};

use router_oracle::Oracle;
use router_types::{AgentCatalog, ConversationState, Message, TopicId};

use crate::config::PipelineConfig;
use crate::prompts::{self, NEW_TOPIC};
use crate::transcript::{format_dialogue, sanitize_label, tail};

/// Searches the stack and disclosed topics for an existing topic the new
/// message belongs to.
///
/// The oracle may only select ids it was shown in the annotated dialogue;
/// hallucinated ids, the NEW_TOPIC sentinel, and oracle failures all
/// resolve to `None` (start fresh).
pub struct ResurfacingClassifier<O> {
    oracle: Arc<O>,
    max_context_messages: usize,
}

impl<O: Oracle> ResurfacingClassifier<O> {
    /// Create a classifier over the given oracle.
    pub fn new(oracle: Arc<O>, config: &PipelineConfig) -> Self {
        Self {
            oracle,
            max_context_messages: config.max_context_messages,
        }
    }

    /// Resolve the message to an existing topic id, or `None` for a new
    /// topic.
    pub async fn resolve(
        &self,
        state: &ConversationState,
        message: &Message,
        catalog: &AgentCatalog,
    ) -> Option<TopicId> {
        let annotated =
            format_dialogue(tail(state.dialogue(), self.max_context_messages), true);
        let prompt = prompts::resurfacing_prompt(&annotated, &message.content, catalog);

        let answer = match self.oracle.classify(&prompt).await {
            Ok(answer) => answer,
            Err(e) => {
                warn!(error = %e, "Resurfacing oracle failed, starting a new topic");
                return None;
            }
        };

        let label = sanitize_label(&answer);
        if label.eq_ignore_ascii_case(NEW_TOPIC) {
            debug!("Resurfacing oracle chose a new topic");
            return None;
        }

        match self.find_topic(state, &label) {
            Some(id) => {
                debug!(topic = %id, "Resurfacing previously seen topic");
                Some(id)
            }
            None => {
                warn!(answer = %answer, "Resurfacing answer names no known topic, starting a new topic");
                None
            }
        }
    }

    /// Match a sanitized answer against the ids of known topics.
    fn find_topic(&self, state: &ConversationState, label: &str) -> Option<TopicId> {
        state
            .stack()
            .iter()
            .chain(state.disclosed().iter())
            .map(|t| t.id())
            .find(|id| id.as_str().eq_ignore_ascii_case(label))
            .cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use router_oracle::{FailingOracle, StaticOracle};
    use router_types::{AgentSpec, Topic};

    fn catalog() -> AgentCatalog {
        AgentCatalog::new(vec![AgentSpec::new("DIAGNOSIS_AGENT", "Symptom triage")]).unwrap()
    }

    fn state_with_disclosed_topic() -> (ConversationState, TopicId) {
        let mut state = ConversationState::new();
        let topic = Topic::new();
        let id = topic.id().clone();
        state.push_new(topic);
        state
            .commit_message(Message::user("I have a headache").tagged(id.clone()))
            .unwrap();
        state.disclose();
        (state, id)
    }

    fn classifier<O: Oracle>(oracle: O) -> ResurfacingClassifier<O> {
        ResurfacingClassifier::new(Arc::new(oracle), &PipelineConfig::default())
    }

    #[tokio::test]
    async fn test_resolve_known_id() {
        let (state, id) = state_with_disclosed_topic();
        let c = classifier(StaticOracle::new(id.as_str()));
        let resolved = c
            .resolve(&state, &Message::user("back to my headache"), &catalog())
            .await;
        assert_eq!(resolved, Some(id));
    }

    #[tokio::test]
    async fn test_resolve_quoted_id() {
        let (state, id) = state_with_disclosed_topic();
        let c = classifier(StaticOracle::new(format!("'{}'", id)));
        let resolved = c
            .resolve(&state, &Message::user("back to that"), &catalog())
            .await;
        assert_eq!(resolved, Some(id));
    }

    #[tokio::test]
    async fn test_resolve_sentinel() {
        let (state, _) = state_with_disclosed_topic();
        let c = classifier(StaticOracle::new("NEW_TOPIC"));
        let resolved = c
            .resolve(&state, &Message::user("something else"), &catalog())
            .await;
        assert_eq!(resolved, None);
    }

    #[tokio::test]
    async fn test_resolve_hallucinated_id() {
        let (state, _) = state_with_disclosed_topic();
        let c = classifier(StaticOracle::new("01HFAKEFAKEFAKEFAKEFAKE"));
        let resolved = c
            .resolve(&state, &Message::user("hm"), &catalog())
            .await;
        assert_eq!(resolved, None);
    }

    #[tokio::test]
    async fn test_resolve_oracle_error() {
        let (state, _) = state_with_disclosed_topic();
        let c = classifier(FailingOracle);
        let resolved = c
            .resolve(&state, &Message::user("hm"), &catalog())
            .await;
        assert_eq!(resolved, None);
    }
}
