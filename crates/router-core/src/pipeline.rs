//! Pipeline orchestrator: the per-turn state machine.
//!
//! Stage order is fixed: PreProcessing, ContinuityCheck, then either
//! Routing directly or ResurfaceCheck, then either Routing or CreateTopic,
//! then Routing, PostProcessing. Stages run strictly in sequence; each
//! conditional branch depends on the side effects of the stage before it.
//!
//! `advance` mutates a clone of the committed state and returns it only
//! after post-processing re-validates the stack/disclosed partition, so a
//! fatal error mid-turn can never expose partial writes to the caller.

use std::sync::Arc;

use tracing::{debug, info};

use router_oracle::Oracle;
use router_types::{AgentCatalog, ConversationState, Message, Topic, TopicId};

use crate::config::PipelineConfig;
use crate::continuity::ContinuityClassifier;
use crate::error::PipelineError;
use crate::resurface::ResurfacingClassifier;
use crate::router::AgentRouter;

/// Per-turn pipeline states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    PreProcessing,
    ContinuityCheck,
    ResurfaceCheck,
    CreateTopic,
    Routing,
    PostProcessing,
}

/// The per-turn routing pipeline.
///
/// Owns nothing global: the oracle and the agent catalog are injected at
/// construction and the conversation state is passed per call, so one
/// pipeline instance serves any number of independent sessions.
pub struct Pipeline<O> {
    catalog: AgentCatalog,
    continuity: ContinuityClassifier<O>,
    resurfacing: ResurfacingClassifier<O>,
    router: AgentRouter<O>,
}

impl<O: Oracle> Pipeline<O> {
    /// Create a pipeline over an oracle and a validated agent catalog.
    pub fn new(oracle: Arc<O>, catalog: AgentCatalog, config: PipelineConfig) -> Self {
        Self {
            catalog,
            continuity: ContinuityClassifier::new(Arc::clone(&oracle), &config),
            resurfacing: ResurfacingClassifier::new(Arc::clone(&oracle), &config),
            router: AgentRouter::new(oracle, &config),
        }
    }

    /// Run one turn: resolve the topic for `message`, route it, and tag it.
    ///
    /// The input state is read, never written; on success the updated
    /// state is returned, on error the caller still holds the previous
    /// committed state.
    pub async fn advance(
        &self,
        state: &ConversationState,
        message: Message,
    ) -> Result<ConversationState, PipelineError> {
        let mut next = state.clone();
        let mut stage = Stage::PreProcessing;

        loop {
            debug!(?stage, "Entering pipeline stage");
            stage = match stage {
                Stage::PreProcessing => {
                    next.set_topic_selected(false);
                    Stage::ContinuityCheck
                }

                Stage::ContinuityCheck => {
                    let continues = match next.current_topic() {
                        Some(topic) => self.continuity.check(topic, &message, &self.catalog).await,
                        // Empty stack: nothing to continue
                        None => false,
                    };
                    if continues {
                        next.set_topic_selected(true);
                        Stage::Routing
                    } else {
                        Stage::ResurfaceCheck
                    }
                }

                Stage::ResurfaceCheck => {
                    if !next.has_topics() {
                        Stage::CreateTopic
                    } else if let Some(id) = self
                        .resurfacing
                        .resolve(&next, &message, &self.catalog)
                        .await
                    {
                        self.activate(&mut next, &id)?;
                        next.set_topic_selected(true);
                        Stage::Routing
                    } else {
                        Stage::CreateTopic
                    }
                }

                Stage::CreateTopic => {
                    // Shelve-on-switch: the outgoing top moves to disclosed
                    if next.current_topic().is_some() {
                        next.disclose();
                    }
                    let topic = Topic::new();
                    info!(topic = %topic.id(), "Created new topic");
                    next.push_new(topic);
                    next.set_topic_selected(true);
                    Stage::Routing
                }

                Stage::Routing => {
                    let topic = next.current_topic().ok_or(PipelineError::NoCurrentTopic)?;
                    let agent = self.router.route(topic, &message, &self.catalog).await?;
                    next.current_topic_mut()
                        .ok_or(PipelineError::NoCurrentTopic)?
                        .assign_agent(agent);
                    Stage::PostProcessing
                }

                Stage::PostProcessing => {
                    let id = next
                        .current_topic()
                        .map(|t| t.id().clone())
                        .ok_or(PipelineError::NoCurrentTopic)?;
                    next.commit_message(message.clone().tagged(id))?;
                    next.check_partition()?;
                    return Ok(next);
                }
            };
        }
    }

    /// Bring a resolved topic to the top, shelving the outgoing top.
    ///
    /// Resurfacing the topic already on top is a structural no-op.
    fn activate(
        &self,
        state: &mut ConversationState,
        id: &TopicId,
    ) -> Result<(), PipelineError> {
        if state.current_topic().map(|t| t.id()) != Some(id) {
            state.disclose();
        }
        if !state.resurface(id) {
            return Err(PipelineError::UnknownTopic(id.clone()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use router_oracle::ScriptedOracle;
    use router_types::AgentSpec;

    fn catalog() -> AgentCatalog {
        AgentCatalog::new(vec![
            AgentSpec::new("DIAGNOSIS_AGENT", "Symptom triage"),
            AgentSpec::new("APPOINTMENT_AGENT", "Scheduling"),
            AgentSpec::new("SMALL_TALK_AGENT", "Greetings and chit-chat"),
        ])
        .unwrap()
    }

    fn pipeline(answers: &[&str]) -> Pipeline<ScriptedOracle> {
        Pipeline::new(
            Arc::new(ScriptedOracle::new(answers.iter().copied())),
            catalog(),
            PipelineConfig::default(),
        )
    }

    #[tokio::test]
    async fn test_first_message_creates_topic() {
        let p = pipeline(&["DIAGNOSIS_AGENT"]);
        let state = ConversationState::new();

        let next = p
            .advance(&state, Message::user("I have a headache"))
            .await
            .unwrap();

        assert_eq!(next.stack().len(), 1);
        assert!(next.disclosed().is_empty());
        let topic = next.current_topic().unwrap();
        assert_eq!(topic.messages().len(), 1);
        assert_eq!(topic.assigned_agent().map(|a| a.as_str()), Some("DIAGNOSIS_AGENT"));
        assert_eq!(next.dialogue().len(), 1);
        assert_eq!(next.dialogue()[0].topic_id(), topic.id());
    }

    #[tokio::test]
    async fn test_continuation_appends_to_current_topic() {
        let p = pipeline(&["DIAGNOSIS_AGENT"]);
        let state = p
            .advance(&ConversationState::new(), Message::user("I have a headache"))
            .await
            .unwrap();
        let topic_id = state.current_topic().unwrap().id().clone();

        let p = pipeline(&["SAME_TOPIC", "DIAGNOSIS_AGENT"]);
        let next = p
            .advance(&state, Message::user("It's been 2 days"))
            .await
            .unwrap();

        assert_eq!(next.stack().len(), 1);
        assert_eq!(next.current_topic().unwrap().id(), &topic_id);
        assert_eq!(next.current_topic().unwrap().messages().len(), 2);
        assert!(next.disclosed().is_empty());
    }

    #[tokio::test]
    async fn test_topic_switch_shelves_previous() {
        let p = pipeline(&["DIAGNOSIS_AGENT"]);
        let state = p
            .advance(&ConversationState::new(), Message::user("I have a headache"))
            .await
            .unwrap();
        let first_id = state.current_topic().unwrap().id().clone();

        let p = pipeline(&["DIFFERENT_TOPIC", "NEW_TOPIC", "APPOINTMENT_AGENT"]);
        let next = p
            .advance(&state, Message::user("Can you book me an appointment?"))
            .await
            .unwrap();

        assert_eq!(next.stack().len(), 1);
        assert_ne!(next.current_topic().unwrap().id(), &first_id);
        assert_eq!(next.disclosed().len(), 1);
        assert_eq!(next.disclosed()[0].id(), &first_id);
        assert_eq!(
            next.current_topic().unwrap().assigned_agent().map(|a| a.as_str()),
            Some("APPOINTMENT_AGENT")
        );
        next.check_partition().unwrap();
    }

    #[tokio::test]
    async fn test_resurface_disclosed_topic() {
        let p = pipeline(&["DIAGNOSIS_AGENT"]);
        let state = p
            .advance(&ConversationState::new(), Message::user("I have a headache"))
            .await
            .unwrap();
        let headache_id = state.current_topic().unwrap().id().clone();

        let p = pipeline(&["DIFFERENT_TOPIC", "NEW_TOPIC", "APPOINTMENT_AGENT"]);
        let state = p
            .advance(&state, Message::user("Book me an appointment"))
            .await
            .unwrap();
        let appointment_id = state.current_topic().unwrap().id().clone();

        let p = pipeline(&["DIFFERENT_TOPIC", headache_id.as_str(), "DIAGNOSIS_AGENT"]);
        let next = p
            .advance(&state, Message::user("Back to my headache, is it serious?"))
            .await
            .unwrap();

        assert_eq!(next.current_topic().unwrap().id(), &headache_id);
        assert_eq!(next.disclosed().len(), 1);
        assert_eq!(next.disclosed()[0].id(), &appointment_id);
        assert_eq!(next.current_topic().unwrap().messages().len(), 2);
        next.check_partition().unwrap();
    }

    #[tokio::test]
    async fn test_continuity_skipped_on_empty_stack() {
        let p = pipeline(&["SMALL_TALK_AGENT"]);
        let next = p
            .advance(&ConversationState::new(), Message::user("hi there"))
            .await
            .unwrap();

        // Only the routing prompt is issued
        assert_eq!(next.stack().len(), 1);
    }

    #[tokio::test]
    async fn test_hallucinated_resurface_id_creates_topic() {
        let p = pipeline(&["DIAGNOSIS_AGENT"]);
        let state = p
            .advance(&ConversationState::new(), Message::user("I have a headache"))
            .await
            .unwrap();

        let p = pipeline(&["DIFFERENT_TOPIC", "01HNOTREALNOTREALNOTREAL", "SMALL_TALK_AGENT"]);
        let next = p.advance(&state, Message::user("thanks!")).await.unwrap();

        assert_eq!(next.stack().len(), 1);
        assert_eq!(next.disclosed().len(), 1);
        next.check_partition().unwrap();
    }

    #[tokio::test]
    async fn test_routing_failure_is_fatal_and_preserves_state() {
        let p = pipeline(&["DIAGNOSIS_AGENT"]);
        let state = p
            .advance(&ConversationState::new(), Message::user("I have a headache"))
            .await
            .unwrap();

        // Continuity answer arrives, then the script runs dry at routing
        let p = pipeline(&["SAME_TOPIC"]);
        let result = p.advance(&state, Message::user("still hurts")).await;

        assert!(matches!(result, Err(PipelineError::Routing(_))));
        // Previous committed state untouched
        assert_eq!(state.dialogue().len(), 1);
        assert_eq!(state.current_topic().unwrap().messages().len(), 1);
    }

    #[tokio::test]
    async fn test_invalid_route_is_fatal() {
        let p = pipeline(&["BILLING_AGENT"]);
        let result = p
            .advance(&ConversationState::new(), Message::user("hello"))
            .await;
        assert!(matches!(result, Err(PipelineError::InvalidRoute(_))));
    }

    #[tokio::test]
    async fn test_oracle_failure_at_continuity_falls_back() {
        let p = pipeline(&["DIAGNOSIS_AGENT"]);
        let state = p
            .advance(&ConversationState::new(), Message::user("I have a headache"))
            .await
            .unwrap();

        // Empty continuity answer queue: first call errors, stage falls
        // back to a topic break, then resurfacing and routing proceed.
        let oracle = ScriptedOracle::new(Vec::<String>::new());
        let p = Pipeline::new(Arc::new(oracle), catalog(), PipelineConfig::default());
        let result = p.advance(&state, Message::user("unrelated")).await;

        // Resurfacing also errors (exhausted script) and falls back to a
        // new topic; routing then errors, which is fatal.
        assert!(matches!(result, Err(PipelineError::Routing(_))));
    }

    #[tokio::test]
    async fn test_agent_reassignment_on_continuation() {
        let p = pipeline(&["DIAGNOSIS_AGENT"]);
        let state = p
            .advance(&ConversationState::new(), Message::user("My ear hurts"))
            .await
            .unwrap();

        // Router re-evaluates the continued topic and picks a better fit
        let p = pipeline(&["SAME_TOPIC", "APPOINTMENT_AGENT"]);
        let next = p
            .advance(&state, Message::user("Book me with an ENT for it"))
            .await
            .unwrap();

        assert_eq!(
            next.current_topic().unwrap().assigned_agent().map(|a| a.as_str()),
            Some("APPOINTMENT_AGENT")
        );
    }
}
