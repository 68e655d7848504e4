//! # router-session
//!
//! Per-session serialization over the routing pipeline.
//!
//! Each session (independent conversation thread) owns one
//! [`ConversationState`] guarded by its own async mutex: at most one
//! pipeline run is in flight per session, while unrelated sessions
//! proceed in parallel. The lock is held across the whole turn, so two
//! overlapping requests for the same session can never interleave their
//! stack mutations.
//!
//! The manager also exposes the persistence boundary: `checkpoint` hands
//! out a plain-data snapshot of a session's state and `restore` installs
//! one, letting a caller survive process restarts with external storage.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use thiserror::Error;
use tracing::debug;

use router_core::{Pipeline, PipelineError};
use router_oracle::Oracle;
use router_types::{ConversationState, Message, StateError, TopicId};

/// Errors from session-level operations.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The pipeline turn failed; the session keeps its previous state
    #[error(transparent)]
    Pipeline(#[from] PipelineError),

    /// Conversation state contract violation outside a pipeline run
    #[error(transparent)]
    State(#[from] StateError),

    /// Operation on a session that was never created or restored
    #[error("unknown session: {0}")]
    UnknownSession(String),
}

type SessionSlot = Arc<tokio::sync::Mutex<ConversationState>>;

/// Serializes pipeline runs per session and multiplexes one pipeline
/// across any number of sessions.
pub struct SessionManager<O> {
    pipeline: Pipeline<O>,
    sessions: Mutex<HashMap<String, SessionSlot>>,
}

impl<O: Oracle> SessionManager<O> {
    /// Create a manager over a pipeline.
    pub fn new(pipeline: Pipeline<O>) -> Self {
        Self {
            pipeline,
            sessions: Mutex::new(HashMap::new()),
        }
    }

    /// Fetch or create the slot for a session id.
    fn slot(&self, session_id: &str) -> SessionSlot {
        let mut sessions = self.sessions.lock().expect("session map lock poisoned");
        Arc::clone(
            sessions
                .entry(session_id.to_string())
                .or_insert_with(|| Arc::new(tokio::sync::Mutex::new(ConversationState::new()))),
        )
    }

    /// Fetch the slot for an existing session id.
    fn existing_slot(&self, session_id: &str) -> Result<SessionSlot, SessionError> {
        let sessions = self.sessions.lock().expect("session map lock poisoned");
        sessions
            .get(session_id)
            .cloned()
            .ok_or_else(|| SessionError::UnknownSession(session_id.to_string()))
    }

    /// Run one turn for the given session, creating it on first use.
    ///
    /// Holds the session's lock for the whole pipeline run; the new state
    /// is committed only on success.
    pub async fn advance(
        &self,
        session_id: &str,
        message: Message,
    ) -> Result<ConversationState, SessionError> {
        let slot = self.slot(session_id);
        let mut state = slot.lock().await;
        debug!(session = session_id, "Advancing session");

        let next = self.pipeline.advance(&state, message).await?;
        *state = next.clone();
        Ok(next)
    }

    /// Attribute an agent reply to the session's current topic.
    ///
    /// Called by the dispatcher after the routed agent produced its
    /// response, before the next `advance`.
    pub async fn record_reply(
        &self,
        session_id: &str,
        reply: Message,
    ) -> Result<TopicId, SessionError> {
        let slot = self.existing_slot(session_id)?;
        let mut state = slot.lock().await;
        Ok(state.record_reply(reply)?)
    }

    /// Snapshot a session's state for external persistence.
    pub async fn checkpoint(&self, session_id: &str) -> Result<ConversationState, SessionError> {
        let slot = self.existing_slot(session_id)?;
        let state = slot.lock().await;
        Ok(state.clone())
    }

    /// Install a previously checkpointed state, replacing anything the
    /// session currently holds.
    pub async fn restore(&self, session_id: &str, state: ConversationState) {
        let slot = self.slot(session_id);
        let mut current = slot.lock().await;
        *current = state;
    }

    /// Ids of sessions currently held in memory.
    pub fn session_ids(&self) -> Vec<String> {
        let sessions = self.sessions.lock().expect("session map lock poisoned");
        sessions.keys().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use router_core::PipelineConfig;
    use router_oracle::StaticOracle;
    use router_types::{AgentCatalog, AgentSpec};

    fn manager() -> SessionManager<StaticOracle> {
        let catalog = AgentCatalog::new(vec![AgentSpec::new(
            "SMALL_TALK_AGENT",
            "Greetings and chit-chat",
        )])
        .unwrap();
        let pipeline = Pipeline::new(
            Arc::new(StaticOracle::new("SMALL_TALK_AGENT")),
            catalog,
            PipelineConfig::default(),
        );
        SessionManager::new(pipeline)
    }

    #[tokio::test]
    async fn test_advance_creates_session() {
        let manager = manager();
        let state = manager.advance("s1", Message::user("hi")).await.unwrap();
        assert_eq!(state.stack().len(), 1);
        assert_eq!(manager.session_ids(), vec!["s1".to_string()]);
    }

    #[tokio::test]
    async fn test_sessions_are_independent() {
        let manager = manager();
        manager.advance("s1", Message::user("hi")).await.unwrap();
        manager.advance("s2", Message::user("hello")).await.unwrap();

        let s1 = manager.checkpoint("s1").await.unwrap();
        let s2 = manager.checkpoint("s2").await.unwrap();
        assert_ne!(
            s1.current_topic().unwrap().id(),
            s2.current_topic().unwrap().id()
        );
    }

    #[tokio::test]
    async fn test_record_reply_tags_current_topic() {
        let manager = manager();
        let state = manager.advance("s1", Message::user("hi")).await.unwrap();
        let topic_id = state.current_topic().unwrap().id().clone();

        let reply_id = manager
            .record_reply("s1", Message::assistant("Hello!"))
            .await
            .unwrap();
        assert_eq!(reply_id, topic_id);

        let state = manager.checkpoint("s1").await.unwrap();
        assert_eq!(state.dialogue().len(), 2);
        assert_eq!(state.messages_for_topic(&topic_id).len(), 2);
    }

    #[tokio::test]
    async fn test_record_reply_unknown_session() {
        let manager = manager();
        let result = manager
            .record_reply("missing", Message::assistant("?"))
            .await;
        assert!(matches!(result, Err(SessionError::UnknownSession(_))));
    }

    #[tokio::test]
    async fn test_checkpoint_restore_round_trip() {
        let manager = manager();
        manager.advance("s1", Message::user("hi")).await.unwrap();

        let snapshot = manager.checkpoint("s1").await.unwrap();
        let json = serde_json::to_string(&snapshot).unwrap();

        let restored: ConversationState = serde_json::from_str(&json).unwrap();
        manager.restore("s2", restored).await;

        let s2 = manager.checkpoint("s2").await.unwrap();
        assert_eq!(s2.dialogue().len(), snapshot.dialogue().len());
        assert_eq!(
            s2.current_topic().unwrap().id(),
            snapshot.current_topic().unwrap().id()
        );
    }
}
