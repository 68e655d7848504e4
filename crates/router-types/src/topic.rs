//! Topics and topic identifiers.

use serde::{Deserialize, Serialize};

use crate::catalog::AgentId;
use crate::message::TaggedMessage;
use crate::state::StateError;

/// Unique identifier for a topic.
///
/// Assigned once at topic creation (ULID) and never reused. Opaque to
/// callers; the only operations are comparison and display.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TopicId(String);

impl TopicId {
    /// Generate a fresh identifier.
    pub fn generate() -> Self {
        Self(ulid::Ulid::new().to_string())
    }

    /// View as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for TopicId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// One coherent sub-conversation within the outer dialogue.
///
/// The id is immutable after creation. The message list is append-only and
/// accepts only messages already tagged with this topic's id. The assigned
/// agent may be set and later reassigned by the routing stage; nothing else
/// about a topic changes after creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Topic {
    id: TopicId,
    messages: Vec<TaggedMessage>,
    assigned_agent: Option<AgentId>,
}

impl Topic {
    /// Create a new topic with a fresh id, no messages, and no agent.
    pub fn new() -> Self {
        Self {
            id: TopicId::generate(),
            messages: Vec::new(),
            assigned_agent: None,
        }
    }

    /// The topic's identifier.
    pub fn id(&self) -> &TopicId {
        &self.id
    }

    /// Messages attributed to this topic, oldest first.
    pub fn messages(&self) -> &[TaggedMessage] {
        &self.messages
    }

    /// The agent currently responsible for this topic, if any.
    pub fn assigned_agent(&self) -> Option<&AgentId> {
        self.assigned_agent.as_ref()
    }

    /// Append a message. The message's tag must match this topic's id.
    pub fn push_message(&mut self, message: TaggedMessage) -> Result<(), StateError> {
        if message.topic_id() != &self.id {
            return Err(StateError::TagMismatch {
                tagged: message.topic_id().clone(),
                topic: self.id.clone(),
            });
        }
        self.messages.push(message);
        Ok(())
    }

    /// Assign or reassign the handling agent.
    pub fn assign_agent(&mut self, agent: AgentId) {
        self.assigned_agent = Some(agent);
    }
}

impl Default for Topic {
    fn default() -> Self {
        Self::new()
    }
}
