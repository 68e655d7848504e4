//! Dialogue messages and topic-tagged messages.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::topic::TopicId;

/// Role of the message author.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// User input
    User,
    /// Assistant response
    Assistant,
    /// System message
    System,
}

impl Role {
    /// Parse a role name, accepting transport-layer aliases
    /// ("human" for user, "ai" for assistant).
    pub fn parse(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "user" | "human" => Some(Role::User),
            "assistant" | "ai" => Some(Role::Assistant),
            "system" => Some(Role::System),
            _ => None,
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::User => write!(f, "user"),
            Role::Assistant => write!(f, "assistant"),
            Role::System => write!(f, "system"),
        }
    }
}

/// A single dialogue turn, not yet attributed to a topic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// Role of the author
    pub role: Role,
    /// Message text
    pub content: String,
    /// When the message was produced
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub timestamp: DateTime<Utc>,
}

impl Message {
    /// Create a message with the current timestamp.
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            timestamp: Utc::now(),
        }
    }

    /// Create a user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    /// Create an assistant message.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }

    /// Attribute this message to a topic, consuming it.
    ///
    /// The returned copy carries the tag permanently; [`TaggedMessage`]
    /// exposes no way to change it.
    pub fn tagged(self, topic_id: TopicId) -> TaggedMessage {
        TaggedMessage {
            message: self,
            topic_id,
        }
    }
}

/// A message permanently attributed to a topic.
///
/// The tag is set once at construction. There is no mutator: provenance of
/// already-attributed messages cannot be rewritten by later turns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaggedMessage {
    message: Message,
    topic_id: TopicId,
}

impl TaggedMessage {
    /// The underlying message.
    pub fn message(&self) -> &Message {
        &self.message
    }

    /// The topic this message belongs to.
    pub fn topic_id(&self) -> &TopicId {
        &self.topic_id
    }

    /// Author role, for transcript rendering.
    pub fn role(&self) -> Role {
        self.message.role
    }

    /// Message text, for transcript rendering.
    pub fn content(&self) -> &str {
        &self.message.content
    }
}
