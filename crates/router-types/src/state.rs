//! Outer conversation state: the full dialogue plus the topic stack and
//! the disclosed (shelved) topics.
//!
//! The stack holds topics currently in play, most recently active at the
//! end; the top of the stack is the current topic. Disclosed topics have
//! been pushed out of the stack but remain retrievable for resurfacing.
//! Topics move between the two collections only through [`push_new`],
//! [`disclose`] and [`resurface`]; nothing is ever deleted or duplicated.
//!
//! [`push_new`]: ConversationState::push_new
//! [`disclose`]: ConversationState::disclose
//! [`resurface`]: ConversationState::resurface

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::message::{Message, TaggedMessage};
use crate::topic::{Topic, TopicId};

/// Contract violations on conversation state.
///
/// These indicate a programming error, not a recoverable condition: the
/// turn that observes one must be aborted with the prior state intact.
#[derive(Debug, Error)]
pub enum StateError {
    /// An operation required a current topic but the stack was empty
    #[error("no active topic on the stack")]
    NoActiveTopic,

    /// A message tagged for one topic was appended to another
    #[error("message tagged for topic {tagged} appended to topic {topic}")]
    TagMismatch {
        /// Tag carried by the message
        tagged: TopicId,
        /// Topic the append was attempted on
        topic: TopicId,
    },

    /// A topic id was found in both the stack and the disclosed topics
    #[error("topic {0} present in both stack and disclosed topics")]
    PartitionViolation(TopicId),
}

/// Full per-session conversation state.
///
/// Plain serializable data: a caller may checkpoint it between turns and
/// restore it later. The `topic_selected` flag is per-turn pipeline
/// scratch; it is reset at the start of every turn.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConversationState {
    dialogue: Vec<TaggedMessage>,
    stack: Vec<Topic>,
    disclosed: Vec<Topic>,
    #[serde(default)]
    topic_selected: bool,
}

impl ConversationState {
    /// Create an empty state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Peek the top of the stack.
    pub fn current_topic(&self) -> Option<&Topic> {
        self.stack.last()
    }

    /// Mutable access to the top of the stack.
    pub fn current_topic_mut(&mut self) -> Option<&mut Topic> {
        self.stack.last_mut()
    }

    /// Place a brand-new topic on top of the stack. Disclosed topics are
    /// untouched.
    pub fn push_new(&mut self, topic: Topic) {
        self.stack.push(topic);
    }

    /// Pop the top of the stack and shelve it. No-op on an empty stack.
    pub fn disclose(&mut self) {
        if let Some(topic) = self.stack.pop() {
            self.disclosed.push(topic);
        }
    }

    /// Bring a previously seen topic to the top of the stack.
    ///
    /// Searches the stack first, then the disclosed topics. Returns false
    /// without touching anything if the id is unknown. Resurfacing the
    /// topic already on top leaves the stack order unchanged.
    pub fn resurface(&mut self, id: &TopicId) -> bool {
        if let Some(pos) = self.stack.iter().position(|t| t.id() == id) {
            let topic = self.stack.remove(pos);
            self.stack.push(topic);
            return true;
        }
        if let Some(pos) = self.disclosed.iter().position(|t| t.id() == id) {
            let topic = self.disclosed.remove(pos);
            self.stack.push(topic);
            return true;
        }
        false
    }

    /// Whether any topic exists in either collection.
    pub fn has_topics(&self) -> bool {
        !self.stack.is_empty() || !self.disclosed.is_empty()
    }

    /// Whether the given id names a known topic (stack or disclosed).
    pub fn contains_topic(&self, id: &TopicId) -> bool {
        self.stack.iter().any(|t| t.id() == id) || self.disclosed.iter().any(|t| t.id() == id)
    }

    /// The full tagged dialogue, oldest first.
    pub fn dialogue(&self) -> &[TaggedMessage] {
        &self.dialogue
    }

    /// The topic stack, top at the end.
    pub fn stack(&self) -> &[Topic] {
        &self.stack
    }

    /// The shelved topics.
    pub fn disclosed(&self) -> &[Topic] {
        &self.disclosed
    }

    /// Per-turn resolution flag.
    pub fn topic_selected(&self) -> bool {
        self.topic_selected
    }

    /// Set the per-turn resolution flag.
    pub fn set_topic_selected(&mut self, selected: bool) {
        self.topic_selected = selected;
    }

    /// Append an already-tagged message to the current topic and the
    /// dialogue. The tag must match the current topic's id.
    pub fn commit_message(&mut self, message: TaggedMessage) -> Result<(), StateError> {
        let current = self.stack.last_mut().ok_or(StateError::NoActiveTopic)?;
        current.push_message(message.clone())?;
        self.dialogue.push(message);
        Ok(())
    }

    /// Attribute an agent reply to the current topic.
    ///
    /// Callers append the chosen agent's response through this between
    /// turns, so replies carry the same tag as the user message that
    /// provoked them. Returns the topic id the reply was tagged with.
    pub fn record_reply(&mut self, reply: Message) -> Result<TopicId, StateError> {
        let id = self
            .current_topic()
            .map(|t| t.id().clone())
            .ok_or(StateError::NoActiveTopic)?;
        self.commit_message(reply.tagged(id.clone()))?;
        Ok(id)
    }

    /// All dialogue messages attributed to the given topic, in order.
    pub fn messages_for_topic(&self, id: &TopicId) -> Vec<&TaggedMessage> {
        self.dialogue.iter().filter(|m| m.topic_id() == id).collect()
    }

    /// Verify the stack/disclosed partition invariant: no topic id may
    /// appear in both collections or twice within one.
    pub fn check_partition(&self) -> Result<(), StateError> {
        let all = self.stack.iter().chain(self.disclosed.iter());
        let mut seen: Vec<&TopicId> = Vec::new();
        for topic in all {
            if seen.contains(&topic.id()) {
                return Err(StateError::PartitionViolation(topic.id().clone()));
            }
            seen.push(topic.id());
        }
        Ok(())
    }
}
