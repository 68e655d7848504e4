//! # router-types
//!
//! Data model for the dialog router: messages, topics, the agent catalog,
//! and the outer conversation state with its topic stack and disclosed
//! (shelved) topics.
//!
//! Every type here is plain serializable data so a caller can checkpoint
//! and restore a conversation between turns. Topics move between the stack
//! and the disclosed collection only through the transition operations on
//! [`ConversationState`]; a topic id lives in exactly one of the two
//! collections at any time.

pub mod catalog;
pub mod message;
pub mod state;
pub mod topic;

pub use catalog::{AgentCatalog, AgentId, AgentSpec, CatalogError};
pub use message::{Message, Role, TaggedMessage};
pub use state::{ConversationState, StateError};
pub use topic::{Topic, TopicId};
