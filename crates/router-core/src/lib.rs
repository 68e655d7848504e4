//! # router-core
//!
//! The per-turn routing pipeline: given the outer conversation state and a
//! new user message, decide which topic the message belongs to and which
//! specialized agent should handle it.
//!
//! Four stages run in sequence, each depending on the side effects of the
//! previous one:
//! 1. Continuity check: does the message continue the current topic?
//! 2. Resurfacing search: does it reattach to a previously seen topic?
//! 3. Topic creation: neither matched, start a fresh topic.
//! 4. Agent routing: assign the handling agent for the resolved topic.
//!
//! Continuity and resurfacing fail closed (break / new topic) when the
//! classification oracle errors or answers outside its enumeration; only
//! routing failures are fatal for the turn. [`Pipeline::advance`] works on
//! a clone of the committed state, so a fatal error leaves the caller
//! holding the previous state with no partial writes.

pub mod config;
pub mod continuity;
pub mod error;
pub mod pipeline;
pub mod prompts;
pub mod resurface;
pub mod router;
pub mod transcript;

pub use config::PipelineConfig;
pub use continuity::ContinuityClassifier;
pub use error::PipelineError;
pub use pipeline::Pipeline;
pub use resurface::ResurfacingClassifier;
pub use router::AgentRouter;
pub use transcript::{format_dialogue, sanitize_label, strip_braces, strip_quotes};
