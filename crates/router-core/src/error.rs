//! Pipeline error taxonomy.
//!
//! Recoverable stage errors (continuity or resurfacing oracle failures)
//! never appear here; those stages fall back to their closed-world
//! defaults internally. Everything in this enum aborts the turn and
//! leaves the caller's previous state untouched.

use thiserror::Error;

use router_oracle::OracleError;
use router_types::{CatalogError, StateError, TopicId};

/// Fatal per-turn errors.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The routing oracle call failed; no agent can be assigned
    #[error("agent routing failed: {0}")]
    Routing(#[source] OracleError),

    /// The routing oracle named an agent outside the catalog
    #[error("oracle selected unknown agent: {0:?}")]
    InvalidRoute(String),

    /// A resolved topic id vanished between stages
    #[error("resurfaced topic not found: {0}")]
    UnknownTopic(TopicId),

    /// The routing stage was reached without a current topic
    #[error("no current topic after topic resolution")]
    NoCurrentTopic,

    /// Conversation state contract violation
    #[error(transparent)]
    State(#[from] StateError),

    /// Catalog configuration error
    #[error(transparent)]
    Catalog(#[from] CatalogError),
}
