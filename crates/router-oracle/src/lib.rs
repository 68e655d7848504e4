//! # router-oracle
//!
//! The classification oracle boundary. Every continuity, resurfacing, and
//! routing decision in the pipeline is delegated to an implementation of
//! the [`Oracle`] trait, which answers a prompt with a short free-text
//! label. The oracle is treated as unreliable: it may error, time out, or
//! answer outside the expected enumeration, and call sites must validate
//! every answer before acting on it.

mod api;
mod mock;

pub use api::{ApiOracle, ApiOracleConfig};
pub use mock::{FailingOracle, ScriptedOracle, StaticOracle};

use async_trait::async_trait;
use thiserror::Error;

/// Error type for oracle calls.
#[derive(Debug, Error)]
pub enum OracleError {
    #[error("API request failed: {0}")]
    Api(String),

    #[error("failed to parse API response: {0}")]
    Parse(String),

    #[error("rate limit exceeded")]
    RateLimitExceeded,

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("timeout waiting for response")]
    Timeout,

    #[error("no answers left in script")]
    ScriptExhausted,
}

/// External decision function backing the pipeline's classifiers.
///
/// Implementations answer with a single label; whitespace and wrapping
/// quotes are the caller's problem (see the sanitizers in router-core).
#[async_trait]
pub trait Oracle: Send + Sync {
    /// Answer a classification prompt with a short label.
    async fn classify(&self, prompt: &str) -> Result<String, OracleError>;
}
