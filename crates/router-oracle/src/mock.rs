//! Test oracles.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::{Oracle, OracleError};

/// Oracle that answers every prompt with the same label.
pub struct StaticOracle {
    answer: String,
}

impl StaticOracle {
    /// Create an oracle with a fixed answer.
    pub fn new(answer: impl Into<String>) -> Self {
        Self {
            answer: answer.into(),
        }
    }
}

#[async_trait]
impl Oracle for StaticOracle {
    async fn classify(&self, _prompt: &str) -> Result<String, OracleError> {
        Ok(self.answer.clone())
    }
}

/// Oracle that replays a queue of answers and records the prompts it saw.
///
/// Answers are consumed front to back; an empty queue yields
/// [`OracleError::ScriptExhausted`], which pipeline stages treat like any
/// other oracle failure.
pub struct ScriptedOracle {
    answers: Mutex<VecDeque<String>>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedOracle {
    /// Create a scripted oracle from a list of answers.
    pub fn new(answers: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            answers: Mutex::new(answers.into_iter().map(Into::into).collect()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Prompts seen so far, in call order.
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().expect("prompts lock poisoned").clone()
    }

    /// Number of answers not yet consumed.
    pub fn remaining(&self) -> usize {
        self.answers.lock().expect("answers lock poisoned").len()
    }
}

#[async_trait]
impl Oracle for ScriptedOracle {
    async fn classify(&self, prompt: &str) -> Result<String, OracleError> {
        self.prompts
            .lock()
            .expect("prompts lock poisoned")
            .push(prompt.to_string());
        self.answers
            .lock()
            .expect("answers lock poisoned")
            .pop_front()
            .ok_or(OracleError::ScriptExhausted)
    }
}

/// Oracle that always fails, for exercising closed-world fallbacks.
pub struct FailingOracle;

#[async_trait]
impl Oracle for FailingOracle {
    async fn classify(&self, _prompt: &str) -> Result<String, OracleError> {
        Err(OracleError::Timeout)
    }
}
