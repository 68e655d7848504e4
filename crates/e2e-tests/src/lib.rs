//! Shared harness for dialog-router end-to-end tests.
//!
//! Provides a realistic agent catalog, pipeline builders over scripted
//! oracles, and oracle variants for failure injection and concurrency
//! probing.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use router_core::{Pipeline, PipelineConfig};
use router_oracle::{Oracle, OracleError, ScriptedOracle};
use router_types::{AgentCatalog, AgentSpec, Message};

/// Install a fmt subscriber for test output. Safe to call repeatedly.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_test_writer()
        .try_init();
}

/// The medical-assistant catalog used across scenario tests.
pub fn medical_catalog() -> AgentCatalog {
    AgentCatalog::new(vec![
        AgentSpec::new(
            "DIAGNOSIS_AGENT",
            "Clinical questions, symptom triage, medication safety",
        ),
        AgentSpec::new(
            "APPOINTMENT_AGENT",
            "Booking, rescheduling, and visit logistics",
        ),
        AgentSpec::new(
            "SMALL_TALK_AGENT",
            "Greetings, thanks, and meta-assistant chatter",
        ),
        AgentSpec::new(
            "OUT_OF_TOPIC_AGENT",
            "Everything unrelated to healthcare tasks",
        ),
    ])
    .unwrap()
}

/// Build a pipeline whose oracle replays the given answers in order.
pub fn scripted_pipeline(answers: &[&str]) -> Pipeline<ScriptedOracle> {
    Pipeline::new(
        Arc::new(ScriptedOracle::new(answers.iter().copied())),
        medical_catalog(),
        PipelineConfig::default(),
    )
}

/// Build a pipeline over an arbitrary oracle and the medical catalog.
pub fn pipeline_with<O: Oracle>(oracle: O) -> Pipeline<O> {
    Pipeline::new(Arc::new(oracle), medical_catalog(), PipelineConfig::default())
}

/// A user message.
pub fn user(content: &str) -> Message {
    Message::user(content)
}

/// Oracle that replays a sequence of steps where `None` means the call
/// fails with a timeout. Used to prove closed-world fallback behavior.
pub struct StepOracle {
    steps: Mutex<std::collections::VecDeque<Option<String>>>,
}

impl StepOracle {
    /// Create from `Some(answer)` / `None` (fail) steps.
    pub fn new(steps: impl IntoIterator<Item = Option<&'static str>>) -> Self {
        Self {
            steps: Mutex::new(
                steps
                    .into_iter()
                    .map(|s| s.map(str::to_string))
                    .collect(),
            ),
        }
    }
}

#[async_trait]
impl Oracle for StepOracle {
    async fn classify(&self, _prompt: &str) -> Result<String, OracleError> {
        let step = self
            .steps
            .lock()
            .expect("steps lock poisoned")
            .pop_front()
            .ok_or(OracleError::ScriptExhausted)?;
        step.ok_or(OracleError::Timeout)
    }
}

/// Oracle that tracks how many classifications are in flight at once.
///
/// Every call sleeps briefly so overlapping turns would be observed; the
/// per-session lock in router-session must keep `max_in_flight` at 1 for
/// calls of a single session.
pub struct ProbeOracle {
    answer: String,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    delay: Duration,
}

impl ProbeOracle {
    /// Create a probe that always answers `answer`.
    pub fn new(answer: &str, delay: Duration) -> Self {
        Self {
            answer: answer.to_string(),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
            delay,
        }
    }

    /// Highest number of simultaneous in-flight calls observed.
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Oracle for ProbeOracle {
    async fn classify(&self, _prompt: &str) -> Result<String, OracleError> {
        let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(current, Ordering::SeqCst);
        tokio::time::sleep(self.delay).await;
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        Ok(self.answer.clone())
    }
}
