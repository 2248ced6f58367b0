//! Mock engine client for testing.
//!
//! Executes a pre-scripted sequence of statement outcomes and records what
//! the runner did with it, so tests can assert on execution order and on
//! resource release.

use crate::client::{EngineClient, StatementOutput};
use crate::error::{QuarryError, Result};
use crate::table::ColumnInfo;
use async_trait::async_trait;
use serde_json::json;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

/// Outcome scripted for one statement.
#[derive(Debug, Clone)]
enum ScriptStep {
    /// Return this output.
    Output(StatementOutput),
    /// Fail with this engine message.
    Fail(String),
}

/// Observations recorded while the mock was driven.
#[derive(Debug, Default)]
struct MockState {
    executed: Vec<String>,
    closed: bool,
}

/// Inspection handle for a [`MockEngineClient`], valid after the client has
/// been consumed by the runner.
#[derive(Debug, Clone)]
pub struct MockHandle {
    state: Arc<Mutex<MockState>>,
}

impl MockHandle {
    /// SQL texts executed, in order.
    pub fn executed(&self) -> Vec<String> {
        self.state.lock().unwrap().executed.clone()
    }

    /// Whether `close` ran.
    pub fn was_closed(&self) -> bool {
        self.state.lock().unwrap().closed
    }
}

/// A mock engine client that replays scripted outcomes.
#[derive(Debug)]
pub struct MockEngineClient {
    script: VecDeque<ScriptStep>,
    close_failure: Option<String>,
    state: Arc<Mutex<MockState>>,
}

impl MockEngineClient {
    /// Creates a mock with an empty script.
    pub fn new() -> Self {
        Self {
            script: VecDeque::new(),
            close_failure: None,
            state: Arc::new(Mutex::new(MockState::default())),
        }
    }

    /// Scripts a successful statement with the given output.
    pub fn with_output(mut self, output: StatementOutput) -> Self {
        self.script.push_back(ScriptStep::Output(output));
        self
    }

    /// Scripts a successful non-row-returning statement (the driver's
    /// `[[true]]` / "results" acknowledgment).
    pub fn with_ack(self) -> Self {
        self.with_output(ack_output())
    }

    /// Scripts an engine rejection with the given message.
    pub fn with_failure(mut self, message: impl Into<String>) -> Self {
        self.script.push_back(ScriptStep::Fail(message.into()));
        self
    }

    /// Scripts `close` to fail with the given message. The close attempt
    /// is still recorded.
    pub fn with_close_failure(mut self, message: impl Into<String>) -> Self {
        self.close_failure = Some(message.into());
        self
    }

    /// Returns a handle that stays valid after the client is consumed.
    pub fn handle(&self) -> MockHandle {
        MockHandle {
            state: Arc::clone(&self.state),
        }
    }
}

impl Default for MockEngineClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EngineClient for MockEngineClient {
    async fn execute(&mut self, sql: &str) -> Result<StatementOutput> {
        self.state.lock().unwrap().executed.push(sql.to_string());

        match self.script.pop_front() {
            Some(ScriptStep::Output(output)) => Ok(output),
            Some(ScriptStep::Fail(message)) => Err(QuarryError::execution(0, sql, message)),
            None => Err(QuarryError::internal(format!(
                "mock script exhausted at statement: {sql}"
            ))),
        }
    }

    async fn close(&mut self) -> Result<()> {
        self.state.lock().unwrap().closed = true;
        match self.close_failure.take() {
            Some(message) => Err(QuarryError::connection(message)),
            None => Ok(()),
        }
    }
}

/// The exact wire shape the driver emits after a non-row-returning
/// statement.
pub fn ack_output() -> StatementOutput {
    StatementOutput::new(
        vec![ColumnInfo::new("results", "boolean")],
        vec![vec![json!(true)]],
    )
}
