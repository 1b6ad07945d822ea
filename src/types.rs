use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// What the user wants answered, and where to start looking.
#[derive(Debug, Clone)]
pub struct Task {
    pub address: String,
    pub prompt: String,
}

/// Immutable run parameters, built once at startup.
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Upper bound on capture→decide→act iterations. Always > 0.
    pub max_attempts: u32,
    /// Pause after a successful action so the page can re-render.
    pub settle_delay: Duration,
    pub headless: bool,
}

impl RunConfig {
    /// Pause after a recoverable action failure, before retrying.
    pub fn recovery_delay(&self) -> Duration {
        self.settle_delay * 2
    }
}

/// A screenshot of the current page, taken fresh each attempt.
pub struct RenderSnapshot {
    png: Vec<u8>,
}

impl RenderSnapshot {
    pub fn new(png: Vec<u8>) -> Self {
        Self { png }
    }

    /// Inline form the oracle accepts in an `image_url` content part.
    pub fn as_data_uri(&self) -> String {
        format!("data:image/png;base64,{}", STANDARD.encode(&self.png))
    }
}

/// What the oracle asked for: one more step, or the answer itself.
///
/// Wire shape: `{"type":"action"|"solution","data":{...}}`. Anything else,
/// including payload fields that don't belong to the declared type, is
/// rejected at parse time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "lowercase")]
pub enum Decision {
    Action(ActionRequest),
    Solution(Solution),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ActionRequest {
    pub action: ActionKind,
    /// Exact visible text of the element to act on.
    pub target: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionKind {
    Click,
    /// Part of the decision schema, but no executor exists for it yet.
    Type,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Solution {
    pub answer: String,
    /// Where on the page the answer was found.
    pub source: String,
}

/// One loop iteration, kept in memory for the duration of the run only.
#[derive(Debug, Clone, PartialEq)]
pub struct AttemptRecord {
    pub index: u32,
    pub decision: Decision,
    pub outcome: AttemptOutcome,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttemptOutcome {
    Executed,
    Failed,
    Terminal,
}

/// The run's single terminal result.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Solved { answer: String, source: String },
    Exhausted { attempts_used: u32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Running,
    Solved,
    Exhausted,
    Failed,
}

impl RunState {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, RunState::Running)
    }
}
