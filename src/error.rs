use thiserror::Error;

use crate::types::ActionKind;

/// Errors that abort the run. All of these propagate to the top-level
/// handler; the session is torn down on the way out.
#[derive(Debug, Error)]
pub enum AgentError {
    /// Bad or missing configuration, raised before any session exists.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// The initial page load failed.
    #[error("failed to load {address}: {reason}")]
    Navigation { address: String, reason: String },

    /// Screenshot capture failed.
    #[error("screenshot capture failed: {0}")]
    Capture(String),

    /// Transport or service failure talking to the oracle.
    #[error("oracle request failed: {0}")]
    OracleRequest(String),

    /// The oracle replied, but not with a valid decision.
    #[error("oracle reply did not match the decision schema: {0}")]
    DecisionParse(String),

    /// The browser side fell over outside of navigation/capture.
    #[error("browser session error: {0}")]
    Session(String),
}

/// Recoverable executor errors. The loop records the failed attempt, backs
/// off, and keeps going; these never abort the run.
#[derive(Debug, Error)]
pub enum ExecError {
    /// No element on the page carries the requested visible text.
    #[error("no element with visible text {0:?}")]
    ElementNotFound(String),

    /// The decision schema names the kind, but nothing executes it.
    #[error("action kind {0:?} is not supported")]
    UnsupportedAction(ActionKind),

    /// An element was resolved but the interaction itself failed.
    #[error("interaction failed: {0}")]
    Interaction(String),
}
