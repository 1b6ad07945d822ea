pub mod agent;
pub mod brain;
pub mod config;
pub mod error;
pub mod hands;
pub mod types;

pub use agent::Agent;
pub use brain::{Brain, Oracle};
pub use error::{AgentError, ExecError};
pub use hands::{ChromeSession, Session};
pub use types::{
    ActionKind, ActionRequest, AttemptOutcome, AttemptRecord, Decision, Outcome, RenderSnapshot,
    RunConfig, RunState, Solution, Task,
};
