use tracing::{info, warn};

use crate::brain::Oracle;
use crate::error::AgentError;
use crate::hands::{self, Session};
use crate::types::{
    AttemptOutcome, AttemptRecord, Decision, Outcome, RunConfig, RunState, Solution, Task,
};

/// Owns the session for one run and drives the capture→decide→act loop.
pub struct Agent<O, S> {
    oracle: O,
    session: S,
    config: RunConfig,
    history: Vec<AttemptRecord>,
    state: RunState,
}

impl<O: Oracle, S: Session> Agent<O, S> {
    pub fn new(oracle: O, session: S, config: RunConfig) -> Self {
        Self {
            oracle,
            session,
            config,
            history: Vec::new(),
            state: RunState::Running,
        }
    }

    /// Attempts so far, oldest first. Cleared at the start of each run.
    pub fn history(&self) -> &[AttemptRecord] {
        &self.history
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    /// Drive the session until the oracle reports a solution or the attempt
    /// budget runs out. Fatal errors propagate; the session is torn down
    /// when the agent is dropped, whichever way this returns.
    pub async fn run(&mut self, task: &Task) -> Result<Outcome, AgentError> {
        self.history.clear();
        self.state = RunState::Running;

        let result = self.drive(task).await;
        self.state = match &result {
            Ok(Outcome::Solved { .. }) => RunState::Solved,
            Ok(Outcome::Exhausted { .. }) => RunState::Exhausted,
            Err(_) => RunState::Failed,
        };
        result
    }

    async fn drive(&mut self, task: &Task) -> Result<Outcome, AgentError> {
        info!(address = %task.address, "navigating");
        self.session.navigate(&task.address).await?;

        let mut attempts = 0u32;
        let mut solution: Option<Solution> = None;

        while attempts < self.config.max_attempts && solution.is_none() {
            attempts += 1;
            info!(attempt = attempts, max = self.config.max_attempts, "capturing page");

            let snapshot = self.session.capture().await?;
            let decision = self.oracle.decide(&snapshot, &task.prompt).await?;

            match decision {
                Decision::Solution(found) => {
                    info!(answer = %found.answer, source = %found.source, "solution found");
                    self.history.push(AttemptRecord {
                        index: attempts,
                        decision: Decision::Solution(found.clone()),
                        outcome: AttemptOutcome::Terminal,
                    });
                    solution = Some(found);
                }
                Decision::Action(action) => {
                    info!(kind = ?action.action, target = %action.target, "executing action");

                    let (outcome, delay) = match hands::execute(&mut self.session, &action).await {
                        Ok(()) => (AttemptOutcome::Executed, self.config.settle_delay),
                        Err(e) => {
                            warn!(error = %e, "action failed, will retry");
                            (AttemptOutcome::Failed, self.config.recovery_delay())
                        }
                    };
                    self.history.push(AttemptRecord {
                        index: attempts,
                        decision: Decision::Action(action),
                        outcome,
                    });

                    // Let the page settle before the next capture; pointless
                    // after the final attempt.
                    if attempts < self.config.max_attempts {
                        tokio::time::sleep(delay).await;
                    }
                }
            }
        }

        match solution {
            Some(Solution { answer, source }) => Ok(Outcome::Solved { answer, source }),
            None => {
                warn!(attempts_used = attempts, "attempt budget exhausted");
                Ok(Outcome::Exhausted {
                    attempts_used: attempts,
                })
            }
        }
    }
}
