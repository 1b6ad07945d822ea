//! Environment-sourced configuration.
//!
//! - `HEADLESS` - run Chrome without a window. Defaults to `false`.
//! - `SETTLE_DELAY_MS` - pause after a successful action. Defaults to `30000`.
//! - `MAX_ATTEMPTS` - attempt budget, must be at least 1. Defaults to `10`.
//!
//! `OPENAI_API_KEY` and `OPENAI_MODEL` are read by the oracle client, not
//! here. All values are read once at startup into an immutable `RunConfig`.

use std::str::FromStr;
use std::time::Duration;

use crate::error::AgentError;
use crate::types::RunConfig;

const DEFAULT_SETTLE_DELAY_MS: u64 = 30_000;
const DEFAULT_MAX_ATTEMPTS: u32 = 10;

impl RunConfig {
    pub fn from_env() -> Result<Self, AgentError> {
        let headless = parse_var("HEADLESS", false)?;
        let settle_ms = parse_var("SETTLE_DELAY_MS", DEFAULT_SETTLE_DELAY_MS)?;
        let max_attempts: u32 = parse_var("MAX_ATTEMPTS", DEFAULT_MAX_ATTEMPTS)?;

        if max_attempts == 0 {
            return Err(AgentError::Config(
                "MAX_ATTEMPTS must be at least 1".into(),
            ));
        }

        Ok(Self {
            max_attempts,
            settle_delay: Duration::from_millis(settle_ms),
            headless,
        })
    }
}

fn parse_var<T>(name: &str, default: T) -> Result<T, AgentError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(name) {
        Ok(raw) => raw
            .parse()
            .map_err(|e| AgentError::Config(format!("invalid value for {name}: {e}"))),
        Err(_) => Ok(default),
    }
}
