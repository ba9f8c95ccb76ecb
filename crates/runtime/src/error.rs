//! Error types surfaced by the agent runtime.
//!
//! Task-level failures are not errors here: they travel as
//! [`TaskOutcome::Failed`](task_system::TaskOutcome) through the chain that
//! ran the task. These variants cover setup and API misuse.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, RuntimeError>;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RuntimeError {
    #[error("invalid configuration value for {key}: {reason}")]
    InvalidConfig { key: &'static str, reason: String },

    #[error("{name} chain is not registered with this agent")]
    ChainNotRegistered { name: &'static str },
}
