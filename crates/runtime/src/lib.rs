//! Agent runtime built on `task-system`.
//!
//! Provides a simulated grid world ([`AgentState`]), leaf and composite
//! tasks acting on it, the built-in chains of an autonomous agent and the
//! [`Agent`] facade that ties them to a [`task_system::TaskRunner`].
//!
//! # Modules
//!
//! - [`state`]: World and agent state passed to every task
//! - [`behaviour`]: Scoped behaviour settings pushed by running tasks
//! - [`tasks`]: Movement, food, combat and idle tasks
//! - [`chains`]: Survival, defense, unstuck, food and user-task chains
//! - [`agent`]: Builder-based facade driving one agent per tick
pub mod agent;
pub mod behaviour;
pub mod chains;
pub mod config;
pub mod error;
pub mod state;
pub mod status;
pub mod tasks;

pub use agent::{Agent, AgentBuilder};
pub use behaviour::BehaviourStack;
pub use config::AgentConfig;
pub use error::{Result, RuntimeError};
pub use state::{
    ACTION_LOG_CAPACITY, AgentState, CardinalDirection, Item, LeafAction, MAX_HEALTH, MAX_HUNGER,
    Mob, Position, WorldRules,
};
pub use status::StatusLineSink;
