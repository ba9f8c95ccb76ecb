//! Built-in tasks for the simulated agent.
//!
//! Leaf tasks ([`StepTask`], [`EatFoodTask`], [`TimeoutWanderTask`],
//! [`IdleTask`]) act on [`AgentState`](crate::AgentState) directly; the others
//! delegate to a single sub-task each tick.

mod combat;
mod food;
mod idle;
mod movement;

pub use combat::KillMobTask;
pub use food::{EAT_TICKS, EatFoodTask};
pub use idle::IdleTask;
pub use movement::{GotoTask, MAX_BLOCKED_STEPS, STEP_TICKS, StepTask, TimeoutWanderTask};
