//! Tick-driven hierarchical task engine with priority-based chain arbitration.
//!
//! This library drives an agent one simulation frame at a time. Work is
//! expressed as trees of [`Task`]s where every node owns at most one sub-task,
//! and top-level concerns are expressed as [`TaskChain`]s competing for control
//! through a [`TaskRunner`].
//!
//! - **Explicit context**: every hook receives the agent/world context `C`
//! - **Continuity**: equal sub-tasks are kept, never restarted
//! - **Clean teardown**: every `on_start` is matched by exactly one `on_stop`
//! - **Single-threaded**: the whole tree is walked synchronously each tick
//!
//! # Architecture
//!
//! - [`Task`]: Authoring contract for a unit of work
//! - [`TaskNode`]: Lifecycle wrapper owning a task and its single sub-task
//! - [`ForceContinuation`]: Optional veto against interruption
//! - [`TaskChain`], [`SingleTaskChain`]: Top-level prioritized concerns
//! - [`TaskRunner`]: Per-tick chain arbiter
//! - [`StatusSink`], [`StatusReport`], [`TaskTrace`]: Debug/status reporting

pub mod chain;
pub mod force;
pub mod node;
pub mod outcome;
pub mod runner;
pub mod status;
pub mod task;
pub mod trace;

// Re-export core types for ergonomic API
pub use chain::{SingleTaskChain, TaskChain};
pub use force::ForceContinuation;
pub use node::TaskNode;
pub use outcome::{TaskFailure, TaskOutcome};
pub use runner::{ChainId, TaskRunner};
pub use status::{StatusReport, StatusSink, TracingSink};
pub use task::{AsAny, BoxedTask, Task, TaskControl};
pub use trace::{StateChange, TaskTrace};
