//! Terminal results of a root task.

use thiserror::Error;

/// A task failure reported through [`TaskControl::fail`](crate::TaskControl::fail)
/// or [`TaskNode::fail`](crate::TaskNode::fail).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("task <{task}> failed: {reason}")]
pub struct TaskFailure {
    /// Debug label of the failing task.
    pub task: String,
    pub reason: String,
}

/// How a chain's root task ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskOutcome {
    /// The task reported [`is_finished`](crate::Task::is_finished).
    Finished,

    /// The task was cancelled before finishing.
    Cancelled,

    /// The task failed and was dropped.
    Failed(TaskFailure),
}

impl TaskOutcome {
    #[inline]
    pub fn is_finished(&self) -> bool {
        matches!(self, TaskOutcome::Finished)
    }

    #[inline]
    pub fn is_failed(&self) -> bool {
        matches!(self, TaskOutcome::Failed(_))
    }
}
