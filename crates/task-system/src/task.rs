//! Core task trait.
//!
//! This module defines the [`Task`] trait, the authoring contract for every
//! node of a task tree. The trait is generic over a context type `C`, so tasks
//! read and mutate agent/world state that is passed in explicitly each tick.
//! Lifecycle bookkeeping (start/stop pairing, sub-task ownership) is handled by
//! [`TaskNode`](crate::TaskNode); implementors only supply the hooks.

use std::any::Any;

use crate::{ForceContinuation, TaskFailure};

/// A boxed, dynamically dispatched task.
pub type BoxedTask<C> = Box<dyn Task<C>>;

/// Upcast helper used for task-defined equality and typed spine queries.
///
/// Implemented for every `'static` type, so task authors never write it.
pub trait AsAny: Any {
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Any> AsAny for T {
    #[inline]
    fn as_any(&self) -> &dyn Any {
        self
    }

    #[inline]
    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// A unit of recursive, interruptible work.
pub trait Task<C>: AsAny {
    /// Called once per activation, right before the first [`Task::on_tick`].
    fn on_start(&mut self, _ctx: &mut C, _control: &mut TaskControl) {}

    /// Performs one step of work.
    ///
    /// # Returns
    ///
    /// - `None` if this task does its own leaf work (or idles) this tick
    /// - `Some(task)` to delegate to a sub-task. If the candidate is equal to
    ///   the sub-task already held, the held one keeps running and the
    ///   candidate is dropped.
    fn on_tick(&mut self, ctx: &mut C, control: &mut TaskControl) -> Option<BoxedTask<C>>;

    /// Called once per activation when the task is stopped or interrupted.
    ///
    /// `interrupting` is the task that replaced this one, or `None` if the
    /// task was stopped cleanly.
    fn on_stop(&mut self, _ctx: &mut C, _interrupting: Option<&dyn Task<C>>) {}

    /// Whether the task has nothing left to do. Must not have side effects.
    fn is_finished(&self, _ctx: &C) -> bool {
        false
    }

    /// Whether `other` describes the same unit of work as `self`.
    ///
    /// Typically implemented with `other.downcast_ref::<Self>()` and a
    /// comparison of the task's goal (target position, item, ...).
    fn is_equal(&self, other: &dyn Task<C>) -> bool;

    /// Short human-readable label, e.g. `"Goto (4, 2)"`.
    fn debug_label(&self) -> String;

    /// Capability query for the interruption veto.
    fn force_continuation(&self) -> Option<&dyn ForceContinuation<C>> {
        None
    }
}

impl<C: 'static> dyn Task<C> {
    /// Returns `true` if the concrete task type is `T`.
    #[inline]
    pub fn is<T: Task<C>>(&self) -> bool {
        self.as_any().is::<T>()
    }

    /// Downcasts to the concrete task type `T`.
    #[inline]
    pub fn downcast_ref<T: Task<C>>(&self) -> Option<&T> {
        self.as_any().downcast_ref::<T>()
    }
}

/// Per-node control surface handed to [`Task::on_start`] and [`Task::on_tick`].
///
/// Holds the node's debug state and collects failure requests. A failure
/// requested through [`TaskControl::fail`] stops the node as soon as the hook
/// returns; any sub-task candidate returned alongside it is discarded.
#[derive(Debug, Default)]
pub struct TaskControl {
    debug_state: String,
    failure: Option<String>,
    child_failure: Option<TaskFailure>,
}

impl TaskControl {
    /// Sets the free-form status shown next to the task label.
    pub fn set_debug_state(&mut self, state: impl Into<String>) {
        self.debug_state = state.into();
    }

    /// The current free-form status.
    pub fn debug_state(&self) -> &str {
        &self.debug_state
    }

    /// Requests that this task fail with the given reason.
    pub fn fail(&mut self, reason: impl Into<String>) {
        self.failure = Some(reason.into());
    }

    /// Returns the failure of the sub-task dropped since the previous tick.
    pub fn take_child_failure(&mut self) -> Option<TaskFailure> {
        self.child_failure.take()
    }

    pub(crate) fn take_failure(&mut self) -> Option<String> {
        self.failure.take()
    }

    pub(crate) fn record_child_failure(&mut self, failure: TaskFailure) {
        self.child_failure = Some(failure);
    }
}
