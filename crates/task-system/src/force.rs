//! Interruption veto capability.

use crate::Task;

/// Lets a task refuse to be interrupted for the current tick.
///
/// Tasks opt in by returning `Some(self)` from
/// [`Task::force_continuation`]. When a parent wants to replace or drop its
/// sub-task, every node on the held spine is asked; a single veto rejects the
/// whole replacement for that tick and the held sub-task keeps running.
///
/// Intended for short, unsafe-to-abort micro-actions (a step already in
/// flight, a swing mid-animation). A task that always vetoes can never be
/// replaced by its parent.
pub trait ForceContinuation<C> {
    /// Returns `true` to keep running instead of yielding to `candidate`.
    ///
    /// `candidate` is `None` when the parent no longer wants any sub-task.
    fn should_force(&self, ctx: &C, candidate: Option<&dyn Task<C>>) -> bool;
}
