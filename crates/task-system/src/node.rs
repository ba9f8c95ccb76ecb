//! Lifecycle wrapper around a [`Task`].
//!
//! A [`TaskNode`] owns one task plus, at most, one sub-task node. It enforces
//! the lifecycle contract that task authors rely on:
//!
//! - `on_start` runs exactly once per activation, right before the first tick
//! - `on_stop` runs exactly once per activation, and only if `on_start` ran
//! - a sub-task is always stopped before it is replaced or dropped
//! - an equal sub-task is never replaced (its progress survives)

use std::fmt;

use tracing::{debug, trace, warn};

use crate::{BoxedTask, Task, TaskControl, TaskFailure, TaskTrace};

/// A task together with its lifecycle state and its single owned sub-task.
pub struct TaskNode<C> {
    task: BoxedTask<C>,
    control: TaskControl,
    previous_debug_state: String,
    sub: Option<Box<TaskNode<C>>>,
    /// `on_start` has not run yet for the current activation.
    first: bool,
    /// Latched by `stop`, cleared by the next `on_start`.
    stopped: bool,
    active: bool,
    failure: Option<String>,
}

impl<C: 'static> TaskNode<C> {
    /// Wraps `task` in a node that has not started yet.
    pub fn new(task: impl Task<C>) -> Self {
        Self::from_boxed(Box::new(task))
    }

    /// Like [`TaskNode::new`] for an already boxed task.
    pub fn from_boxed(task: BoxedTask<C>) -> Self {
        Self {
            task,
            control: TaskControl::default(),
            previous_debug_state: String::new(),
            sub: None,
            first: true,
            stopped: false,
            active: false,
            failure: None,
        }
    }

    /// The task this node drives.
    pub fn task(&self) -> &dyn Task<C> {
        self.task.as_ref()
    }

    /// Mutable access to the task this node drives.
    pub fn task_mut(&mut self) -> &mut dyn Task<C> {
        self.task.as_mut()
    }

    /// The currently held sub-task, if any.
    pub fn sub_task(&self) -> Option<&TaskNode<C>> {
        self.sub.as_deref()
    }

    /// `on_start` ran without a terminal `stop` since.
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// `stop` ran since the last `on_start`.
    pub fn is_stopped(&self) -> bool {
        self.stopped
    }

    /// Forwards [`Task::is_finished`].
    pub fn is_finished(&self, ctx: &C) -> bool {
        self.task.is_finished(ctx)
    }

    /// Whether `other` is the same unit of work as this node's task.
    pub fn is_equal_to(&self, other: &dyn Task<C>) -> bool {
        self.task.is_equal(other)
    }

    /// Free-form status last set by the task.
    pub fn debug_state(&self) -> &str {
        self.control.debug_state()
    }

    /// Reason of the last failure, latched until the node starts again.
    pub fn failure(&self) -> Option<&str> {
        self.failure.as_deref()
    }

    /// The latched failure together with this task's label.
    pub fn failure_report(&self) -> Option<TaskFailure> {
        self.failure.as_ref().map(|reason| TaskFailure {
            task: self.task.debug_label(),
            reason: reason.clone(),
        })
    }

    /// `<label> debug_state`, as shown in the status overlay.
    pub fn label(&self) -> String {
        self.to_string()
    }

    /// Advances this node and, recursively, its held sub-task by one tick.
    pub fn tick(&mut self, ctx: &mut C, trace: &mut TaskTrace) {
        let slot = trace.enter(self.label());

        if self.first {
            debug!(task = %self, "task start");
            self.active = true;
            self.failure = None;
            // Failures of sub-tasks from a previous activation are stale
            self.control.take_child_failure();
            self.task.on_start(ctx, &mut self.control);
            self.first = false;
            self.stopped = false;
            if let Some(reason) = self.control.take_failure() {
                self.fail(ctx, reason);
            }
        }
        if self.stopped {
            return;
        }

        let candidate = self.task.on_tick(ctx, &mut self.control);
        if let Some(reason) = self.control.take_failure() {
            self.fail(ctx, reason);
            trace.relabel(slot, self.label());
            return;
        }

        if self.control.debug_state() != self.previous_debug_state {
            debug!(task = %self, "task state");
            self.previous_debug_state = self.control.debug_state().to_owned();
            trace.state_changed(self.task.debug_label(), self.previous_debug_state.clone());
        }
        trace.relabel(slot, self.label());

        self.reconcile(ctx, candidate);

        if let Some(sub) = self.sub.as_deref_mut() {
            sub.tick(ctx, trace);
            if let Some(failure) = sub.failure_report() {
                self.sub = None;
                self.control.record_child_failure(failure);
            }
        }
    }

    /// Stops this node and its held spine.
    ///
    /// No-op if the node is not active. The next tick runs `on_start` again.
    pub fn stop(&mut self, ctx: &mut C, interrupting: Option<&dyn Task<C>>) {
        if !self.active {
            return;
        }
        debug!(
            task = %self,
            interrupted_by = ?interrupting.map(|task| task.debug_label()),
            "task stop"
        );
        if !self.first {
            self.task.on_stop(ctx, interrupting);
        }

        if let Some(mut sub) = self.sub.take() {
            sub.stop(ctx, interrupting);
        }

        self.first = true;
        self.active = false;
        self.stopped = true;
    }

    /// Suspends this node: runs `on_stop` down the spine but stays active.
    ///
    /// The held sub-task is kept, and the next tick re-runs `on_start` on
    /// every interrupted node.
    pub fn interrupt(&mut self, ctx: &mut C, interrupting: Option<&dyn Task<C>>) {
        if !self.active {
            return;
        }
        debug!(task = %self, "task interrupt");
        if !self.first {
            self.task.on_stop(ctx, interrupting);
        }

        if let Some(sub) = self.sub.as_deref_mut()
            && !sub.stopped
        {
            sub.interrupt(ctx, interrupting);
        }

        self.first = true;
    }

    /// Stops this node and latches `reason` as its failure.
    pub fn fail(&mut self, ctx: &mut C, reason: impl Into<String>) {
        let reason = reason.into();
        self.stop(ctx, None);
        warn!(task = %self, %reason, "task failed");
        self.failure = Some(reason);
    }

    /// Returns the node to its never-started state.
    ///
    /// Does not run `on_stop`; stop the node first if it is active.
    pub fn reset(&mut self) {
        self.first = true;
        self.active = false;
        self.stopped = false;
        self.failure = None;
    }

    /// Whether this task or any task on its held spine satisfies `pred`.
    pub fn this_or_child_satisfies(&self, mut pred: impl FnMut(&dyn Task<C>) -> bool) -> bool {
        self.spine().any(|node| pred(node.task()))
    }

    /// Whether a task of type `T` is on the held spine.
    pub fn this_or_child_is<T: Task<C>>(&self) -> bool {
        self.this_or_child_satisfies(|task| task.is::<T>())
    }

    /// Iterates this node and its held sub-tasks, root first.
    pub fn spine(&self) -> impl Iterator<Item = &TaskNode<C>> {
        std::iter::successors(Some(self), |&node| node.sub.as_deref())
    }

    fn reconcile(&mut self, ctx: &mut C, candidate: Option<BoxedTask<C>>) {
        match candidate {
            Some(candidate) => {
                if self
                    .sub
                    .as_deref()
                    .is_some_and(|sub| candidate.is_equal(sub.task()))
                {
                    return;
                }
                if !self.sub_can_be_replaced(ctx, Some(candidate.as_ref())) {
                    trace!(task = %self, candidate = %candidate.debug_label(), "sub-task forced");
                    return;
                }
                if let Some(mut previous) = self.sub.take() {
                    previous.stop(ctx, Some(candidate.as_ref()));
                }
                self.sub = Some(Box::new(TaskNode::from_boxed(candidate)));
            }
            None => {
                if self.sub.is_some() && self.sub_can_be_replaced(ctx, None) {
                    if let Some(mut previous) = self.sub.take() {
                        previous.stop(ctx, None);
                    }
                }
            }
        }
    }

    fn sub_can_be_replaced(&self, ctx: &C, candidate: Option<&dyn Task<C>>) -> bool {
        match self.sub.as_deref() {
            None => true,
            Some(sub) => !sub.this_or_child_satisfies(|task| {
                task.force_continuation()
                    .is_some_and(|force| force.should_force(ctx, candidate))
            }),
        }
    }
}

impl<C: 'static> fmt::Display for TaskNode<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{}> {}", self.task.debug_label(), self.control.debug_state())
    }
}

impl<C: 'static> fmt::Debug for TaskNode<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskNode")
            .field("task", &self.task.debug_label())
            .field("debug_state", &self.control.debug_state())
            .field("active", &self.active)
            .field("stopped", &self.stopped)
            .field("sub", &self.sub)
            .finish()
    }
}
