use task_system::{
    BoxedTask, SingleTaskChain, Task, TaskChain, TaskNode, TaskOutcome, TaskTrace,
};
use tracing::info;

use crate::AgentState;
use crate::tasks::IdleTask;

/// Called once with the outcome of a user task.
pub type FinishCallback = Box<dyn FnOnce(&TaskOutcome)>;

/// Runs tasks requested by the user (or a host script).
///
/// When a task ends the finish callback fires and, if configured, an
/// [`IdleTask`] is queued so the chain keeps reporting a task.
pub struct UserTaskChain {
    inner: SingleTaskChain<AgentState>,
    on_finish: Option<FinishCallback>,
    started_at: u64,
    running_idle: bool,
    next_is_idle: bool,
    idle_when_inactive: bool,
}

impl UserTaskChain {
    pub const NAME: &'static str = "User Tasks";
    pub const PRIORITY: f32 = 50.0;

    pub fn new(idle_when_inactive: bool) -> Self {
        Self {
            inner: SingleTaskChain::new(Self::NAME, Self::PRIORITY),
            on_finish: None,
            started_at: 0,
            running_idle: false,
            next_is_idle: false,
            idle_when_inactive,
        }
    }

    pub fn run_task(&mut self, state: &mut AgentState, task: impl Task<AgentState>) -> bool {
        self.run_boxed(state, Box::new(task), None)
    }

    /// Runs `task` and calls `on_finish` once it finishes, fails or is
    /// cancelled.
    pub fn run_task_then(
        &mut self,
        state: &mut AgentState,
        task: impl Task<AgentState>,
        on_finish: impl FnOnce(&TaskOutcome) + 'static,
    ) -> bool {
        self.run_boxed(state, Box::new(task), Some(Box::new(on_finish)))
    }

    /// Installs `task` unless an equal task is already running.
    ///
    /// A replaced task reports [`TaskOutcome::Cancelled`] to its callback.
    /// When the running task is kept, `on_finish` is dropped without being
    /// called and `false` is returned.
    pub fn run_boxed(
        &mut self,
        state: &mut AgentState,
        task: BoxedTask<AgentState>,
        on_finish: Option<FinishCallback>,
    ) -> bool {
        let label = task.debug_label();
        if !self.inner.run_boxed(state, task) {
            return false;
        }
        let idle = std::mem::take(&mut self.next_is_idle);
        self.inner.take_outcome();
        if let Some(replaced) = self.on_finish.take() {
            replaced(&TaskOutcome::Cancelled);
        }
        if !idle {
            info!(task = %label, tick = state.tick, "user task started");
        }
        self.on_finish = on_finish;
        self.started_at = state.tick;
        self.running_idle = idle;
        true
    }

    /// Stops and drops the current task. Returns `false` if there was none.
    pub fn cancel(&mut self, state: &mut AgentState) -> bool {
        if !self.inner.cancel(state) {
            return false;
        }
        let outcome = self.inner.take_outcome().unwrap_or(TaskOutcome::Cancelled);
        self.complete(state, outcome);
        true
    }

    /// Marks the next task passed to [`UserTaskChain::run_task`] as an idle task.
    pub fn signal_next_task_is_idle(&mut self) {
        self.next_is_idle = true;
    }

    pub fn is_running_idle_task(&self) -> bool {
        self.running_idle && self.inner.has_task()
    }

    pub fn has_task(&self) -> bool {
        self.inner.has_task()
    }

    /// Label of the running user task, `None` when idle or empty.
    pub fn current_task_label(&self) -> Option<String> {
        if self.running_idle {
            return None;
        }
        self.inner.root().map(|root| root.task().debug_label())
    }

    fn complete(&mut self, state: &mut AgentState, outcome: TaskOutcome) {
        let ticks = state.tick.saturating_sub(self.started_at);
        if !self.running_idle {
            info!(ticks, ?outcome, "user task finished");
        }
        if let Some(callback) = self.on_finish.take() {
            callback(&outcome);
        }
        let queue_idle = self.idle_when_inactive
            && !self.running_idle
            && !matches!(outcome, TaskOutcome::Cancelled);
        self.running_idle = false;
        if queue_idle {
            self.signal_next_task_is_idle();
            self.run_task(state, IdleTask);
        }
    }
}

impl TaskChain<AgentState> for UserTaskChain {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn is_relevant(&self, state: &AgentState) -> bool {
        self.inner.is_relevant(state)
    }

    fn priority(&self, _state: &AgentState) -> f32 {
        Self::PRIORITY
    }

    fn root(&self) -> Option<&TaskNode<AgentState>> {
        self.inner.root()
    }

    fn root_mut(&mut self) -> Option<&mut TaskNode<AgentState>> {
        self.inner.root_mut()
    }

    fn tick(&mut self, state: &mut AgentState, trace: &mut TaskTrace) {
        self.inner.tick(state, trace);
        if let Some(outcome) = self.inner.take_outcome() {
            self.complete(state, outcome);
        }
    }
}
