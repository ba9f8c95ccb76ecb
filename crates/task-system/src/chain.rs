//! Top-level task chains.
//!
//! A chain is one top-level concern of the agent (survival, the user goal,
//! idling, ...). It owns an optional root [`TaskNode`] and tells the
//! [`TaskRunner`](crate::TaskRunner) whether it is relevant and how urgent it
//! is. Only the chain holding control is ticked.

use tracing::{debug, info};

use crate::{AsAny, BoxedTask, Task, TaskNode, TaskOutcome, TaskTrace};

/// Relevance predicate evaluated against the current context.
pub type Relevance<C> = Box<dyn Fn(&C) -> bool>;

/// Priority function evaluated against the current context.
pub type PriorityFn<C> = Box<dyn Fn(&C) -> f32>;

/// A named, prioritizable top-level concern.
pub trait TaskChain<C: 'static>: AsAny {
    /// Human-readable name shown in status reports.
    fn name(&self) -> &str;

    /// Whether this chain wants control right now. Must not have side effects.
    fn is_relevant(&self, ctx: &C) -> bool;

    /// Urgency of this chain; only consulted while it is relevant.
    fn priority(&self, ctx: &C) -> f32;

    /// The root task node, if the chain holds one.
    fn root(&self) -> Option<&TaskNode<C>>;

    /// Mutable access to the root task node.
    fn root_mut(&mut self) -> Option<&mut TaskNode<C>>;

    /// Ticks the root task. Called only while this chain holds control.
    fn tick(&mut self, ctx: &mut C, trace: &mut TaskTrace) {
        if let Some(root) = self.root_mut() {
            root.tick(ctx, trace);
        }
    }

    /// Control moved to `next` (`None` when no chain is relevant).
    fn on_interrupt(&mut self, ctx: &mut C, next: Option<&str>) {
        debug!(chain = self.name(), next = next.unwrap_or("(idle)"), "chain interrupted");
        self.stop(ctx);
    }

    /// Stops the root task and everything below it.
    fn stop(&mut self, ctx: &mut C) {
        if let Some(root) = self.root_mut() {
            root.stop(ctx, None);
        }
    }

    /// Whether the root task has started and not been stopped.
    fn is_active(&self) -> bool {
        self.root().is_some_and(TaskNode::is_active)
    }
}

impl<C: 'static> dyn TaskChain<C> {
    /// Downcasts to the concrete chain type `T`.
    #[inline]
    pub fn downcast_ref<T: TaskChain<C>>(&self) -> Option<&T> {
        self.as_any().downcast_ref::<T>()
    }

    #[inline]
    pub fn downcast_mut<T: TaskChain<C>>(&mut self) -> Option<&mut T> {
        self.as_any_mut().downcast_mut::<T>()
    }
}

/// A chain running one root task at a time.
///
/// The chain is relevant while it holds a task (and its relevance predicate
/// agrees). When the root finishes or fails the chain drops it and records a
/// [`TaskOutcome`], so it stops competing for control.
pub struct SingleTaskChain<C> {
    name: String,
    priority: PriorityFn<C>,
    relevance: Relevance<C>,
    main: Option<TaskNode<C>>,
    outcome: Option<TaskOutcome>,
}

impl<C: 'static> SingleTaskChain<C> {
    /// Creates a chain with a static priority.
    pub fn new(name: impl Into<String>, priority: f32) -> Self {
        Self {
            name: name.into(),
            priority: Box::new(move |_| priority),
            relevance: Box::new(|_| true),
            main: None,
            outcome: None,
        }
    }

    /// Replaces the static priority with one computed from the context.
    pub fn with_priority(mut self, priority: impl Fn(&C) -> f32 + 'static) -> Self {
        self.priority = Box::new(priority);
        self
    }

    /// Adds a relevance predicate on top of "has a task".
    pub fn with_relevance(mut self, relevance: impl Fn(&C) -> bool + 'static) -> Self {
        self.relevance = Box::new(relevance);
        self
    }

    /// Installs `task` as the root unless an equal task is already running.
    ///
    /// Returns `true` if the root was replaced. A replaced root is stopped
    /// with `task` as the interrupting reference.
    pub fn run_task(&mut self, ctx: &mut C, task: impl Task<C>) -> bool {
        self.run_boxed(ctx, Box::new(task))
    }

    /// Like [`SingleTaskChain::run_task`] for an already boxed task.
    pub fn run_boxed(&mut self, ctx: &mut C, task: BoxedTask<C>) -> bool {
        if self.main.as_ref().is_some_and(|main| task.is_equal(main.task())) {
            return false;
        }
        if let Some(mut previous) = self.main.take() {
            previous.stop(ctx, Some(task.as_ref()));
        }
        debug!(chain = %self.name, task = %task.debug_label(), "chain task set");
        self.outcome = None;
        self.main = Some(TaskNode::from_boxed(task));
        true
    }

    /// Stops and drops the root task. Returns `false` if there was none.
    pub fn cancel(&mut self, ctx: &mut C) -> bool {
        match self.main.take() {
            Some(mut main) => {
                main.stop(ctx, None);
                info!(chain = %self.name, task = %main, "chain task cancelled");
                self.outcome = Some(TaskOutcome::Cancelled);
                true
            }
            None => false,
        }
    }

    /// Returns `true` while a root task is installed.
    pub fn has_task(&self) -> bool {
        self.main.is_some()
    }

    /// How the last root task ended, if it ended since it was installed.
    pub fn outcome(&self) -> Option<&TaskOutcome> {
        self.outcome.as_ref()
    }

    /// Takes the recorded outcome, leaving `None`.
    pub fn take_outcome(&mut self) -> Option<TaskOutcome> {
        self.outcome.take()
    }

    fn finish(&mut self, outcome: TaskOutcome) {
        if let Some(main) = self.main.take() {
            info!(chain = %self.name, task = %main, ?outcome, "chain task ended");
        }
        self.outcome = Some(outcome);
    }
}

impl<C: 'static> TaskChain<C> for SingleTaskChain<C> {
    fn name(&self) -> &str {
        &self.name
    }

    fn is_relevant(&self, ctx: &C) -> bool {
        self.main.is_some() && (self.relevance)(ctx)
    }

    fn priority(&self, ctx: &C) -> f32 {
        (self.priority)(ctx)
    }

    fn root(&self) -> Option<&TaskNode<C>> {
        self.main.as_ref()
    }

    fn root_mut(&mut self) -> Option<&mut TaskNode<C>> {
        self.main.as_mut()
    }

    fn tick(&mut self, ctx: &mut C, trace: &mut TaskTrace) {
        let Some(main) = self.main.as_mut() else {
            return;
        };
        if let Some(failure) = main.failure_report() {
            self.finish(TaskOutcome::Failed(failure));
            return;
        }
        if main.is_finished(ctx) {
            main.stop(ctx, None);
            self.finish(TaskOutcome::Finished);
            return;
        }

        main.tick(ctx, trace);

        if let Some(failure) = main.failure_report() {
            self.finish(TaskOutcome::Failed(failure));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TaskControl;

    #[derive(Default)]
    struct TestContext {
        log: Vec<String>,
        progress: u32,
        goal: u32,
        broken: bool,
    }

    struct Count {
        goal: u32,
    }

    impl Task<TestContext> for Count {
        fn on_start(&mut self, ctx: &mut TestContext, _control: &mut TaskControl) {
            ctx.log.push(format!("start {}", self.goal));
        }

        fn on_tick(
            &mut self,
            ctx: &mut TestContext,
            control: &mut TaskControl,
        ) -> Option<BoxedTask<TestContext>> {
            if ctx.broken {
                control.fail("broken");
            }
            ctx.progress += 1;
            None
        }

        fn on_stop(&mut self, ctx: &mut TestContext, interrupting: Option<&dyn Task<TestContext>>) {
            let by = interrupting.map(|task| task.debug_label()).unwrap_or_default();
            ctx.log.push(format!("stop {} {}", self.goal, by).trim_end().to_string());
        }

        fn is_finished(&self, ctx: &TestContext) -> bool {
            ctx.progress >= self.goal.max(ctx.goal)
        }

        fn is_equal(&self, other: &dyn Task<TestContext>) -> bool {
            other
                .downcast_ref::<Count>()
                .is_some_and(|other| other.goal == self.goal)
        }

        fn debug_label(&self) -> String {
            format!("Count {}", self.goal)
        }
    }

    fn tick(chain: &mut SingleTaskChain<TestContext>, ctx: &mut TestContext) {
        let mut trace = TaskTrace::new();
        chain.tick(ctx, &mut trace);
    }

    #[test]
    fn chain_without_task_is_not_relevant() {
        let chain = SingleTaskChain::<TestContext>::new("user", 50.0);
        assert!(!chain.is_relevant(&TestContext::default()));
        assert_eq!(chain.priority(&TestContext::default()), 50.0);
    }

    #[test]
    fn run_task_keeps_equal_root() {
        let mut ctx = TestContext::default();
        let mut chain = SingleTaskChain::new("user", 50.0);

        assert!(chain.run_task(&mut ctx, Count { goal: 3 }));
        tick(&mut chain, &mut ctx);
        assert!(!chain.run_task(&mut ctx, Count { goal: 3 }));
        tick(&mut chain, &mut ctx);

        assert_eq!(ctx.log, vec!["start 3"]);
        assert_eq!(ctx.progress, 2);
    }

    #[test]
    fn run_task_replaces_different_root() {
        let mut ctx = TestContext::default();
        let mut chain = SingleTaskChain::new("user", 50.0);
        chain.run_task(&mut ctx, Count { goal: 3 });
        tick(&mut chain, &mut ctx);

        assert!(chain.run_task(&mut ctx, Count { goal: 9 }));
        tick(&mut chain, &mut ctx);

        assert_eq!(ctx.log, vec!["start 3", "stop 3 Count 9", "start 9"]);
    }

    #[test]
    fn finished_root_is_dropped() {
        let mut ctx = TestContext::default();
        let mut chain = SingleTaskChain::new("user", 50.0);
        chain.run_task(&mut ctx, Count { goal: 2 });

        for _ in 0..3 {
            tick(&mut chain, &mut ctx);
        }

        assert!(!chain.has_task());
        assert!(!chain.is_relevant(&ctx));
        assert_eq!(chain.take_outcome(), Some(TaskOutcome::Finished));
        assert_eq!(ctx.log, vec!["start 2", "stop 2"]);
    }

    #[test]
    fn failed_root_is_dropped_with_reason() {
        let mut ctx = TestContext {
            broken: true,
            ..Default::default()
        };
        let mut chain = SingleTaskChain::new("user", 50.0);
        chain.run_task(&mut ctx, Count { goal: 5 });

        tick(&mut chain, &mut ctx);

        assert!(!chain.has_task());
        match chain.outcome() {
            Some(TaskOutcome::Failed(failure)) => assert_eq!(failure.reason, "broken"),
            other => panic!("unexpected outcome {other:?}"),
        }
    }

    #[test]
    fn cancel_stops_root() {
        let mut ctx = TestContext::default();
        let mut chain = SingleTaskChain::new("user", 50.0);
        chain.run_task(&mut ctx, Count { goal: 5 });
        tick(&mut chain, &mut ctx);

        assert!(chain.cancel(&mut ctx));
        assert!(!chain.cancel(&mut ctx));

        assert_eq!(ctx.log, vec!["start 5", "stop 5"]);
        assert_eq!(chain.take_outcome(), Some(TaskOutcome::Cancelled));
    }

    #[test]
    fn relevance_predicate_gates_chain() {
        let mut ctx = TestContext::default();
        let mut chain = SingleTaskChain::new("food", 55.0)
            .with_relevance(|ctx: &TestContext| ctx.goal > 0)
            .with_priority(|ctx: &TestContext| ctx.goal as f32);
        chain.run_task(&mut ctx, Count { goal: 1 });

        assert!(!chain.is_relevant(&ctx));
        ctx.goal = 7;
        assert!(chain.is_relevant(&ctx));
        assert_eq!(chain.priority(&ctx), 7.0);
    }
}
