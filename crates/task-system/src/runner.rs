//! Per-tick chain arbitration.
//!
//! The [`TaskRunner`] is the entry point called once per simulation frame. It
//! scores every registered chain, hands control to the most urgent relevant
//! one and ticks only that chain's task tree.
//!
//! # Selection
//!
//! - Chains that are not relevant are skipped (a `NaN` priority counts as not
//!   relevant)
//! - The highest priority wins; ties go to the chain registered first
//! - If no chain is relevant the tick is a no-op and the agent idles
//!
//! # Hand-over
//!
//! When the selected chain differs from the one holding control, the previous
//! holder is interrupted (its tree is stopped down to the leaf) before the new
//! chain is ticked, so at most one chain affects the world per tick.

use tracing::{debug, info};

use crate::{StatusReport, StatusSink, TaskChain, TaskTrace, TracingSink};

/// Handle to a registered chain, in registration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChainId(pub usize);

/// Chain arbiter driving one agent.
pub struct TaskRunner<C: 'static> {
    chains: Vec<Box<dyn TaskChain<C>>>,
    current: Option<usize>,
    enabled: bool,
    trace: TaskTrace,
    sink: Box<dyn StatusSink>,
}

impl<C: 'static> TaskRunner<C> {
    /// Creates an enabled runner reporting to [`TracingSink`].
    pub fn new() -> Self {
        Self::with_sink(TracingSink)
    }

    /// Creates an enabled runner reporting to `sink`.
    pub fn with_sink(sink: impl StatusSink + 'static) -> Self {
        Self {
            chains: Vec::new(),
            current: None,
            enabled: true,
            trace: TaskTrace::new(),
            sink: Box::new(sink),
        }
    }

    /// Registers a chain. Registration order breaks priority ties.
    pub fn register(&mut self, chain: impl TaskChain<C>) -> ChainId {
        self.register_boxed(Box::new(chain))
    }

    /// Like [`TaskRunner::register`] for an already boxed chain.
    pub fn register_boxed(&mut self, chain: Box<dyn TaskChain<C>>) -> ChainId {
        debug!(chain = chain.name(), index = self.chains.len(), "chain registered");
        self.chains.push(chain);
        ChainId(self.chains.len() - 1)
    }

    /// Advances the agent by one frame.
    pub fn tick(&mut self, ctx: &mut C) {
        if !self.enabled {
            return;
        }

        let selected = self.select(ctx);
        if selected != self.current {
            self.hand_over(ctx, selected);
        }

        self.trace.clear();
        if let Some(index) = selected {
            self.chains[index].tick(ctx, &mut self.trace);
        }

        for change in self.trace.changes() {
            self.sink.state_changed(change);
        }
        let report = self.status_report();
        self.sink.tick_finished(&report);
    }

    /// Index of the chain that should hold control this tick.
    fn select(&self, ctx: &C) -> Option<usize> {
        let mut best: Option<(usize, f32)> = None;
        for (index, chain) in self.chains.iter().enumerate() {
            if !chain.is_relevant(ctx) {
                continue;
            }
            let priority = chain.priority(ctx);
            if priority.is_nan() {
                continue;
            }
            // Strictly greater: earlier registrations win ties
            if best.is_none_or(|(_, top)| priority > top) {
                best = Some((index, priority));
            }
        }
        best.map(|(index, _)| index)
    }

    fn hand_over(&mut self, ctx: &mut C, selected: Option<usize>) {
        let next = selected.map(|index| self.chains[index].name().to_owned());
        let previous = self.current.take().map(|index| {
            let chain = &mut self.chains[index];
            chain.on_interrupt(ctx, next.as_deref());
            chain.name().to_owned()
        });

        self.sink.chain_changed(previous.as_deref(), next.as_deref());
        self.current = selected;
    }

    /// Re-enables ticking after [`TaskRunner::disable`].
    pub fn enable(&mut self) {
        if !self.enabled {
            info!("task runner enabled");
        }
        self.enabled = true;
    }

    /// Stops every chain and turns [`TaskRunner::tick`] into a no-op.
    pub fn disable(&mut self, ctx: &mut C) {
        for chain in &mut self.chains {
            chain.stop(ctx);
        }
        if self.current.is_some() {
            self.hand_over(ctx, None);
        }
        self.trace.clear();
        if self.enabled {
            info!("task runner disabled");
        }
        self.enabled = false;
    }

    /// `false` between [`TaskRunner::disable`] and [`TaskRunner::enable`].
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Stops the tree of the chain holding control.
    ///
    /// The chain keeps its root, so it restarts from `on_start` if it is
    /// selected again.
    pub fn stop_current(&mut self, ctx: &mut C) {
        if let Some(index) = self.current {
            self.chains[index].stop(ctx);
            self.hand_over(ctx, None);
            self.trace.clear();
        }
    }

    /// The chain holding control, `None` when idle or disabled.
    pub fn current_chain(&self) -> Option<&dyn TaskChain<C>> {
        self.current.map(|index| self.chains[index].as_ref())
    }

    /// Handle of the chain holding control.
    pub fn current_chain_id(&self) -> Option<ChainId> {
        self.current.map(ChainId)
    }

    /// Name of the chain holding control.
    pub fn current_chain_name(&self) -> Option<&str> {
        self.current_chain().map(|chain| chain.name())
    }

    /// Labels of the tasks ticked in the last frame, root first.
    pub fn active_spine(&self) -> &[String] {
        self.trace.spine()
    }

    /// Snapshot of the last tick: chain name, active spine, enabled flag.
    pub fn status_report(&self) -> StatusReport {
        StatusReport {
            chain: self.current_chain_name().map(str::to_owned),
            spine: self.trace.spine().to_vec(),
            enabled: self.enabled,
        }
    }

    /// The chain registered under `id`.
    pub fn chain_by_id(&self, id: ChainId) -> Option<&dyn TaskChain<C>> {
        self.chains.get(id.0).map(|chain| chain.as_ref())
    }

    /// Mutable access to the chain registered under `id`.
    pub fn chain_by_id_mut(&mut self, id: ChainId) -> Option<&mut dyn TaskChain<C>> {
        match self.chains.get_mut(id.0) {
            Some(chain) => Some(chain.as_mut()),
            None => None,
        }
    }

    /// First registered chain of concrete type `T`.
    pub fn chain<T: TaskChain<C>>(&self) -> Option<&T> {
        self.chains.iter().find_map(|chain| chain.downcast_ref::<T>())
    }

    /// Mutable access to the first registered chain of type `T`.
    pub fn chain_mut<T: TaskChain<C>>(&mut self) -> Option<&mut T> {
        self.chains
            .iter_mut()
            .find_map(|chain| chain.downcast_mut::<T>())
    }

    /// All chains in registration order.
    pub fn chains(&self) -> impl Iterator<Item = &dyn TaskChain<C>> {
        self.chains.iter().map(|chain| chain.as_ref())
    }

    /// Number of registered chains.
    pub fn len(&self) -> usize {
        self.chains.len()
    }

    /// Returns `true` if no chain is registered.
    pub fn is_empty(&self) -> bool {
        self.chains.is_empty()
    }
}

impl<C: 'static> Default for TaskRunner<C> {
    fn default() -> Self {
        Self::new()
    }
}
