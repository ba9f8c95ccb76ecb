//! High-level agent facade.
//!
//! The agent owns the world state and the task runner with its built-in
//! chains, and exposes a builder-based API for hosts to drive it one tick at
//! a time.

use task_system::{ChainId, StatusReport, StatusSink, Task, TaskChain, TaskOutcome, TaskRunner};
use tracing::info;

use crate::chains::{FoodChain, MobDefenseChain, UnstuckChain, UserTaskChain, WorldSurvivalChain};
use crate::error::{Result, RuntimeError};
use crate::tasks::{EatFoodTask, TimeoutWanderTask};
use crate::{AgentConfig, AgentState, StatusLineSink};

/// A simulated agent: world state plus the chains competing to act on it.
pub struct Agent {
    state: AgentState,
    runner: TaskRunner<AgentState>,
    config: AgentConfig,
    user_chain: Option<ChainId>,
}

impl Agent {
    /// Create a new agent builder
    pub fn builder() -> AgentBuilder {
        AgentBuilder::new()
    }

    /// Advances the world and the agent by one tick.
    pub fn tick(&mut self) {
        self.state.advance_world();
        self.runner.tick(&mut self.state);
    }

    /// Runs `task` on the user chain, replacing any different user task.
    ///
    /// Re-enables the runner if the agent was stopped.
    pub fn run_user_task(&mut self, task: impl Task<AgentState>) -> Result<bool> {
        let chain = self.user_chain_id()?;
        let Self { state, runner, .. } = self;
        let replaced = chain_of(runner, chain)?.run_task(state, task);
        runner.enable();
        Ok(replaced)
    }

    /// Like [`Agent::run_user_task`], calling `on_finish` with the outcome.
    pub fn run_user_task_then(
        &mut self,
        task: impl Task<AgentState>,
        on_finish: impl FnOnce(&TaskOutcome) + 'static,
    ) -> Result<bool> {
        let chain = self.user_chain_id()?;
        let Self { state, runner, .. } = self;
        let replaced = chain_of(runner, chain)?.run_task_then(state, task, on_finish);
        runner.enable();
        Ok(replaced)
    }

    /// Cancels the running user task. Returns `false` if there was none.
    pub fn cancel_user_task(&mut self) -> Result<bool> {
        let chain = self.user_chain_id()?;
        let Self { state, runner, .. } = self;
        Ok(chain_of(runner, chain)?.cancel(state))
    }

    /// Cancels the user task and halts all chains until the next user task.
    pub fn stop(&mut self) {
        if let Some(chain) = self.user_chain
            && let Ok(user) = chain_of(&mut self.runner, chain)
        {
            user.cancel(&mut self.state);
        }
        self.runner.stop_current(&mut self.state);
        self.runner.disable(&mut self.state);
        info!(tick = self.state.tick, "agent stopped");
    }

    pub fn is_stopped(&self) -> bool {
        !self.runner.is_enabled()
    }

    pub fn status_report(&self) -> StatusReport {
        self.runner.status_report()
    }

    /// One-line rendering of [`Agent::status_report`].
    pub fn status_line(&self) -> String {
        self.status_report().to_string()
    }

    pub fn current_chain_name(&self) -> Option<&str> {
        self.runner.current_chain_name()
    }

    /// Whether the agent is wandering off after getting stuck.
    pub fn is_unsticking(&self) -> bool {
        self.active_tree_contains::<TimeoutWanderTask>()
    }

    pub fn is_eating(&self) -> bool {
        self.active_tree_contains::<EatFoodTask>()
    }

    /// Whether a task of type `T` is on the spine of the chain in control.
    pub fn active_tree_contains<T: Task<AgentState>>(&self) -> bool {
        self.runner
            .current_chain()
            .and_then(|chain| chain.root())
            .is_some_and(|root| root.is_active() && root.this_or_child_is::<T>())
    }

    pub fn user_chain(&self) -> Option<&UserTaskChain> {
        self.runner.chain::<UserTaskChain>()
    }

    pub fn state(&self) -> &AgentState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut AgentState {
        &mut self.state
    }

    pub fn config(&self) -> &AgentConfig {
        &self.config
    }

    pub fn runner(&self) -> &TaskRunner<AgentState> {
        &self.runner
    }

    fn user_chain_id(&self) -> Result<ChainId> {
        self.user_chain.ok_or(RuntimeError::ChainNotRegistered {
            name: UserTaskChain::NAME,
        })
    }
}

fn chain_of(runner: &mut TaskRunner<AgentState>, id: ChainId) -> Result<&mut UserTaskChain> {
    runner
        .chain_by_id_mut(id)
        .and_then(|chain| chain.downcast_mut::<UserTaskChain>())
        .ok_or(RuntimeError::ChainNotRegistered {
            name: UserTaskChain::NAME,
        })
}

/// Builder for [`Agent`].
///
/// By default every built-in chain is registered, in priority order:
/// survival, defense, unstuck, food, user tasks.
pub struct AgentBuilder {
    config: AgentConfig,
    state: Option<AgentState>,
    sink: Option<Box<dyn StatusSink>>,
    extra_chains: Vec<Box<dyn TaskChain<AgentState>>>,
    builtin_chains: bool,
}

impl AgentBuilder {
    fn new() -> Self {
        Self {
            config: AgentConfig::default(),
            state: None,
            sink: None,
            extra_chains: Vec::new(),
            builtin_chains: true,
        }
    }

    /// Override agent configuration
    pub fn config(mut self, config: AgentConfig) -> Self {
        self.config = config;
        self
    }

    /// Provide initial world state
    pub fn initial_state(mut self, state: AgentState) -> Self {
        self.state = Some(state);
        self
    }

    /// Replace the default [`StatusLineSink`].
    pub fn status_sink(mut self, sink: impl StatusSink + 'static) -> Self {
        self.sink = Some(Box::new(sink));
        self
    }

    /// Register an additional chain after the built-in ones.
    pub fn add_chain(mut self, chain: impl TaskChain<AgentState>) -> Self {
        self.extra_chains.push(Box::new(chain));
        self
    }

    /// Skip the built-in chains; only chains added with
    /// [`AgentBuilder::add_chain`] are registered.
    pub fn without_builtin_chains(mut self) -> Self {
        self.builtin_chains = false;
        self
    }

    pub fn build(self) -> Result<Agent> {
        self.config.validate()?;

        let sink: Box<dyn StatusSink> = match self.sink {
            Some(sink) => sink,
            None => Box::new(StatusLineSink::new(self.config.show_task_chain)),
        };
        let mut runner = TaskRunner::with_sink(sink);

        let mut user_chain = None;
        if self.builtin_chains {
            runner.register(WorldSurvivalChain::new());
            runner.register(MobDefenseChain::new(self.config.defense_radius));
            runner.register(UnstuckChain::new(self.config.stuck_ticks));
            runner.register(FoodChain::new(self.config.hunger_threshold));
            user_chain = Some(runner.register(UserTaskChain::new(self.config.idle_when_inactive)));
        }
        for chain in self.extra_chains {
            runner.register_boxed(chain);
        }

        let mut state = self.state.unwrap_or_default();
        state.rules = self.config.world;

        info!(chains = runner.len(), "agent built");
        Ok(Agent {
            state,
            runner,
            config: self.config,
            user_chain,
        })
    }
}
