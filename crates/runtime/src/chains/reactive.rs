//! Chains that react to world conditions.
//!
//! Each chain installs its task from [`TaskChain::tick`] when its trigger
//! holds and stays relevant while the task runs, so an interrupted task
//! resumes once the chain regains control.

use task_system::{SingleTaskChain, TaskChain, TaskNode, TaskTrace};

use crate::AgentState;
use crate::tasks::{EatFoodTask, GotoTask, KillMobTask, TimeoutWanderTask};

/// Ticks the unstuck chain wanders before handing control back.
pub const UNSTUCK_WANDER_TICKS: u32 = 6;

macro_rules! delegate_root {
    () => {
        fn root(&self) -> Option<&TaskNode<AgentState>> {
            self.inner.root()
        }

        fn root_mut(&mut self) -> Option<&mut TaskNode<AgentState>> {
            self.inner.root_mut()
        }
    };
}

/// Leaves hazardous ground.
pub struct WorldSurvivalChain {
    inner: SingleTaskChain<AgentState>,
}

impl WorldSurvivalChain {
    pub const NAME: &'static str = "World Survival";
    pub const PRIORITY: f32 = 100.0;

    pub fn new() -> Self {
        Self {
            inner: SingleTaskChain::new(Self::NAME, Self::PRIORITY),
        }
    }
}

impl Default for WorldSurvivalChain {
    fn default() -> Self {
        Self::new()
    }
}

impl TaskChain<AgentState> for WorldSurvivalChain {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn is_relevant(&self, state: &AgentState) -> bool {
        self.inner.has_task() || state.on_hazard()
    }

    fn priority(&self, _state: &AgentState) -> f32 {
        Self::PRIORITY
    }

    delegate_root!();

    fn tick(&mut self, state: &mut AgentState, trace: &mut TaskTrace) {
        if !self.inner.has_task() && state.on_hazard() {
            let safe = state.nearest_safe();
            self.inner.run_task(state, GotoTask::new(safe));
        }
        self.inner.tick(state, trace);
    }
}

/// Fights the nearest mob within a radius.
pub struct MobDefenseChain {
    inner: SingleTaskChain<AgentState>,
    radius: u32,
}

impl MobDefenseChain {
    pub const NAME: &'static str = "Mob Defense";
    pub const PRIORITY: f32 = 65.0;

    pub fn new(radius: u32) -> Self {
        Self {
            inner: SingleTaskChain::new(Self::NAME, Self::PRIORITY),
            radius,
        }
    }
}

impl TaskChain<AgentState> for MobDefenseChain {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn is_relevant(&self, state: &AgentState) -> bool {
        state.nearest_mob_within(self.radius).is_some()
    }

    fn priority(&self, _state: &AgentState) -> f32 {
        Self::PRIORITY
    }

    delegate_root!();

    fn tick(&mut self, state: &mut AgentState, trace: &mut TaskTrace) {
        if let Some(mob) = state.nearest_mob_within(self.radius).map(|mob| mob.id) {
            // Keeps the current fight when the nearest mob did not change
            self.inner.run_task(state, KillMobTask::new(mob));
        }
        self.inner.tick(state, trace);
    }
}

/// Wanders off after repeated blocked moves.
pub struct UnstuckChain {
    inner: SingleTaskChain<AgentState>,
    threshold: u32,
}

impl UnstuckChain {
    pub const NAME: &'static str = "Unstuck";
    pub const PRIORITY: f32 = 60.0;

    pub fn new(threshold: u32) -> Self {
        Self {
            inner: SingleTaskChain::new(Self::NAME, Self::PRIORITY),
            threshold,
        }
    }

    fn is_stuck(&self, state: &AgentState) -> bool {
        state.stuck_ticks >= self.threshold
    }
}

impl TaskChain<AgentState> for UnstuckChain {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn is_relevant(&self, state: &AgentState) -> bool {
        self.inner.has_task() || self.is_stuck(state)
    }

    fn priority(&self, _state: &AgentState) -> f32 {
        Self::PRIORITY
    }

    delegate_root!();

    fn tick(&mut self, state: &mut AgentState, trace: &mut TaskTrace) {
        if !self.inner.has_task() && self.is_stuck(state) {
            self.inner
                .run_task(state, TimeoutWanderTask::new(UNSTUCK_WANDER_TICKS));
        }
        self.inner.tick(state, trace);
    }
}

/// Eats when hunger crosses a threshold and food is carried.
pub struct FoodChain {
    inner: SingleTaskChain<AgentState>,
    threshold: u32,
}

impl FoodChain {
    pub const NAME: &'static str = "Food";
    pub const PRIORITY: f32 = 55.0;

    pub fn new(threshold: u32) -> Self {
        Self {
            inner: SingleTaskChain::new(Self::NAME, Self::PRIORITY),
            threshold,
        }
    }

    fn wants_to_eat(&self, state: &AgentState) -> bool {
        state.hunger >= self.threshold && state.food_count() > 0
    }
}

impl TaskChain<AgentState> for FoodChain {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn is_relevant(&self, state: &AgentState) -> bool {
        self.inner.has_task() || self.wants_to_eat(state)
    }

    fn priority(&self, _state: &AgentState) -> f32 {
        Self::PRIORITY
    }

    delegate_root!();

    fn tick(&mut self, state: &mut AgentState, trace: &mut TaskTrace) {
        if !self.inner.has_task() && self.wants_to_eat(state) {
            self.inner.run_task(state, EatFoodTask::new());
        }
        self.inner.tick(state, trace);
    }
}
