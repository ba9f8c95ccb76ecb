use task_system::{BoxedTask, Task, TaskControl};

use super::GotoTask;
use crate::AgentState;

/// Approaches a mob and attacks it until it is gone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KillMobTask {
    mob: u32,
}

impl KillMobTask {
    pub fn new(mob: u32) -> Self {
        Self { mob }
    }

    pub fn mob(&self) -> u32 {
        self.mob
    }
}

impl Task<AgentState> for KillMobTask {
    fn on_tick(
        &mut self,
        state: &mut AgentState,
        control: &mut TaskControl,
    ) -> Option<BoxedTask<AgentState>> {
        let mob = *state.mob(self.mob)?;
        if state.position.distance(mob.position) <= 1 {
            control.set_debug_state(format!("attacking ({} hp)", mob.health));
            state.attack(self.mob);
            return None;
        }
        control.set_debug_state("approaching");
        Some(Box::new(GotoTask::within(mob.position, 1)))
    }

    fn is_finished(&self, state: &AgentState) -> bool {
        state.mob(self.mob).is_none()
    }

    fn is_equal(&self, other: &dyn Task<AgentState>) -> bool {
        other
            .downcast_ref::<KillMobTask>()
            .is_some_and(|other| other.mob == self.mob)
    }

    fn debug_label(&self) -> String {
        format!("Kill mob {}", self.mob)
    }
}
