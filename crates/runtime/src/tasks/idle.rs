use task_system::{BoxedTask, Task, TaskControl};

use crate::AgentState;

/// Does nothing, forever. Keeps the user chain occupied between commands.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdleTask;

impl Task<AgentState> for IdleTask {
    fn on_tick(
        &mut self,
        _state: &mut AgentState,
        control: &mut TaskControl,
    ) -> Option<BoxedTask<AgentState>> {
        control.set_debug_state("waiting");
        None
    }

    fn is_equal(&self, other: &dyn Task<AgentState>) -> bool {
        other.is::<IdleTask>()
    }

    fn debug_label(&self) -> String {
        "Idle".to_string()
    }
}
