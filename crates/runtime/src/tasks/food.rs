use task_system::{BoxedTask, Task, TaskControl};

use crate::{AgentState, Item};

/// Ticks spent chewing before a bite lands.
pub const EAT_TICKS: u32 = 3;

/// Eats carried food until hunger is gone.
///
/// Food is protected from other uses while the task runs.
#[derive(Debug, Clone, Default)]
pub struct EatFoodTask {
    chewing: u32,
}

impl EatFoodTask {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Task<AgentState> for EatFoodTask {
    fn on_start(&mut self, state: &mut AgentState, _control: &mut TaskControl) {
        self.chewing = 0;
        state.behaviour.push(self.debug_label());
        state.behaviour.add_protected_items(Item::FOOD);
    }

    fn on_tick(
        &mut self,
        state: &mut AgentState,
        control: &mut TaskControl,
    ) -> Option<BoxedTask<AgentState>> {
        let Some(food) = state.best_food() else {
            control.fail("no food");
            return None;
        };
        self.chewing += 1;
        control.set_debug_state(format!("chewing {food}"));
        if self.chewing >= EAT_TICKS {
            self.chewing = 0;
            state.eat(food);
        }
        None
    }

    fn on_stop(&mut self, state: &mut AgentState, _interrupting: Option<&dyn Task<AgentState>>) {
        state.behaviour.pop();
    }

    fn is_finished(&self, state: &AgentState) -> bool {
        state.hunger == 0
    }

    fn is_equal(&self, other: &dyn Task<AgentState>) -> bool {
        other.is::<EatFoodTask>()
    }

    fn debug_label(&self) -> String {
        "Eat food".to_string()
    }
}
