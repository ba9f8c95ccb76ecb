//! Movement tasks.
//!
//! Walking one tile takes [`STEP_TICKS`] ticks. A [`StepTask`] that has begun
//! a step vetoes its own interruption until the step lands, so a parent that
//! changes its mind about the next sub-task never leaves the agent between
//! tiles. The veto only covers that reconciliation: a chain that replaces or
//! cancels its root, or loses control, stops a step in flight.

use task_system::{BoxedTask, ForceContinuation, Task, TaskControl};
use tracing::debug;

use crate::{AgentState, CardinalDirection, Position};

/// Ticks needed to cross one tile.
pub const STEP_TICKS: u32 = 2;

/// Blocked steps a [`GotoTask`] tolerates before giving up.
pub const MAX_BLOCKED_STEPS: u32 = 3;

/// Single-tile step from a fixed position.
#[derive(Debug, Clone)]
pub struct StepTask {
    from: Position,
    direction: CardinalDirection,
    progress: u32,
    done: bool,
}

impl StepTask {
    pub fn new(from: Position, direction: CardinalDirection) -> Self {
        Self {
            from,
            direction,
            progress: 0,
            done: false,
        }
    }

    pub fn direction(&self) -> CardinalDirection {
        self.direction
    }

    /// Whether the step has begun and not yet landed.
    pub fn is_mid_step(&self) -> bool {
        self.progress > 0 && !self.done
    }
}

impl Task<AgentState> for StepTask {
    fn on_start(&mut self, _state: &mut AgentState, _control: &mut TaskControl) {
        self.progress = 0;
        self.done = false;
    }

    fn on_tick(
        &mut self,
        state: &mut AgentState,
        control: &mut TaskControl,
    ) -> Option<BoxedTask<AgentState>> {
        if self.done {
            return None;
        }
        self.progress += 1;
        control.set_debug_state(format!("{}/{}", self.progress, STEP_TICKS));
        if self.progress >= STEP_TICKS {
            if state.try_move(self.direction) {
                self.done = true;
            } else {
                control.fail("path blocked");
            }
        }
        None
    }

    fn is_finished(&self, _state: &AgentState) -> bool {
        self.done
    }

    fn is_equal(&self, other: &dyn Task<AgentState>) -> bool {
        other
            .downcast_ref::<StepTask>()
            .is_some_and(|other| other.from == self.from && other.direction == self.direction)
    }

    fn debug_label(&self) -> String {
        format!("Step {}", self.direction)
    }

    fn force_continuation(&self) -> Option<&dyn ForceContinuation<AgentState>> {
        Some(self)
    }
}

impl ForceContinuation<AgentState> for StepTask {
    fn should_force(&self, _state: &AgentState, _candidate: Option<&dyn Task<AgentState>>) -> bool {
        self.is_mid_step()
    }
}

/// Walks to within `range` tiles of `target`.
///
/// A blocked step is answered with a sidestep clockwise of the blocked
/// direction. After [`MAX_BLOCKED_STEPS`] blocked steps the task fails.
#[derive(Debug, Clone)]
pub struct GotoTask {
    target: Position,
    range: u32,
    blocked_steps: u32,
    /// Sidestep to take while still standing at the given position.
    detour: Option<(Position, CardinalDirection)>,
}

impl GotoTask {
    pub fn new(target: Position) -> Self {
        Self::within(target, 0)
    }

    pub fn within(target: Position, range: u32) -> Self {
        Self {
            target,
            range,
            blocked_steps: 0,
            detour: None,
        }
    }

    pub fn target(&self) -> Position {
        self.target
    }
}

impl Task<AgentState> for GotoTask {
    fn on_start(&mut self, _state: &mut AgentState, _control: &mut TaskControl) {
        self.blocked_steps = 0;
        self.detour = None;
    }

    fn on_tick(
        &mut self,
        state: &mut AgentState,
        control: &mut TaskControl,
    ) -> Option<BoxedTask<AgentState>> {
        if let Some(failure) = control.take_child_failure() {
            self.blocked_steps += 1;
            if self.blocked_steps >= MAX_BLOCKED_STEPS {
                control.fail(format!("cannot reach {}: {}", self.target, failure.reason));
                return None;
            }
            let blocked = match self.detour {
                Some((_, direction)) => direction,
                None => state.position.direction_towards(self.target)?,
            };
            debug!(at = %state.position, %blocked, attempt = self.blocked_steps, "sidestepping");
            self.detour = Some((state.position, blocked.clockwise()));
        }

        if state.position.distance(self.target) <= self.range {
            control.set_debug_state("arrived");
            return None;
        }

        if let Some((from, direction)) = self.detour {
            if from == state.position {
                control.set_debug_state("sidestepping");
                return Some(Box::new(StepTask::new(from, direction)));
            }
            self.detour = None;
        }

        let direction = state.position.direction_towards(self.target)?;
        control.set_debug_state(format!("{} left", state.position.distance(self.target)));
        Some(Box::new(StepTask::new(state.position, direction)))
    }

    fn is_finished(&self, state: &AgentState) -> bool {
        state.position.distance(self.target) <= self.range
    }

    fn is_equal(&self, other: &dyn Task<AgentState>) -> bool {
        other
            .downcast_ref::<GotoTask>()
            .is_some_and(|other| other.target == self.target && other.range == self.range)
    }

    fn debug_label(&self) -> String {
        if self.range == 0 {
            format!("Goto {}", self.target)
        } else {
            format!("Goto {} ~{}", self.target, self.range)
        }
    }
}

/// Wanders for a fixed number of ticks, turning clockwise when blocked.
#[derive(Debug, Clone)]
pub struct TimeoutWanderTask {
    duration: u32,
    elapsed: u32,
    heading: CardinalDirection,
}

impl TimeoutWanderTask {
    pub fn new(duration: u32) -> Self {
        Self {
            duration,
            elapsed: 0,
            heading: CardinalDirection::North,
        }
    }
}

impl Task<AgentState> for TimeoutWanderTask {
    fn on_start(&mut self, _state: &mut AgentState, _control: &mut TaskControl) {
        self.elapsed = 0;
    }

    fn on_tick(
        &mut self,
        state: &mut AgentState,
        control: &mut TaskControl,
    ) -> Option<BoxedTask<AgentState>> {
        self.elapsed += 1;
        control.set_debug_state(format!("{}/{}", self.elapsed, self.duration));
        if !state.try_move(self.heading) {
            self.heading = self.heading.clockwise();
        }
        None
    }

    fn is_finished(&self, _state: &AgentState) -> bool {
        self.elapsed >= self.duration
    }

    fn is_equal(&self, other: &dyn Task<AgentState>) -> bool {
        other
            .downcast_ref::<TimeoutWanderTask>()
            .is_some_and(|other| other.duration == self.duration)
    }

    fn debug_label(&self) -> String {
        format!("Wander {}t", self.duration)
    }
}
