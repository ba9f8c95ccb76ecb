//! Scripted world events for the demo run.
//!
//! A user errand is interrupted by a mob showing up on the way, later a
//! hazard appears underfoot and hunger sets in, and a final errand has to
//! sidestep a wall.

use agent_runtime::tasks::GotoTask;
use agent_runtime::{Agent, AgentState, Item, Position};
use anyhow::Result;
use task_system::TaskOutcome;
use tracing::info;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ScriptEvent {
    /// Sends the agent to a position through the user chain.
    UserGoto(Position),
    /// Spawns a mob relative to the agent.
    SpawnMob {
        id: u32,
        offset: (i32, i32),
        health: u32,
    },
    /// Turns the agent's tile and its neighbours into hazards.
    HazardUnderfoot,
    Hunger(u32),
    Wall(Vec<Position>),
}

/// Events keyed by the world tick they fire on, in ascending order.
#[derive(Clone, Debug)]
pub struct Scenario {
    events: Vec<(u64, ScriptEvent)>,
    next: usize,
}

impl Scenario {
    pub fn new(mut events: Vec<(u64, ScriptEvent)>) -> Self {
        events.sort_by_key(|(tick, _)| *tick);
        Self { events, next: 0 }
    }

    pub fn demo() -> Self {
        let wall = (1..=3).map(|y| Position::new(16, y)).collect();
        Self::new(vec![
            (0, ScriptEvent::UserGoto(Position::new(12, 0))),
            (
                8,
                ScriptEvent::SpawnMob {
                    id: 1,
                    offset: (0, 3),
                    health: 8,
                },
            ),
            (45, ScriptEvent::HazardUnderfoot),
            (70, ScriptEvent::Hunger(16)),
            (90, ScriptEvent::Wall(wall)),
            (95, ScriptEvent::UserGoto(Position::new(20, 0))),
        ])
    }

    pub fn initial_state() -> AgentState {
        AgentState::new()
            .with_item(Item::Bread, 2)
            .with_item(Item::Apple, 2)
            .with_item(Item::Torch, 4)
    }

    /// Events not fired yet.
    pub fn remaining(&self) -> usize {
        self.events.len() - self.next
    }

    /// Fires every event due at or before the agent's current tick.
    pub fn apply(&mut self, agent: &mut Agent) -> Result<()> {
        while let Some((at, event)) = self.events.get(self.next) {
            if *at > agent.state().tick {
                break;
            }
            info!(tick = agent.state().tick, ?event, "script event");
            fire(agent, event.clone())?;
            self.next += 1;
        }
        Ok(())
    }
}

fn fire(agent: &mut Agent, event: ScriptEvent) -> Result<()> {
    match event {
        ScriptEvent::UserGoto(target) => {
            let started = agent.state().tick;
            agent.run_user_task_then(GotoTask::new(target), move |outcome: &TaskOutcome| {
                info!(%target, started, ?outcome, "errand done");
            })?;
        }
        ScriptEvent::SpawnMob { id, offset, health } => {
            let state = agent.state_mut();
            let at = Position::new(state.position.x + offset.0, state.position.y + offset.1);
            state.spawn_mob(id, at, health);
        }
        ScriptEvent::HazardUnderfoot => {
            let state = agent.state_mut();
            let center = state.position;
            for dx in -1..=1 {
                for dy in -1..=1 {
                    state.hazards.insert(Position::new(center.x + dx, center.y + dy));
                }
            }
        }
        ScriptEvent::Hunger(level) => agent.state_mut().hunger = level,
        ScriptEvent::Wall(tiles) => agent.state_mut().blocked.extend(tiles),
    }
    Ok(())
}
