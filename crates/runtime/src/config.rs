//! Agent configuration and environment loaders.
use std::env;

use crate::error::{Result, RuntimeError};
use crate::WorldRules;

/// Tunables for the agent runtime and its built-in chains.
#[derive(Clone, Debug, PartialEq)]
pub struct AgentConfig {
    /// Milliseconds between ticks when driven by a host loop.
    pub tick_ms: u64,
    /// Ticks before the host stops; `0` runs until interrupted.
    pub max_ticks: u64,
    /// Log the active chain/task spine whenever it changes.
    pub show_task_chain: bool,
    /// Queue an idle task after each user task finishes.
    pub idle_when_inactive: bool,
    /// Hunger level at which the food chain takes over.
    pub hunger_threshold: u32,
    /// Consecutive failed moves before the unstuck chain takes over.
    pub stuck_ticks: u32,
    /// Manhattan radius in which mobs are engaged.
    pub defense_radius: u32,
    /// Emit the status report as JSON instead of text.
    pub status_json: bool,
    pub world: WorldRules,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            tick_ms: 50,
            max_ticks: 600,
            show_task_chain: true,
            idle_when_inactive: true,
            hunger_threshold: 14,
            stuck_ticks: 40,
            defense_radius: 6,
            status_json: false,
            world: WorldRules::default(),
        }
    }
}

impl AgentConfig {
    /// Construct configuration from process environment variables.
    ///
    /// Environment variables:
    /// - `AGENT_TICK_MS` - Milliseconds per tick (default: 50)
    /// - `AGENT_MAX_TICKS` - Ticks to run, 0 for unbounded (default: 600)
    /// - `AGENT_SHOW_TASK_CHAIN` - Log spine changes (default: true)
    /// - `AGENT_IDLE_WHEN_INACTIVE` - Idle after user tasks (default: true)
    /// - `AGENT_HUNGER_THRESHOLD` - Hunger that triggers eating (default: 14)
    /// - `AGENT_HUNGER_INTERVAL` - Ticks per hunger point (default: 40)
    /// - `AGENT_STUCK_TICKS` - Failed moves before unsticking (default: 40)
    /// - `AGENT_DEFENSE_RADIUS` - Mob engagement radius (default: 6)
    /// - `AGENT_STATUS_JSON` - Print status reports as JSON (default: false)
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Some(tick_ms) = read_env::<u64>("AGENT_TICK_MS") {
            config.tick_ms = tick_ms;
        }
        if let Some(max_ticks) = read_env::<u64>("AGENT_MAX_TICKS") {
            config.max_ticks = max_ticks;
        }
        if let Some(show) = read_env::<bool>("AGENT_SHOW_TASK_CHAIN") {
            config.show_task_chain = show;
        }
        if let Some(idle) = read_env::<bool>("AGENT_IDLE_WHEN_INACTIVE") {
            config.idle_when_inactive = idle;
        }
        if let Some(threshold) = read_env::<u32>("AGENT_HUNGER_THRESHOLD") {
            config.hunger_threshold = threshold;
        }
        if let Some(interval) = read_env::<u64>("AGENT_HUNGER_INTERVAL") {
            config.world.hunger_interval = interval;
        }
        if let Some(stuck) = read_env::<u32>("AGENT_STUCK_TICKS") {
            config.stuck_ticks = stuck;
        }
        if let Some(radius) = read_env::<u32>("AGENT_DEFENSE_RADIUS") {
            config.defense_radius = radius;
        }
        if let Some(json) = read_env::<bool>("AGENT_STATUS_JSON") {
            config.status_json = json;
        } else if env::var("AGENT_STATUS_JSON").is_ok() {
            // A bare variable counts as enabled
            config.status_json = true;
        }

        config
    }

    pub fn validate(&self) -> Result<()> {
        if self.tick_ms == 0 {
            return Err(RuntimeError::InvalidConfig {
                key: "AGENT_TICK_MS",
                reason: "tick length must be positive".into(),
            });
        }
        if self.stuck_ticks == 0 {
            return Err(RuntimeError::InvalidConfig {
                key: "AGENT_STUCK_TICKS",
                reason: "stuck threshold must be positive".into(),
            });
        }
        Ok(())
    }
}

fn read_env<T>(key: &str) -> Option<T>
where
    T: std::str::FromStr,
{
    env::var(key).ok()?.parse().ok()
}
