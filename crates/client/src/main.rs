//! Agent simulator binary.
//!
//! Drives one agent through a scripted scenario at a fixed tick rate and
//! reports its active chain and task spine as it goes.
//!
//! # Examples
//!
//! ```bash
//! # Default run, 600 ticks at 50ms
//! cargo run -p agent-client
//!
//! # Run until ctrl-c, JSON status lines, verbose task logs
//! AGENT_MAX_TICKS=0 AGENT_STATUS_JSON=1 RUST_LOG=task_system=debug cargo run -p agent-client
//! ```
mod logging;
mod scenario;

use std::time::Duration;

use agent_runtime::{Agent, AgentConfig};
use anyhow::Result;
use task_system::StatusReport;
use tokio::time::MissedTickBehavior;

use crate::scenario::Scenario;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if it exists (silently ignore if not found)
    dotenvy::dotenv().ok();

    let config = AgentConfig::from_env();
    let _guard = logging::setup_logging()?;

    tracing::info!("Starting agent simulator");
    tracing::info!("Tick: {}ms, max ticks: {}", config.tick_ms, config.max_ticks);

    let mut agent = Agent::builder()
        .config(config.clone())
        .initial_state(Scenario::initial_state())
        .build()?;
    let mut scenario = Scenario::demo();

    let mut interval = tokio::time::interval(Duration::from_millis(config.tick_ms));
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    let mut last_status = String::new();
    loop {
        tokio::select! {
            _ = interval.tick() => {}
            result = &mut shutdown => {
                result?;
                tracing::info!("Interrupted, stopping agent");
                break;
            }
        }

        scenario.apply(&mut agent)?;
        agent.tick();

        let report = agent.status_report();
        let line = report.to_string();
        if line != last_status {
            print_status(agent.state().tick, &report, config.status_json)?;
            last_status = line;
        }

        if config.max_ticks > 0 && agent.state().tick >= config.max_ticks {
            tracing::info!("Reached {} ticks", config.max_ticks);
            break;
        }
    }

    agent.stop();

    let state = agent.state();
    tracing::info!(
        tick = state.tick,
        position = %state.position,
        health = state.health,
        hunger = state.hunger,
        actions = state.action_count,
        pending_events = scenario.remaining(),
        "Simulation finished"
    );
    Ok(())
}

fn print_status(tick: u64, report: &StatusReport, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string(report)?);
    } else {
        println!("[{tick:>5}] {report}");
    }
    Ok(())
}
