//! Logging setup for the simulator binary.
use std::path::PathBuf;

use anyhow::Result;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Initializes the global subscriber.
///
/// Logs go to stderr, or to a daily rolling file under `AGENT_LOG_DIR` when
/// that variable is set. The returned guard must be held until exit so the
/// file writer flushes.
pub fn setup_logging() -> Result<Option<WorkerGuard>> {
    let env_filter = EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into());

    let Some(log_dir) = std::env::var_os("AGENT_LOG_DIR").map(PathBuf::from) else {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_writer(std::io::stderr)
            .init();
        return Ok(None);
    };

    std::fs::create_dir_all(&log_dir)?;
    let file_appender = tracing_appender::rolling::daily(&log_dir, "agent-sim.log");
    let (non_blocking_file, guard) = tracing_appender::non_blocking(file_appender);

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking_file)
        .with_ansi(false);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .init();

    tracing::info!("Log directory: {}", log_dir.display());
    Ok(Some(guard))
}
