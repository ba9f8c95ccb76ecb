use task_system::{StateChange, StatusReport, StatusSink, TracingSink};
use tracing::info;

/// Logs the active chain and task spine whenever it changes.
///
/// Chain switches and state changes are forwarded to [`TracingSink`].
#[derive(Debug, Default)]
pub struct StatusLineSink {
    show_task_chain: bool,
    last_line: String,
    events: TracingSink,
}

impl StatusLineSink {
    pub fn new(show_task_chain: bool) -> Self {
        Self {
            show_task_chain,
            ..Default::default()
        }
    }
}

impl StatusSink for StatusLineSink {
    fn state_changed(&mut self, change: &StateChange) {
        self.events.state_changed(change);
    }

    fn chain_changed(&mut self, previous: Option<&str>, next: Option<&str>) {
        self.events.chain_changed(previous, next);
    }

    fn tick_finished(&mut self, report: &StatusReport) {
        if !self.show_task_chain {
            return;
        }
        let line = report.to_string();
        if line != self.last_line {
            info!(status = %line, "task chain");
            self.last_line = line;
        }
    }
}
