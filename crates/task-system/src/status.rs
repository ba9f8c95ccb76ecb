//! Status reporting for overlays and status lines.

use std::fmt;

use tracing::{debug, info};

use crate::StateChange;

/// Snapshot of what the runner is doing after a tick.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct StatusReport {
    /// Name of the chain holding control, `None` when idle.
    pub chain: Option<String>,
    /// Labels of the active spine, root first.
    pub spine: Vec<String>,
    pub enabled: bool,
}

impl StatusReport {
    /// Returns `true` if no chain holds control.
    #[inline]
    pub fn is_idle(&self) -> bool {
        self.chain.is_none()
    }
}

impl fmt::Display for StatusReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.enabled {
            return write!(f, "(disabled)");
        }
        match &self.chain {
            None => write!(f, "(idle)"),
            Some(chain) => {
                write!(f, "{chain}")?;
                for label in &self.spine {
                    write!(f, " -> {}", label.trim_end())?;
                }
                Ok(())
            }
        }
    }
}

/// Receiver of scheduler events, e.g. a debug overlay or a status line.
///
/// All methods default to no-ops so sinks only implement what they render.
pub trait StatusSink {
    /// A task's debug state changed this tick.
    fn state_changed(&mut self, _change: &StateChange) {}

    /// Control moved between chains (`None` means idle).
    fn chain_changed(&mut self, _previous: Option<&str>, _next: Option<&str>) {}

    /// Called once at the end of every runner tick.
    fn tick_finished(&mut self, _report: &StatusReport) {}
}

impl<S: StatusSink + ?Sized> StatusSink for Box<S> {
    fn state_changed(&mut self, change: &StateChange) {
        (**self).state_changed(change);
    }

    fn chain_changed(&mut self, previous: Option<&str>, next: Option<&str>) {
        (**self).chain_changed(previous, next);
    }

    fn tick_finished(&mut self, report: &StatusReport) {
        (**self).tick_finished(report);
    }
}

/// Default sink: forwards events to `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl StatusSink for TracingSink {
    fn state_changed(&mut self, change: &StateChange) {
        debug!(task = %change.label, state = %change.state, "state change");
    }

    fn chain_changed(&mut self, previous: Option<&str>, next: Option<&str>) {
        info!(
            from = previous.unwrap_or("(idle)"),
            to = next.unwrap_or("(idle)"),
            "chain switch"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_renders_spine() {
        let report = StatusReport {
            chain: Some("User Tasks".into()),
            spine: vec!["<Goto (3, 4)> walking".into(), "<Step East> ".into()],
            enabled: true,
        };

        assert_eq!(
            report.to_string(),
            "User Tasks -> <Goto (3, 4)> walking -> <Step East>"
        );
    }

    #[test]
    fn report_renders_idle_and_disabled() {
        let mut report = StatusReport {
            enabled: true,
            ..Default::default()
        };
        assert!(report.is_idle());
        assert_eq!(report.to_string(), "(idle)");

        report.enabled = false;
        assert_eq!(report.to_string(), "(disabled)");
    }
}
