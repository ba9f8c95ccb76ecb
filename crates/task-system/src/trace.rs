//! Per-tick bookkeeping of the walked task spine.

/// A debug-state change emitted by a task during a tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateChange {
    pub label: String,
    pub state: String,
}

/// Records which tasks were ticked this frame and which changed state.
///
/// Every [`TaskNode`](crate::TaskNode) registers itself on entry to `tick`,
/// so after a chain tick the trace holds the active spine from root to leaf.
#[derive(Debug, Default)]
pub struct TaskTrace {
    spine: Vec<String>,
    changes: Vec<StateChange>,
}

impl TaskTrace {
    /// Creates an empty trace.
    pub fn new() -> Self {
        Self::default()
    }

    /// Labels of the tasks ticked this frame, root first.
    pub fn spine(&self) -> &[String] {
        &self.spine
    }

    /// Debug-state changes emitted this frame, in tick order.
    pub fn changes(&self) -> &[StateChange] {
        &self.changes
    }

    /// Forgets everything recorded so far.
    pub fn clear(&mut self) {
        self.spine.clear();
        self.changes.clear();
    }

    pub(crate) fn enter(&mut self, label: String) -> usize {
        self.spine.push(label);
        self.spine.len() - 1
    }

    pub(crate) fn relabel(&mut self, slot: usize, label: String) {
        if let Some(entry) = self.spine.get_mut(slot) {
            *entry = label;
        }
    }

    pub(crate) fn state_changed(&mut self, label: String, state: String) {
        self.changes.push(StateChange { label, state });
    }
}
