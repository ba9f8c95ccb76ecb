//! Scoped behaviour settings.
//!
//! Tasks push a frame when they start and pop it when they stop, so settings
//! such as protected items only apply while the task that set them runs.
//! Start/stop pairing of the task tree keeps pushes and pops balanced.

use std::collections::BTreeSet;

use tracing::warn;

use crate::Item;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
struct BehaviourFrame {
    label: String,
    protected: BTreeSet<Item>,
}

/// Stack of behaviour frames. The bottom frame is implicit and empty.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BehaviourStack {
    frames: Vec<BehaviourFrame>,
}

impl BehaviourStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Opens a frame owned by `label`.
    pub fn push(&mut self, label: impl Into<String>) {
        self.frames.push(BehaviourFrame {
            label: label.into(),
            protected: BTreeSet::new(),
        });
    }

    /// Closes the top frame. Popping the implicit bottom frame is a no-op.
    pub fn pop(&mut self) {
        if self.frames.pop().is_none() {
            warn!("behaviour stack popped while empty");
        }
    }

    /// Protects `items` for the lifetime of the top frame.
    pub fn add_protected_items(&mut self, items: impl IntoIterator<Item = Item>) {
        match self.frames.last_mut() {
            Some(frame) => frame.protected.extend(items),
            None => warn!("protected items added without a behaviour frame"),
        }
    }

    /// Whether any open frame protects `item`.
    pub fn is_protected(&self, item: Item) -> bool {
        self.frames.iter().any(|frame| frame.protected.contains(&item))
    }

    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    /// Label of the frame on top, if any.
    pub fn current(&self) -> Option<&str> {
        self.frames.last().map(|frame| frame.label.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn protection_lasts_until_pop() {
        let mut stack = BehaviourStack::new();
        stack.push("eat");
        stack.add_protected_items([Item::Bread, Item::Apple]);
        stack.push("goto");

        assert!(stack.is_protected(Item::Bread));
        assert_eq!(stack.current(), Some("goto"));

        stack.pop();
        stack.pop();
        assert!(!stack.is_protected(Item::Bread));
        assert_eq!(stack.depth(), 0);
    }

    #[test]
    fn popping_empty_stack_is_noop() {
        let mut stack = BehaviourStack::new();
        stack.pop();
        assert_eq!(stack.depth(), 0);
    }
}
