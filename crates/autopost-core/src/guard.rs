//! Re-entrancy guard
//!
//! Writes the engine performs on target sites are saves in the host's eyes.
//! While such a write is in flight the guard is engaged, and the dispatch
//! entry points refuse to treat any save they receive as a new trigger.
//! Clones share state, so a host integration can hold one to stamp its own
//! save notifications.

use std::cell::Cell;
use std::rc::Rc;

/// Shared "do not re-dispatch" marker
#[derive(Debug, Clone, Default)]
pub struct ReentrancyGuard {
    depth: Rc<Cell<u32>>,
}

impl ReentrancyGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether an engine write is currently in flight
    pub fn is_engaged(&self) -> bool {
        self.depth.get() > 0
    }

    /// Engage the guard until the returned token is dropped
    pub fn engage(&self) -> Suppression {
        self.depth.set(self.depth.get() + 1);
        Suppression {
            depth: Rc::clone(&self.depth),
        }
    }
}

/// Token keeping a [`ReentrancyGuard`] engaged
#[derive(Debug)]
#[must_use = "the guard disengages as soon as the token is dropped"]
pub struct Suppression {
    depth: Rc<Cell<u32>>,
}

impl Drop for Suppression {
    fn drop(&mut self) {
        self.depth.set(self.depth.get().saturating_sub(1));
    }
}
