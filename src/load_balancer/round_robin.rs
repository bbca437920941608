//! Round-robin rotation cursor.

use std::sync::atomic::{AtomicUsize, Ordering};

/// Round-robin selector.
/// Stores an internal counter to rotate through a fixed number of slots.
#[derive(Debug, Default)]
pub struct RoundRobin {
    counter: AtomicUsize,
}

impl RoundRobin {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start the rotation at a given position.
    pub fn starting_at(start: usize) -> Self {
        Self {
            counter: AtomicUsize::new(start),
        }
    }

    /// Read-and-increment the cursor, returning the slot in `0..len`.
    ///
    /// Returns `None` for an empty set. Concurrent callers each get a
    /// distinct counter value, so no position is skipped or repeated.
    pub fn next_index(&self, len: usize) -> Option<usize> {
        if len == 0 {
            return None;
        }
        let ticket = self.counter.fetch_add(1, Ordering::Relaxed);
        Some(ticket % len)
    }
}
