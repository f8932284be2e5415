//! Identifier allocation for the in-memory store.

use std::sync::{Mutex, PoisonError};

use tracing::trace;

/// Number of hex digits in an allocated identifier.
pub const ID_WIDTH: usize = 24;

/// Monotonic identifier source shared by all mappings of one store.
///
/// Identifiers are the counter value rendered as 24 zero-padded lowercase hex digits, the
/// same shape as the object ids a document database hands out. The counter spans the full
/// 96 bits those digits can hold; since it starts inside the `u64` range it cannot run out.
/// Each allocator is an independent counter, so stores built with their own allocator never
/// interfere.
#[derive(Debug, Default)]
pub struct IdAllocator {
    last: Mutex<u128>,
}

impl IdAllocator {
    /// Creates an allocator whose first identifier is `1`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an allocator whose first identifier is `last + 1`.
    pub fn starting_after(last: u64) -> Self {
        Self { last: Mutex::new(u128::from(last)) }
    }

    /// Returns the next identifier. Safe to call from many threads at once.
    pub fn next_id(&self) -> String {
        let value = {
            // The counter is a plain integer, so a poisoned lock still holds a valid value
            let mut last = self.last.lock().unwrap_or_else(PoisonError::into_inner);
            *last += 1;
            *last
        };
        let id = format!("{value:0width$x}", width = ID_WIDTH);

        trace!(%id, "Allocated id");

        id
    }
}
