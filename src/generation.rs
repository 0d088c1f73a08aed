//! "Last request wins" bookkeeping for loaders.
//!
//! A loader calls [`Generations::begin`] when it starts a load and holds on to
//! the returned [`LoadTicket`]. Starting another load invalidates every older
//! ticket. Before committing anything to visible state the loader checks
//! [`Generations::is_current`]; a superseded load simply drops its result.

use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug, Default)]
pub struct Generations {
    latest: AtomicU64,
}

/// Identifies one load started by [`Generations::begin`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadTicket(u64);

impl Generations {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new load, superseding all earlier ones.
    pub fn begin(&self) -> LoadTicket {
        LoadTicket(self.latest.fetch_add(1, Ordering::SeqCst) + 1)
    }

    /// True if no load has started since `ticket` was issued.
    pub fn is_current(&self, ticket: LoadTicket) -> bool {
        self.latest.load(Ordering::SeqCst) == ticket.0
    }
}
