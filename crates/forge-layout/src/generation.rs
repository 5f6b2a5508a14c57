//! Last-write-wins for overlapping layout requests.
//!
//! Layout itself is synchronous. A host that runs it off the UI thread takes a
//! [`LayoutTicket`] before starting, and applies the result only if the
//! ticket is still current when the layout finishes. Starting a new request
//! makes every older ticket stale, so a slow run can never overwrite the
//! positions of a newer one.

use std::sync::atomic::{AtomicU64, Ordering};

use tracing::debug;

/// Identifies one layout request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LayoutTicket(u64);

impl LayoutTicket {
    #[must_use]
    pub const fn value(self) -> u64 {
        self.0
    }
}

/// Shared counter of layout requests. Safe to share across threads.
#[derive(Debug, Default)]
pub struct LayoutGeneration {
    current: AtomicU64,
}

impl LayoutGeneration {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            current: AtomicU64::new(0),
        }
    }

    /// Start a request, superseding every earlier ticket.
    pub fn begin(&self) -> LayoutTicket {
        LayoutTicket(self.current.fetch_add(1, Ordering::AcqRel) + 1)
    }

    #[must_use]
    pub fn is_current(&self, ticket: LayoutTicket) -> bool {
        self.current.load(Ordering::Acquire) == ticket.0
    }

    /// `Some(value)` if `ticket` is still the latest request, otherwise drop
    /// it.
    pub fn accept<T>(&self, ticket: LayoutTicket, value: T) -> Option<T> {
        if self.is_current(ticket) {
            Some(value)
        } else {
            debug!(ticket = ticket.0, "stale layout result discarded");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn newest_ticket_wins() {
        let generation = LayoutGeneration::new();
        let first = generation.begin();
        assert!(generation.is_current(first));

        let second = generation.begin();
        assert!(!generation.is_current(first));
        assert_eq!(generation.accept(first, "old"), None);
        assert_eq!(generation.accept(second, "new"), Some("new"));
        assert!(second > first);
    }

    #[test]
    fn tickets_are_unique_across_threads() {
        let generation = Arc::new(LayoutGeneration::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let generation = Arc::clone(&generation);
                thread::spawn(move || {
                    (0..100)
                        .map(|_| generation.begin().value())
                        .collect::<Vec<_>>()
                })
            })
            .collect();

        let mut all: Vec<u64> = handles
            .into_iter()
            .flat_map(|h| h.join().unwrap())
            .collect();
        all.sort_unstable();
        all.dedup();
        assert_eq!(all.len(), 800);
        assert!(generation.is_current(LayoutTicket(800)));
    }
}
