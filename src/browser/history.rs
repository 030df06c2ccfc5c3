//! Where the browser persists its canonical URL.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};

/// A non-navigating history: `replace` swaps the current entry's query
/// string without adding an entry or reloading.
pub trait History: Send + Sync {
    fn replace(&self, query: &str);
}

/// A single in-memory history entry. Used by the CLI and by tests.
#[derive(Debug, Default)]
pub struct MemoryHistory {
    current: Mutex<String>,
    writes: AtomicUsize,
}

impl MemoryHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// The current query string (empty before the first replace).
    pub fn current(&self) -> String {
        self.current
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// How many times the entry has been replaced.
    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

impl History for MemoryHistory {
    fn replace(&self, query: &str) {
        tracing::trace!(query, "history replace");
        *self.current.lock().unwrap_or_else(PoisonError::into_inner) = query.to_string();
        self.writes.fetch_add(1, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn replace_keeps_a_single_entry() {
        let history = MemoryHistory::new();
        assert_eq!(history.current(), "");

        history.replace("q=housing");
        history.replace("q=housing&page=2");
        history.replace("");

        assert_eq!(history.current(), "");
        assert_eq!(history.writes(), 3);
    }
}
