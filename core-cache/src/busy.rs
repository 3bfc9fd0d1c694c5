//! In-flight operation tracking
//!
//! At most one cache operation per entity may run at a time. A second caller
//! for the same entity is told to back off instead of queueing behind the
//! first.

use parking_lot::Mutex;
use std::collections::HashSet;
use std::sync::Arc;

/// Set of entity ids with an operation in flight.
#[derive(Debug, Default, Clone)]
pub struct BusySet {
    inner: Arc<Mutex<HashSet<String>>>,
}

impl BusySet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark `id` busy. Returns `None` if it already is.
    pub fn try_acquire(&self, id: &str) -> Option<BusyGuard> {
        let mut set = self.inner.lock();
        if !set.insert(id.to_string()) {
            return None;
        }
        Some(BusyGuard {
            set: Arc::clone(&self.inner),
            id: id.to_string(),
        })
    }
}

/// Releases the entity on drop, including on early return or panic.
#[derive(Debug)]
pub struct BusyGuard {
    set: Arc<Mutex<HashSet<String>>>,
    id: String,
}

impl Drop for BusyGuard {
    fn drop(&mut self) {
        self.set.lock().remove(&self.id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_acquire_is_refused() {
        let busy = BusySet::new();
        let guard = busy.try_acquire("my-beats").unwrap();

        assert!(busy.try_acquire("my-beats").is_none());
        assert!(busy.try_acquire("other").is_some());

        drop(guard);
        assert!(busy.try_acquire("my-beats").is_some());
    }
}
