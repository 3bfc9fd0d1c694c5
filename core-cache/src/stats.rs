//! Cache statistics

use serde::Serialize;

/// Point-in-time view of what the cache holds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub album_records: usize,
    pub release_records: usize,
    pub binary_entries: usize,
    pub binary_bytes: u64,
    pub live_handles: usize,
}

impl CacheStats {
    pub fn total_records(&self) -> usize {
        self.album_records + self.release_records
    }

    pub fn is_empty(&self) -> bool {
        self.total_records() == 0 && self.binary_entries == 0
    }
}
