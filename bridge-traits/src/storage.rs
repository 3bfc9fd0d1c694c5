//! Storage Abstractions
//!
//! Two persistence seams:
//!
//! - [`CacheStorage`]: the durable two-region store backing the offline asset
//!   cache. The *binary* region holds fetched payloads keyed by the URL they
//!   were fetched from; the *metadata* region holds serialized records keyed
//!   by entity id.
//! - [`SettingsStore`]: small key-value preferences, used for player state.

use async_trait::async_trait;
use bytes::Bytes;
use std::fmt;

use crate::error::Result;

/// A named partition of the cache storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CacheRegion {
    /// Fetched payloads (cover images, audio), keyed by source URL
    Binary,
    /// Serialized cache records, keyed by entity id
    Metadata,
}

impl CacheRegion {
    /// All regions, in creation order.
    pub const ALL: [CacheRegion; 2] = [CacheRegion::Binary, CacheRegion::Metadata];

    /// Stable storage name for the region.
    pub fn as_str(&self) -> &'static str {
        match self {
            CacheRegion::Binary => "binary",
            CacheRegion::Metadata => "metadata",
        }
    }
}

impl fmt::Display for CacheRegion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Region-aware durable key-value storage for cached assets.
///
/// Implementations:
/// - Desktop: SQLite, one table per region
/// - Tests / ephemeral sessions: in-memory maps
///
/// `open` must be idempotent. `destroy` removes both regions entirely; a
/// subsequent `open` recreates them empty.
///
/// # Example
///
/// ```ignore
/// use bridge_traits::storage::{CacheRegion, CacheStorage};
///
/// async fn store_cover(storage: &dyn CacheStorage, url: &str, body: Bytes) -> Result<()> {
///     storage.open().await?;
///     storage.put(CacheRegion::Binary, url, body).await
/// }
/// ```
#[async_trait]
pub trait CacheStorage: Send + Sync {
    /// Prepare both regions. Safe to call repeatedly.
    async fn open(&self) -> Result<()>;

    /// Insert or replace an entry.
    async fn put(&self, region: CacheRegion, key: &str, value: Bytes) -> Result<()>;

    /// Fetch an entry, `Ok(None)` when absent.
    async fn get(&self, region: CacheRegion, key: &str) -> Result<Option<Bytes>>;

    /// Delete an entry. Returns whether anything was removed.
    async fn delete(&self, region: CacheRegion, key: &str) -> Result<bool>;

    /// List every key in a region.
    async fn keys(&self, region: CacheRegion) -> Result<Vec<String>>;

    /// Sum of value sizes in a region, without reading the values.
    async fn total_bytes(&self, region: CacheRegion) -> Result<u64>;

    /// Drop both regions wholesale.
    async fn destroy(&self) -> Result<()>;

    /// Check whether an entry exists.
    async fn contains(&self, region: CacheRegion, key: &str) -> Result<bool> {
        Ok(self.get(region, key).await?.is_some())
    }
}

/// Key-value settings storage trait
///
/// Abstracts platform-specific preferences/settings storage:
/// - Desktop: SQLite-backed table
/// - Web: localStorage
///
/// # Example
///
/// ```ignore
/// use bridge_traits::storage::SettingsStore;
///
/// async fn save_volume(store: &dyn SettingsStore) -> Result<()> {
///     store.set_f64("music_player_volume", 0.7).await?;
///     Ok(())
/// }
/// ```
#[async_trait]
pub trait SettingsStore: Send + Sync {
    /// Store a string value
    async fn set_string(&self, key: &str, value: &str) -> Result<()>;

    /// Retrieve a string value
    async fn get_string(&self, key: &str) -> Result<Option<String>>;

    /// Store an integer value
    async fn set_i64(&self, key: &str, value: i64) -> Result<()>;

    /// Retrieve an integer value
    async fn get_i64(&self, key: &str) -> Result<Option<i64>>;

    /// Store a floating-point value
    async fn set_f64(&self, key: &str, value: f64) -> Result<()>;

    /// Retrieve a floating-point value
    async fn get_f64(&self, key: &str) -> Result<Option<f64>>;

    /// Delete a setting
    async fn delete(&self, key: &str) -> Result<()>;

    /// Check if a setting exists
    async fn has_key(&self, key: &str) -> Result<bool> {
        Ok(self.get_string(key).await?.is_some())
    }
}
