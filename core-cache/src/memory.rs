//! In-memory [`CacheStorage`]
//!
//! Backs the cache in tests and in sessions that should not touch disk.
//! Nothing survives the process.

use async_trait::async_trait;
use bridge_traits::error::{BridgeError, Result};
use bridge_traits::storage::{CacheRegion, CacheStorage};
use bytes::Bytes;
use parking_lot::RwLock;
use std::collections::HashMap;

#[derive(Debug, Default)]
struct Regions {
    opened: bool,
    binary: HashMap<String, Bytes>,
    metadata: HashMap<String, Bytes>,
}

impl Regions {
    fn region(&self, region: CacheRegion) -> Result<&HashMap<String, Bytes>> {
        if !self.opened {
            return Err(BridgeError::Storage("storage not opened".to_string()));
        }
        Ok(match region {
            CacheRegion::Binary => &self.binary,
            CacheRegion::Metadata => &self.metadata,
        })
    }

    fn region_mut(&mut self, region: CacheRegion) -> Result<&mut HashMap<String, Bytes>> {
        if !self.opened {
            return Err(BridgeError::Storage("storage not opened".to_string()));
        }
        Ok(match region {
            CacheRegion::Binary => &mut self.binary,
            CacheRegion::Metadata => &mut self.metadata,
        })
    }
}

/// Process-local two-region storage.
#[derive(Debug, Default)]
pub struct MemoryCacheStorage {
    regions: RwLock<Regions>,
}

impl MemoryCacheStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CacheStorage for MemoryCacheStorage {
    async fn open(&self) -> Result<()> {
        self.regions.write().opened = true;
        Ok(())
    }

    async fn put(&self, region: CacheRegion, key: &str, value: Bytes) -> Result<()> {
        self.regions
            .write()
            .region_mut(region)?
            .insert(key.to_string(), value);
        Ok(())
    }

    async fn get(&self, region: CacheRegion, key: &str) -> Result<Option<Bytes>> {
        Ok(self.regions.read().region(region)?.get(key).cloned())
    }

    async fn delete(&self, region: CacheRegion, key: &str) -> Result<bool> {
        Ok(self
            .regions
            .write()
            .region_mut(region)?
            .remove(key)
            .is_some())
    }

    async fn keys(&self, region: CacheRegion) -> Result<Vec<String>> {
        Ok(self.regions.read().region(region)?.keys().cloned().collect())
    }

    async fn total_bytes(&self, region: CacheRegion) -> Result<u64> {
        Ok(self
            .regions
            .read()
            .region(region)?
            .values()
            .map(|v| v.len() as u64)
            .sum())
    }

    async fn destroy(&self) -> Result<()> {
        *self.regions.write() = Regions::default();
        Ok(())
    }
}
