//! # Offline Asset Cache
//!
//! Durable cache of catalog media (album covers, songs, release covers and
//! previews) with bounded staleness and memoized local handles.
//!
//! ## Overview
//!
//! The cache sits between "give me a playable URL" and "fetch it from the
//! object store". It keeps two storage regions behind the
//! [`CacheStorage`](bridge_traits::CacheStorage) bridge:
//!
//! - **binary**: fetched bodies keyed by the exact signed URL they came from
//! - **metadata**: one versioned JSON record per entity (album or release
//!   slot) naming which binaries it owns and when it expires
//!
//! A record older than its TTL is evicted the first time anyone looks at it,
//! together with every binary and handle it owns.
//!
//! ## Components
//!
//! - [`AssetCacheStore`]: the public cache API
//! - [`HandleRegistry`]: at most one live [`LocalHandle`] per cached binary
//! - [`MemoryCacheStorage`]: in-process storage for tests and ephemeral use
//! - [`records`]: the persisted record format
//!
//! ## Usage
//!
//! ```ignore
//! use core_cache::{AssetCacheStore, CacheConfig};
//!
//! let cache = Arc::new(AssetCacheStore::new(storage, http, clock, CacheConfig::default())?);
//! cache.init().await;
//!
//! cache.cache_album(&album, &cover_url, &song_urls).await;
//! if let Some(handle) = cache.get_song_url(&album.id, &song.key).await {
//!     player.play(handle.url());
//! }
//! ```

pub mod busy;
pub mod config;
pub mod error;
pub mod handles;
pub mod memory;
pub mod records;
pub mod stats;
pub mod store;

pub use config::CacheConfig;
pub use error::{CacheError, Result};
pub use handles::{HandleKey, HandleKind, HandleRegistry, LocalHandle};
pub use memory::MemoryCacheStorage;
pub use stats::CacheStats;
pub use store::{AssetCacheStore, CacheOutcome};
