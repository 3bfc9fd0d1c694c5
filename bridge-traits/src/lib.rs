//! # Host Bridge Traits
//!
//! Platform abstraction traits that must be implemented by each host platform.
//!
//! ## Overview
//!
//! This crate defines the contract between the offline catalog core and the
//! host. Each trait represents a capability the core requires but does not
//! own: fetching bytes over HTTP, persisting cache regions, signing object
//! keys, listing the object store, keeping time and running background work.
//!
//! ## Traits
//!
//! ### Networking & Object Store
//! - [`HttpClient`](http::HttpClient) - Fetch-by-URL for covers and audio bodies
//! - [`AccessUrlIssuer`](object_store::AccessUrlIssuer) - Mints time-limited signed URLs
//! - [`ObjectStore`](object_store::ObjectStore) - Prefix listing and small text reads
//!
//! ### Storage
//! - [`CacheStorage`](storage::CacheStorage) - Two-region key-value persistence for the asset cache
//! - [`SettingsStore`](storage::SettingsStore) - Key-value preferences (player state)
//!
//! ### Utilities
//! - [`Clock`](time::Clock) - Time source for deterministic TTL testing
//! - [`TaskSpawner`](background::TaskSpawner) - Fire-and-forget background work
//!
//! ## Error Handling
//!
//! All bridge traits use the [`BridgeError`](error::BridgeError) type. Host
//! implementations should convert platform errors into it and keep messages
//! actionable (which URL, which key, which region).
//!
//! ## Thread Safety
//!
//! All bridge traits require `Send + Sync` so implementations can be shared
//! across async tasks behind an `Arc`.
//!
//! ## Examples
//!
//! ### Implementing AccessUrlIssuer
//!
//! ```ignore
//! use bridge_traits::object_store::AccessUrlIssuer;
//! use bridge_traits::error::Result;
//! use async_trait::async_trait;
//!
//! pub struct PresigningIssuer {
//!     bucket: String,
//! }
//!
//! #[async_trait]
//! impl AccessUrlIssuer for PresigningIssuer {
//!     async fn issue_access_url(&self, key: &str) -> Result<String> {
//!         // Sign `key` for `self.validity()`
//!         todo!()
//!     }
//! }
//! ```

pub mod background;
pub mod error;
pub mod http;
pub mod object_store;
pub mod storage;
pub mod time;

pub use error::BridgeError;

// Re-export commonly used types
pub use background::{BoxTask, TaskSpawner};
pub use http::{HttpClient, HttpMethod, HttpRequest, HttpResponse, RetryPolicy};
pub use object_store::{AccessUrlIssuer, ObjectEntry, ObjectStore, DEFAULT_URL_VALIDITY};
pub use storage::{CacheRegion, CacheStorage, SettingsStore};
pub use time::{Clock, LogLevel, SystemClock};
