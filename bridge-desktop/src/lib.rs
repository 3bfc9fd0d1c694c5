//! # Desktop Bridge Implementations
//!
//! Default implementations of bridge traits for desktop platforms
//! (macOS, Windows, Linux).
//!
//! ## Overview
//!
//! This crate provides production-ready implementations of the host bridges
//! the offline catalog core needs but does not own:
//! - `HttpClient` using `reqwest`, retrying 5xx/429 with exponential backoff
//! - `CacheStorage` using SQLite (one table per cache region)
//! - `SettingsStore` using a SQLite-backed key-value table
//! - `TaskSpawner` using the ambient Tokio runtime
//!
//! The object-store capabilities (`AccessUrlIssuer`, `ObjectStore`) are
//! deployment specific and always supplied by the host.
//!
//! ## Usage
//!
//! ```ignore
//! use bridge_desktop::{ReqwestHttpClient, SqliteCacheStorage, TokioTaskSpawner};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let http = ReqwestHttpClient::new();
//!     let storage = SqliteCacheStorage::new("cache/offline.db".into()).await?;
//!     let spawner = TokioTaskSpawner::new();
//!
//!     // Hand these to CoreConfig::builder()
//!     Ok(())
//! }
//! ```

mod background;
mod cache_storage;
mod http;
mod settings;

pub use background::TokioTaskSpawner;
pub use cache_storage::SqliteCacheStorage;
pub use http::ReqwestHttpClient;
pub use settings::SqliteSettingsStore;

use bridge_traits::error::BridgeError;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::path::Path;

/// Open (creating if needed) a SQLite database file.
pub(crate) async fn connect_file(db_path: &Path) -> Result<SqlitePool, BridgeError> {
    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(BridgeError::Io)?;
        }
    }

    let options = SqliteConnectOptions::new()
        .filename(db_path)
        .create_if_missing(true);

    SqlitePool::connect_with(options)
        .await
        .map_err(|e| BridgeError::Storage(format!("Failed to connect to DB: {}", e)))
}

/// Single-connection in-memory database. A pool with more than one
/// connection would hand out distinct, empty databases.
pub(crate) async fn connect_memory() -> Result<SqlitePool, BridgeError> {
    SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .map_err(|e| BridgeError::Storage(format!("Failed to connect to DB: {}", e)))
}
