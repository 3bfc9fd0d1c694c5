//! # Cache Error Types

use bridge_traits::BridgeError;
use thiserror::Error;

/// Errors surfaced by the asset cache.
///
/// Most cache operations swallow these and degrade to a miss; they are
/// returned only where a caller explicitly asked for the outcome.
#[derive(Error, Debug)]
pub enum CacheError {
    /// Storage could not be opened; the cache runs in always-miss mode.
    #[error("Cache storage unavailable")]
    Unavailable,

    /// Fetching a body failed. `url` has its query string redacted.
    #[error("Failed to fetch {url}: {source}")]
    Fetch {
        url: String,
        #[source]
        source: BridgeError,
    },

    /// Reading or writing a storage region failed.
    #[error("Cache storage error: {0}")]
    Storage(#[from] BridgeError),

    /// A record could not be encoded or decoded.
    #[error("Record serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A persisted record carried a version this build does not understand.
    #[error("Unsupported record version {found} (expected {expected})")]
    UnsupportedVersion { found: u32, expected: u32 },

    /// Cache configuration failed validation.
    #[error("Invalid cache configuration: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, CacheError>;
