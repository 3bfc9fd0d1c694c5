//! Object Store Abstractions
//!
//! The remote object store that holds catalog media is reached through two
//! capabilities:
//!
//! - [`AccessUrlIssuer`] mints time-limited, self-authenticating URLs for a
//!   single object key. URLs carry their credentials in the query string and
//!   must not be logged verbatim.
//! - [`ObjectStore`] lists keys under a prefix and reads small text objects
//!   (release sidecars).

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::time::Duration;

use crate::error::Result;

/// Validity window of an issued access URL.
pub const DEFAULT_URL_VALIDITY: Duration = Duration::from_secs(3600);

/// A single listed object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectEntry {
    /// Full object key, e.g. `albums/my-beats/track-one.mp3`
    pub key: String,
    /// Size in bytes, when the store reports it
    pub size: Option<u64>,
    pub last_modified: Option<DateTime<Utc>>,
}

impl ObjectEntry {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            size: None,
            last_modified: None,
        }
    }

    pub fn with_size(mut self, size: u64) -> Self {
        self.size = Some(size);
        self
    }
}

/// Issues time-limited access URLs for object keys.
///
/// Stateless and idempotent: calling it twice for the same key yields two
/// independently valid URLs. There is no renegotiation of the validity window.
///
/// # Example
///
/// ```ignore
/// use bridge_traits::object_store::AccessUrlIssuer;
///
/// async fn playable(issuer: &dyn AccessUrlIssuer, key: &str) -> Result<String> {
///     issuer.issue_access_url(key).await
/// }
/// ```
#[async_trait]
pub trait AccessUrlIssuer: Send + Sync {
    /// Issue a signed URL for `key`.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::Signing`](crate::error::BridgeError::Signing)
    /// when the store rejects the request or credentials are missing.
    async fn issue_access_url(&self, key: &str) -> Result<String>;

    /// How long an issued URL stays valid.
    fn validity(&self) -> Duration {
        DEFAULT_URL_VALIDITY
    }
}

/// Read-only listing access to the object store.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// List every object whose key starts with `prefix`, in store order.
    async fn list_objects(&self, prefix: &str) -> Result<Vec<ObjectEntry>>;

    /// Read a small object as UTF-8 text.
    async fn read_text(&self, key: &str) -> Result<String>;
}
