//! # Core Configuration Module
//!
//! Provides configuration management for the offline catalog core.
//!
//! ## Overview
//!
//! The configuration system uses a builder pattern to construct a `CoreConfig`
//! instance that holds all host bridges and settings the core needs. It
//! enforces fail-fast validation so a missing capability is reported at
//! startup with an actionable message, not on the first cache miss.
//!
//! ## Required Dependencies
//!
//! - `AccessUrlIssuer` - Mints time-limited URLs for object keys
//! - `ObjectStore` - Lists the catalog and reads release sidecars
//!
//! ## Optional Dependencies (with platform defaults)
//!
//! - `HttpClient` - Fetches cover and audio bodies (desktop default: reqwest)
//! - `TaskSpawner` - Fire-and-forget warm-up work (desktop default: tokio)
//! - `CacheStorage` - Durable cache regions (desktop default: SQLite at `database_path`)
//! - `SettingsStore` - Player state (desktop default: SQLite at `database_path`)
//! - `Clock` - Time source (default: system clock)
//!
//! Desktop defaults are only available with the `desktop-shims` feature. The
//! SQLite-backed defaults need an async connection, so they are opened by
//! [`CoreConfig::cache_storage`] and [`CoreConfig::settings_store`] rather
//! than by the builder.
//!
//! ## Usage
//!
//! ```ignore
//! use core_runtime::config::CoreConfig;
//! use std::sync::Arc;
//!
//! let config = CoreConfig::builder()
//!     .access_url_issuer(Arc::new(MyPresigner::new()))
//!     .object_store(Arc::new(MyBucket::new()))
//!     .database_path("/path/to/offline.db")
//!     .artist_name("DRIP SIFU")
//!     .build()?;
//! ```
//!
//! ## Error Handling
//!
//! ```ignore
//! // Fails with CapabilityMissing { capability: "AccessUrlIssuer", .. }
//! let config = CoreConfig::builder().build();
//! ```

use crate::error::{Error, Result};
use bridge_traits::{
    AccessUrlIssuer, CacheStorage, Clock, HttpClient, ObjectStore, SettingsStore, SystemClock,
    TaskSpawner,
};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// Default time-to-live of a cached album or release record.
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(7 * 24 * 60 * 60);

/// Artist credited on every catalog entry unless overridden.
pub const DEFAULT_ARTIST_NAME: &str = "DRIP SIFU";

/// Days after today an upcoming release is dated when nothing else says.
pub const DEFAULT_UPCOMING_FALLBACK_DAYS: u32 = 30;

const MAX_CACHE_TTL: Duration = Duration::from_secs(365 * 24 * 60 * 60);

/// Core configuration for the offline catalog.
///
/// This struct holds all dependencies and settings required to initialize
/// the core library. Use [`CoreConfigBuilder`] to construct instances.
#[derive(Clone)]
pub struct CoreConfig {
    /// Signs object keys into time-limited URLs (required)
    pub access_url_issuer: Arc<dyn AccessUrlIssuer>,

    /// Lists catalog objects (required)
    pub object_store: Arc<dyn ObjectStore>,

    /// HTTP client used for cache fills
    pub http_client: Arc<dyn HttpClient>,

    /// Runs opportunistic caching in the background
    pub task_spawner: Arc<dyn TaskSpawner>,

    /// Time source for TTL checks and release-date fallbacks
    pub clock: Arc<dyn Clock>,

    /// Injected cache storage; `None` means the desktop default is opened
    pub cache_storage: Option<Arc<dyn CacheStorage>>,

    /// Injected settings store; `None` means the desktop default is opened
    pub settings_store: Option<Arc<dyn SettingsStore>>,

    /// SQLite file for the desktop storage defaults
    pub database_path: Option<PathBuf>,

    /// How long cached records stay valid
    pub cache_ttl: Duration,

    /// Validity window of issued URLs
    pub url_validity: Duration,

    /// Artist credited on albums, songs and releases
    pub artist_name: String,

    /// Fallback offset for upcoming release dates
    pub upcoming_fallback_days: u32,
}

impl std::fmt::Debug for CoreConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CoreConfig")
            .field("access_url_issuer", &"AccessUrlIssuer { ... }")
            .field("object_store", &"ObjectStore { ... }")
            .field("http_client", &"HttpClient { ... }")
            .field("task_spawner", &"TaskSpawner { ... }")
            .field(
                "cache_storage",
                &self.cache_storage.as_ref().map(|_| "CacheStorage { ... }"),
            )
            .field(
                "settings_store",
                &self.settings_store.as_ref().map(|_| "SettingsStore { ... }"),
            )
            .field("database_path", &self.database_path)
            .field("cache_ttl", &self.cache_ttl)
            .field("url_validity", &self.url_validity)
            .field("artist_name", &self.artist_name)
            .field("upcoming_fallback_days", &self.upcoming_fallback_days)
            .finish()
    }
}

impl CoreConfig {
    /// Creates a new builder for constructing a `CoreConfig`.
    pub fn builder() -> CoreConfigBuilder {
        CoreConfigBuilder::default()
    }

    /// Validates the configuration and returns an error if invalid.
    ///
    /// This checks:
    /// - TTL is positive and at most a year
    /// - URL validity is positive
    /// - Artist name is not blank
    /// - A database path exists whenever a storage default must be opened
    pub fn validate(&self) -> Result<()> {
        if self.cache_ttl.is_zero() {
            return Err(Error::Config(
                "Cache TTL must be greater than zero".to_string(),
            ));
        }

        if self.cache_ttl > MAX_CACHE_TTL {
            return Err(Error::Config(
                "Cache TTL exceeds maximum of 365 days".to_string(),
            ));
        }

        if self.url_validity.is_zero() {
            return Err(Error::Config(
                "URL validity must be greater than zero".to_string(),
            ));
        }

        if self.artist_name.trim().is_empty() {
            return Err(Error::Config("Artist name cannot be empty".to_string()));
        }

        if let Some(path) = &self.database_path {
            if path.as_os_str().is_empty() {
                return Err(Error::Config("Database path cannot be empty".to_string()));
            }
        }

        let needs_default_storage = self.cache_storage.is_none() || self.settings_store.is_none();
        if needs_default_storage && self.database_path.is_none() {
            return Err(Error::Config(
                "Database path is required when CacheStorage or SettingsStore is not injected. \
                 Use .database_path() or inject both stores."
                    .to_string(),
            ));
        }

        Ok(())
    }

    /// Returns the injected cache storage, or opens the desktop default.
    pub async fn cache_storage(&self) -> Result<Arc<dyn CacheStorage>> {
        match &self.cache_storage {
            Some(storage) => Ok(Arc::clone(storage)),
            None => provide_default_cache_storage(self.database_path.as_ref()).await,
        }
    }

    /// Returns the injected settings store, or opens the desktop default.
    pub async fn settings_store(&self) -> Result<Arc<dyn SettingsStore>> {
        match &self.settings_store {
            Some(store) => Ok(Arc::clone(store)),
            None => provide_default_settings_store(self.database_path.as_ref()).await,
        }
    }
}

fn required_capability_error(capability: &str, purpose: &str) -> Error {
    Error::CapabilityMissing {
        capability: capability.to_string(),
        message: format!(
            "{} implementation is required {}. Inject one through the matching builder method.",
            capability, purpose
        ),
    }
}

#[cfg(not(feature = "desktop-shims"))]
fn desktop_default_missing_error(capability: &str, purpose: &str) -> Error {
    Error::CapabilityMissing {
        capability: capability.to_string(),
        message: format!(
            "{} implementation is required {}. \
             Desktop: enable the 'desktop-shims' feature to use the default. \
             Other hosts: inject a platform implementation.",
            capability, purpose
        ),
    }
}

#[cfg(feature = "desktop-shims")]
fn provide_default_http_client() -> Result<Arc<dyn HttpClient>> {
    Ok(Arc::new(bridge_desktop::ReqwestHttpClient::new()))
}

#[cfg(not(feature = "desktop-shims"))]
fn provide_default_http_client() -> Result<Arc<dyn HttpClient>> {
    Err(desktop_default_missing_error(
        "HttpClient",
        "to fetch cover and audio bodies",
    ))
}

#[cfg(feature = "desktop-shims")]
fn provide_default_task_spawner() -> Result<Arc<dyn TaskSpawner>> {
    Ok(Arc::new(bridge_desktop::TokioTaskSpawner::new()))
}

#[cfg(not(feature = "desktop-shims"))]
fn provide_default_task_spawner() -> Result<Arc<dyn TaskSpawner>> {
    Err(desktop_default_missing_error(
        "TaskSpawner",
        "to run background caching",
    ))
}

#[cfg(feature = "desktop-shims")]
fn storage_path(database_path: Option<&PathBuf>, capability: &str) -> Result<PathBuf> {
    database_path.cloned().ok_or_else(|| {
        Error::Config(format!(
            "Database path is required to open the default {}",
            capability
        ))
    })
}

#[cfg(feature = "desktop-shims")]
async fn provide_default_cache_storage(
    database_path: Option<&PathBuf>,
) -> Result<Arc<dyn CacheStorage>> {
    let path = storage_path(database_path, "CacheStorage")?;
    let storage = bridge_desktop::SqliteCacheStorage::new(path).await?;
    Ok(Arc::new(storage))
}

#[cfg(not(feature = "desktop-shims"))]
async fn provide_default_cache_storage(
    _database_path: Option<&PathBuf>,
) -> Result<Arc<dyn CacheStorage>> {
    Err(desktop_default_missing_error(
        "CacheStorage",
        "for the offline asset cache",
    ))
}

#[cfg(feature = "desktop-shims")]
async fn provide_default_settings_store(
    database_path: Option<&PathBuf>,
) -> Result<Arc<dyn SettingsStore>> {
    let path = storage_path(database_path, "SettingsStore")?;
    let store = bridge_desktop::SqliteSettingsStore::new(path).await?;
    Ok(Arc::new(store))
}

#[cfg(not(feature = "desktop-shims"))]
async fn provide_default_settings_store(
    _database_path: Option<&PathBuf>,
) -> Result<Arc<dyn SettingsStore>> {
    Err(desktop_default_missing_error(
        "SettingsStore",
        "for player state",
    ))
}

/// Builder for constructing [`CoreConfig`] instances.
///
/// Use this builder to incrementally set configuration options and then
/// call [`build()`](CoreConfigBuilder::build) to create the final config.
#[derive(Default)]
pub struct CoreConfigBuilder {
    access_url_issuer: Option<Arc<dyn AccessUrlIssuer>>,
    object_store: Option<Arc<dyn ObjectStore>>,
    http_client: Option<Arc<dyn HttpClient>>,
    task_spawner: Option<Arc<dyn TaskSpawner>>,
    clock: Option<Arc<dyn Clock>>,
    cache_storage: Option<Arc<dyn CacheStorage>>,
    settings_store: Option<Arc<dyn SettingsStore>>,
    database_path: Option<PathBuf>,
    cache_ttl: Option<Duration>,
    url_validity: Option<Duration>,
    artist_name: Option<String>,
    upcoming_fallback_days: Option<u32>,
}

impl CoreConfigBuilder {
    pub fn access_url_issuer(mut self, issuer: Arc<dyn AccessUrlIssuer>) -> Self {
        self.access_url_issuer = Some(issuer);
        self
    }

    pub fn object_store(mut self, store: Arc<dyn ObjectStore>) -> Self {
        self.object_store = Some(store);
        self
    }

    pub fn http_client(mut self, client: Arc<dyn HttpClient>) -> Self {
        self.http_client = Some(client);
        self
    }

    pub fn task_spawner(mut self, spawner: Arc<dyn TaskSpawner>) -> Self {
        self.task_spawner = Some(spawner);
        self
    }

    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    pub fn cache_storage(mut self, storage: Arc<dyn CacheStorage>) -> Self {
        self.cache_storage = Some(storage);
        self
    }

    pub fn settings_store(mut self, store: Arc<dyn SettingsStore>) -> Self {
        self.settings_store = Some(store);
        self
    }

    /// Sets the SQLite file used by the desktop storage defaults.
    pub fn database_path<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.database_path = Some(path.into());
        self
    }

    /// Sets the record TTL (default: 7 days).
    pub fn cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = Some(ttl);
        self
    }

    /// Overrides the URL validity window. Defaults to the issuer's own
    /// [`validity()`](AccessUrlIssuer::validity).
    pub fn url_validity(mut self, validity: Duration) -> Self {
        self.url_validity = Some(validity);
        self
    }

    pub fn artist_name(mut self, name: impl Into<String>) -> Self {
        self.artist_name = Some(name.into());
        self
    }

    pub fn upcoming_fallback_days(mut self, days: u32) -> Self {
        self.upcoming_fallback_days = Some(days);
        self
    }

    /// Builds the final configuration.
    ///
    /// # Errors
    ///
    /// - `CapabilityMissing` when a required bridge is absent, or an optional
    ///   one is absent and no desktop default is compiled in
    /// - `Config` when a setting fails validation
    pub fn build(self) -> Result<CoreConfig> {
        let access_url_issuer = self.access_url_issuer.ok_or_else(|| {
            required_capability_error("AccessUrlIssuer", "to sign object keys into playable URLs")
        })?;

        let object_store = self.object_store.ok_or_else(|| {
            required_capability_error("ObjectStore", "to list the catalog")
        })?;

        let http_client = match self.http_client {
            Some(client) => client,
            None => provide_default_http_client()?,
        };

        let task_spawner = match self.task_spawner {
            Some(spawner) => spawner,
            None => provide_default_task_spawner()?,
        };

        #[cfg(not(feature = "desktop-shims"))]
        {
            if self.cache_storage.is_none() {
                return Err(desktop_default_missing_error(
                    "CacheStorage",
                    "for the offline asset cache",
                ));
            }
            if self.settings_store.is_none() {
                return Err(desktop_default_missing_error(
                    "SettingsStore",
                    "for player state",
                ));
            }
        }

        let url_validity = self
            .url_validity
            .unwrap_or_else(|| access_url_issuer.validity());

        let config = CoreConfig {
            access_url_issuer,
            object_store,
            http_client,
            task_spawner,
            clock: self.clock.unwrap_or_else(|| Arc::new(SystemClock)),
            cache_storage: self.cache_storage,
            settings_store: self.settings_store,
            database_path: self.database_path,
            cache_ttl: self.cache_ttl.unwrap_or(DEFAULT_CACHE_TTL),
            url_validity,
            artist_name: self
                .artist_name
                .unwrap_or_else(|| DEFAULT_ARTIST_NAME.to_string()),
            upcoming_fallback_days: self
                .upcoming_fallback_days
                .unwrap_or(DEFAULT_UPCOMING_FALLBACK_DAYS),
        };

        config.validate()?;

        Ok(config)
    }
}
