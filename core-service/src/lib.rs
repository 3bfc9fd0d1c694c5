//! Core service façade and bootstrap helpers.
//!
//! This crate wires a validated [`CoreConfig`] into the offline catalog core:
//! the catalog scanner, the asset cache, URL resolution and player state.
//! Desktop apps typically enable the `desktop-shims` feature so that the
//! HTTP client, task spawner and SQLite-backed stores fall back to the
//! `bridge-desktop` adapters; other hosts inject their own.
//!
//! ```ignore
//! use core_runtime::config::CoreConfig;
//! use core_service::CoreService;
//!
//! let config = CoreConfig::builder()
//!     .access_url_issuer(issuer)
//!     .object_store(bucket)
//!     .database_path("/path/to/offline.db")
//!     .build()?;
//!
//! let core = CoreService::bootstrap(config).await?;
//! let catalog = core.resolver().scan_catalog().await?;
//! let cover = core.resolver().resolve_album_cover_url(&catalog.albums[0]).await?;
//! ```

pub mod error;
pub mod player_state;
pub mod resolver;

pub use error::{Result, ServiceError};
pub use player_state::{PlayerState, PlayerStateStore, RestoredSession};
pub use resolver::{ResolutionService, ResolvedUrl};

use std::sync::Arc;

use core_cache::{AssetCacheStore, CacheConfig};
use core_catalog::{CatalogConfig, CatalogScanner, CatalogSource};
use core_runtime::config::CoreConfig;
use tracing::{info, instrument};

/// Primary façade exposed to host applications.
#[derive(Clone)]
pub struct CoreService {
    config: Arc<CoreConfig>,
    cache: Arc<AssetCacheStore>,
    catalog: Arc<dyn CatalogSource>,
    resolver: ResolutionService,
    player_state: PlayerStateStore,
}

impl CoreService {
    /// Wire every component from `config`.
    ///
    /// Opens the default storage backends when none were injected. The
    /// cache itself is not touched yet; see [`initialize`](Self::initialize).
    #[instrument(skip(config))]
    pub async fn new(config: CoreConfig) -> Result<Self> {
        config.validate()?;

        let cache_storage = config.cache_storage().await?;
        let settings_store = config.settings_store().await?;

        let cache = Arc::new(AssetCacheStore::new(
            cache_storage,
            Arc::clone(&config.http_client),
            Arc::clone(&config.clock),
            CacheConfig::default().with_ttl(config.cache_ttl),
        )?);

        let catalog_config = CatalogConfig::default()
            .with_artist_name(config.artist_name.clone())
            .with_upcoming_fallback_days(config.upcoming_fallback_days);
        let catalog: Arc<dyn CatalogSource> = Arc::new(CatalogScanner::new(
            Arc::clone(&config.object_store),
            Arc::clone(&config.clock),
            catalog_config,
        )?);

        let resolver = ResolutionService::new(
            Arc::clone(&config.access_url_issuer),
            Arc::clone(&cache),
            Arc::clone(&catalog),
            Arc::clone(&config.task_spawner),
        );

        Ok(Self {
            config: Arc::new(config),
            cache,
            catalog,
            resolver,
            player_state: PlayerStateStore::new(settings_store),
        })
    }

    /// Construct and initialize in one step.
    pub async fn bootstrap(config: CoreConfig) -> Result<Self> {
        let service = Self::new(config).await?;
        service.initialize().await;
        Ok(service)
    }

    /// Open the cache regions. Returns whether the cache is usable; a
    /// `false` here leaves every cache lookup a miss but is not an error.
    #[instrument(skip(self))]
    pub async fn initialize(&self) -> bool {
        let available = self.cache.init().await;
        let stats = self.cache.stats().await;
        info!(
            cache_available = available,
            album_records = stats.album_records,
            release_records = stats.release_records,
            binary_entries = stats.binary_entries,
            binary_bytes = stats.binary_bytes,
            url_validity_secs = self.config.url_validity.as_secs(),
            "Core service initialized"
        );
        available
    }

    pub fn config(&self) -> &CoreConfig {
        &self.config
    }

    pub fn cache(&self) -> &Arc<AssetCacheStore> {
        &self.cache
    }

    pub fn catalog(&self) -> Arc<dyn CatalogSource> {
        Arc::clone(&self.catalog)
    }

    pub fn resolver(&self) -> &ResolutionService {
        &self.resolver
    }

    pub fn player_state(&self) -> &PlayerStateStore {
        &self.player_state
    }
}
