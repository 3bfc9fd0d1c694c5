//! # Asset Cache Store
//!
//! Fetch-and-persist orchestration for album and release media.
//!
//! Storage failures never escape this module: an unavailable backend turns
//! every lookup into a miss and every write into a no-op. The only methods
//! that return errors are the ones whose caller explicitly decides what to do
//! with a failure ([`AssetCacheStore::cache_album_cover`]).

use bridge_traits::http::HttpClient;
use bridge_traits::storage::{CacheRegion, CacheStorage};
use bridge_traits::time::Clock;
use bytes::Bytes;
use core_catalog::{Album, Release};
use core_runtime::logging::redact_signed_url;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, instrument, warn};

use crate::busy::BusySet;
use crate::config::CacheConfig;
use crate::error::{CacheError, Result};
use crate::handles::{HandleKey, HandleKind, HandleRegistry, LocalHandle};
use crate::records::{self, CacheRecord, CachedAlbum, CachedRelease};
use crate::stats::CacheStats;

const ALBUM_PREFIX: &str = "album:";
const RELEASE_PREFIX: &str = "release:";

fn album_record_key(album_id: &str) -> String {
    format!("{}{}", ALBUM_PREFIX, album_id)
}

fn release_record_key(release_id: &str) -> String {
    format!("{}{}", RELEASE_PREFIX, release_id)
}

/// Handle kinds and entity id owned by a metadata key.
fn entity_of(key: &str) -> Option<(&'static [HandleKind], &str)> {
    const ALBUM: &[HandleKind] = &HandleKind::ALBUM;
    const RELEASE: &[HandleKind] = &HandleKind::RELEASE;

    if let Some(id) = key.strip_prefix(ALBUM_PREFIX) {
        Some((ALBUM, id))
    } else {
        key.strip_prefix(RELEASE_PREFIX).map(|id| (RELEASE, id))
    }
}

/// Result of a caching attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheOutcome {
    /// A record was written. `cover` reports whether the cover body was
    /// stored, `audio` how many audio bodies were.
    Cached { cover: bool, audio: usize },
    /// A live, complete record already existed.
    AlreadyCached,
    /// Another caching attempt for the same entity is in flight.
    Busy,
    /// Storage is unavailable; nothing was attempted.
    Unavailable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum InitState {
    Uninitialized,
    Ready,
    Unavailable,
}

/// Durable cache of catalog media with TTL-bounded records.
///
/// Construct once and share behind an `Arc`.
pub struct AssetCacheStore {
    storage: Arc<dyn CacheStorage>,
    http: Arc<dyn HttpClient>,
    clock: Arc<dyn Clock>,
    ttl: chrono::Duration,
    state: Mutex<InitState>,
    handles: HandleRegistry,
    busy: BusySet,
}

impl AssetCacheStore {
    /// Create a store. Storage is not touched until [`init`](Self::init) or
    /// the first operation.
    pub fn new(
        storage: Arc<dyn CacheStorage>,
        http: Arc<dyn HttpClient>,
        clock: Arc<dyn Clock>,
        config: CacheConfig,
    ) -> Result<Self> {
        config.validate()?;
        let ttl = config.ttl_chrono()?;

        Ok(Self {
            storage,
            http,
            clock,
            ttl,
            state: Mutex::new(InitState::Uninitialized),
            handles: HandleRegistry::new(),
            busy: BusySet::new(),
        })
    }

    /// Prepare both storage regions.
    ///
    /// Idempotent once it succeeds. After a failure the store stays in
    /// always-miss mode until `init` is called again.
    #[instrument(skip(self))]
    pub async fn init(&self) -> bool {
        let mut state = self.state.lock().await;
        if *state == InitState::Ready {
            return true;
        }
        *state = self.open_storage().await;
        *state == InitState::Ready
    }

    /// Whether storage opened successfully.
    pub async fn is_available(&self) -> bool {
        self.ensure_ready().await
    }

    async fn open_storage(&self) -> InitState {
        match self.storage.open().await {
            Ok(()) => {
                info!("Asset cache storage ready");
                InitState::Ready
            }
            Err(e) => {
                warn!(error = %e, "Asset cache storage unavailable; running without cache");
                InitState::Unavailable
            }
        }
    }

    async fn ensure_ready(&self) -> bool {
        let mut state = self.state.lock().await;
        if *state == InitState::Uninitialized {
            *state = self.open_storage().await;
        }
        *state == InitState::Ready
    }

    // ---------------------------------------------------------------------
    // Albums
    // ---------------------------------------------------------------------

    /// True if a live album record with at least one stored song exists.
    ///
    /// An expired record is evicted as a side effect.
    #[instrument(skip(self))]
    pub async fn is_cached(&self, album_id: &str) -> bool {
        if !self.ensure_ready().await {
            return false;
        }
        matches!(
            self.live_record(&album_record_key(album_id)).await,
            Some(CacheRecord::Album(ref album)) if album.has_audio()
        )
    }

    /// Fetch and persist an album's cover and songs.
    ///
    /// Songs with no entry in `song_urls` are skipped. Individual fetch
    /// failures are logged and skipped; the record reflects whatever subset
    /// succeeded.
    #[instrument(skip(self, album, cover_url, song_urls), fields(album_id = %album.id))]
    pub async fn cache_album(
        &self,
        album: &Album,
        cover_url: &str,
        song_urls: &HashMap<String, String>,
    ) -> CacheOutcome {
        if !self.ensure_ready().await {
            return CacheOutcome::Unavailable;
        }

        let Some(_guard) = self.busy.try_acquire(&album.id) else {
            debug!("Album caching already in progress");
            return CacheOutcome::Busy;
        };

        if self.is_cached(&album.id).await {
            debug!("Album already cached");
            return CacheOutcome::AlreadyCached;
        }

        info!(songs = album.songs.len(), "Caching album");

        let cover = self.store_best_effort(cover_url).await;

        let mut audio_urls = BTreeMap::new();
        for song in &album.songs {
            let Some(url) = song_urls.get(&song.key) else {
                debug!(song_key = %song.key, "No URL for song; skipping");
                continue;
            };
            if self.store_best_effort(url).await {
                audio_urls.insert(song.key.clone(), url.clone());
            }
        }

        let stored = audio_urls.len();
        let now = self.clock.now();
        let record = CacheRecord::Album(CachedAlbum {
            album: album.clone(),
            audio_urls,
            cover_url: cover_url.to_string(),
            timestamp: now,
            expires_at: now + self.ttl,
        });

        if let Err(e) = self.replace_record(&album_record_key(&album.id), record).await {
            warn!(error = %e, "Failed to persist album record");
        }

        info!(
            cover_stored = cover,
            songs_stored = stored,
            songs_total = album.songs.len(),
            "Album cached"
        );
        CacheOutcome::Cached {
            cover,
            audio: stored,
        }
    }

    /// Fetch and store only the album cover, creating a minimal record if
    /// none exists.
    ///
    /// Unlike the other caching calls this returns its failure, so the caller
    /// can decide whether it matters.
    #[instrument(skip(self, album, cover_url), fields(album_id = %album.id))]
    pub async fn cache_album_cover(&self, album: &Album, cover_url: &str) -> Result<()> {
        if !self.ensure_ready().await {
            return Err(CacheError::Unavailable);
        }

        self.fetch_into_storage(cover_url).await?;

        let key = album_record_key(&album.id);
        let record = match self.live_record(&key).await {
            Some(CacheRecord::Album(mut existing)) => {
                existing.cover_url = cover_url.to_string();
                CacheRecord::Album(existing)
            }
            _ => {
                let now = self.clock.now();
                CacheRecord::Album(CachedAlbum {
                    album: album.clone(),
                    audio_urls: BTreeMap::new(),
                    cover_url: cover_url.to_string(),
                    timestamp: now,
                    expires_at: now + self.ttl,
                })
            }
        };

        self.replace_record(&key, record).await?;
        debug!("Album cover cached");
        Ok(())
    }

    /// Local handle for an album's cover, if cached.
    #[instrument(skip(self))]
    pub async fn get_cover_url(&self, album_id: &str) -> Option<LocalHandle> {
        let album = self.live_album(album_id).await?;
        self.handle_for(HandleKey::album_cover(album_id), &album.cover_url)
            .await
    }

    /// Local handle for one song of an album, if cached.
    #[instrument(skip(self))]
    pub async fn get_song_url(&self, album_id: &str, song_key: &str) -> Option<LocalHandle> {
        let album = self.live_album(album_id).await?;
        let url = album.audio_urls.get(song_key)?;
        self.handle_for(HandleKey::album_song(album_id, song_key), url)
            .await
    }

    /// Remove an album's record, binaries and handles.
    #[instrument(skip(self))]
    pub async fn clear_album(&self, album_id: &str) {
        self.clear_entity(&album_record_key(album_id), &HandleKind::ALBUM, album_id)
            .await;
    }

    // ---------------------------------------------------------------------
    // Releases
    // ---------------------------------------------------------------------

    /// True if a live release record exists and its cover body is stored.
    #[instrument(skip(self))]
    pub async fn is_release_cached(&self, release_id: &str) -> bool {
        let Some(release) = self.live_release(release_id).await else {
            return false;
        };
        match self
            .storage
            .contains(CacheRegion::Binary, &release.cover_url)
            .await
        {
            Ok(present) => present,
            Err(e) => {
                warn!(error = %e, "Failed to check release cover");
                false
            }
        }
    }

    /// Fetch and persist a release's cover and optional audio.
    #[instrument(skip(self, release, cover_url, audio_url), fields(release_id = %release.id))]
    pub async fn cache_release(
        &self,
        release: &Release,
        cover_url: &str,
        audio_url: Option<&str>,
    ) -> CacheOutcome {
        if !self.ensure_ready().await {
            return CacheOutcome::Unavailable;
        }

        let cover = self.store_best_effort(cover_url).await;

        let mut stored_audio = None;
        if let Some(url) = audio_url {
            if self.store_best_effort(url).await {
                stored_audio = Some(url.to_string());
            }
        }

        let audio = usize::from(stored_audio.is_some());
        let now = self.clock.now();
        let record = CacheRecord::Release(CachedRelease {
            release: release.clone(),
            cover_url: cover_url.to_string(),
            audio_url: stored_audio,
            timestamp: now,
            expires_at: now + self.ttl,
        });

        if let Err(e) = self
            .replace_record(&release_record_key(&release.id), record)
            .await
        {
            warn!(error = %e, "Failed to persist release record");
        }

        info!(cover_stored = cover, audio_stored = audio, "Release cached");
        CacheOutcome::Cached { cover, audio }
    }

    /// Release snapshot stored with the live record, if any.
    pub async fn cached_release(&self, release_id: &str) -> Option<Release> {
        self.live_release(release_id).await.map(|r| r.release)
    }

    #[instrument(skip(self))]
    pub async fn get_release_cover_url(&self, release_id: &str) -> Option<LocalHandle> {
        let release = self.live_release(release_id).await?;
        self.handle_for(HandleKey::release_cover(release_id), &release.cover_url)
            .await
    }

    #[instrument(skip(self))]
    pub async fn get_release_audio_url(&self, release_id: &str) -> Option<LocalHandle> {
        let release = self.live_release(release_id).await?;
        let url = release.audio_url.as_deref()?;
        self.handle_for(HandleKey::release_audio(release_id), url)
            .await
    }

    /// Remove a release's record, binaries and handles.
    #[instrument(skip(self))]
    pub async fn clear_release(&self, release_id: &str) {
        self.clear_entity(
            &release_record_key(release_id),
            &HandleKind::RELEASE,
            release_id,
        )
        .await;
    }

    // ---------------------------------------------------------------------
    // Whole-cache operations
    // ---------------------------------------------------------------------

    /// Revoke every handle, destroy both regions and reopen them empty.
    #[instrument(skip(self))]
    pub async fn clear_all(&self) {
        let revoked = self.handles.revoke_all();

        let mut state = self.state.lock().await;
        if let Err(e) = self.storage.destroy().await {
            warn!(error = %e, "Failed to destroy cache storage");
        }
        *state = self.open_storage().await;

        info!(revoked_handles = revoked, "Asset cache cleared");
    }

    /// Counts of records, binaries and live handles.
    #[instrument(skip(self))]
    pub async fn stats(&self) -> CacheStats {
        let mut stats = CacheStats {
            live_handles: self.handles.live_count(),
            ..CacheStats::default()
        };

        if !self.ensure_ready().await {
            return stats;
        }

        match self.storage.keys(CacheRegion::Metadata).await {
            Ok(keys) => {
                stats.album_records = keys.iter().filter(|k| k.starts_with(ALBUM_PREFIX)).count();
                stats.release_records =
                    keys.iter().filter(|k| k.starts_with(RELEASE_PREFIX)).count();
            }
            Err(e) => warn!(error = %e, "Failed to list cache records"),
        }

        match self.storage.keys(CacheRegion::Binary).await {
            Ok(keys) => stats.binary_entries = keys.len(),
            Err(e) => warn!(error = %e, "Failed to list cached binaries"),
        }

        match self.storage.total_bytes(CacheRegion::Binary).await {
            Ok(bytes) => stats.binary_bytes = bytes,
            Err(e) => warn!(error = %e, "Failed to size cached binaries"),
        }

        stats
    }

    // ---------------------------------------------------------------------
    // Internals
    // ---------------------------------------------------------------------

    async fn fetch_into_storage(&self, url: &str) -> Result<()> {
        if let Ok(true) = self.storage.contains(CacheRegion::Binary, url).await {
            return Ok(());
        }

        let body: Bytes = self
            .http
            .fetch_bytes(url)
            .await
            .map_err(|source| CacheError::Fetch {
                url: redact_signed_url(url),
                source,
            })?;

        self.storage.put(CacheRegion::Binary, url, body).await?;
        Ok(())
    }

    async fn store_best_effort(&self, url: &str) -> bool {
        match self.fetch_into_storage(url).await {
            Ok(()) => true,
            Err(e) => {
                warn!(url = %redact_signed_url(url), error = %e, "Skipping asset");
                false
            }
        }
    }

    /// Read and decode a record. Unreadable records are deleted.
    async fn load_record(&self, key: &str) -> Option<CacheRecord> {
        let bytes = match self.storage.get(CacheRegion::Metadata, key).await {
            Ok(found) => found?,
            Err(e) => {
                warn!(record = key, error = %e, "Failed to read cache record");
                return None;
            }
        };

        match records::decode(&bytes) {
            Ok(record) => Some(record),
            Err(e) => {
                warn!(record = key, error = %e, "Discarding unreadable cache record");
                self.discard_record(key, &bytes).await;
                None
            }
        }
    }

    /// Drop an undecodable record together with whatever it still names:
    /// the binaries readable from the raw JSON and every handle of its
    /// entity.
    async fn discard_record(&self, key: &str, raw: &[u8]) {
        for url in records::salvage_urls(raw) {
            self.delete_binary(&url).await;
        }
        if let Err(e) = self.storage.delete(CacheRegion::Metadata, key).await {
            warn!(record = key, error = %e, "Failed to delete unreadable record");
        }
        if let Some((kinds, entity_id)) = entity_of(key) {
            self.handles.revoke_entity(kinds, entity_id);
        }
    }

    /// Load a record, evicting it if expired.
    async fn live_record(&self, key: &str) -> Option<CacheRecord> {
        let record = self.load_record(key).await?;
        if record.is_expired(self.clock.now()) {
            debug!(record = key, expires_at = %record.expires_at(), "Cache record expired");
            self.evict(key, &record).await;
            return None;
        }
        Some(record)
    }

    async fn live_album(&self, album_id: &str) -> Option<CachedAlbum> {
        if !self.ensure_ready().await {
            return None;
        }
        match self.live_record(&album_record_key(album_id)).await? {
            CacheRecord::Album(album) => Some(album),
            CacheRecord::Release(_) => None,
        }
    }

    async fn live_release(&self, release_id: &str) -> Option<CachedRelease> {
        if !self.ensure_ready().await {
            return None;
        }
        match self.live_record(&release_record_key(release_id)).await? {
            CacheRecord::Release(release) => Some(release),
            CacheRecord::Album(_) => None,
        }
    }

    async fn handle_for(&self, key: HandleKey, url: &str) -> Option<LocalHandle> {
        if let Some(handle) = self.handles.get(&key, url) {
            return Some(handle);
        }

        let generation = self.handles.generation();
        match self.storage.get(CacheRegion::Binary, url).await {
            Ok(Some(body)) => {
                let handle = self.handles.get_or_insert(key, url, body, generation);
                if handle.is_none() {
                    debug!("Cache entry invalidated while loading; treating as miss");
                }
                handle
            }
            Ok(None) => None,
            Err(e) => {
                warn!(error = %e, "Failed to read cached binary");
                None
            }
        }
    }

    /// Persist `record` under `key`, retiring binaries and handles of the
    /// record it replaces that the new one no longer references.
    async fn replace_record(&self, key: &str, record: CacheRecord) -> Result<()> {
        let previous = self.load_record(key).await;

        let encoded = records::encode(&record)?;
        self.storage
            .put(CacheRegion::Metadata, key, Bytes::from(encoded))
            .await?;

        let Some(previous) = previous else {
            return Ok(());
        };

        let current = record.bindings();
        let still_used = record.binary_urls();
        for (handle_key, url) in previous.bindings() {
            let unchanged = current
                .iter()
                .any(|(k, u)| *k == handle_key && *u == url);
            if unchanged {
                continue;
            }
            self.handles.revoke(&handle_key);
            if !still_used.contains(url) {
                self.delete_binary(url).await;
            }
        }
        Ok(())
    }

    async fn evict(&self, key: &str, record: &CacheRecord) {
        for url in record.binary_urls() {
            self.delete_binary(url).await;
        }
        if let Err(e) = self.storage.delete(CacheRegion::Metadata, key).await {
            warn!(record = key, error = %e, "Failed to delete cache record");
        }
        let entity_id = match record {
            CacheRecord::Album(a) => a.album.id.as_str(),
            CacheRecord::Release(r) => r.release.id.as_str(),
        };
        self.handles.revoke_entity(record.handle_kinds(), entity_id);
    }

    async fn clear_entity(&self, key: &str, kinds: &[HandleKind], entity_id: &str) {
        if self.ensure_ready().await {
            if let Some(record) = self.load_record(key).await {
                self.evict(key, &record).await;
                info!(record = key, "Cache entry cleared");
            }
        }
        self.handles.revoke_entity(kinds, entity_id);
    }

    async fn delete_binary(&self, url: &str) {
        if let Err(e) = self.storage.delete(CacheRegion::Binary, url).await {
            warn!(url = %redact_signed_url(url), error = %e, "Failed to delete cached binary");
        }
    }
}
