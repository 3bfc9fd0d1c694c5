//! # URL Resolution
//!
//! Turns catalog entries into something playable: a local handle when the
//! asset cache has the body, a freshly signed URL otherwise. Cache fills are
//! never awaited on the resolution path; they are handed to the
//! [`TaskSpawner`] and their failures only logged.

use bridge_traits::{AccessUrlIssuer, TaskSpawner};
use core_cache::{AssetCacheStore, CacheOutcome, LocalHandle};
use core_catalog::{Album, CatalogSnapshot, CatalogSource, Release, ReleaseSlot};
use core_runtime::logging::redact_signed_url;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

use crate::error::{Result, ServiceError};

/// Where a caller should load an asset from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedUrl {
    /// Served from the asset cache
    Local(LocalHandle),
    /// Signed remote URL, valid for the issuer's window
    Remote(String),
}

impl ResolvedUrl {
    pub fn as_str(&self) -> &str {
        match self {
            ResolvedUrl::Local(handle) => handle.url(),
            ResolvedUrl::Remote(url) => url,
        }
    }

    pub fn is_local(&self) -> bool {
        matches!(self, ResolvedUrl::Local(_))
    }
}

impl fmt::Display for ResolvedUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResolvedUrl::Local(handle) => f.write_str(handle.url()),
            ResolvedUrl::Remote(url) => f.write_str(&redact_signed_url(url)),
        }
    }
}

/// Cache-first resolution of covers and audio.
///
/// Cheap to clone; clones share the same cache, issuer and catalog.
#[derive(Clone)]
pub struct ResolutionService {
    issuer: Arc<dyn AccessUrlIssuer>,
    cache: Arc<AssetCacheStore>,
    catalog: Arc<dyn CatalogSource>,
    spawner: Arc<dyn TaskSpawner>,
}

impl ResolutionService {
    pub fn new(
        issuer: Arc<dyn AccessUrlIssuer>,
        cache: Arc<AssetCacheStore>,
        catalog: Arc<dyn CatalogSource>,
        spawner: Arc<dyn TaskSpawner>,
    ) -> Self {
        Self {
            issuer,
            cache,
            catalog,
            spawner,
        }
    }

    async fn sign(&self, key: &str) -> Result<String> {
        self.issuer
            .issue_access_url(key)
            .await
            .map_err(|source| ServiceError::Resolution {
                key: key.to_string(),
                source,
            })
    }

    /// Playable URL for one song.
    ///
    /// Only an issuer failure is returned; a cache miss just falls through
    /// to signing.
    #[instrument(skip(self))]
    pub async fn resolve_song_url(&self, song_key: &str, album_id: &str) -> Result<ResolvedUrl> {
        if let Some(handle) = self.cache.get_song_url(album_id, song_key).await {
            debug!("Song served from cache");
            return Ok(ResolvedUrl::Local(handle));
        }
        Ok(ResolvedUrl::Remote(self.sign(song_key).await?))
    }

    /// Displayable URL for an album cover.
    ///
    /// On a miss the signed URL is returned immediately and the cover is
    /// fetched into the cache in the background.
    #[instrument(skip(self, album), fields(album_id = %album.id))]
    pub async fn resolve_album_cover_url(&self, album: &Album) -> Result<ResolvedUrl> {
        if let Some(handle) = self.cache.get_cover_url(&album.id).await {
            return Ok(ResolvedUrl::Local(handle));
        }

        let url = self.sign(&album.cover_key).await?;

        let cache = Arc::clone(&self.cache);
        let album = album.clone();
        let fill_url = url.clone();
        self.spawner.spawn(
            "album-cover-fill",
            Box::pin(async move {
                if let Err(e) = cache.cache_album_cover(&album, &fill_url).await {
                    debug!(album_id = %album.id, error = %e, "Cover side-fetch failed");
                }
            }),
        );

        Ok(ResolvedUrl::Remote(url))
    }

    #[instrument(skip(self, release), fields(release_id = %release.id))]
    pub async fn resolve_release_cover_url(&self, release: &Release) -> Result<ResolvedUrl> {
        if let Some(handle) = self.cache.get_release_cover_url(&release.id).await {
            return Ok(ResolvedUrl::Local(handle));
        }
        Ok(ResolvedUrl::Remote(self.sign(&release.cover_key).await?))
    }

    /// `None` when the release has no preview audio.
    #[instrument(skip(self, release), fields(release_id = %release.id))]
    pub async fn resolve_release_audio_url(&self, release: &Release) -> Result<Option<ResolvedUrl>> {
        let Some(audio_key) = release.audio_key.as_deref() else {
            return Ok(None);
        };
        if let Some(handle) = self.cache.get_release_audio_url(&release.id).await {
            return Ok(Some(ResolvedUrl::Local(handle)));
        }
        Ok(Some(ResolvedUrl::Remote(self.sign(audio_key).await?)))
    }

    /// Make sure an album's cover and songs are in the cache.
    ///
    /// Does nothing if the album is already cached. Songs whose key cannot be
    /// signed are left out; nothing is reported to the caller.
    #[instrument(skip(self, album), fields(album_id = %album.id))]
    pub async fn ensure_album_cached(&self, album: &Album) {
        if self.cache.is_cached(&album.id).await {
            debug!("Album already cached");
            return;
        }

        let cover_url = match self.sign(&album.cover_key).await {
            Ok(url) => url,
            Err(e) => {
                warn!(error = %e, "Cannot cache album without a cover URL");
                return;
            }
        };

        let mut song_urls = HashMap::with_capacity(album.songs.len());
        for song in &album.songs {
            match self.sign(&song.key).await {
                Ok(url) => {
                    song_urls.insert(song.key.clone(), url);
                }
                Err(e) => warn!(song_key = %song.key, error = %e, "Skipping unsigned song"),
            }
        }

        match self.cache.cache_album(album, &cover_url, &song_urls).await {
            CacheOutcome::Cached { cover, audio } => {
                info!(cover_stored = cover, songs_stored = audio, "Album warmed")
            }
            outcome => debug!(?outcome, "Album not cached"),
        }
    }

    /// Background variant of [`ensure_album_cached`](Self::ensure_album_cached).
    pub fn warm_album(&self, album: &Album) {
        let this = self.clone();
        let album = album.clone();
        self.spawner.spawn(
            "album-warm",
            Box::pin(async move { this.ensure_album_cached(&album).await }),
        );
    }

    /// Current latest release, with a background cache fill.
    pub async fn latest_release(&self) -> Option<Release> {
        self.release(ReleaseSlot::Latest).await
    }

    /// Current upcoming release, with a background cache fill.
    pub async fn upcoming_release(&self) -> Option<Release> {
        self.release(ReleaseSlot::Upcoming).await
    }

    #[instrument(skip(self))]
    async fn release(&self, slot: ReleaseSlot) -> Option<Release> {
        let release = match self.catalog.release(slot).await {
            Ok(Some(release)) => release,
            Ok(None) => {
                debug!("No release in slot");
                return None;
            }
            Err(e) => {
                warn!(error = %e, "Release lookup failed");
                return None;
            }
        };

        let unchanged = self
            .cache
            .cached_release(&release.id)
            .await
            .is_some_and(|cached| cached.same_media(&release));
        if unchanged && self.cache.is_release_cached(&release.id).await {
            debug!("Release already cached");
            return Some(release);
        }

        let cover_url = match self.sign(&release.cover_key).await {
            Ok(url) => url,
            Err(e) => {
                warn!(error = %e, "Release cover could not be signed");
                return None;
            }
        };

        let audio_url = match release.audio_key.as_deref() {
            Some(key) => match self.sign(key).await {
                Ok(url) => Some(url),
                Err(e) => {
                    warn!(error = %e, "Release audio could not be signed");
                    None
                }
            },
            None => None,
        };

        let cache = Arc::clone(&self.cache);
        let snapshot = release.clone();
        self.spawner.spawn(
            "release-fill",
            Box::pin(async move {
                cache
                    .cache_release(&snapshot, &cover_url, audio_url.as_deref())
                    .await;
            }),
        );

        Some(release)
    }

    /// Rescan the catalog.
    pub async fn scan_catalog(&self) -> Result<CatalogSnapshot> {
        Ok(self.catalog.scan().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remote_display_is_redacted() {
        let url = ResolvedUrl::Remote("https://cdn/a.mp3?X-Amz-Signature=abc".to_string());
        assert_eq!(url.as_str(), "https://cdn/a.mp3?X-Amz-Signature=abc");
        assert_eq!(url.to_string(), "https://cdn/a.mp3?[REDACTED]");
        assert!(!url.is_local());
    }
}
