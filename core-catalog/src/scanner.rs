//! Object-store backed catalog scanning.

use async_trait::async_trait;
use bridge_traits::{object_store::ObjectEntry, Clock, ObjectStore};
use chrono::{Days, NaiveDate};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

use crate::config::CatalogConfig;
use crate::error::Result;
use crate::models::{Album, CatalogSnapshot, Release, ReleaseSlot, Song};
use crate::naming;

/// Read access to the catalog.
#[async_trait]
pub trait CatalogSource: Send + Sync {
    /// Enumerate every album with its songs.
    async fn scan(&self) -> Result<CatalogSnapshot>;

    /// Look up the release occupying `slot`, `Ok(None)` if it has no cover.
    async fn release(&self, slot: ReleaseSlot) -> Result<Option<Release>>;
}

/// Builds the catalog by listing the object store.
pub struct CatalogScanner {
    store: Arc<dyn ObjectStore>,
    clock: Arc<dyn Clock>,
    config: CatalogConfig,
}

impl CatalogScanner {
    /// Create a scanner. Fails if `config` does not validate.
    pub fn new(
        store: Arc<dyn ObjectStore>,
        clock: Arc<dyn Clock>,
        config: CatalogConfig,
    ) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            store,
            clock,
            config,
        })
    }

    pub fn config(&self) -> &CatalogConfig {
        &self.config
    }

    fn slot_prefix(&self, slot: ReleaseSlot) -> &str {
        match slot {
            ReleaseSlot::Latest => &self.config.latest_prefix,
            ReleaseSlot::Upcoming => &self.config.upcoming_prefix,
        }
    }

    fn build_album(&self, folder: &str, entries: &[&ObjectEntry]) -> Option<Album> {
        let cover = entries.iter().find(|e| naming::is_cover_key(&e.key))?;

        let id = naming::album_id(folder);
        let title = naming::display_title(folder);

        let songs = entries
            .iter()
            .filter(|e| naming::is_audio_key(&e.key))
            .map(|e| {
                let stem = naming::file_stem(&e.key);
                Song {
                    id: naming::song_id(&id, stem),
                    title: naming::display_title(stem),
                    artist: self.config.artist_name.clone(),
                    key: e.key.clone(),
                    duration_secs: 0,
                    album_id: id.clone(),
                    album_title: title.clone(),
                }
            })
            .collect();

        Some(Album {
            id,
            title,
            artist: self.config.artist_name.clone(),
            cover_key: cover.key.clone(),
            songs,
        })
    }

    async fn read_sidecar(&self, key: &str) -> Option<naming::Sidecar> {
        match self.store.read_text(key).await {
            Ok(text) => Some(naming::parse_sidecar(&text)),
            Err(e) => {
                warn!(key = key, error = %e, "Failed to read release sidecar");
                None
            }
        }
    }

    fn fallback_date(&self, slot: ReleaseSlot) -> NaiveDate {
        let today = self.clock.now().date_naive();
        match slot {
            ReleaseSlot::Latest => today,
            ReleaseSlot::Upcoming => today
                .checked_add_days(Days::new(u64::from(self.config.upcoming_fallback_days)))
                .unwrap_or(today),
        }
    }
}

#[async_trait]
impl CatalogSource for CatalogScanner {
    #[instrument(skip(self))]
    async fn scan(&self) -> Result<CatalogSnapshot> {
        let prefix = self.config.albums_prefix.as_str();
        let entries = self.store.list_objects(prefix).await?;
        debug!(objects = entries.len(), "Listed album objects");

        // Folder order is first-seen order; a folder needs at least one key
        // below it (`albums/<folder>/<file>`).
        let mut folders: Vec<&str> = Vec::new();
        let mut by_folder: HashMap<&str, Vec<&ObjectEntry>> = HashMap::new();
        for entry in &entries {
            let Some(rest) = entry.key.strip_prefix(prefix) else {
                continue;
            };
            let Some((folder, _)) = rest.split_once('/') else {
                continue;
            };
            by_folder
                .entry(folder)
                .or_insert_with(|| {
                    folders.push(folder);
                    Vec::new()
                })
                .push(entry);
        }

        let mut snapshot = CatalogSnapshot::default();
        for folder in folders {
            let files = by_folder.get(folder).map(Vec::as_slice).unwrap_or(&[]);
            match self.build_album(folder, files) {
                Some(album) => {
                    snapshot.songs.extend(album.songs.iter().cloned());
                    snapshot.albums.push(album);
                }
                None => debug!(folder = folder, "Skipping album folder without cover"),
            }
        }

        info!(
            albums = snapshot.albums.len(),
            songs = snapshot.songs.len(),
            "Catalog scan complete"
        );
        Ok(snapshot)
    }

    #[instrument(skip(self))]
    async fn release(&self, slot: ReleaseSlot) -> Result<Option<Release>> {
        let entries = self.store.list_objects(self.slot_prefix(slot)).await?;

        let Some(cover) = entries.iter().find(|e| naming::is_cover_key(&e.key)) else {
            debug!(slot = %slot, "No release cover found");
            return Ok(None);
        };
        let audio_key = entries
            .iter()
            .find(|e| naming::is_audio_key(&e.key))
            .map(|e| e.key.clone());

        let parsed = naming::parse_cover_stem(naming::file_stem(&cover.key));
        let mut title = parsed.title;
        let mut release_date = parsed.release_date;

        if slot == ReleaseSlot::Upcoming && (release_date.is_none() || title.is_none()) {
            let sidecar_key = entries.iter().find(|e| naming::is_sidecar_key(&e.key));
            if let Some(sidecar_key) = sidecar_key {
                if let Some(sidecar) = self.read_sidecar(&sidecar_key.key).await {
                    release_date = release_date.or(sidecar.release_date);
                    title = title.or(sidecar.title);
                }
            }
        }

        let release = Release {
            id: slot.entity_id().to_string(),
            slot,
            title: title.unwrap_or_else(|| slot.default_title().to_string()),
            artist: self.config.artist_name.clone(),
            cover_key: cover.key.clone(),
            release_date: release_date.unwrap_or_else(|| self.fallback_date(slot)),
            audio_key,
        };

        debug!(
            slot = %slot,
            title = %release.title,
            release_date = %release.release_date,
            has_audio = release.audio_key.is_some(),
            "Resolved release"
        );
        Ok(Some(release))
    }
}
