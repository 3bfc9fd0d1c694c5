//! # Player State Persistence
//!
//! Remembers what was playing between sessions: album, song, position,
//! volume and the carousel page. Everything here is best-effort. A value
//! that cannot be read falls back to its default and a value that cannot be
//! written is logged and forgotten.

use bridge_traits::SettingsStore;
use core_catalog::{CatalogSnapshot, Song};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, instrument, warn};

pub const KEY_CURRENT_ALBUM_ID: &str = "music_player_current_album_id";
pub const KEY_CURRENT_SONG_ID: &str = "music_player_current_song_id";
pub const KEY_CURRENT_TIME: &str = "music_player_current_time";
pub const KEY_VOLUME: &str = "music_player_volume";
pub const KEY_ALBUM_INDEX: &str = "music_player_album_index";

pub const DEFAULT_VOLUME: f64 = 0.7;

/// Albums shown per carousel page.
pub const CAROUSEL_PAGE_SIZE: usize = 3;

/// Persisted player state as last saved.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayerState {
    pub current_album_id: Option<String>,
    pub current_song_id: Option<String>,
    /// Playback offset in seconds
    pub current_time: f64,
    /// 0.0 to 1.0
    pub volume: f64,
    /// First album index of the visible carousel page
    pub album_index: Option<usize>,
}

impl Default for PlayerState {
    fn default() -> Self {
        Self {
            current_album_id: None,
            current_song_id: None,
            current_time: 0.0,
            volume: DEFAULT_VOLUME,
            album_index: None,
        }
    }
}

/// Player state mapped onto a freshly scanned catalog.
#[derive(Debug, Clone, PartialEq)]
pub struct RestoredSession {
    pub song: Option<Song>,
    pub album_id: Option<String>,
    /// Seconds to seek to; zero unless the saved song was found
    pub position: f64,
    pub volume: f64,
    pub album_index: usize,
}

impl PlayerState {
    /// Map saved ids onto `catalog`.
    ///
    /// The saved song wins if it still exists, otherwise the first song of
    /// the catalog is selected and the saved position is dropped. The
    /// carousel keeps its saved page when still in range, otherwise it opens
    /// on the page holding the saved album.
    pub fn restore(&self, catalog: &CatalogSnapshot) -> RestoredSession {
        let saved_song = self
            .current_song_id
            .as_deref()
            .and_then(|id| catalog.song(id));

        let (song, position) = match saved_song {
            Some(song) => (Some(song.clone()), self.current_time),
            None => (catalog.songs.first().cloned(), 0.0),
        };

        let album_id = song
            .as_ref()
            .map(|s| s.album_id.clone())
            .or_else(|| self.current_album_id.clone());

        let album_index = match self.album_index {
            Some(index) if index < catalog.albums.len() => index,
            _ => self
                .current_album_id
                .as_deref()
                .and_then(|id| catalog.album_index(id))
                .map(|pos| pos - pos % CAROUSEL_PAGE_SIZE)
                .unwrap_or(0),
        };

        RestoredSession {
            song,
            album_id,
            position,
            volume: self.volume,
            album_index,
        }
    }
}

/// Reads and writes [`PlayerState`] through a [`SettingsStore`].
#[derive(Clone)]
pub struct PlayerStateStore {
    settings: Arc<dyn SettingsStore>,
}

impl PlayerStateStore {
    pub fn new(settings: Arc<dyn SettingsStore>) -> Self {
        Self { settings }
    }

    /// Load the saved state. Never fails.
    #[instrument(skip(self))]
    pub async fn load(&self) -> PlayerState {
        let defaults = PlayerState::default();

        let current_time = self
            .read_f64(KEY_CURRENT_TIME)
            .await
            .filter(|t| t.is_finite() && *t >= 0.0)
            .unwrap_or(defaults.current_time);

        let volume = self
            .read_f64(KEY_VOLUME)
            .await
            .filter(|v| v.is_finite())
            .map(|v| v.clamp(0.0, 1.0))
            .unwrap_or(defaults.volume);

        let album_index = self
            .read_i64(KEY_ALBUM_INDEX)
            .await
            .and_then(|i| usize::try_from(i).ok());

        PlayerState {
            current_album_id: self.read_id(KEY_CURRENT_ALBUM_ID).await,
            current_song_id: self.read_id(KEY_CURRENT_SONG_ID).await,
            current_time,
            volume,
            album_index,
        }
    }

    /// Persist every field. Failures are logged per key.
    #[instrument(skip(self, state))]
    pub async fn save(&self, state: &PlayerState) {
        self.write_id(KEY_CURRENT_ALBUM_ID, state.current_album_id.as_deref())
            .await;
        self.write_id(KEY_CURRENT_SONG_ID, state.current_song_id.as_deref())
            .await;

        if let Err(e) = self.settings.set_f64(KEY_CURRENT_TIME, state.current_time).await {
            warn!(key = KEY_CURRENT_TIME, error = %e, "Failed to save player state");
        }
        if let Err(e) = self.settings.set_f64(KEY_VOLUME, state.volume).await {
            warn!(key = KEY_VOLUME, error = %e, "Failed to save player state");
        }

        let index_result = match state.album_index {
            Some(index) => {
                self.settings
                    .set_i64(KEY_ALBUM_INDEX, i64::try_from(index).unwrap_or(i64::MAX))
                    .await
            }
            None => self.settings.delete(KEY_ALBUM_INDEX).await,
        };
        if let Err(e) = index_result {
            warn!(key = KEY_ALBUM_INDEX, error = %e, "Failed to save player state");
        }

        debug!("Player state saved");
    }

    /// Persist only the playback offset; called frequently while playing.
    pub async fn save_position(&self, seconds: f64) {
        if let Err(e) = self.settings.set_f64(KEY_CURRENT_TIME, seconds).await {
            warn!(key = KEY_CURRENT_TIME, error = %e, "Failed to save playback position");
        }
    }

    async fn read_id(&self, key: &str) -> Option<String> {
        match self.settings.get_string(key).await {
            Ok(value) => value.filter(|v| !v.trim().is_empty()),
            Err(e) => {
                debug!(key, error = %e, "Ignoring unreadable player setting");
                None
            }
        }
    }

    async fn read_f64(&self, key: &str) -> Option<f64> {
        match self.settings.get_f64(key).await {
            Ok(value) => value,
            Err(e) => {
                debug!(key, error = %e, "Ignoring unreadable player setting");
                None
            }
        }
    }

    async fn read_i64(&self, key: &str) -> Option<i64> {
        match self.settings.get_i64(key).await {
            Ok(value) => value,
            Err(e) => {
                debug!(key, error = %e, "Ignoring unreadable player setting");
                None
            }
        }
    }

    async fn write_id(&self, key: &str, value: Option<&str>) {
        let result = match value {
            Some(id) => self.settings.set_string(key, id).await,
            None => self.settings.delete(key).await,
        };
        if let Err(e) = result {
            warn!(key, error = %e, "Failed to save player state");
        }
    }
}
