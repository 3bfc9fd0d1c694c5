//! Domain models for the catalog
//!
//! All ids are derived strings. `Song::album_id` is the canonical link back
//! to its album; `album_title` exists for display only.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A single track inside an album folder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Song {
    /// `<album id>-<slugified file stem>`
    pub id: String,
    pub title: String,
    pub artist: String,
    /// Object-store key of the audio file
    pub key: String,
    /// Zero until the player has loaded the audio
    pub duration_secs: u32,
    pub album_id: String,
    pub album_title: String,
}

/// An album folder with a cover and zero or more songs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Album {
    pub id: String,
    pub title: String,
    pub artist: String,
    pub cover_key: String,
    pub songs: Vec<Song>,
}

impl Album {
    pub fn song(&self, song_id: &str) -> Option<&Song> {
        self.songs.iter().find(|s| s.id == song_id)
    }

    pub fn song_by_key(&self, key: &str) -> Option<&Song> {
        self.songs.iter().find(|s| s.key == key)
    }

    /// Iterate song keys in album order.
    pub fn song_keys(&self) -> impl Iterator<Item = &str> {
        self.songs.iter().map(|s| s.key.as_str())
    }
}

/// The two singleton release slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReleaseSlot {
    Latest,
    Upcoming,
}

impl ReleaseSlot {
    /// Entity id of the slot, stable across scans.
    pub fn entity_id(&self) -> &'static str {
        match self {
            ReleaseSlot::Latest => "latest-release",
            ReleaseSlot::Upcoming => "upcoming-release",
        }
    }

    /// Title used when the cover filename carries none.
    pub fn default_title(&self) -> &'static str {
        match self {
            ReleaseSlot::Latest => "Latest Release",
            ReleaseSlot::Upcoming => "Coming Soon",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ReleaseSlot::Latest => "latest",
            ReleaseSlot::Upcoming => "upcoming",
        }
    }
}

impl fmt::Display for ReleaseSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A latest or upcoming release.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Release {
    pub id: String,
    pub slot: ReleaseSlot,
    pub title: String,
    pub artist: String,
    pub cover_key: String,
    pub release_date: NaiveDate,
    /// Preview audio; upcoming releases often have none yet
    pub audio_key: Option<String>,
}

impl Release {
    /// Key used to look up the cached audio, empty when there is no preview.
    pub fn audio_key_or_empty(&self) -> &str {
        self.audio_key.as_deref().unwrap_or("")
    }

    /// Same objects under the same title. The date is left out because a
    /// dateless cover gets a fallback date that moves with the clock.
    pub fn same_media(&self, other: &Release) -> bool {
        self.cover_key == other.cover_key
            && self.audio_key == other.audio_key
            && self.title == other.title
    }
}

/// Result of a full catalog scan.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogSnapshot {
    /// Albums in first-seen folder order
    pub albums: Vec<Album>,
    /// Every song of every album, flattened in the same order
    pub songs: Vec<Song>,
}

impl CatalogSnapshot {
    pub fn album(&self, album_id: &str) -> Option<&Album> {
        self.albums.iter().find(|a| a.id == album_id)
    }

    pub fn album_index(&self, album_id: &str) -> Option<usize> {
        self.albums.iter().position(|a| a.id == album_id)
    }

    pub fn song(&self, song_id: &str) -> Option<&Song> {
        self.songs.iter().find(|s| s.id == song_id)
    }

    pub fn is_empty(&self) -> bool {
        self.albums.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn album() -> Album {
        let song = |n: &str| Song {
            id: format!("my-beats-{}", n),
            title: n.to_string(),
            artist: "DRIP SIFU".to_string(),
            key: format!("albums/my-beats/{}.mp3", n),
            duration_secs: 0,
            album_id: "my-beats".to_string(),
            album_title: "my beats".to_string(),
        };
        Album {
            id: "my-beats".to_string(),
            title: "my beats".to_string(),
            artist: "DRIP SIFU".to_string(),
            cover_key: "albums/my-beats/cover.jpg".to_string(),
            songs: vec![song("one"), song("two")],
        }
    }

    #[test]
    fn test_album_lookups() {
        let album = album();
        assert_eq!(album.song("my-beats-two").unwrap().title, "two");
        assert!(album.song_by_key("albums/my-beats/one.mp3").is_some());
        assert_eq!(album.song_keys().count(), 2);
    }

    #[test]
    fn test_release_slot_identity() {
        assert_eq!(ReleaseSlot::Latest.entity_id(), "latest-release");
        assert_eq!(ReleaseSlot::Upcoming.entity_id(), "upcoming-release");
        assert_eq!(ReleaseSlot::Upcoming.default_title(), "Coming Soon");
    }

    #[test]
    fn test_release_date_serializes_as_iso() {
        let release = Release {
            id: "latest-release".to_string(),
            slot: ReleaseSlot::Latest,
            title: "Fortune Cookies".to_string(),
            artist: "DRIP SIFU".to_string(),
            cover_key: "latest/Fortune-Cookies-2025-09-20.jpg".to_string(),
            release_date: NaiveDate::from_ymd_opt(2025, 9, 20).unwrap(),
            audio_key: None,
        };

        let json = serde_json::to_value(&release).unwrap();
        assert_eq!(json["release_date"], "2025-09-20");
        assert_eq!(json["slot"], "latest");
        assert_eq!(release.audio_key_or_empty(), "");
    }

    #[test]
    fn test_same_media_ignores_date() {
        let release = Release {
            id: "upcoming-release".to_string(),
            slot: ReleaseSlot::Upcoming,
            title: "Coming Soon".to_string(),
            artist: "DRIP SIFU".to_string(),
            cover_key: "upcoming/cover.jpg".to_string(),
            release_date: NaiveDate::from_ymd_opt(2025, 4, 9).unwrap(),
            audio_key: None,
        };

        let next_day = Release {
            release_date: NaiveDate::from_ymd_opt(2025, 4, 10).unwrap(),
            ..release.clone()
        };
        assert!(release.same_media(&next_day));

        let with_preview = Release {
            audio_key: Some("upcoming/preview.mp3".to_string()),
            ..release.clone()
        };
        assert!(!release.same_media(&with_preview));
    }
}
