//! # Catalog Configuration

use crate::error::{CatalogError, Result};
use serde::{Deserialize, Serialize};

/// Settings for catalog scanning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// Artist credited on every album, song and release.
    pub artist_name: String,

    /// Days after today an upcoming release is dated when neither the cover
    /// filename nor the sidecar carries a date.
    pub upcoming_fallback_days: u32,

    /// Prefix under which each album is one folder. Default: `albums/`.
    pub albums_prefix: String,

    /// Prefix of the latest-release slot. Default: `latest/`.
    pub latest_prefix: String,

    /// Prefix of the upcoming-release slot. Default: `upcoming/`.
    pub upcoming_prefix: String,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            artist_name: "DRIP SIFU".to_string(),
            upcoming_fallback_days: 30,
            albums_prefix: "albums/".to_string(),
            latest_prefix: "latest/".to_string(),
            upcoming_prefix: "upcoming/".to_string(),
        }
    }
}

impl CatalogConfig {
    pub fn with_artist_name(mut self, name: impl Into<String>) -> Self {
        self.artist_name = name.into();
        self
    }

    pub fn with_upcoming_fallback_days(mut self, days: u32) -> Self {
        self.upcoming_fallback_days = days;
        self
    }

    pub fn with_albums_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.albums_prefix = prefix.into();
        self
    }

    pub fn with_latest_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.latest_prefix = prefix.into();
        self
    }

    pub fn with_upcoming_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.upcoming_prefix = prefix.into();
        self
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.artist_name.trim().is_empty() {
            return Err(CatalogError::InvalidConfig(
                "artist_name cannot be empty".to_string(),
            ));
        }

        for (name, prefix) in [
            ("albums_prefix", &self.albums_prefix),
            ("latest_prefix", &self.latest_prefix),
            ("upcoming_prefix", &self.upcoming_prefix),
        ] {
            if prefix.is_empty() || !prefix.ends_with('/') {
                return Err(CatalogError::InvalidConfig(format!(
                    "{} must be a non-empty folder prefix ending in '/', got {:?}",
                    name, prefix
                )));
            }
        }

        Ok(())
    }
}
