//! Persisted cache records
//!
//! Every metadata-region value is a JSON [`RecordEnvelope`]. Readers reject
//! envelopes with an unknown `version`; the store then deletes the record and
//! treats the entity as uncached.

use chrono::{DateTime, Utc};
use core_catalog::{Album, Release};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::error::{CacheError, Result};
use crate::handles::{HandleKey, HandleKind};

/// Current on-disk record version.
pub const RECORD_VERSION: u32 = 1;

/// Album snapshot plus the signed URLs its binaries were fetched from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CachedAlbum {
    pub album: Album,
    /// song key -> signed URL used at cache time (only songs that were stored)
    pub audio_urls: BTreeMap<String, String>,
    /// Recorded even if the cover fetch itself failed
    pub cover_url: String,
    pub timestamp: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl CachedAlbum {
    /// An album counts as cached once at least one song is stored.
    pub fn has_audio(&self) -> bool {
        !self.audio_urls.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CachedRelease {
    pub release: Release,
    pub cover_url: String,
    pub audio_url: Option<String>,
    pub timestamp: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

/// A metadata-region record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "data", rename_all = "snake_case")]
pub enum CacheRecord {
    Album(CachedAlbum),
    Release(CachedRelease),
}

impl CacheRecord {
    pub fn expires_at(&self) -> DateTime<Utc> {
        match self {
            CacheRecord::Album(a) => a.expires_at,
            CacheRecord::Release(r) => r.expires_at,
        }
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at()
    }

    /// Every binary-region key this record owns.
    pub fn binary_urls(&self) -> BTreeSet<&str> {
        match self {
            CacheRecord::Album(a) => std::iter::once(a.cover_url.as_str())
                .chain(a.audio_urls.values().map(String::as_str))
                .collect(),
            CacheRecord::Release(r) => std::iter::once(r.cover_url.as_str())
                .chain(r.audio_url.as_deref())
                .collect(),
        }
    }

    /// Each handle this record can back, paired with the binary key it reads.
    pub fn bindings(&self) -> Vec<(HandleKey, &str)> {
        match self {
            CacheRecord::Album(a) => {
                let mut out = vec![(HandleKey::album_cover(&a.album.id), a.cover_url.as_str())];
                out.extend(
                    a.audio_urls
                        .iter()
                        .map(|(key, url)| (HandleKey::album_song(&a.album.id, key), url.as_str())),
                );
                out
            }
            CacheRecord::Release(r) => {
                let mut out = vec![(HandleKey::release_cover(&r.release.id), r.cover_url.as_str())];
                if let Some(url) = &r.audio_url {
                    out.push((HandleKey::release_audio(&r.release.id), url.as_str()));
                }
                out
            }
        }
    }

    /// Handle kinds this record's entity can own.
    pub fn handle_kinds(&self) -> &'static [HandleKind] {
        match self {
            CacheRecord::Album(_) => &HandleKind::ALBUM,
            CacheRecord::Release(_) => &HandleKind::RELEASE,
        }
    }
}

/// Versioned wrapper stored in the metadata region.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordEnvelope {
    pub version: u32,
    pub record: CacheRecord,
}

/// Serialize a record inside a current-version envelope.
pub fn encode(record: &CacheRecord) -> Result<Vec<u8>> {
    #[derive(Serialize)]
    struct EnvelopeRef<'a> {
        version: u32,
        record: &'a CacheRecord,
    }

    Ok(serde_json::to_vec(&EnvelopeRef {
        version: RECORD_VERSION,
        record,
    })?)
}

/// Parse a stored envelope, rejecting unknown versions.
pub fn decode(bytes: &[u8]) -> Result<CacheRecord> {
    #[derive(Deserialize)]
    struct VersionHeader {
        version: u32,
    }

    let header: VersionHeader = serde_json::from_slice(bytes)?;
    if header.version != RECORD_VERSION {
        return Err(CacheError::UnsupportedVersion {
            found: header.version,
            expected: RECORD_VERSION,
        });
    }

    let envelope: RecordEnvelope = serde_json::from_slice(bytes)?;
    Ok(envelope.record)
}

/// Binary keys named by a record that [`decode`] rejected, as far as the
/// raw JSON can still be read.
pub fn salvage_urls(bytes: &[u8]) -> Vec<String> {
    let Ok(value) = serde_json::from_slice::<serde_json::Value>(bytes) else {
        return Vec::new();
    };

    let data = &value["record"]["data"];
    let mut urls: Vec<String> = ["cover_url", "audio_url"]
        .iter()
        .filter_map(|field| data[*field].as_str())
        .map(str::to_string)
        .collect();
    if let Some(songs) = data["audio_urls"].as_object() {
        urls.extend(songs.values().filter_map(|v| v.as_str()).map(str::to_string));
    }
    urls
}
