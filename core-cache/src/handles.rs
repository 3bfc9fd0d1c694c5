//! Local handles and their registry
//!
//! A [`LocalHandle`] is an in-process reference to cached bytes, rendered as
//! a `blob:` style URL the player or UI can consume directly. The
//! [`HandleRegistry`] guarantees that for any (kind, entity, sub-key) there is
//! at most one live handle: repeated lookups converge on the same handle
//! until a clear operation revokes it.

use bytes::Bytes;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use uuid::Uuid;

/// Which cached binary a handle refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HandleKind {
    AlbumCover,
    AlbumSong,
    ReleaseCover,
    ReleaseAudio,
}

impl HandleKind {
    pub const ALBUM: [HandleKind; 2] = [HandleKind::AlbumCover, HandleKind::AlbumSong];
    pub const RELEASE: [HandleKind; 2] = [HandleKind::ReleaseCover, HandleKind::ReleaseAudio];
}

/// Registry lookup key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct HandleKey {
    pub kind: HandleKind,
    pub entity_id: String,
    /// Song key for [`HandleKind::AlbumSong`], `None` otherwise
    pub sub_key: Option<String>,
}

impl HandleKey {
    pub fn album_cover(album_id: &str) -> Self {
        Self {
            kind: HandleKind::AlbumCover,
            entity_id: album_id.to_string(),
            sub_key: None,
        }
    }

    pub fn album_song(album_id: &str, song_key: &str) -> Self {
        Self {
            kind: HandleKind::AlbumSong,
            entity_id: album_id.to_string(),
            sub_key: Some(song_key.to_string()),
        }
    }

    pub fn release_cover(release_id: &str) -> Self {
        Self {
            kind: HandleKind::ReleaseCover,
            entity_id: release_id.to_string(),
            sub_key: None,
        }
    }

    pub fn release_audio(release_id: &str) -> Self {
        Self {
            kind: HandleKind::ReleaseAudio,
            entity_id: release_id.to_string(),
            sub_key: None,
        }
    }
}

/// Revocable reference to cached bytes.
///
/// Clones share revocation state. Equality is identity: two handles are
/// equal only if they came from the same allocation.
#[derive(Clone)]
pub struct LocalHandle {
    id: Uuid,
    url: Arc<str>,
    data: Bytes,
    revoked: Arc<AtomicBool>,
}

impl LocalHandle {
    pub fn new(data: Bytes) -> Self {
        let id = Uuid::new_v4();
        Self {
            id,
            url: Arc::from(format!("blob:offline/{}", id)),
            data,
            revoked: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    /// URL form, stable for the lifetime of the handle.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// The cached bytes, or `None` once revoked.
    pub fn bytes(&self) -> Option<Bytes> {
        (!self.is_revoked()).then(|| self.data.clone())
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn is_revoked(&self) -> bool {
        self.revoked.load(Ordering::Acquire)
    }

    pub(crate) fn revoke(&self) {
        self.revoked.store(true, Ordering::Release);
    }
}

impl PartialEq for LocalHandle {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for LocalHandle {}

impl fmt::Debug for LocalHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LocalHandle")
            .field("url", &self.url)
            .field("len", &self.data.len())
            .field("revoked", &self.is_revoked())
            .finish()
    }
}

struct Entry {
    /// Binary-region key the handle was read from
    source: String,
    handle: LocalHandle,
}

#[derive(Default)]
struct Entries {
    map: HashMap<HandleKey, Entry>,
    /// Bumped on every revocation request, even one that found nothing
    generation: u64,
}

impl Entries {
    fn take(&mut self, key: &HandleKey) -> bool {
        self.generation += 1;
        match self.map.remove(key) {
            Some(entry) => {
                entry.handle.revoke();
                true
            }
            None => false,
        }
    }
}

/// Per-process map of live handles.
///
/// Each entry remembers the binary key it was created from. A lookup naming
/// a different source revokes the entry instead of returning it, so a
/// handle never outlives the record binding that produced it.
#[derive(Default)]
pub struct HandleRegistry {
    entries: Mutex<Entries>,
}

impl HandleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Live handle for `key` backed by `source`. A handle backed by another
    /// source is revoked and `None` returned.
    pub fn get(&self, key: &HandleKey, source: &str) -> Option<LocalHandle> {
        let mut entries = self.entries.lock();
        match entries.map.get(key) {
            Some(entry) if entry.source == source => Some(entry.handle.clone()),
            Some(_) => {
                entries.take(key);
                None
            }
            None => None,
        }
    }

    /// Revocation counter, read before loading bytes for
    /// [`get_or_insert`](Self::get_or_insert).
    pub fn generation(&self) -> u64 {
        self.entries.lock().generation
    }

    /// Return the live handle for `key`, creating it from `data` if there is
    /// none. Concurrent callers converge on whichever handle was inserted
    /// first.
    ///
    /// Returns `None` without inserting when a revocation happened after
    /// `seen_generation` was read, since `data` may belong to a cleared
    /// entry.
    pub fn get_or_insert(
        &self,
        key: HandleKey,
        source: &str,
        data: Bytes,
        seen_generation: u64,
    ) -> Option<LocalHandle> {
        let mut entries = self.entries.lock();
        match entries.map.get(&key) {
            Some(entry) if entry.source == source => return Some(entry.handle.clone()),
            Some(_) => {
                // Superseded by the caller's own source, not a clear
                if let Some(stale) = entries.map.remove(&key) {
                    stale.handle.revoke();
                }
            }
            None => {}
        }
        if entries.generation != seen_generation {
            return None;
        }

        let handle = LocalHandle::new(data);
        entries.map.insert(
            key,
            Entry {
                source: source.to_string(),
                handle: handle.clone(),
            },
        );
        Some(handle)
    }

    /// Revoke and forget a single handle.
    pub fn revoke(&self, key: &HandleKey) -> bool {
        self.entries.lock().take(key)
    }

    /// Revoke and forget every handle of `kinds` for `entity_id`.
    pub fn revoke_entity(&self, kinds: &[HandleKind], entity_id: &str) -> usize {
        let mut entries = self.entries.lock();
        let mut revoked = 0;
        entries.map.retain(|key, entry| {
            let matches = key.entity_id == entity_id && kinds.contains(&key.kind);
            if matches {
                entry.handle.revoke();
                revoked += 1;
            }
            !matches
        });
        entries.generation += 1;
        revoked
    }

    /// Revoke and forget every handle.
    pub fn revoke_all(&self) -> usize {
        let mut entries = self.entries.lock();
        for entry in entries.map.values() {
            entry.handle.revoke();
        }
        let count = entries.map.len();
        entries.map.clear();
        entries.generation += 1;
        count
    }

    pub fn live_count(&self) -> usize {
        self.entries.lock().map.len()
    }
}
