//! Shared fakes for cache integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use bridge_traits::error::Result as BridgeResult;
use bridge_traits::http::{HttpClient, HttpRequest, HttpResponse};
use bridge_traits::time::Clock;
use bytes::Bytes;
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use core_catalog::{Album, Release, ReleaseSlot, Song};
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use std::time::Duration;

/// Clock the test moves by hand.
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            now: Mutex::new(Utc.with_ymd_and_hms(2025, 3, 10, 12, 0, 0).unwrap()),
        }
    }

    pub fn advance(&self, by: chrono::Duration) {
        *self.now.lock() += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock()
    }
}

/// HTTP fake serving fixed bodies and counting requests per URL.
#[derive(Default)]
pub struct FakeHttp {
    bodies: HashMap<String, Bytes>,
    failing: HashSet<String>,
    delay: Option<Duration>,
    calls: Mutex<HashMap<String, usize>>,
}

impl FakeHttp {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn serve(mut self, url: &str, body: &'static [u8]) -> Self {
        self.bodies.insert(url.to_string(), Bytes::from_static(body));
        self
    }

    /// Serve the album cover and every song, each body being its object key.
    pub fn serve_album(mut self, album: &Album) -> Self {
        let keys = std::iter::once(&album.cover_key).chain(album.songs.iter().map(|s| &s.key));
        for key in keys {
            self.bodies
                .insert(signed(key), Bytes::from(key.clone().into_bytes()));
        }
        self
    }

    pub fn serve_release(mut self, release: &Release) -> Self {
        let keys = std::iter::once(&release.cover_key).chain(release.audio_key.iter());
        for key in keys {
            self.bodies
                .insert(signed(key), Bytes::from(key.clone().into_bytes()));
        }
        self
    }

    /// Answer `url` with a 500.
    pub fn fail(mut self, url: &str) -> Self {
        self.failing.insert(url.to_string());
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self, url: &str) -> usize {
        self.calls.lock().get(url).copied().unwrap_or(0)
    }

    pub fn total_calls(&self) -> usize {
        self.calls.lock().values().sum()
    }
}

#[async_trait]
impl HttpClient for FakeHttp {
    async fn execute(&self, request: HttpRequest) -> BridgeResult<HttpResponse> {
        *self.calls.lock().entry(request.url.clone()).or_default() += 1;

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let (status, body) = if self.failing.contains(&request.url) {
            (500, Bytes::new())
        } else if let Some(body) = self.bodies.get(&request.url) {
            (200, body.clone())
        } else {
            (404, Bytes::new())
        };

        Ok(HttpResponse {
            status,
            headers: HashMap::new(),
            body,
        })
    }
}

pub fn album(id: &str, song_count: usize) -> Album {
    let songs = (1..=song_count)
        .map(|n| Song {
            id: format!("{}-track-{}", id, n),
            title: format!("Track {}", n),
            artist: "DRIP SIFU".to_string(),
            key: format!("albums/{}/track-{}.mp3", id, n),
            duration_secs: 0,
            album_id: id.to_string(),
            album_title: id.replace('-', " "),
        })
        .collect();

    Album {
        id: id.to_string(),
        title: id.replace('-', " "),
        artist: "DRIP SIFU".to_string(),
        cover_key: format!("albums/{}/cover.jpg", id),
        songs,
    }
}

pub fn release(slot: ReleaseSlot, with_audio: bool) -> Release {
    Release {
        id: slot.entity_id().to_string(),
        slot,
        title: "Fortune Cookies".to_string(),
        artist: "DRIP SIFU".to_string(),
        cover_key: format!("{}/Fortune-Cookies-2025-09-20.jpg", slot.as_str()),
        release_date: NaiveDate::from_ymd_opt(2025, 9, 20).unwrap(),
        audio_key: with_audio.then(|| format!("{}/preview.mp3", slot.as_str())),
    }
}

/// Signed URL for `key`, the way the issuer would hand it out.
pub fn signed(key: &str) -> String {
    format!("https://cdn.test/{}?sig=abc", key)
}

pub fn song_urls(album: &Album) -> HashMap<String, String> {
    album
        .songs
        .iter()
        .map(|s| (s.key.clone(), signed(&s.key)))
        .collect()
}
