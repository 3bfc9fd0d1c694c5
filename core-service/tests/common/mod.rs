//! Shared fakes for service integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use bridge_traits::error::{BridgeError, Result as BridgeResult};
use bridge_traits::object_store::ObjectEntry;
use bridge_traits::{
    AccessUrlIssuer, BoxTask, Clock, HttpClient, HttpRequest, HttpResponse, ObjectStore,
    SettingsStore, TaskSpawner,
};
use bytes::Bytes;
use chrono::{DateTime, TimeZone, Utc};
use mockall::mock;
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};

mock! {
    pub Issuer {}

    #[async_trait]
    impl AccessUrlIssuer for Issuer {
        async fn issue_access_url(&self, key: &str) -> BridgeResult<String>;
    }
}

pub fn signed(key: &str) -> String {
    format!("https://cdn.test/{}?X-Amz-Signature=abc", key)
}

/// Issuer that signs every key and accepts any number of calls.
pub fn signing_issuer() -> MockIssuer {
    let mut issuer = MockIssuer::new();
    issuer
        .expect_issue_access_url()
        .returning(|key| Ok(signed(key)));
    issuer
}

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

/// Object store over a fixed key list.
pub struct FakeBucket {
    keys: Vec<String>,
    broken: bool,
}

impl FakeBucket {
    pub fn new(keys: &[&str]) -> Self {
        Self {
            keys: keys.iter().map(|k| k.to_string()).collect(),
            broken: false,
        }
    }

    pub fn broken() -> Self {
        Self {
            keys: Vec::new(),
            broken: true,
        }
    }
}

#[async_trait]
impl ObjectStore for FakeBucket {
    async fn list_objects(&self, prefix: &str) -> BridgeResult<Vec<ObjectEntry>> {
        if self.broken {
            return Err(BridgeError::NotAvailable("bucket offline".to_string()));
        }
        Ok(self
            .keys
            .iter()
            .filter(|k| k.starts_with(prefix))
            .map(|k| ObjectEntry::new(k.clone()))
            .collect())
    }

    async fn read_text(&self, key: &str) -> BridgeResult<String> {
        Err(BridgeError::NotAvailable(key.to_string()))
    }
}

/// Serves the object key back as the body of its signed URL; counts calls.
#[derive(Default)]
pub struct EchoHttp {
    calls: Mutex<HashMap<String, usize>>,
    failing: HashSet<String>,
}

impl EchoHttp {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail(mut self, url: &str) -> Self {
        self.failing.insert(url.to_string());
        self
    }

    pub fn total_calls(&self) -> usize {
        self.calls.lock().values().sum()
    }
}

#[async_trait]
impl HttpClient for EchoHttp {
    async fn execute(&self, request: HttpRequest) -> BridgeResult<HttpResponse> {
        *self.calls.lock().entry(request.url.clone()).or_default() += 1;
        let status = if self.failing.contains(&request.url) { 503 } else { 200 };
        Ok(HttpResponse {
            status,
            headers: HashMap::new(),
            body: Bytes::from(request.url.into_bytes()),
        })
    }
}

/// Holds spawned tasks until the test runs them.
#[derive(Default)]
pub struct QueueSpawner {
    tasks: Mutex<Vec<(&'static str, BoxTask)>>,
}

impl QueueSpawner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pending(&self) -> Vec<&'static str> {
        self.tasks.lock().iter().map(|(name, _)| *name).collect()
    }

    /// Run every queued task to completion, including ones they queue.
    pub async fn run_all(&self) {
        loop {
            let batch: Vec<_> = std::mem::take(&mut *self.tasks.lock());
            if batch.is_empty() {
                break;
            }
            for (_, task) in batch {
                task.await;
            }
        }
    }
}

impl TaskSpawner for QueueSpawner {
    fn spawn(&self, name: &'static str, task: BoxTask) {
        self.tasks.lock().push((name, task));
    }
}

/// String-typed settings, parsed on read like browser local storage.
#[derive(Default)]
pub struct StringSettings {
    values: Mutex<HashMap<String, String>>,
}

impl StringSettings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn raw(&self, key: &str) -> Option<String> {
        self.values.lock().get(key).cloned()
    }

    fn parse<T: std::str::FromStr>(&self, key: &str) -> BridgeResult<Option<T>> {
        match self.values.lock().get(key) {
            None => Ok(None),
            Some(raw) => raw
                .parse()
                .map(Some)
                .map_err(|_| BridgeError::OperationFailed(format!("bad value for {}", key))),
        }
    }
}

#[async_trait]
impl SettingsStore for StringSettings {
    async fn set_string(&self, key: &str, value: &str) -> BridgeResult<()> {
        self.values.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn get_string(&self, key: &str) -> BridgeResult<Option<String>> {
        Ok(self.raw(key))
    }

    async fn set_i64(&self, key: &str, value: i64) -> BridgeResult<()> {
        self.set_string(key, &value.to_string()).await
    }

    async fn get_i64(&self, key: &str) -> BridgeResult<Option<i64>> {
        self.parse(key)
    }

    async fn set_f64(&self, key: &str, value: f64) -> BridgeResult<()> {
        self.set_string(key, &value.to_string()).await
    }

    async fn get_f64(&self, key: &str) -> BridgeResult<Option<f64>> {
        self.parse(key)
    }

    async fn delete(&self, key: &str) -> BridgeResult<()> {
        self.values.lock().remove(key);
        Ok(())
    }
}

/// Bucket layout with two albums and both release slots.
pub const CATALOG_KEYS: &[&str] = &[
    "albums/my-beats/cover.jpg",
    "albums/my-beats/Intro.mp3",
    "albums/my-beats/Late Night.mp3",
    "albums/Night Drive/cover.png",
    "albums/Night Drive/cruise.wav",
    "latest/Fortune-Cookies-2025-09-20.jpg",
    "latest/preview.mp3",
    "upcoming/cover.jpg",
];
