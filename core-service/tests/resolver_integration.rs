//! Cache-first resolution over fake bridges.

mod common;

use bridge_traits::error::BridgeError;
use chrono::NaiveDate;
use common::{
    signed, signing_issuer, EchoHttp, FakeBucket, ManualClock, MockIssuer, QueueSpawner,
    StringSettings, CATALOG_KEYS,
};
use core_cache::MemoryCacheStorage;
use core_catalog::CatalogSnapshot;
use core_runtime::config::CoreConfig;
use core_service::{CoreService, ResolvedUrl, ServiceError};
use std::sync::Arc;

struct Harness {
    core: CoreService,
    http: Arc<EchoHttp>,
    spawner: Arc<QueueSpawner>,
    clock: Arc<ManualClock>,
}

async fn harness_with(issuer: MockIssuer, bucket: FakeBucket, http: EchoHttp) -> Harness {
    let http = Arc::new(http);
    let spawner = Arc::new(QueueSpawner::new());
    let clock = Arc::new(ManualClock::new());

    let config = CoreConfig::builder()
        .access_url_issuer(Arc::new(issuer))
        .object_store(Arc::new(bucket))
        .http_client(http.clone())
        .task_spawner(spawner.clone())
        .clock(clock.clone())
        .cache_storage(Arc::new(MemoryCacheStorage::new()))
        .settings_store(Arc::new(StringSettings::new()))
        .build()
        .unwrap();

    let core = CoreService::bootstrap(config).await.unwrap();
    Harness {
        core,
        http,
        spawner,
        clock,
    }
}

async fn harness() -> Harness {
    harness_with(signing_issuer(), FakeBucket::new(CATALOG_KEYS), EchoHttp::new()).await
}

async fn catalog(h: &Harness) -> CatalogSnapshot {
    h.core.resolver().scan_catalog().await.unwrap()
}

#[tokio::test]
async fn test_song_miss_returns_signed_url_without_caching() {
    let h = harness().await;

    let url = h
        .core
        .resolver()
        .resolve_song_url("albums/my-beats/Intro.mp3", "my-beats")
        .await
        .unwrap();

    assert_eq!(url, ResolvedUrl::Remote(signed("albums/my-beats/Intro.mp3")));
    assert!(h.spawner.pending().is_empty());
    assert_eq!(h.http.total_calls(), 0);
}

#[tokio::test]
async fn test_ensure_album_cached_signs_and_fetches_once() {
    let mut issuer = MockIssuer::new();
    issuer
        .expect_issue_access_url()
        .times(3)
        .returning(|key| Ok(signed(key)));
    let h = harness_with(issuer, FakeBucket::new(CATALOG_KEYS), EchoHttp::new()).await;
    let catalog = catalog(&h).await;
    let album = catalog.album("my-beats").unwrap();

    h.core.resolver().ensure_album_cached(album).await;
    h.core.resolver().ensure_album_cached(album).await;

    assert_eq!(h.http.total_calls(), 3);
    assert!(h.core.cache().is_cached("my-beats").await);

    let song = &album.songs[1];
    let first = h
        .core
        .resolver()
        .resolve_song_url(&song.key, &album.id)
        .await
        .unwrap();
    let second = h
        .core
        .resolver()
        .resolve_song_url(&song.key, &album.id)
        .await
        .unwrap();

    assert!(first.is_local());
    assert_eq!(first, second);
    assert!(first.as_str().starts_with("blob:offline/"));
}

#[tokio::test]
async fn test_cover_miss_schedules_side_fetch() {
    let h = harness().await;
    let catalog = catalog(&h).await;
    let album = catalog.album("night-drive").unwrap();

    let first = h.core.resolver().resolve_album_cover_url(album).await.unwrap();
    assert_eq!(first, ResolvedUrl::Remote(signed("albums/Night Drive/cover.png")));
    assert_eq!(h.spawner.pending(), vec!["album-cover-fill"]);

    h.spawner.run_all().await;

    let second = h.core.resolver().resolve_album_cover_url(album).await.unwrap();
    assert!(second.is_local());
    assert!(!h.core.cache().is_cached("night-drive").await);
    assert!(h.spawner.pending().is_empty());
}

#[tokio::test]
async fn test_cover_side_fetch_failure_is_swallowed() {
    let url = signed("albums/Night Drive/cover.png");
    let h = harness_with(
        signing_issuer(),
        FakeBucket::new(CATALOG_KEYS),
        EchoHttp::new().fail(&url),
    )
    .await;
    let catalog = catalog(&h).await;
    let album = catalog.album("night-drive").unwrap();

    let resolved = h.core.resolver().resolve_album_cover_url(album).await.unwrap();
    h.spawner.run_all().await;

    assert_eq!(resolved, ResolvedUrl::Remote(url));
    assert!(h.core.cache().get_cover_url("night-drive").await.is_none());
}

#[tokio::test]
async fn test_issuer_failure_propagates() {
    let mut issuer = MockIssuer::new();
    issuer
        .expect_issue_access_url()
        .returning(|_| Err(BridgeError::Signing {
            key: "albums/my-beats/Intro.mp3".to_string(),
            message: "credentials expired".to_string(),
        }));
    let h = harness_with(issuer, FakeBucket::new(CATALOG_KEYS), EchoHttp::new()).await;

    let err = h
        .core
        .resolver()
        .resolve_song_url("albums/my-beats/Intro.mp3", "my-beats")
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        ServiceError::Resolution { ref key, .. } if key == "albums/my-beats/Intro.mp3"
    ));
}

#[tokio::test]
async fn test_unsigned_cover_skips_caching() {
    let mut issuer = MockIssuer::new();
    issuer.expect_issue_access_url().returning(|key| {
        if key.ends_with("cover.jpg") {
            Err(BridgeError::OperationFailed("denied".to_string()))
        } else {
            Ok(signed(key))
        }
    });
    let h = harness_with(issuer, FakeBucket::new(CATALOG_KEYS), EchoHttp::new()).await;
    let catalog = catalog(&h).await;

    h.core
        .resolver()
        .ensure_album_cached(catalog.album("my-beats").unwrap())
        .await;

    assert_eq!(h.http.total_calls(), 0);
    assert!(!h.core.cache().is_cached("my-beats").await);
}

#[tokio::test]
async fn test_partial_album_still_serves_cached_songs() {
    let h = harness_with(
        signing_issuer(),
        FakeBucket::new(CATALOG_KEYS),
        EchoHttp::new().fail(&signed("albums/my-beats/Late Night.mp3")),
    )
    .await;
    let catalog = catalog(&h).await;
    let album = catalog.album("my-beats").unwrap();

    h.core.resolver().ensure_album_cached(album).await;

    let resolver = h.core.resolver();
    assert!(h.core.cache().is_cached("my-beats").await);
    assert!(resolver
        .resolve_song_url(&album.songs[0].key, "my-beats")
        .await
        .unwrap()
        .is_local());
    assert!(!resolver
        .resolve_song_url(&album.songs[1].key, "my-beats")
        .await
        .unwrap()
        .is_local());
}

#[tokio::test]
async fn test_warm_album_runs_in_background() {
    let h = harness().await;
    let catalog = catalog(&h).await;
    let album = catalog.album("my-beats").unwrap();

    h.core.resolver().warm_album(album);
    assert!(!h.core.cache().is_cached("my-beats").await);
    assert_eq!(h.spawner.pending(), vec!["album-warm"]);

    h.spawner.run_all().await;
    assert!(h.core.cache().is_cached("my-beats").await);
}

#[tokio::test]
async fn test_expired_album_resolves_remotely_again() {
    let h = harness().await;
    let catalog = catalog(&h).await;
    let album = catalog.album("my-beats").unwrap();
    let key = &album.songs[0].key;

    h.core.resolver().ensure_album_cached(album).await;
    let cached = h.core.resolver().resolve_song_url(key, "my-beats").await.unwrap();

    h.clock.advance(chrono::Duration::days(8));

    let fresh = h.core.resolver().resolve_song_url(key, "my-beats").await.unwrap();
    assert_eq!(fresh, ResolvedUrl::Remote(signed(key)));
    match cached {
        ResolvedUrl::Local(handle) => assert!(handle.is_revoked()),
        other => panic!("expected a cached handle, got {other}"),
    }
}

#[tokio::test]
async fn test_latest_release_is_cached_in_background() {
    let h = harness().await;
    let resolver = h.core.resolver();

    let release = resolver.latest_release().await.unwrap();
    assert_eq!(release.id, "latest-release");
    assert_eq!(release.title, "Fortune Cookies");
    assert_eq!(release.release_date, NaiveDate::from_ymd_opt(2025, 9, 20).unwrap());
    assert_eq!(h.spawner.pending(), vec!["release-fill"]);

    h.spawner.run_all().await;

    assert!(resolver.resolve_release_cover_url(&release).await.unwrap().is_local());
    let audio = resolver.resolve_release_audio_url(&release).await.unwrap().unwrap();
    assert!(audio.is_local());

    // Unchanged and cached: no second fill
    let again = resolver.latest_release().await.unwrap();
    assert_eq!(again, release);
    assert!(h.spawner.pending().is_empty());
}

#[tokio::test]
async fn test_upcoming_release_defaults() {
    let h = harness().await;
    let resolver = h.core.resolver();

    let release = resolver.upcoming_release().await.unwrap();
    assert_eq!(release.title, "Coming Soon");
    assert_eq!(release.release_date, NaiveDate::from_ymd_opt(2025, 4, 9).unwrap());
    assert!(resolver.resolve_release_audio_url(&release).await.unwrap().is_none());

    let cover = resolver.resolve_release_cover_url(&release).await.unwrap();
    assert_eq!(cover, ResolvedUrl::Remote(signed("upcoming/cover.jpg")));
}

#[tokio::test]
async fn test_dateless_release_is_not_refetched_next_day() {
    let h = harness().await;
    let resolver = h.core.resolver();

    let first = resolver.upcoming_release().await.unwrap();
    assert_eq!(h.spawner.pending(), vec!["release-fill"]);
    h.spawner.run_all().await;
    let fetched = h.http.total_calls();

    h.clock.advance(chrono::Duration::days(1));
    let next_day = resolver.upcoming_release().await.unwrap();

    assert_ne!(next_day.release_date, first.release_date);
    assert!(h.spawner.pending().is_empty());
    assert_eq!(h.http.total_calls(), fetched);
    assert!(resolver
        .resolve_release_cover_url(&next_day)
        .await
        .unwrap()
        .is_local());
}

#[tokio::test]
async fn test_missing_or_unreachable_release_is_none() {
    let h = harness_with(
        signing_issuer(),
        FakeBucket::new(&["albums/my-beats/cover.jpg"]),
        EchoHttp::new(),
    )
    .await;
    assert!(h.core.resolver().latest_release().await.is_none());
    assert!(h.spawner.pending().is_empty());

    let h = harness_with(signing_issuer(), FakeBucket::broken(), EchoHttp::new()).await;
    assert!(h.core.resolver().upcoming_release().await.is_none());
    assert!(matches!(
        h.core.resolver().scan_catalog().await,
        Err(ServiceError::Catalog(_))
    ));
}
