//! Integration tests for MetadataResolver against a mocked provider

use serde_json::json;
use smlcore::PlatformId;
use smlresolver::{MetadataResolver, ResolveError};
use std::time::Duration;
use wiremock::matchers::{header, header_exists, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const SOURCE_URL: &str = "https://open.spotify.com/track/4iV5W9uYEdYUVa79Axb7Rh";

fn provider_json() -> serde_json::Value {
    json!({
        "entityUniqueId": "SPOTIFY_SONG::4iV5W9uYEdYUVa79Axb7Rh",
        "userCountry": "US",
        "pageUrl": "https://song.link/s/4iV5W9uYEdYUVa79Axb7Rh",
        "entitiesByUniqueId": {
            "SPOTIFY_SONG::4iV5W9uYEdYUVa79Axb7Rh": {
                "id": "4iV5W9uYEdYUVa79Axb7Rh",
                "type": "song",
                "title": "Never Gonna Give You Up",
                "artistName": "Rick Astley",
                "thumbnailUrl": "https://i.scdn.co/image/ab67616d0000b273",
                "apiProvider": "spotify"
            }
        },
        "linksByPlatform": {
            "spotify": {
                "url": "https://open.spotify.com/track/4iV5W9uYEdYUVa79Axb7Rh",
                "nativeAppUriDesktop": "spotify:track:4iV5W9uYEdYUVa79Axb7Rh",
                "entityUniqueId": "SPOTIFY_SONG::4iV5W9uYEdYUVa79Axb7Rh"
            },
            "appleMusic": {
                "url": "https://music.apple.com/us/album/1559523357?i=1559523359",
                "nativeAppUriMobile": "music://music.apple.com/us/album/1559523357?i=1559523359",
                "entityUniqueId": "ITUNES_SONG::1559523359"
            },
            "youtubeMusic": {
                "url": "https://music.youtube.com/watch?v=lYBUbBu4W08",
                "entityUniqueId": "YOUTUBE_VIDEO::lYBUbBu4W08"
            },
            "youtube": {
                "url": "https://www.youtube.com/watch?v=lYBUbBu4W08",
                "entityUniqueId": "YOUTUBE_VIDEO::lYBUbBu4W08"
            },
            "yandex": {
                "url": "https://music.yandex.ru/track/1",
                "entityUniqueId": "YANDEX_SONG::1"
            }
        }
    })
}

fn resolver_for(server: &MockServer) -> MetadataResolver {
    MetadataResolver::builder()
        .provider_url(format!("{}/links", server.uri()))
        .base_delay(Duration::from_millis(10))
        .build()
        .unwrap()
}

#[tokio::test]
async fn test_fetch_transforms_provider_payload() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/links"))
        .and(query_param("url", SOURCE_URL))
        .and(query_param("userCountry", "US"))
        .and(header("accept", "application/json"))
        .and(header_exists("user-agent"))
        .respond_with(ResponseTemplate::new(200).set_body_json(provider_json()))
        .expect(1)
        .mount(&server)
        .await;

    let metadata = resolver_for(&server).fetch(SOURCE_URL, "US").await.unwrap();

    assert_eq!(metadata.track_title, "Never Gonna Give You Up");
    assert_eq!(metadata.slug, "never-gonna-give-you-up");
    assert_eq!(metadata.artist.slug, "rick-astley");
    assert_eq!(metadata.source_url, SOURCE_URL);
    let mut platforms: Vec<PlatformId> = metadata.platform_links.iter().map(|l| l.platform).collect();
    platforms.sort_by_key(|p| p.as_str());
    assert_eq!(
        platforms,
        vec![PlatformId::Apple, PlatformId::Spotify, PlatformId::Youtube]
    );
    assert_eq!(
        metadata.link_for(PlatformId::Youtube).unwrap().url,
        "https://www.youtube.com/watch?v=lYBUbBu4W08"
    );
}

#[tokio::test]
async fn test_same_key_within_ttl_calls_provider_once() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/links"))
        .respond_with(ResponseTemplate::new(200).set_body_json(provider_json()))
        .expect(1)
        .mount(&server)
        .await;

    let resolver = resolver_for(&server);
    let first = resolver.fetch(SOURCE_URL, "US").await.unwrap();
    let second = resolver.fetch(SOURCE_URL, "US").await.unwrap();

    assert_eq!(first, second);
    assert_eq!(resolver.cache().stats().await.hits, 1);
}

#[tokio::test]
async fn test_country_code_is_part_of_the_key() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/links"))
        .respond_with(ResponseTemplate::new(200).set_body_json(provider_json()))
        .expect(2)
        .mount(&server)
        .await;

    let resolver = resolver_for(&server);
    resolver.fetch(SOURCE_URL, "US").await.unwrap();
    resolver.fetch(SOURCE_URL, "FR").await.unwrap();
}

#[tokio::test]
async fn test_expired_entry_triggers_a_second_call() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/links"))
        .respond_with(ResponseTemplate::new(200).set_body_json(provider_json()))
        .expect(2)
        .mount(&server)
        .await;

    let resolver = MetadataResolver::builder()
        .provider_url(format!("{}/links", server.uri()))
        .cache_ttl(Duration::from_millis(100))
        .build()
        .unwrap();

    resolver.fetch(SOURCE_URL, "US").await.unwrap();
    tokio::time::sleep(Duration::from_millis(150)).await;
    resolver.fetch(SOURCE_URL, "US").await.unwrap();
}

#[tokio::test]
async fn test_always_failing_provider_is_tried_three_times() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/links"))
        .respond_with(ResponseTemplate::new(503))
        .expect(3)
        .mount(&server)
        .await;

    let started = std::time::Instant::now();
    let err = resolver_for(&server).fetch(SOURCE_URL, "US").await.unwrap_err();

    match err {
        ResolveError::UpstreamUnavailable { attempts, reason } => {
            assert_eq!(attempts, 3);
            assert!(reason.contains("503"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
    // 10ms + 20ms of backoff between the three attempts
    assert!(started.elapsed() >= Duration::from_millis(30));
}

#[tokio::test]
async fn test_recovers_after_transient_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/links"))
        .respond_with(ResponseTemplate::new(500))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/links"))
        .respond_with(ResponseTemplate::new(200).set_body_json(provider_json()))
        .expect(1)
        .mount(&server)
        .await;

    let metadata = resolver_for(&server).fetch(SOURCE_URL, "US").await.unwrap();
    assert_eq!(metadata.artist.name, "Rick Astley");
}

#[tokio::test]
async fn test_malformed_payload_is_not_retried_nor_cached() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/links"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "entityUniqueId": "SPOTIFY_SONG::missing",
            "entitiesByUniqueId": {},
            "linksByPlatform": {}
        })))
        .expect(2)
        .mount(&server)
        .await;

    let resolver = resolver_for(&server);
    for _ in 0..2 {
        let err = resolver.fetch(SOURCE_URL, "US").await.unwrap_err();
        assert!(matches!(err, ResolveError::MalformedResponse(_)));
    }
    assert!(resolver.cache().is_empty().await);
}

#[tokio::test]
async fn test_invalid_json_is_malformed() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/links"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .expect(1)
        .mount(&server)
        .await;

    let err = resolver_for(&server).fetch(SOURCE_URL, "US").await.unwrap_err();
    assert!(matches!(err, ResolveError::MalformedResponse(_)));
}

#[tokio::test]
async fn test_invalid_source_never_reaches_provider() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(provider_json()))
        .expect(0)
        .mount(&server)
        .await;

    let err = resolver_for(&server).fetch("", "US").await.unwrap_err();
    assert!(err.is_invalid_input());
}

#[tokio::test]
async fn test_unknown_domain_still_resolves() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(query_param("url", "https://music.example.org/track/9"))
        .respond_with(ResponseTemplate::new(200).set_body_json(provider_json()))
        .expect(1)
        .mount(&server)
        .await;

    let metadata = resolver_for(&server)
        .fetch("https://music.example.org/track/9", "US")
        .await
        .unwrap();
    assert_eq!(metadata.source_url, "https://music.example.org/track/9");
}

#[tokio::test]
async fn test_resolution_carries_the_domain_warning() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(provider_json()))
        .expect(3)
        .mount(&server)
        .await;
    let resolver = resolver_for(&server);

    let unknown = resolver
        .resolve("https://music.example.org/track/9", "US")
        .await
        .unwrap();
    assert_eq!(
        unknown.warning().as_deref(),
        Some("Unrecognized music platform domain: music.example.org")
    );
    assert_eq!(unknown.metadata.track_title, "Never Gonna Give You Up");

    let app_uri = resolver
        .resolve("spotify:track:4iV5W9uYEdYUVa79Axb7Rh", "US")
        .await
        .unwrap();
    assert!(app_uri.warning().is_some());

    let known = resolver.resolve(SOURCE_URL, "US").await.unwrap();
    assert!(known.source.recognized);
    assert!(known.warning().is_none());
}

#[tokio::test]
async fn test_unreachable_provider_is_unavailable() {
    let resolver = MetadataResolver::builder()
        .provider_url("http://127.0.0.1:9/links")
        .base_delay(Duration::from_millis(1))
        .timeout(Duration::from_secs(2))
        .build()
        .unwrap();

    let err = resolver.fetch(SOURCE_URL, "US").await.unwrap_err();
    assert!(err.is_upstream_unavailable());
}
