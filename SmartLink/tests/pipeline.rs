//! End-to-end pipeline tests: mocked provider, real filesystem

use serde_json::json;
use smartlink::{BatchRequest, ErrorKind, SmartLinkService};
use smlartifact::ArtifactGenerator;
use smlconfig::Config;
use smlcore::MetadataOverrides;
use smlresolver::MetadataResolver;
use std::path::Path;
use std::time::{Duration, Instant};
use tempfile::TempDir;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const SOURCE_URL: &str = "https://open.spotify.com/track/4iV5W9uYEdYUVa79Axb7Rh";

fn provider_json(title: &str) -> serde_json::Value {
    json!({
        "entityUniqueId": "SPOTIFY_SONG::4iV5W9uYEdYUVa79Axb7Rh",
        "userCountry": "US",
        "pageUrl": "https://song.link/s/4iV5W9uYEdYUVa79Axb7Rh",
        "entitiesByUniqueId": {
            "SPOTIFY_SONG::4iV5W9uYEdYUVa79Axb7Rh": {
                "title": title,
                "artistName": "Rick Astley",
                "thumbnailUrl": "https://i.scdn.co/image/ab67616d0000b273"
            }
        },
        "linksByPlatform": {
            "spotify": { "url": "https://open.spotify.com/track/4iV5W9uYEdYUVa79Axb7Rh" },
            "deezer": { "url": "https://www.deezer.com/track/781592622" },
            "youtubeMusic": { "url": "https://music.youtube.com/watch?v=lYBUbBu4W08" }
        }
    })
}

async fn mount_provider(server: &MockServer, title: &str) {
    Mock::given(method("GET"))
        .and(path("/links"))
        .and(query_param("url", SOURCE_URL))
        .respond_with(ResponseTemplate::new(200).set_body_json(provider_json(title)))
        .mount(server)
        .await;
}

fn service(server: &MockServer, dir: &TempDir) -> SmartLinkService {
    let resolver = MetadataResolver::builder()
        .provider_url(format!("{}/links", server.uri()))
        .base_delay(Duration::from_millis(5))
        .build()
        .unwrap();
    let generator = ArtifactGenerator::builder()
        .output_dir(dir.path().join("public/smartlinks"))
        .base_url("https://links.test/smartlinks")
        .build();
    SmartLinkService::new(resolver, generator)
}

#[tokio::test]
async fn test_create_from_url_writes_the_page() {
    let server = MockServer::start().await;
    mount_provider(&server, "Never Gonna Give You Up").await;
    let dir = tempfile::tempdir().unwrap();
    let service = service(&server, &dir);

    let link = service.create_from_url(SOURCE_URL, None, None).await.unwrap();

    let expected = dir
        .path()
        .join("public/smartlinks/rick-astley/never-gonna-give-you-up.html");
    assert_eq!(link.artifact.path, expected);
    assert_eq!(
        link.public_url,
        "https://links.test/smartlinks/rick-astley/never-gonna-give-you-up"
    );

    assert_eq!(link.warning, None);

    let html = std::fs::read_to_string(&expected).unwrap();
    assert!(html.contains("Never Gonna Give You Up"));
    assert!(html.contains("https://www.deezer.com/track/781592622"));
    assert!(html.contains("https://i.scdn.co/image/ab67616d0000b273"));
}

#[tokio::test]
async fn test_failed_resolution_leaves_no_artifact() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(502))
        .expect(3)
        .mount(&server)
        .await;
    let dir = tempfile::tempdir().unwrap();
    let service = service(&server, &dir);

    let err = service.create_from_url(SOURCE_URL, Some("FR"), None).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::UpstreamUnavailable);
    assert!(!dir.path().join("public").exists());
}

#[tokio::test]
async fn test_invalid_source_url() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    let service = service(&server, &dir);

    let err = service.create_from_url("   ", None, None).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidInput);
}

#[tokio::test]
async fn test_unknown_domain_is_reported_on_the_link() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/links"))
        .and(query_param("url", "spotify:track:4iV5W9uYEdYUVa79Axb7Rh"))
        .respond_with(ResponseTemplate::new(200).set_body_json(provider_json("Never Gonna Give You Up")))
        .expect(1)
        .mount(&server)
        .await;
    let dir = tempfile::tempdir().unwrap();
    let service = service(&server, &dir);

    let link = service
        .create_from_url("spotify:track:4iV5W9uYEdYUVa79Axb7Rh", None, None)
        .await
        .unwrap();

    assert!(link.artifact.path.exists());
    assert_eq!(
        link.warning.as_deref(),
        Some("Unrecognized music platform URL: spotify:track:4iV5W9uYEdYUVa79Axb7Rh")
    );
}

#[tokio::test]
async fn test_overrides_win() {
    let server = MockServer::start().await;
    mount_provider(&server, "Never Gonna Give You Up").await;
    let dir = tempfile::tempdir().unwrap();
    let service = service(&server, &dir);

    let overrides = MetadataOverrides {
        track_title: Some("Never Gonna Give You Up (Remastered)".to_string()),
        description: Some("The 2022 remaster".to_string()),
        audio_preview_url: Some("not a url".to_string()),
        ..Default::default()
    };
    let link = service
        .create_from_url(SOURCE_URL, None, Some(&overrides))
        .await
        .unwrap();

    assert_eq!(link.artifact.track_slug, "never-gonna-give-you-up-remastered");
    let html = String::from_utf8(link.artifact.content).unwrap();
    assert!(html.contains("The 2022 remaster"));
    assert!(!html.contains("<audio"), "unusable preview is dropped");
}

#[tokio::test]
async fn test_update_from_url_moves_renamed_track() {
    let server = MockServer::start().await;
    mount_provider(&server, "Never Gonna Give You Up").await;
    let dir = tempfile::tempdir().unwrap();
    let service = service(&server, &dir);

    let original = service.create_from_url(SOURCE_URL, None, None).await.unwrap();

    let overrides = MetadataOverrides {
        slug: Some("nggyu".to_string()),
        ..Default::default()
    };
    let updated = service
        .update_from_url(SOURCE_URL, None, Some(&overrides), Some(original.artifact.track_slug.as_str()))
        .await
        .unwrap();

    assert!(updated.artifact.path.ends_with("rick-astley/nggyu.html"));
    assert!(!original.artifact.path.exists());
    let err = service
        .read("rick-astley", "never-gonna-give-you-up")
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);

    assert!(service.delete("rick-astley", "nggyu").await.unwrap());
    assert!(!service.delete("rick-astley", "nggyu").await.unwrap());
    assert!(!dir.path().join("public/smartlinks/rick-astley").exists());
}

#[tokio::test]
async fn test_update_from_url_accepts_previous_title() {
    let server = MockServer::start().await;
    mount_provider(&server, "Never Gonna Give You Up").await;
    let dir = tempfile::tempdir().unwrap();
    let service = service(&server, &dir);

    let original = service.create_from_url(SOURCE_URL, None, None).await.unwrap();
    let overrides = MetadataOverrides {
        slug: Some("nggyu".to_string()),
        ..Default::default()
    };
    service
        .update_from_url(SOURCE_URL, None, Some(&overrides), Some("Never Gonna Give You Up"))
        .await
        .unwrap();

    assert!(!original.artifact.path.exists());
}

#[tokio::test]
async fn test_batch_continues_after_failures_and_waits_between_items() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/links"))
        .respond_with(ResponseTemplate::new(200).set_body_json(provider_json("Together Forever")))
        .expect(2)
        .mount(&server)
        .await;
    let dir = tempfile::tempdir().unwrap();
    let service = service(&server, &dir);

    let requests = vec![
        BatchRequest::new(SOURCE_URL),
        BatchRequest::new("not a url"),
        BatchRequest::new(SOURCE_URL).with_country("GB"),
    ];
    let started = Instant::now();
    let report = service
        .create_batch(&requests, Duration::from_millis(30))
        .await;

    assert!(started.elapsed() >= Duration::from_millis(60));
    assert_eq!(report.outcomes.len(), 3);
    assert_eq!(report.created(), 2);
    assert_eq!(report.failed(), 1);
    match &report.outcomes[1] {
        smartlink::BatchOutcome::Failed { kind, source_url, .. } => {
            assert_eq!(*kind, ErrorKind::InvalidInput);
            assert_eq!(source_url, "not a url");
        }
        other => panic!("unexpected outcome: {other:?}"),
    }
}

#[tokio::test]
async fn test_service_from_config() {
    let server = MockServer::start().await;
    mount_provider(&server, "Never Gonna Give You Up").await;
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("site");

    let config = Config::from_yaml_str(&format!(
        "resolver:\n  provider_url: {}/links\n  default_country: DE\nartifacts:\n  directory: {}\n  base_url: https://sl.test\n",
        server.uri(),
        output.display()
    ))
    .unwrap();
    let service = SmartLinkService::from_config(&config).unwrap();
    assert_eq!(service.default_country(), "DE");

    let link = service.create_from_url(SOURCE_URL, None, None).await.unwrap();
    assert_eq!(
        link.public_url,
        "https://sl.test/rick-astley/never-gonna-give-you-up"
    );
    assert!(Path::new(&output).join("rick-astley/never-gonna-give-you-up.html").exists());
}
