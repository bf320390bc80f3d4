//! Resolution provider payload and its transformation into [`TrackMetadata`]
//!
//! The provider answers with an index of entities plus one link per provider
//! key:
//!
//! ```json
//! {
//!   "entityUniqueId": "SPOTIFY_SONG::4iV5W9uYEdYUVa79Axb7Rh",
//!   "entitiesByUniqueId": { "SPOTIFY_SONG::…": { "title": "…", "artistName": "…" } },
//!   "linksByPlatform": { "appleMusic": { "url": "…" } },
//!   "userCountry": "US",
//!   "pageUrl": "https://song.link/s/…"
//! }
//! ```

use crate::error::{ResolveError, Result};
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::Deserialize;
use smlcore::{Artist, PlatformId, PlatformLink, TrackMetadata, slug, web_url};
use std::collections::HashMap;
use tracing::{debug, warn};

/// Raw provider response
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderResponse {
    #[serde(default)]
    pub entity_unique_id: Option<String>,
    #[serde(default)]
    pub entities_by_unique_id: HashMap<String, ProviderEntity>,
    #[serde(default)]
    pub links_by_platform: IndexMap<String, ProviderLink>,
    #[serde(default)]
    pub user_country: Option<String>,
    #[serde(default)]
    pub page_url: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProviderEntity {
    pub title: Option<String>,
    pub artist_name: Option<String>,
    pub thumbnail_url: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProviderLink {
    pub url: Option<String>,
    pub native_app_uri_mobile: Option<String>,
    pub native_app_uri_desktop: Option<String>,
}

/// Maps a provider key onto a canonical platform.
///
/// The second value ranks keys sharing a platform: when a payload carries
/// both, the lowest rank wins whatever the payload order (`youtube` over
/// `youtubeMusic`, `appleMusic` over `itunes`, `amazonMusic` over
/// `amazonStore`). Keys outside this table are dropped.
pub fn canonical_platform(provider_key: &str) -> Option<(PlatformId, u8)> {
    let mapped = match provider_key {
        "spotify" => (PlatformId::Spotify, 0),
        "appleMusic" => (PlatformId::Apple, 0),
        "itunes" => (PlatformId::Apple, 1),
        "youtube" => (PlatformId::Youtube, 0),
        "youtubeMusic" => (PlatformId::Youtube, 1),
        "deezer" => (PlatformId::Deezer, 0),
        "tidal" => (PlatformId::Tidal, 0),
        "amazonMusic" => (PlatformId::Amazon, 0),
        "amazonStore" => (PlatformId::Amazon, 1),
        "soundcloud" => (PlatformId::Soundcloud, 0),
        "bandcamp" => (PlatformId::Bandcamp, 0),
        "pandora" => (PlatformId::Pandora, 0),
        "napster" => (PlatformId::Napster, 0),
        _ => return None,
    };
    Some(mapped)
}

impl ProviderResponse {
    /// Transforms the payload into canonical metadata.
    ///
    /// Fails with [`ResolveError::MalformedResponse`] when the main entity is
    /// missing or lacks a title or an artist name.
    pub fn into_metadata(self, source_url: &str, resolved_at: DateTime<Utc>) -> Result<TrackMetadata> {
        let entity_id = self
            .entity_unique_id
            .filter(|id| !id.trim().is_empty())
            .ok_or_else(|| ResolveError::malformed("payload has no entityUniqueId"))?;

        let entity = self
            .entities_by_unique_id
            .get(&entity_id)
            .ok_or_else(|| ResolveError::malformed(format!("main entity {entity_id} is absent")))?;

        let title = required(&entity.title, "title", &entity_id)?;
        let artist_name = required(&entity.artist_name, "artistName", &entity_id)?;

        let platform_links = collect_links(self.links_by_platform);
        let artist = Artist::new(artist_name);

        Ok(TrackMetadata {
            track_title: title.to_string(),
            slug: slug::normalize(title),
            description: TrackMetadata::default_description(title, &artist.name),
            artist,
            cover_image_url: entity.thumbnail_url.clone().filter(|u| web_url(u).is_some()),
            platform_links,
            source_url: source_url.to_string(),
            audio_preview_url: None,
            resolved_at,
        })
    }
}

fn required<'a>(value: &'a Option<String>, field: &str, entity_id: &str) -> Result<&'a str> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ResolveError::malformed(format!("main entity {entity_id} has no {field}")))
}

fn collect_links(links: IndexMap<String, ProviderLink>) -> Vec<PlatformLink> {
    let mut by_platform: IndexMap<PlatformId, (u8, PlatformLink)> = IndexMap::new();

    for (key, link) in links {
        let Some((platform, rank)) = canonical_platform(&key) else {
            debug!(provider_key = %key, "Dropping unmapped platform");
            continue;
        };
        let Some(url) = link.url.filter(|u| !u.trim().is_empty()) else {
            debug!(provider_key = %key, "Dropping platform without url");
            continue;
        };
        if web_url(&url).is_none() {
            warn!(provider_key = %key, url = %url, "Dropping platform with a non-web url");
            continue;
        }

        if let Some((kept_rank, _)) = by_platform.get(&platform) {
            if *kept_rank <= rank {
                debug!(provider_key = %key, platform = %platform, "Keeping higher-ranked link");
                continue;
            }
        }

        by_platform.insert(
            platform,
            (
                rank,
                PlatformLink {
                    platform,
                    url,
                    native_app_uri_mobile: link.native_app_uri_mobile,
                    native_app_uri_desktop: link.native_app_uri_desktop,
                },
            ),
        );
    }

    by_platform.into_values().map(|(_, link)| link).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn payload(links: serde_json::Value) -> ProviderResponse {
        serde_json::from_value(json!({
            "entityUniqueId": "SPOTIFY_SONG::1",
            "entitiesByUniqueId": {
                "SPOTIFY_SONG::1": {
                    "title": "Wait and Bleed",
                    "artistName": "Slipknot",
                    "thumbnailUrl": "https://i.scdn.co/image/cover"
                }
            },
            "linksByPlatform": links,
            "userCountry": "US",
            "pageUrl": "https://song.link/s/1"
        }))
        .unwrap()
    }

    #[test]
    fn test_every_platform_has_a_provider_key() {
        let keys = [
            "spotify", "appleMusic", "itunes", "youtube", "youtubeMusic", "deezer", "tidal",
            "amazonMusic", "amazonStore", "soundcloud", "bandcamp", "pandora", "napster",
        ];
        for platform in PlatformId::ALL {
            assert!(
                keys.iter()
                    .any(|k| canonical_platform(k).map(|(p, _)| p) == Some(platform)),
                "{platform} has no provider key"
            );
        }
        assert_eq!(canonical_platform("yandex"), None);
    }

    #[test]
    fn test_transform_builds_canonical_metadata() {
        let response = payload(json!({
            "spotify": { "url": "https://open.spotify.com/track/1", "nativeAppUriDesktop": "spotify:track:1" },
            "appleMusic": { "url": "https://music.apple.com/us/album/1" },
            "yandex": { "url": "https://music.yandex.ru/1" }
        }));
        let now = Utc::now();
        let metadata = response
            .into_metadata("https://open.spotify.com/track/1", now)
            .unwrap();

        assert_eq!(metadata.track_title, "Wait and Bleed");
        assert_eq!(metadata.slug, "wait-and-bleed");
        assert_eq!(metadata.artist.name, "Slipknot");
        assert_eq!(metadata.artist.slug, "slipknot");
        assert_eq!(
            metadata.description,
            "Listen to 'Wait and Bleed' by Slipknot on all platforms."
        );
        assert_eq!(
            metadata.cover_image_url.as_deref(),
            Some("https://i.scdn.co/image/cover")
        );
        assert_eq!(metadata.resolved_at, now);

        assert_eq!(metadata.platform_links.len(), 2);
        assert!(metadata.link_for(PlatformId::Apple).is_some());
        assert_eq!(
            metadata
                .link_for(PlatformId::Spotify)
                .and_then(|l| l.native_app_uri_desktop.as_deref()),
            Some("spotify:track:1")
        );
    }

    #[test]
    fn test_duplicate_platform_keeps_primary_key_in_any_order() {
        for links in [
            json!({
                "youtube": { "url": "https://www.youtube.com/watch?v=a" },
                "youtubeMusic": { "url": "https://music.youtube.com/watch?v=a" }
            }),
            json!({
                "youtubeMusic": { "url": "https://music.youtube.com/watch?v=a" },
                "youtube": { "url": "https://www.youtube.com/watch?v=a" }
            }),
        ] {
            let metadata = payload(links).into_metadata("https://x.test", Utc::now()).unwrap();
            assert_eq!(metadata.platform_links.len(), 1);
            assert_eq!(
                metadata.platform_links[0].url,
                "https://www.youtube.com/watch?v=a"
            );
        }
    }

    #[test]
    fn test_links_without_url_are_dropped() {
        let metadata = payload(json!({
            "deezer": { "nativeAppUriMobile": "deezer://track/1" },
            "tidal": { "url": "" },
            "napster": { "url": "https://napster.com/t/1" }
        }))
        .into_metadata("https://x.test", Utc::now())
        .unwrap();
        assert_eq!(metadata.platform_links.len(), 1);
        assert_eq!(metadata.platform_links[0].platform, PlatformId::Napster);
    }

    #[test]
    fn test_script_links_never_reach_the_page() {
        let metadata = payload(json!({
            "spotify": { "url": "javascript:alert(document.cookie)" },
            "deezer": { "url": "data:text/html,<script>x</script>" },
            "tidal": { "url": "https://tidal.com/browse/track/1" }
        }))
        .into_metadata("https://x.test", Utc::now())
        .unwrap();
        assert_eq!(metadata.platform_links.len(), 1);
        assert_eq!(metadata.platform_links[0].platform, PlatformId::Tidal);
    }

    #[test]
    fn test_missing_main_entity_is_malformed() {
        let response: ProviderResponse = serde_json::from_value(json!({
            "entityUniqueId": "SPOTIFY_SONG::missing",
            "entitiesByUniqueId": {},
            "linksByPlatform": {}
        }))
        .unwrap();
        let err = response.into_metadata("https://x.test", Utc::now()).unwrap_err();
        assert!(matches!(err, ResolveError::MalformedResponse(_)));

        let response: ProviderResponse = serde_json::from_value(json!({})).unwrap();
        let err = response.into_metadata("https://x.test", Utc::now()).unwrap_err();
        assert!(matches!(err, ResolveError::MalformedResponse(_)));
    }

    #[test]
    fn test_entity_without_title_is_malformed() {
        let response: ProviderResponse = serde_json::from_value(json!({
            "entityUniqueId": "E",
            "entitiesByUniqueId": { "E": { "artistName": "Someone" } }
        }))
        .unwrap();
        let err = response.into_metadata("https://x.test", Utc::now()).unwrap_err();
        assert!(err.to_string().contains("has no title"));
    }
}
