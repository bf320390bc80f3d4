//! Domain model shared by the resolver and the artifact generator

use crate::slug;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::warn;
use url::Url;

/// Canonical streaming platform identifier
///
/// The set is closed: provider keys that do not map onto one of these
/// variants are dropped during resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlatformId {
    Spotify,
    Apple,
    Youtube,
    Deezer,
    Tidal,
    Amazon,
    Soundcloud,
    Bandcamp,
    Pandora,
    Napster,
}

impl PlatformId {
    pub const ALL: [PlatformId; 10] = [
        PlatformId::Spotify,
        PlatformId::Apple,
        PlatformId::Youtube,
        PlatformId::Deezer,
        PlatformId::Tidal,
        PlatformId::Amazon,
        PlatformId::Soundcloud,
        PlatformId::Bandcamp,
        PlatformId::Pandora,
        PlatformId::Napster,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PlatformId::Spotify => "spotify",
            PlatformId::Apple => "apple",
            PlatformId::Youtube => "youtube",
            PlatformId::Deezer => "deezer",
            PlatformId::Tidal => "tidal",
            PlatformId::Amazon => "amazon",
            PlatformId::Soundcloud => "soundcloud",
            PlatformId::Bandcamp => "bandcamp",
            PlatformId::Pandora => "pandora",
            PlatformId::Napster => "napster",
        }
    }
}

impl fmt::Display for PlatformId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PlatformId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PlatformId::ALL
            .into_iter()
            .find(|p| p.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown platform: {s}"))
    }
}

/// One platform's link for a track
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlatformLink {
    pub platform: PlatformId,
    pub url: String,
    #[serde(default)]
    pub native_app_uri_mobile: Option<String>,
    #[serde(default)]
    pub native_app_uri_desktop: Option<String>,
}

impl PlatformLink {
    pub fn new(platform: PlatformId, url: impl Into<String>) -> Self {
        Self {
            platform,
            url: url.into(),
            native_app_uri_mobile: None,
            native_app_uri_desktop: None,
        }
    }
}

/// Artist name together with its slug
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Artist {
    pub name: String,
    pub slug: String,
}

impl Artist {
    /// Builds an artist whose slug is derived from the name
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        let slug = slug::normalize(&name);
        Self { name, slug }
    }
}

/// Resolved metadata for one track
///
/// Produced by the resolver, consumed once by the artifact generator; only the
/// rendered artifact is kept afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackMetadata {
    pub track_title: String,
    pub artist: Artist,
    /// Track slug
    pub slug: String,
    #[serde(default)]
    pub cover_image_url: Option<String>,
    pub description: String,
    pub platform_links: Vec<PlatformLink>,
    pub source_url: String,
    /// Optional enrichment: a short audio preview
    #[serde(default)]
    pub audio_preview_url: Option<String>,
    pub resolved_at: DateTime<Utc>,
}

impl TrackMetadata {
    /// Description used when the caller supplied none
    pub fn default_description(title: &str, artist_name: &str) -> String {
        format!("Listen to '{title}' by {artist_name} on all platforms.")
    }

    /// Link for a given platform, if resolved
    pub fn link_for(&self, platform: PlatformId) -> Option<&PlatformLink> {
        self.platform_links.iter().find(|l| l.platform == platform)
    }

    /// Merges caller-supplied overrides onto the resolved metadata.
    ///
    /// Overrides always win. Renaming the title or the artist re-derives the
    /// corresponding slug unless that slug is overridden too. A description
    /// that was derived from the old title/artist is derived again.
    pub fn with_overrides(mut self, overrides: &MetadataOverrides) -> Self {
        let derived_description =
            Self::default_description(&self.track_title, &self.artist.name) == self.description;

        if let Some(title) = non_blank(&overrides.track_title) {
            self.track_title = title.to_string();
            self.slug = slug::normalize(title);
        }
        if let Some(name) = non_blank(&overrides.artist_name) {
            self.artist = Artist::new(name);
        }
        if let Some(track_slug) = non_blank(&overrides.slug) {
            self.slug = slug::normalize(track_slug);
        }
        if let Some(artist_slug) = non_blank(&overrides.artist_slug) {
            self.artist.slug = slug::normalize(artist_slug);
        }

        match non_blank(&overrides.description) {
            Some(description) => self.description = description.to_string(),
            None if derived_description => {
                self.description = Self::default_description(&self.track_title, &self.artist.name)
            }
            None => {}
        }

        if let Some(cover) = non_blank(&overrides.cover_image_url) {
            match web_url(cover) {
                Some(url) => self.cover_image_url = Some(url.to_string()),
                None => warn!(cover = %cover, "Ignoring unusable cover image URL"),
            }
        }

        if let Some(preview) = non_blank(&overrides.audio_preview_url) {
            match web_url(preview) {
                Some(url) => self.audio_preview_url = Some(url.to_string()),
                None => warn!(preview = %preview, "Ignoring unusable audio preview URL"),
            }
        }

        self
    }
}

/// Caller-supplied values applied on top of resolved metadata
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MetadataOverrides {
    pub track_title: Option<String>,
    pub artist_name: Option<String>,
    pub slug: Option<String>,
    pub artist_slug: Option<String>,
    pub description: Option<String>,
    pub cover_image_url: Option<String>,
    pub audio_preview_url: Option<String>,
}

impl MetadataOverrides {
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

/// Parses `raw` as an absolute http(s) URL, the only kind a public page links to
pub fn web_url(raw: &str) -> Option<Url> {
    Url::parse(raw.trim())
        .ok()
        .filter(|url| matches!(url.scheme(), "http" | "https") && url.has_host())
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}
