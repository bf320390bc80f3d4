//! Source URL validation
//!
//! A source URL must be non-empty and parse as an absolute URI. Anything
//! outside the known music-platform web domains (other hosts, app URIs such
//! as `spotify:track:...`) is accepted with a warning: the resolution
//! provider may still recognize it.

use crate::error::{ResolveError, Result};
use tracing::warn;
use url::Url;

/// Music-platform domains the provider is known to handle.
/// Subdomains match too (`open.spotify.com` matches `spotify.com`).
pub const KNOWN_DOMAINS: &[&str] = &[
    "spotify.com",
    "spotify.link",
    "apple.com",
    "youtube.com",
    "youtu.be",
    "deezer.com",
    "deezer.page.link",
    "tidal.com",
    "amazon.com",
    "soundcloud.com",
    "bandcamp.com",
    "pandora.com",
    "napster.com",
    "song.link",
    "album.link",
    "odesli.co",
];

/// A source URL that passed validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedUrl {
    pub url: Url,
    /// Whether the URL is http(s) on one of [`KNOWN_DOMAINS`]
    pub recognized: bool,
}

impl ValidatedUrl {
    /// Non-fatal warning to surface when the domain is not recognized
    pub fn warning(&self) -> Option<String> {
        if self.recognized {
            None
        } else {
            Some(match self.url.host_str().filter(|h| !h.is_empty()) {
                Some(host) => format!("Unrecognized music platform domain: {host}"),
                None => format!("Unrecognized music platform URL: {}", self.url),
            })
        }
    }
}

/// Returns true when `host` is one of the known domains or a subdomain of one
pub fn is_known_domain(host: &str) -> bool {
    let host = host.trim_end_matches('.').to_ascii_lowercase();
    KNOWN_DOMAINS
        .iter()
        .any(|d| host == *d || host.ends_with(&format!(".{d}")))
}

/// Validates a candidate source URL.
///
/// Fails with [`ResolveError::InvalidInput`] only when the URL is empty or
/// does not parse.
pub fn validate(raw: &str) -> Result<ValidatedUrl> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(ResolveError::invalid_input("source URL is empty"));
    }

    let url = Url::parse(raw)
        .map_err(|e| ResolveError::invalid_input(format!("invalid source URL '{raw}': {e}")))?;

    let recognized = matches!(url.scheme(), "http" | "https")
        && url.host_str().is_some_and(is_known_domain);
    let validated = ValidatedUrl { url, recognized };

    if let Some(warning) = validated.warning() {
        warn!(source_url = %raw, "{}", warning);
    }

    Ok(validated)
}
