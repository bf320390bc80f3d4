//! SmartLink artifact generation and lifecycle
//!
//! An artifact lives at `<output_dir>/<artist_slug>/<track_slug>.html` and is
//! served at `<base_url>/<artist_slug>/<track_slug>`. Both are pure functions
//! of the two slugs.
//!
//! Lifecycle: `generate` creates or overwrites, `update` overwrites in place
//! or moves the artifact when the track slug changed, `delete` removes it
//! (idempotent) and cleans up the artist directory once empty.

use crate::error::{ArtifactError, Result};
use crate::platforms;
use crate::renderer::{HtmlRenderer, RenderContext, RenderedPlatform, TemplateRenderer};
use crate::store::{ArtifactStore, FsArtifactStore};
use smlcore::{TrackMetadata, slug, web_url};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Default directory receiving the artifacts
pub const DEFAULT_OUTPUT_DIR: &str = "public/smartlinks";

/// Default public base URL of the artifacts
pub const DEFAULT_BASE_URL: &str = "http://localhost:3000/smartlinks";

/// Cover used when the track has none
pub const DEFAULT_COVER: &str = "/images/default-cover.jpg";

/// A rendered and persisted SmartLink page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub path: PathBuf,
    pub content: Vec<u8>,
    pub artist_slug: String,
    pub track_slug: String,
}

#[derive(Debug, Clone)]
pub struct ArtifactGenerator {
    store: Arc<dyn ArtifactStore>,
    renderer: Arc<dyn TemplateRenderer>,
    output_dir: PathBuf,
    base_url: String,
    default_cover: String,
}

impl ArtifactGenerator {
    pub fn builder() -> GeneratorBuilder {
        GeneratorBuilder::default()
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn store(&self) -> &Arc<dyn ArtifactStore> {
        &self.store
    }

    /// `<output_dir>/<artist_slug>/<track_slug>.html`, no I/O
    pub fn deterministic_path(&self, artist_slug: &str, track_slug: &str) -> PathBuf {
        self.output_dir
            .join(artist_slug)
            .join(format!("{track_slug}.html"))
    }

    /// `<base_url>/<artist_slug>/<track_slug>`, no I/O
    pub fn public_url(&self, artist_slug: &str, track_slug: &str) -> String {
        format!("{}/{}/{}", self.base_url, artist_slug, track_slug)
    }

    /// Checks the fields generation depends on and lists every missing one
    pub fn validate(metadata: &TrackMetadata) -> Result<()> {
        let mut missing = Vec::new();
        if metadata.track_title.trim().is_empty() {
            missing.push("trackTitle");
        }
        if metadata.artist.name.trim().is_empty() {
            missing.push("artist.name");
        }
        if !is_slug(&metadata.artist.slug) {
            missing.push("artist.slug");
        }
        if !is_slug(&metadata.slug) {
            missing.push("slug");
        }
        if !metadata.platform_links.iter().any(|l| !l.url.trim().is_empty()) {
            missing.push("platformLinks");
        }

        if missing.is_empty() {
            Ok(())
        } else {
            Err(ArtifactError::invalid_input(missing))
        }
    }

    /// Builds the render context: canonical URL, cover fallback and the
    /// platform list sorted by display priority (stable, so ties keep the
    /// metadata order). Links without URL are left out.
    pub fn build_context(&self, metadata: &TrackMetadata) -> RenderContext {
        let mut platforms: Vec<RenderedPlatform> = metadata
            .platform_links
            .iter()
            .filter(|link| web_url(&link.url).is_some())
            .map(|link| {
                let display = platforms::display(link.platform);
                RenderedPlatform {
                    platform: link.platform,
                    name: display.name,
                    color: display.color,
                    priority: display.priority,
                    url: link.url.clone(),
                    native_app_uri_mobile: link.native_app_uri_mobile.clone(),
                    native_app_uri_desktop: link.native_app_uri_desktop.clone(),
                }
            })
            .collect();
        platforms.sort_by_key(|p| p.priority);

        RenderContext {
            title: format!("{} - {}", metadata.track_title, metadata.artist.name),
            track_title: metadata.track_title.clone(),
            artist_name: metadata.artist.name.clone(),
            description: metadata.description.clone(),
            canonical_url: self.public_url(&metadata.artist.slug, &metadata.slug),
            cover_image_url: metadata
                .cover_image_url
                .clone()
                .filter(|c| web_url(c).is_some())
                .unwrap_or_else(|| self.default_cover.clone()),
            audio_preview_url: metadata
                .audio_preview_url
                .clone()
                .filter(|p| web_url(p).is_some()),
            platforms,
        }
    }

    /// Validates, renders and writes the artifact, overwriting any previous
    /// file at the same path. Nothing is rendered or written when validation
    /// fails.
    pub async fn generate(&self, metadata: &TrackMetadata) -> Result<Artifact> {
        Self::validate(metadata)?;

        let context = self.build_context(metadata);
        let content = self.renderer.render(&context)?;

        let artist_slug = metadata.artist.slug.clone();
        let track_slug = metadata.slug.clone();
        let path = self.deterministic_path(&artist_slug, &track_slug);

        if let Some(parent) = path.parent() {
            self.store.ensure_dir(parent).await?;
        }
        self.store.write(&path, &content).await?;

        info!(
            "Generated SmartLink {}/{} ({} platforms) at {}",
            artist_slug,
            track_slug,
            context.platforms.len(),
            path.display()
        );

        Ok(Artifact {
            path,
            content,
            artist_slug,
            track_slug,
        })
    }

    /// Regenerates an artifact. When `previous_slug` differs from the
    /// metadata's slug, the old artifact is deleted first; otherwise the
    /// file is overwritten in place. `previous_slug` goes through
    /// [`slug::normalize`], so the original title works as well.
    pub async fn update(&self, metadata: &TrackMetadata, previous_slug: Option<&str>) -> Result<Artifact> {
        Self::validate(metadata)?;

        let previous_slug = previous_slug
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(slug::normalize);
        if let Some(previous) = previous_slug.as_deref().filter(|p| *p != metadata.slug) {
            debug!(
                "Track slug changed from {} to {}, removing old artifact",
                previous, metadata.slug
            );
            self.delete(&metadata.artist.slug, previous).await?;
        }

        self.generate(metadata).await
    }

    /// Removes an artifact. A missing artifact is not an error; the returned
    /// flag tells whether a file was removed. The artist directory is removed
    /// too once empty; failures there are only logged.
    pub async fn delete(&self, artist_slug: &str, track_slug: &str) -> Result<bool> {
        check_slugs(artist_slug, track_slug)?;

        let path = self.deterministic_path(artist_slug, track_slug);
        let removed = self.store.delete(&path).await?;
        if removed {
            info!("Deleted SmartLink {}/{}", artist_slug, track_slug);
        }

        let artist_dir = self.output_dir.join(artist_slug);
        if let Err(e) = self.store.remove_dir_if_empty(&artist_dir).await {
            warn!("Could not clean up {}: {}", artist_dir.display(), e);
        }

        Ok(removed)
    }

    /// Reads a persisted artifact; [`ArtifactError::NotFound`] when absent
    pub async fn read(&self, artist_slug: &str, track_slug: &str) -> Result<Vec<u8>> {
        check_slugs(artist_slug, track_slug)?;
        self.store
            .read(&self.deterministic_path(artist_slug, track_slug))
            .await
    }

    pub async fn exists(&self, artist_slug: &str, track_slug: &str) -> Result<bool> {
        check_slugs(artist_slug, track_slug)?;
        self.store
            .exists(&self.deterministic_path(artist_slug, track_slug))
            .await
    }
}

/// A slug as produced by `smlcore::slug::normalize`: non-empty, only
/// `[a-z0-9-]`. Anything else could escape the output directory.
fn is_slug(value: &str) -> bool {
    !value.is_empty()
        && value
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
}

fn check_slugs(artist_slug: &str, track_slug: &str) -> Result<()> {
    let mut invalid = Vec::new();
    if !is_slug(artist_slug) {
        invalid.push("artistSlug");
    }
    if !is_slug(track_slug) {
        invalid.push("trackSlug");
    }
    if invalid.is_empty() {
        Ok(())
    } else {
        Err(ArtifactError::invalid_input(invalid))
    }
}

/// Builder for configuring an [`ArtifactGenerator`]
#[derive(Debug, Clone)]
pub struct GeneratorBuilder {
    store: Option<Arc<dyn ArtifactStore>>,
    renderer: Option<Arc<dyn TemplateRenderer>>,
    pub(crate) output_dir: PathBuf,
    pub(crate) base_url: String,
    pub(crate) default_cover: String,
}

impl Default for GeneratorBuilder {
    fn default() -> Self {
        Self {
            store: None,
            renderer: None,
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            base_url: DEFAULT_BASE_URL.to_string(),
            default_cover: DEFAULT_COVER.to_string(),
        }
    }
}

impl GeneratorBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Storage backend (default: the filesystem)
    pub fn store(mut self, store: Arc<dyn ArtifactStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Template renderer (default: [`HtmlRenderer`])
    pub fn renderer(mut self, renderer: Arc<dyn TemplateRenderer>) -> Self {
        self.renderer = Some(renderer);
        self
    }

    pub fn output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }

    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    pub fn default_cover(mut self, url: impl Into<String>) -> Self {
        self.default_cover = url.into();
        self
    }

    pub fn build(self) -> ArtifactGenerator {
        ArtifactGenerator {
            store: self.store.unwrap_or_else(|| Arc::new(FsArtifactStore::new())),
            renderer: self.renderer.unwrap_or_else(|| Arc::new(HtmlRenderer::new())),
            output_dir: self.output_dir,
            base_url: self.base_url.trim_end_matches('/').to_string(),
            default_cover: self.default_cover,
        }
    }
}
