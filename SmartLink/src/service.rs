//! SmartLink pipeline: resolve, apply overrides, generate

use crate::error::Result;
use smlartifact::{Artifact, ArtifactConfigExt, ArtifactGenerator, GeneratorBuilder};
use smlconfig::Config;
use smlcore::{MetadataOverrides, TrackMetadata};
use smlresolver::{MetadataResolver, ResolverBuilder, ResolverConfigExt};
use tracing::{debug, info};

/// Default country used when a caller gives none
pub const DEFAULT_COUNTRY: &str = smlresolver::config_ext::DEFAULT_COUNTRY;

/// A generated SmartLink and where it is served
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SmartLink {
    pub artifact: Artifact,
    pub public_url: String,
    /// Non-fatal warning about the source URL (unrecognized domain)
    pub warning: Option<String>,
}

/// The pipeline service
///
/// Built once at startup and shared by reference; it owns the resolver,
/// whose cache therefore lives as long as the service.
#[derive(Debug)]
pub struct SmartLinkService {
    resolver: MetadataResolver,
    generator: ArtifactGenerator,
    default_country: String,
}

impl SmartLinkService {
    pub fn new(resolver: MetadataResolver, generator: ArtifactGenerator) -> Self {
        Self {
            resolver,
            generator,
            default_country: DEFAULT_COUNTRY.to_string(),
        }
    }

    /// Service wired from the configuration: resolver, cache, artifact
    /// directory and public base URL
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let resolver = ResolverBuilder::from_config(config)?.build()?;
        let generator = GeneratorBuilder::from_config(config)?.build();
        Ok(Self::new(resolver, generator).with_default_country(config.get_resolver_default_country()?))
    }

    pub fn with_default_country(mut self, country_code: impl Into<String>) -> Self {
        self.default_country = country_code.into();
        self
    }

    pub fn resolver(&self) -> &MetadataResolver {
        &self.resolver
    }

    pub fn generator(&self) -> &ArtifactGenerator {
        &self.generator
    }

    pub fn default_country(&self) -> &str {
        &self.default_country
    }

    async fn resolve(
        &self,
        source_url: &str,
        country_code: Option<&str>,
        overrides: Option<&MetadataOverrides>,
    ) -> Result<(TrackMetadata, Option<String>)> {
        let country_code = country_code.unwrap_or(self.default_country.as_str());
        let resolution = self.resolver.resolve(source_url, country_code).await?;
        let warning = resolution.warning();
        let metadata = resolution.metadata;

        let metadata = match overrides {
            Some(overrides) if !overrides.is_empty() => {
                debug!("Applying caller overrides to {}", metadata.slug);
                metadata.with_overrides(overrides)
            }
            _ => metadata,
        };
        Ok((metadata, warning))
    }

    fn published(&self, artifact: Artifact, warning: Option<String>) -> SmartLink {
        let public_url = self
            .generator
            .public_url(&artifact.artist_slug, &artifact.track_slug);
        SmartLink {
            artifact,
            public_url,
            warning,
        }
    }

    /// Resolves `source_url`, merges `overrides` (they win) and generates the
    /// artifact. A failed resolution leaves no artifact behind.
    pub async fn create_from_url(
        &self,
        source_url: &str,
        country_code: Option<&str>,
        overrides: Option<&MetadataOverrides>,
    ) -> Result<SmartLink> {
        let (metadata, warning) = self.resolve(source_url, country_code, overrides).await?;
        let artifact = self.generator.generate(&metadata).await?;
        let link = self.published(artifact, warning);
        info!("SmartLink available at {}", link.public_url);
        Ok(link)
    }

    /// Like [`create_from_url`](Self::create_from_url) but goes through the
    /// update path: when `previous_slug` differs from the new track slug the
    /// old artifact is removed.
    pub async fn update_from_url(
        &self,
        source_url: &str,
        country_code: Option<&str>,
        overrides: Option<&MetadataOverrides>,
        previous_slug: Option<&str>,
    ) -> Result<SmartLink> {
        let (metadata, warning) = self.resolve(source_url, country_code, overrides).await?;
        let artifact = self.generator.update(&metadata, previous_slug).await?;
        let link = self.published(artifact, warning);
        info!("SmartLink updated at {}", link.public_url);
        Ok(link)
    }

    /// Deletes an artifact; `false` when there was nothing to delete
    pub async fn delete(&self, artist_slug: &str, track_slug: &str) -> Result<bool> {
        Ok(self.generator.delete(artist_slug, track_slug).await?)
    }

    /// Content of a generated artifact
    pub async fn read(&self, artist_slug: &str, track_slug: &str) -> Result<Vec<u8>> {
        Ok(self.generator.read(artist_slug, track_slug).await?)
    }
}
