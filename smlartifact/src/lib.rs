//! SmartLink artifact generation
//!
//! Renders resolved [`TrackMetadata`] into a static HTML page and manages its
//! lifecycle on disk.
//!
//! # Features
//!
//! - **Validation gate**: incomplete metadata is rejected before any render
//!   or write
//! - **Deterministic addressing**: `<dir>/<artist_slug>/<track_slug>.html`
//! - **Pluggable rendering**: [`TemplateRenderer`] trait, maud-based
//!   [`HtmlRenderer`] by default
//! - **Pluggable storage**: [`ArtifactStore`] trait with filesystem and
//!   in-memory implementations
//!
//! # Example
//!
//! ```no_run
//! use smlartifact::ArtifactGenerator;
//! # use smlcore::TrackMetadata;
//!
//! # async fn demo(metadata: TrackMetadata) -> smlartifact::Result<()> {
//! let generator = ArtifactGenerator::builder()
//!     .output_dir("public/smartlinks")
//!     .base_url("https://links.example.com")
//!     .build();
//!
//! let artifact = generator.generate(&metadata).await?;
//! println!(
//!     "{} -> {}",
//!     artifact.path.display(),
//!     generator.public_url(&artifact.artist_slug, &artifact.track_slug)
//! );
//! # Ok(())
//! # }
//! ```
//!
//! [`TrackMetadata`]: smlcore::TrackMetadata

pub mod config_ext;
pub mod error;
pub mod generator;
pub mod platforms;
pub mod renderer;
pub mod store;

pub use config_ext::ArtifactConfigExt;
pub use error::{ArtifactError, Result};
pub use generator::{Artifact, ArtifactGenerator, GeneratorBuilder};
pub use platforms::PlatformDisplay;
pub use renderer::{HtmlRenderer, RenderContext, RenderedPlatform, TemplateRenderer};
pub use store::{ArtifactStore, FsArtifactStore, MemoryArtifactStore};
