//! Metadata resolution for SmartLink
//!
//! Turns one music-platform URL into canonical [`TrackMetadata`] by asking an
//! external resolution provider (song.link-style API) for the equivalent
//! links on every platform.
//!
//! # Features
//!
//! - **Validation**: empty or malformed URLs are rejected before any network
//!   call; unknown domains only produce a warning
//! - **Cache**: in-memory TTL cache keyed by `sourceUrl:countryCode`
//!   (default 24h, 1000 entries, coarse insertion-order eviction)
//! - **Retry**: up to 3 attempts with exponential backoff (1s, 2s, ...) on
//!   transport errors, timeouts and non-2xx statuses
//! - **Transform**: provider keys mapped onto the closed [`PlatformId`] set
//!
//! # Example
//!
//! ```no_run
//! use smlconfig::Config;
//! use smlresolver::{ResolverBuilder, ResolverConfigExt};
//!
//! # #[tokio::main]
//! # async fn main() -> anyhow::Result<()> {
//! let config = Config::load_config("")?;
//! let resolver = ResolverBuilder::from_config(&config)?.build()?;
//! let country = config.get_resolver_default_country()?;
//!
//! let metadata = resolver
//!     .fetch("https://open.spotify.com/track/4iV5W9uYEdYUVa79Axb7Rh", &country)
//!     .await?;
//! println!("{} links", metadata.platform_links.len());
//! # Ok(())
//! # }
//! ```
//!
//! [`TrackMetadata`]: smlcore::TrackMetadata
//! [`PlatformId`]: smlcore::PlatformId

pub mod cache;
pub mod config_ext;
pub mod error;
pub mod provider;
pub mod resolver;
pub mod retry;
pub mod validator;

pub use cache::{CacheEntry, CacheStats, MetadataCache};
pub use config_ext::ResolverConfigExt;
pub use error::{ResolveError, Result};
pub use provider::ProviderResponse;
pub use resolver::{MetadataResolver, Resolution, ResolverBuilder};
pub use retry::{RetryDecision, RetryFailure, RetryPolicy};
pub use validator::{ValidatedUrl, validate};
