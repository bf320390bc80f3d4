//! # SmartLink
//!
//! Turns a single music-platform URL into a public SmartLink page listing the
//! equivalent links on every major streaming platform.
//!
//! Pipeline: `source URL → validation → cache or resolution provider →
//! overrides → artifact generation → public URL`.
//!
//! ```no_run
//! use smartlink::SmartLinkService;
//! use smlconfig::Config;
//!
//! # #[tokio::main]
//! # async fn main() -> anyhow::Result<()> {
//! let config = Config::load_config("")?;
//! let service = SmartLinkService::from_config(&config)?;
//!
//! let link = service
//!     .create_from_url("https://open.spotify.com/track/4iV5W9uYEdYUVa79Axb7Rh", None, None)
//!     .await?;
//! println!("{}", link.public_url);
//! # Ok(())
//! # }
//! ```

pub mod batch;
pub mod config_ext;
pub mod error;
pub mod logging;
pub mod service;

pub use batch::{BatchOutcome, BatchReport, BatchRequest};
pub use config_ext::BatchConfigExt;
pub use error::{Error, ErrorKind, Result};
pub use service::{SmartLink, SmartLinkService};
