//! # smlcore
//!
//! Shared domain types for SmartLink: resolved track metadata, the closed set
//! of streaming platforms, caller overrides, and slug normalization.
//!
//! ```
//! use smlcore::slug::normalize;
//!
//! assert_eq!(normalize("Mötley Crüe"), "motley-crue");
//! ```

pub mod models;
pub mod slug;

pub use models::{Artist, MetadataOverrides, PlatformId, PlatformLink, TrackMetadata, web_url};
