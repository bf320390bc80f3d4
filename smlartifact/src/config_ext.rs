//! Extension for reading artifact settings from smlconfig
//!
//! ```yaml
//! artifacts:
//!   directory: public/smartlinks
//!   base_url: http://localhost:3000/smartlinks
//!   default_cover: /images/default-cover.jpg
//! ```

use crate::generator::{DEFAULT_BASE_URL, DEFAULT_COVER, DEFAULT_OUTPUT_DIR, GeneratorBuilder};
use anyhow::Result;
use smlconfig::Config;
use std::path::PathBuf;

pub trait ArtifactConfigExt {
    /// Directory receiving the artifacts. A relative path is kept relative
    /// to the working directory.
    fn get_artifacts_directory(&self) -> Result<PathBuf>;
    fn get_artifacts_base_url(&self) -> Result<String>;
    fn get_artifacts_default_cover(&self) -> Result<String>;
}

impl ArtifactConfigExt for Config {
    fn get_artifacts_directory(&self) -> Result<PathBuf> {
        self.get_string(&["artifacts", "directory"], DEFAULT_OUTPUT_DIR)
            .map(PathBuf::from)
    }

    fn get_artifacts_base_url(&self) -> Result<String> {
        self.get_string(&["artifacts", "base_url"], DEFAULT_BASE_URL)
    }

    fn get_artifacts_default_cover(&self) -> Result<String> {
        self.get_string(&["artifacts", "default_cover"], DEFAULT_COVER)
    }
}

impl GeneratorBuilder {
    /// Builder preloaded with the configured directory, base URL and cover
    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(GeneratorBuilder::default()
            .output_dir(config.get_artifacts_directory()?)
            .base_url(config.get_artifacts_base_url()?)
            .default_cover(config.get_artifacts_default_cover()?))
    }
}
