//! Extension for pipeline-level settings
//!
//! ```yaml
//! batch:
//!   delay_ms: 1000
//! ```

use crate::batch::DEFAULT_BATCH_DELAY;
use anyhow::Result;
use smlconfig::Config;
use std::time::Duration;

pub trait BatchConfigExt {
    /// Pause between two batch items
    fn get_batch_delay(&self) -> Result<Duration>;
}

impl BatchConfigExt for Config {
    fn get_batch_delay(&self) -> Result<Duration> {
        self.get_u64(&["batch", "delay_ms"], DEFAULT_BATCH_DELAY.as_millis() as u64)
            .map(Duration::from_millis)
    }
}
