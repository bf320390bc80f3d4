//! Extension for reading resolver settings from smlconfig
//!
//! ```yaml
//! resolver:
//!   provider_url: https://api.song.link/v1-alpha.1/links
//!   user_agent: SmartLink/0.1 (smlresolver)
//!   timeout_secs: 10
//!   max_attempts: 3
//!   base_delay_ms: 1000
//!   default_country: US
//! cache:
//!   ttl_secs: 86400
//!   capacity: 1000
//! ```
//!
//! Getters persist their default when the key is missing.

use crate::cache::{DEFAULT_CAPACITY, DEFAULT_TTL};
use crate::resolver::{
    DEFAULT_PROVIDER_URL, DEFAULT_REQUEST_TIMEOUT_SECS, DEFAULT_USER_AGENT, ResolverBuilder,
};
use crate::retry::{DEFAULT_BASE_DELAY, DEFAULT_MAX_ATTEMPTS};
use anyhow::Result;
use smlconfig::Config;
use std::time::Duration;

/// Default country sent as `userCountry`
pub const DEFAULT_COUNTRY: &str = "US";

pub trait ResolverConfigExt {
    fn get_resolver_provider_url(&self) -> Result<String>;
    fn get_resolver_user_agent(&self) -> Result<String>;
    fn get_resolver_timeout_secs(&self) -> Result<u64>;
    fn get_resolver_max_attempts(&self) -> Result<u32>;
    fn get_resolver_base_delay_ms(&self) -> Result<u64>;
    fn get_resolver_default_country(&self) -> Result<String>;

    /// Lifetime of cached resolutions, in seconds
    fn get_cache_ttl_secs(&self) -> Result<u64>;
    fn get_cache_capacity(&self) -> Result<usize>;
}

impl ResolverConfigExt for Config {
    fn get_resolver_provider_url(&self) -> Result<String> {
        self.get_string(&["resolver", "provider_url"], DEFAULT_PROVIDER_URL)
    }

    fn get_resolver_user_agent(&self) -> Result<String> {
        self.get_string(&["resolver", "user_agent"], DEFAULT_USER_AGENT)
    }

    fn get_resolver_timeout_secs(&self) -> Result<u64> {
        self.get_u64(&["resolver", "timeout_secs"], DEFAULT_REQUEST_TIMEOUT_SECS)
    }

    fn get_resolver_max_attempts(&self) -> Result<u32> {
        let attempts = self.get_u64(&["resolver", "max_attempts"], DEFAULT_MAX_ATTEMPTS as u64)?;
        Ok(u32::try_from(attempts).unwrap_or(DEFAULT_MAX_ATTEMPTS))
    }

    fn get_resolver_base_delay_ms(&self) -> Result<u64> {
        self.get_u64(
            &["resolver", "base_delay_ms"],
            DEFAULT_BASE_DELAY.as_millis() as u64,
        )
    }

    fn get_resolver_default_country(&self) -> Result<String> {
        self.get_string(&["resolver", "default_country"], DEFAULT_COUNTRY)
    }

    fn get_cache_ttl_secs(&self) -> Result<u64> {
        self.get_u64(&["cache", "ttl_secs"], DEFAULT_TTL.as_secs())
    }

    fn get_cache_capacity(&self) -> Result<usize> {
        let capacity = self.get_u64(&["cache", "capacity"], DEFAULT_CAPACITY as u64)?;
        Ok(usize::try_from(capacity).unwrap_or(DEFAULT_CAPACITY))
    }
}

impl ResolverBuilder {
    /// Builder preloaded with the configured resolver and cache settings
    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(ResolverBuilder::default()
            .provider_url(config.get_resolver_provider_url()?)
            .user_agent(config.get_resolver_user_agent()?)
            .timeout(Duration::from_secs(config.get_resolver_timeout_secs()?))
            .max_attempts(config.get_resolver_max_attempts()?)
            .base_delay(Duration::from_millis(config.get_resolver_base_delay_ms()?))
            .cache_ttl(Duration::from_secs(config.get_cache_ttl_secs()?))
            .cache_capacity(config.get_cache_capacity()?))
    }
}
