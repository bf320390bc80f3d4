//! # SmartLink Configuration Module
//!
//! This module provides configuration management for SmartLink, including:
//! - Loading configuration from YAML files
//! - Merging with embedded default configuration
//! - Environment variable overrides
//! - Typed getters with defaults, persisted on first access
//!
//! The configuration is an explicit value: it is loaded once at startup and
//! handed to the services that need it.
//!
//! ## Usage
//!
//! ```no_run
//! use smlconfig::{Config, ConfigValue};
//!
//! let config = Config::load_config("")?;
//! let level = config.get_log_min_level()?;
//! config.set_value(&["batch", "delay_ms"], ConfigValue::Number(2000.into()))?;
//! # Ok::<(), anyhow::Error>(())
//! ```

use anyhow::{Result, anyhow};
use dirs::home_dir;
use serde_yaml::{Mapping, Number, Value};
use std::{
    env, fs,
    path::{Path, PathBuf},
    sync::{Mutex, MutexGuard},
};
use tracing::{info, warn};

pub use serde_yaml::Value as ConfigValue;

// Configuration par défaut intégrée
const DEFAULT_CONFIG: &str = include_str!("smartlink.yaml");

const ENV_CONFIG_DIR: &str = "SMARTLINK_CONFIG";
const ENV_PREFIX: &str = "SMARTLINK_CONFIG__";
const CONFIG_DIR_NAME: &str = ".smartlink";

const DEFAULT_LOG_MIN_LEVEL: &str = "INFO";
const DEFAULT_LOG_ENABLE_CONSOLE: bool = true;

/// Configuration manager for SmartLink
///
/// Holds the merged YAML tree. When the configuration was loaded from a
/// directory, every setter persists the tree back to `config.yaml`;
/// configurations built with [`Config::from_yaml_str`] live in memory only.
#[derive(Debug)]
pub struct Config {
    config_dir: Option<PathBuf>,
    path: Option<PathBuf>,
    data: Mutex<Value>,
}

impl Config {
    /// Finds a config directory by trying different locations in order
    fn find_config_dir(directory: &str) -> PathBuf {
        if !directory.is_empty() {
            return PathBuf::from(directory);
        }

        if let Ok(env_path) = env::var(ENV_CONFIG_DIR) {
            info!(env_var = ENV_CONFIG_DIR, path = %env_path, "Trying to load config from env");
            return PathBuf::from(env_path);
        }

        if Path::new(CONFIG_DIR_NAME).exists() {
            return PathBuf::from(CONFIG_DIR_NAME);
        }

        if let Some(home) = home_dir() {
            let home_config = home.join(CONFIG_DIR_NAME);
            if home_config.exists() {
                return home_config;
            }
        }

        PathBuf::from(CONFIG_DIR_NAME)
    }

    /// Validates and prepares a config directory
    fn validate_config_dir(path: &Path) -> Result<()> {
        if !path.exists() {
            fs::create_dir_all(path)?;
        }

        if !path.is_dir() {
            return Err(anyhow!("{} is not a directory", path.display()));
        }

        fs::read_dir(path)?;
        Ok(())
    }

    /// Loads the configuration from the specified directory
    ///
    /// This method:
    /// 1. Determines the configuration directory (argument, `SMARTLINK_CONFIG`,
    ///    `./.smartlink`, `~/.smartlink`)
    /// 2. Loads the default embedded configuration
    /// 3. Merges it with the external `config.yaml` file if present
    /// 4. Applies `SMARTLINK_CONFIG__SECTION__KEY` environment overrides
    /// 5. Saves the merged configuration
    pub fn load_config(directory: &str) -> Result<Self> {
        let config_dir = Self::find_config_dir(directory);
        Self::validate_config_dir(&config_dir)?;
        info!(config_dir = %config_dir.display(), "Using config directory");

        let path = config_dir.join("config.yaml");

        let mut value: Value = serde_yaml::from_str(DEFAULT_CONFIG)?;

        match fs::read(&path) {
            Ok(data) => {
                info!(config_file = %path.display(), "Loaded config file");
                let external: Value = serde_yaml::from_slice(&data)?;
                merge_yaml(&mut value, &external);
            }
            Err(_) => {
                info!(config_file = %path.display(), "Config file not found, using default embedded config");
            }
        }

        let mut value = lower_keys_value(value);
        apply_env_overrides(&mut value, env::vars());

        let config = Config {
            config_dir: Some(config_dir),
            path: Some(path),
            data: Mutex::new(value),
        };

        config.save()?;
        Ok(config)
    }

    /// Builds an in-memory configuration from a YAML document merged over the
    /// embedded defaults. Nothing is ever written to disk.
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let mut value: Value = serde_yaml::from_str(DEFAULT_CONFIG)?;
        if !yaml.trim().is_empty() {
            let external: Value = serde_yaml::from_str(yaml)?;
            merge_yaml(&mut value, &external);
        }

        Ok(Config {
            config_dir: None,
            path: None,
            data: Mutex::new(lower_keys_value(value)),
        })
    }

    /// Returns the directory the configuration was loaded from, if any
    pub fn config_dir(&self) -> Option<&Path> {
        self.config_dir.as_deref()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Value>> {
        self.data
            .lock()
            .map_err(|_| anyhow!("configuration lock poisoned"))
    }

    /// Saves the current configuration to the config.yaml file
    pub fn save(&self) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let yaml = serde_yaml::to_string(&*self.lock()?)?;
        fs::write(path, yaml)?;
        Ok(())
    }

    /// Sets a configuration value at the specified path and saves it
    ///
    /// * `path` - Array of keys representing the path (e.g., `&["cache", "ttl_secs"]`)
    pub fn set_value(&self, path: &[&str], value: Value) -> Result<()> {
        {
            let mut data = self.lock()?;
            set_value_internal(&mut data, path, value)?;
        }
        self.save()
    }

    /// Gets a configuration value at the specified path
    ///
    /// Returns an error if the path doesn't exist.
    pub fn get_value(&self, path: &[&str]) -> Result<Value> {
        let data = self.lock()?;
        get_value_internal(&data, path)
    }

    /// Reads an unsigned integer, persisting `default` when the key is absent
    /// or holds something else.
    pub fn get_u64(&self, path: &[&str], default: u64) -> Result<u64> {
        match self.get_value(path) {
            Ok(Value::Number(n)) if n.as_u64().is_some() => Ok(n.as_u64().unwrap_or(default)),
            Ok(Value::String(s)) if s.parse::<u64>().is_ok() => Ok(s.parse().unwrap_or(default)),
            Ok(other) if !other.is_null() => {
                warn!(key = %path.join("."), "Invalid number in configuration, using default {}", default);
                self.set_value(path, Value::Number(Number::from(default)))?;
                Ok(default)
            }
            _ => {
                self.set_value(path, Value::Number(Number::from(default)))?;
                Ok(default)
            }
        }
    }

    /// Reads a non-empty string, persisting `default` when the key is absent.
    pub fn get_string(&self, path: &[&str], default: &str) -> Result<String> {
        match self.get_value(path) {
            Ok(Value::String(s)) if !s.trim().is_empty() => Ok(s),
            _ => {
                self.set_value(path, Value::String(default.to_string()))?;
                Ok(default.to_string())
            }
        }
    }

    /// Reads a boolean, persisting `default` when the key is absent.
    pub fn get_bool(&self, path: &[&str], default: bool) -> Result<bool> {
        match self.get_value(path) {
            Ok(Value::Bool(b)) => Ok(b),
            _ => {
                self.set_value(path, Value::Bool(default))?;
                Ok(default)
            }
        }
    }

    /// Minimum log level (`TRACE`, `DEBUG`, `INFO`, `WARN`, `ERROR`)
    pub fn get_log_min_level(&self) -> Result<String> {
        self.get_string(&["log", "min_level"], DEFAULT_LOG_MIN_LEVEL)
    }

    pub fn set_log_min_level(&self, level: String) -> Result<()> {
        self.set_value(&["log", "min_level"], Value::String(level))
    }

    /// Whether logs are written to the console
    pub fn get_log_enable_console(&self) -> Result<bool> {
        self.get_bool(&["log", "enable_console"], DEFAULT_LOG_ENABLE_CONSOLE)
    }

    pub fn set_log_enable_console(&self, enabled: bool) -> Result<()> {
        self.set_value(&["log", "enable_console"], Value::Bool(enabled))
    }
}

fn set_value_internal(data: &mut Value, path: &[&str], value: Value) -> Result<()> {
    if path.is_empty() {
        *data = value;
        return Ok(());
    }
    if data.is_null() {
        *data = Value::Mapping(Mapping::new());
    }
    if let Value::Mapping(map) = data {
        let key = Value::String(path[0].to_lowercase());
        if path.len() == 1 {
            map.insert(key, value);
        } else {
            let entry = map.entry(key).or_insert(Value::Mapping(Mapping::new()));
            set_value_internal(entry, &path[1..], value)?;
        }
        Ok(())
    } else {
        Err(anyhow!("Current node is not a map"))
    }
}

fn get_value_internal(data: &Value, path: &[&str]) -> Result<Value> {
    let mut current = data;
    for (i, key) in path.iter().enumerate() {
        if let Value::Mapping(map) = current {
            match map.get(&Value::String(key.to_lowercase())) {
                Some(next) => current = next,
                None => return Err(anyhow!("Path {} does not exist", path[..=i].join("."))),
            }
        } else {
            return Err(anyhow!("Path {} is not a mapping", path[..i].join(".")));
        }
    }
    Ok(current.clone())
}

fn apply_env_overrides(config: &mut Value, vars: impl Iterator<Item = (String, String)>) {
    for (key, value) in vars {
        if let Some(rest) = key.strip_prefix(ENV_PREFIX) {
            let key_path = rest.split("__").collect::<Vec<_>>();
            if let Err(err) = set_value_internal(config, &key_path, convert_env_value(&value)) {
                warn!(env_var = %key, "Ignoring configuration override: {}", err);
            }
        }
    }
}

fn convert_env_value(value: &str) -> Value {
    serde_yaml::from_str::<Value>(value).unwrap_or_else(|_| Value::String(value.to_string()))
}

fn lower_keys_value(value: Value) -> Value {
    match value {
        Value::Mapping(map) => {
            let mut new_map = Mapping::new();
            for (k, v) in map {
                let k = match k {
                    Value::String(s) => Value::String(s.to_lowercase()),
                    other => other,
                };
                new_map.insert(k, lower_keys_value(v));
            }
            Value::Mapping(new_map)
        }
        Value::Sequence(seq) => Value::Sequence(seq.into_iter().map(lower_keys_value).collect()),
        _ => value,
    }
}

/// Merges external YAML configuration into default configuration
///
/// Mappings are merged key by key; scalars and sequences from `external`
/// replace the default values.
fn merge_yaml(default: &mut Value, external: &Value) {
    match (default, external) {
        (Value::Mapping(dmap), Value::Mapping(emap)) => {
            for (k, v) in emap {
                match dmap.get_mut(k) {
                    Some(dv) => merge_yaml(dv, v),
                    None => {
                        dmap.insert(k.clone(), v.clone());
                    }
                }
            }
        }
        (d, e) => *d = e.clone(),
    }
}
