//! Configuration management for buildcache
//!
//! Two layers are merged, the later one winning:
//! 1. User-global: `~/.config/buildcache/config.toml` (or `--config`)
//! 2. Project-local: the nearest `.buildcache.toml` above the source root
//!
//! Tables merge by key, arrays and scalars are replaced. The resulting
//! [`Config`] is immutable and passed explicitly to every consumer.

pub mod schema;

pub use schema::{CacheConfig, Config, Mode, PathsConfig, TargetsConfig};

use crate::error::{BuildCacheError, BuildCacheResult};
use std::fs;
use std::path::{Path, PathBuf};
use toml::Value;
use tracing::debug;

/// File name of the project-local configuration
pub const LOCAL_CONFIG_FILE: &str = ".buildcache.toml";

/// Configuration manager
pub struct ConfigManager {
    config_path: Option<PathBuf>,
}

impl ConfigManager {
    /// Create a new config manager with the default user path
    pub fn new() -> Self {
        Self {
            config_path: Self::default_config_path(),
        }
    }

    /// Create a config manager with a custom user path
    pub fn with_path(path: PathBuf) -> Self {
        Self {
            config_path: Some(path),
        }
    }

    /// Default user config path, if a config directory is known
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("buildcache").join("config.toml"))
    }

    /// Find the nearest project-local config, walking up from `start`
    pub fn find_local_config(start: &Path) -> Option<PathBuf> {
        start
            .ancestors()
            .map(|dir| dir.join(LOCAL_CONFIG_FILE))
            .find(|candidate| candidate.is_file())
    }

    /// Load the user configuration alone
    pub fn load(&self) -> BuildCacheResult<Config> {
        self.load_merged(None)
    }

    /// Load the user configuration overlaid with an optional local file
    pub fn load_merged(&self, local: Option<&Path>) -> BuildCacheResult<Config> {
        let mut merged = Value::Table(Default::default());

        let layers = self.config_path.as_deref().into_iter().chain(local);
        for path in layers {
            if !path.exists() {
                debug!("Config file {} not found, skipping", path.display());
                continue;
            }
            debug!("Loading config layer {}", path.display());
            merged = deep_merge(merged, Self::read_layer(path)?);
        }

        merged
            .try_into()
            .map_err(|e: toml::de::Error| BuildCacheError::ConfigInvalid {
                path: local
                    .or(self.config_path.as_deref())
                    .map(Path::to_path_buf)
                    .unwrap_or_default(),
                reason: e.to_string(),
            })
    }

    fn read_layer(path: &Path) -> BuildCacheResult<Value> {
        let content = fs::read_to_string(path)
            .map_err(|e| BuildCacheError::io(format!("reading config from {}", path.display()), e))?;

        toml::from_str(&content).map_err(|e| BuildCacheError::ConfigInvalid {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    /// Get the user config file path
    pub fn path(&self) -> Option<&Path> {
        self.config_path.as_deref()
    }
}

impl Default for ConfigManager {
    fn default() -> Self {
        Self::new()
    }
}

/// Deep merge two TOML values: tables by key, everything else replaced
fn deep_merge(base: Value, overlay: Value) -> Value {
    match (base, overlay) {
        (Value::Table(mut base_table), Value::Table(overlay_table)) => {
            for (key, overlay_value) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_value) => deep_merge(base_value, overlay_value),
                    None => overlay_value,
                };
                base_table.insert(key, merged);
            }
            Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}
