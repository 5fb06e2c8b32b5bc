//! Configuration schema for buildcache
//!
//! Project configuration lives in `.buildcache.toml` next to the sources;
//! user defaults in `~/.config/buildcache/config.toml`.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Root configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Remote cache settings
    pub cache: CacheConfig,

    /// Target selection
    pub targets: TargetsConfig,

    /// File locations
    pub paths: PathsConfig,
}

/// Whether this machine only consumes artifacts or also publishes them
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    #[default]
    Consumer,
    Producer,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Consumer => write!(f, "consumer"),
            Self::Producer => write!(f, "producer"),
        }
    }
}

/// Remote cache settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub mode: Mode,

    /// Address consumers download from
    pub recommended_cache_address: String,

    /// Every address a producer uploads to
    pub cache_addresses: Vec<String>,

    /// Per-request timeout enforced by the transport
    pub request_timeout_secs: u64,

    /// Disable the remote cache for all remaining targets after one timeout
    pub turn_off_remote_cache_on_first_timeout: bool,
}

impl CacheConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            mode: Mode::Consumer,
            recommended_cache_address: String::new(),
            cache_addresses: vec![],
            request_timeout_secs: 20,
            turn_off_remote_cache_on_first_timeout: false,
        }
    }
}

/// Target selection
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TargetsConfig {
    /// Targets allowed to compile locally. When non-empty, every other
    /// target is cache-only.
    pub focused_targets: Vec<String>,
}

/// File locations, relative to the source root unless absolute
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// File holding the remote commit sha
    pub remote_commit_file: String,

    /// Compilation history, relative to the target temp dir
    pub compilation_history_file: String,

    /// Statistics directory, `~` is expanded
    pub stats_dir: String,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            remote_commit_file: "arc.rc".to_string(),
            compilation_history_file: "history.compile".to_string(),
            stats_dir: "~/.buildcache".to_string(),
        }
    }
}
