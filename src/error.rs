//! Error types for buildcache
//!
//! All modules use `BuildCacheResult<T>` as their return type.

use crate::network::NetworkClientError;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for buildcache operations
pub type BuildCacheResult<T> = Result<T, BuildCacheError>;

/// All errors that can occur in buildcache
#[derive(Error, Debug)]
pub enum BuildCacheError {
    // Context errors
    #[error("Missing required build environment variable: {0}")]
    MissingEnv(String),

    #[error("Invalid cache address: {0:?}")]
    InvalidAddress(String),

    // Configuration errors
    #[error("Invalid configuration at {path}: {reason}")]
    ConfigInvalid { path: PathBuf, reason: String },

    // Cache errors
    #[error("Target {target} must use the remote cache, but no artifact is available")]
    ForcedCacheUnavailable { target: String },

    #[error("Remote cache request failed: {0}")]
    Network(#[from] NetworkClientError),

    #[error("No transport available for cache address {0}")]
    UnsupportedTransport(String),

    // Lifecycle errors
    #[error(
        "{plugin} plugin has never been run, thinning cannot be supported. Verify you have \
         active network connection to the remote cache server or fallback to the non-thinned mode."
    )]
    ThinningNotRun { plugin: String },

    // IO errors
    #[error("IO error: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    // Serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    // General errors
    #[error("Internal error: {0}")]
    Internal(String),
}

impl BuildCacheError {
    /// Create an IO error with context
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Get actionable hint for the error
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            Self::MissingEnv(_) => {
                Some("Run this step from an Xcode build phase so build settings are exported")
            }
            Self::InvalidAddress(_) => {
                Some("Check cache.recommended_cache_address and cache.cache_addresses in .buildcache.toml")
            }
            Self::ForcedCacheUnavailable { .. } => {
                Some("Add the target to targets.focused_targets to allow local compilation")
            }
            Self::UnsupportedTransport(_) => Some("Use a file:// cache address"),
            _ => None,
        }
    }
}
