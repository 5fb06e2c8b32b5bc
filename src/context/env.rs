//! Typed access to the build environment
//!
//! The build tool exports its settings as a flat string map. Every field of
//! a context is read through [`EnvReader`], so a missing required key always
//! surfaces as `MissingEnv` naming that key.

use crate::error::{BuildCacheError, BuildCacheResult};
use std::collections::HashMap;
use std::path::PathBuf;

/// Conversion from a raw environment string. Conversions never fail: values
/// a type cannot classify map to that type's fallback.
pub trait EnvValue: Sized {
    fn from_env_value(raw: &str) -> Self;
}

impl EnvValue for String {
    fn from_env_value(raw: &str) -> Self {
        raw.to_string()
    }
}

impl EnvValue for PathBuf {
    fn from_env_value(raw: &str) -> Self {
        PathBuf::from(raw)
    }
}

/// Build settings use `YES`/`NO`; anything unrecognized reads as false
impl EnvValue for bool {
    fn from_env_value(raw: &str) -> Self {
        matches!(
            raw.trim().to_ascii_lowercase().as_str(),
            "yes" | "true" | "1"
        )
    }
}

/// Read-only view over an environment snapshot
#[derive(Debug, Clone, Copy)]
pub struct EnvReader<'a> {
    vars: &'a HashMap<String, String>,
}

impl<'a> EnvReader<'a> {
    pub fn new(vars: &'a HashMap<String, String>) -> Self {
        Self { vars }
    }

    /// Read a key that must be present
    pub fn required<T: EnvValue>(&self, key: &str) -> BuildCacheResult<T> {
        self.optional(key)
            .ok_or_else(|| BuildCacheError::MissingEnv(key.to_string()))
    }

    /// Read a key that may be absent
    pub fn optional<T: EnvValue>(&self, key: &str) -> Option<T> {
        self.vars.get(key).map(|raw| T::from_env_value(raw))
    }
}
