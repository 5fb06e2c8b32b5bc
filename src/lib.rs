//! buildcache - Remote build artifact cache
//!
//! Resolves per-target build context from the environment, decides whether a
//! target can reuse an artifact compiled at a remote commit, and publishes
//! artifacts for other machines to reuse.

pub mod cache;
pub mod cli;
pub mod config;
pub mod context;
pub mod error;
pub mod network;
pub mod plugin;

pub use error::{BuildCacheError, BuildCacheResult};
