//! Remote artifact cache
//!
//! Artifacts are keyed by the remote commit and the target name. A commit is
//! usable once its readiness marker exists on the cache server.
//!
//! # Steps
//!
//! | Step | Role | Outcome |
//! |------|------|---------|
//! | prebuild | consumer | remote artifact downloaded, or local compilation |
//! | postbuild | producer | artifact uploaded to every address, marker created |
//!
//! Cache-only targets (`force_cached`) never fall back to local compilation:
//! a miss fails the build step instead.

pub mod consumer;
pub mod layout;
pub mod producer;

pub use consumer::{CacheDecision, LocalReason};
pub use layout::CacheLayout;
pub use producer::{PublishDecision, SkipReason};
