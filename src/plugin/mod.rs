//! Build plugins for thinned (multi-target) builds

pub mod aggregation;
pub mod thinning;

pub use aggregation::ThinnedTargetsPlugin;
pub use thinning::{ThinningConsumer, ThinningPlugin};
