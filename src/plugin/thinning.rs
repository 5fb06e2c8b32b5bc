//! Lifecycle guard for thinning plugins
//!
//! A thinning plugin that is wired into the build but never run means the
//! build system skipped the caching step, and the products it should have
//! fetched are missing. That must fail loudly: when a [`ThinningConsumer`]
//! goes out of scope without [`ThinningConsumer::run`] having been called,
//! on any exit path, the process terminates with status 1.

use crate::error::{BuildCacheError, BuildCacheResult};
use console::style;
use tracing::error;

/// A plugin participating in a thinned (multi-target) build
pub trait ThinningPlugin {
    /// Name used in diagnostics
    fn name(&self) -> &str;

    /// The plugin's actual work
    fn run(&mut self) -> BuildCacheResult<()>;
}

type ViolationHandler = Box<dyn FnMut(&BuildCacheError)>;

/// Owns a plugin and enforces that it runs before leaving scope
pub struct ThinningConsumer<P: ThinningPlugin> {
    plugin: P,
    has_run: bool,
    on_violation: ViolationHandler,
}

impl<P: ThinningPlugin> ThinningConsumer<P> {
    pub fn new(plugin: P) -> Self {
        Self {
            plugin,
            has_run: false,
            on_violation: Box::new(terminate),
        }
    }

    /// Replace process termination with a custom handler
    pub fn with_violation_handler(mut self, handler: impl FnMut(&BuildCacheError) + 'static) -> Self {
        self.on_violation = Box::new(handler);
        self
    }

    pub fn has_run(&self) -> bool {
        self.has_run
    }

    /// Run the plugin. Consumes the guard, so it runs at most once.
    pub fn run(mut self) -> BuildCacheResult<()> {
        self.has_run = true;
        self.plugin.run()
    }
}

impl<P: ThinningPlugin> Drop for ThinningConsumer<P> {
    fn drop(&mut self) {
        if self.has_run {
            return;
        }
        let violation = BuildCacheError::ThinningNotRun {
            plugin: self.plugin.name().to_string(),
        };
        error!("{}", violation);
        (self.on_violation)(&violation);
    }
}

fn terminate(violation: &BuildCacheError) {
    eprintln!("{} {}", style("Error:").red().bold(), violation);
    std::process::exit(1);
}
