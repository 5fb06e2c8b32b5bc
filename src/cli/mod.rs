//! Command-line interface

pub mod args;
pub mod commands;

pub use args::{Cli, Commands, LogFormat};

use crate::error::BuildCacheError;
use console::style;

/// Print an error and its hint to stderr
pub fn report_error(error: &BuildCacheError) {
    eprintln!("{} {}", style("Error:").red().bold(), error);
    if let Some(hint) = error.hint() {
        eprintln!("{} {}", style("Hint:").yellow(), hint);
    }
}
