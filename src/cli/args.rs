//! CLI argument definitions using clap derive

use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// buildcache - Remote build artifact cache
///
/// Runs inside build phases to reuse compiled artifacts from a remote
/// cache (prebuild) or publish them (postbuild).
#[derive(Parser, Debug)]
#[command(name = "buildcache")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Configuration file path
    #[arg(short, long, global = true, env = "BUILDCACHE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Skip local .buildcache.toml discovery
    #[arg(long, global = true)]
    pub no_local: bool,

    /// Log output format
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Reuse the remote artifact for the current target, if available
    Prebuild,

    /// Publish the current target's product to the remote cache
    Postbuild,

    /// Mark the remote commit ready once every target is published
    Mark,

    /// Print the resolved context for a build step as JSON
    Context(ContextArgs),

    /// Show configuration
    Config(ConfigArgs),
}

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    /// Human-readable lines
    Text,
    /// One JSON object per event
    Json,
}

/// Arguments for the context command
#[derive(Parser, Debug)]
pub struct ContextArgs {
    /// Build step whose context to resolve
    #[arg(value_enum)]
    pub step: Step,
}

/// Build steps
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Step {
    Prebuild,
    Postbuild,
}

/// Arguments for the config command
#[derive(Parser, Debug)]
pub struct ConfigArgs {
    /// Subcommand for config
    #[command(subcommand)]
    pub action: Option<ConfigAction>,
}

/// Config subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Show configuration file path
    Path,
}
