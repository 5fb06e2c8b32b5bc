//! buildcache - Remote build artifact cache
//!
//! CLI entry point that dispatches to subcommands.

use buildcache::cli::{commands, report_error, Cli, Commands, LogFormat};
use buildcache::config::ConfigManager;
use buildcache::error::{BuildCacheError, BuildCacheResult};
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::debug;
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            report_error(&e);
            ExitCode::FAILURE
        }
    }
}

fn run() -> BuildCacheResult<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.log_format);

    let config_manager = match cli.config {
        Some(ref path) => ConfigManager::with_path(path.clone()),
        None => ConfigManager::new(),
    };

    // Find local config unless --no-local is set
    let local_config_path = if cli.no_local {
        debug!("Local config discovery disabled (--no-local)");
        None
    } else {
        let found = ConfigManager::find_local_config(&discovery_root()?);
        if let Some(ref path) = found {
            debug!("Found local config: {}", path.display());
        }
        found
    };

    let config = config_manager.load_merged(local_config_path.as_deref())?;

    match cli.command {
        Commands::Prebuild => commands::prebuild(&config),
        Commands::Postbuild => commands::postbuild(&config),
        Commands::Mark => commands::mark(&config),
        Commands::Context(args) => commands::context(args, &config),
        Commands::Config(args) => commands::config(args, &config, &config_manager),
    }
}

/// 0 = warn, 1 = info, 2+ = debug. Logs go to stderr so stdout stays parseable.
fn init_logging(verbose: u8, format: LogFormat) {
    let filter = match verbose {
        0 => EnvFilter::new("buildcache=warn"),
        1 => EnvFilter::new("buildcache=info"),
        _ => EnvFilter::new("buildcache=debug"),
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time();

    match format {
        LogFormat::Text => builder.init(),
        LogFormat::Json => builder.json().init(),
    }
}

/// Where local config discovery starts: the project root during a build,
/// otherwise the working directory
fn discovery_root() -> BuildCacheResult<PathBuf> {
    match std::env::var_os("SRCROOT") {
        Some(root) if !root.is_empty() => Ok(PathBuf::from(root)),
        _ => std::env::current_dir().map_err(|e| BuildCacheError::io("getting current directory", e)),
    }
}
