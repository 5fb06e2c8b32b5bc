//! Mark command - declare the remote commit's artifacts complete

use super::{environment, network_client};
use crate::cache::producer;
use crate::config::{Config, Mode};
use crate::context::{parse_address, resolve_in_root, BuildActionType, EnvReader, RemoteCommitInfo};
use crate::error::BuildCacheResult;
use console::style;
use std::path::PathBuf;
use tracing::info;

/// Execute the mark command. Runs once, after every target has published.
pub fn execute(config: &Config) -> BuildCacheResult<()> {
    if config.cache.mode != Mode::Producer {
        info!("Not marking: consumer mode");
        return Ok(());
    }

    let vars = environment();
    let env = EnvReader::new(&vars);
    if env.optional::<BuildActionType>("ACTION") == Some(BuildActionType::IndexBuild) {
        info!("Not marking: index build");
        return Ok(());
    }

    let src_root: PathBuf = env.required("SRCROOT")?;
    let location = resolve_in_root(&src_root, &config.paths.remote_commit_file);
    let remote_commit = RemoteCommitInfo::read_from(&location);
    let Some(commit) = remote_commit.commit() else {
        info!("Not marking: no remote commit in {}", location.display());
        return Ok(());
    };

    let addresses = config
        .cache
        .cache_addresses
        .iter()
        .map(|raw| parse_address(raw))
        .collect::<BuildCacheResult<Vec<_>>>()?;
    let client = network_client(&addresses, config.cache.request_timeout())?;
    let marked = producer::mark(&addresses, &client, commit)?;

    println!(
        "{} {} ready on {} cache address(es)",
        style("Marked").green().bold(),
        commit,
        marked
    );
    Ok(())
}
