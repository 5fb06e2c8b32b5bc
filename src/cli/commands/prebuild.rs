//! Prebuild command - reuse the remote artifact when possible

use super::{environment, network_client};
use crate::cache::consumer::{self, CacheDecision};
use crate::cli::report_error;
use crate::config::Config;
use crate::context::PrebuildContext;
use crate::error::BuildCacheResult;
use crate::network::NetworkClient;
use crate::plugin::{ThinnedTargetsPlugin, ThinningConsumer};
use console::style;
use tracing::debug;

/// Execute the prebuild command
pub fn execute(config: &Config) -> BuildCacheResult<()> {
    let context = PrebuildContext::new(config, &environment())?;

    // Without a remote commit nothing is fetched, whatever the address scheme
    let network = match context.remote_commit.commit() {
        Some(_) => Some(network_client(
            std::slice::from_ref(&context.recommended_cache_address),
            config.cache.request_timeout(),
        )?),
        None => None,
    };
    let client = network.as_ref().map(|c| c as &dyn NetworkClient);

    // Armed before deciding: any exit without a remote decision terminates
    let thinning = context.thinned_targets.clone().map(|targets| {
        debug!("Thinning enabled for {} target(s)", targets.len());
        ThinningConsumer::new(ThinnedTargetsPlugin::new(&context, client, targets))
    });

    let decided = match client {
        Some(client) => consumer::decide(&context, client),
        None => consumer::without_remote_commit(&context),
    };
    let decision = match decided
        .and_then(|decision| consumer::persist(&context, &decision).map(|()| decision))
    {
        Ok(decision) => decision,
        Err(e) => {
            // The guard exits on return, before main could report
            if thinning.is_some() {
                report_error(&e);
            }
            return Err(e);
        }
    };

    match decision {
        CacheDecision::Remote { commit, artifact } => {
            if let Some(thinning) = thinning {
                thinning.run()?;
            }
            println!(
                "{} {} from remote cache ({})",
                style("Using").green().bold(),
                context.target_name,
                commit
            );
            debug!("Artifact at {}", artifact.display());
        }
        CacheDecision::Local(reason) => {
            println!(
                "{} {} locally: {}",
                style("Compiling").yellow().bold(),
                context.target_name,
                reason
            );
        }
    }

    Ok(())
}
