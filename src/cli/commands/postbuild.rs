//! Postbuild command - publish the compiled product

use super::{environment, network_client};
use crate::cache::producer::{self, PublishDecision};
use crate::config::Config;
use crate::context::PostbuildContext;
use crate::error::BuildCacheResult;
use console::style;
use tracing::info;

/// Execute the postbuild command
pub fn execute(config: &Config) -> BuildCacheResult<()> {
    let context = PostbuildContext::new(config, &environment())?;

    let (commit, artifact) = match producer::plan(&context) {
        PublishDecision::Publish { commit, artifact } => (commit, artifact),
        PublishDecision::Skip(reason) => {
            info!("Not publishing {}: {}", context.target_name, reason);
            return Ok(());
        }
    };

    let client = network_client(&context.cache_addresses, config.cache.request_timeout())?;
    let published = producer::publish(&context, &client, &commit, &artifact)?;

    println!(
        "{} {} to {} cache address(es) ({})",
        style("Published").green().bold(),
        context.target_name,
        published,
        commit
    );
    Ok(())
}
