//! Context command - print the resolved build step context

use super::environment;
use crate::cli::args::{ContextArgs, Step};
use crate::config::Config;
use crate::context::{PostbuildContext, PrebuildContext};
use crate::error::BuildCacheResult;

/// Execute the context command
pub fn execute(args: ContextArgs, config: &Config) -> BuildCacheResult<()> {
    let vars = environment();
    let json = match args.step {
        Step::Prebuild => serde_json::to_string_pretty(&PrebuildContext::new(config, &vars)?)?,
        Step::Postbuild => serde_json::to_string_pretty(&PostbuildContext::new(config, &vars)?)?,
    };
    println!("{}", json);
    Ok(())
}
