//! CLI command implementations

pub mod config;
pub mod context;
pub mod mark;
pub mod postbuild;
pub mod prebuild;

pub use config::execute as config;
pub use context::execute as context;
pub use mark::execute as mark;
pub use postbuild::execute as postbuild;
pub use prebuild::execute as prebuild;

use crate::error::{BuildCacheError, BuildCacheResult};
use crate::network::{LocalDirTransport, TokioNetworkClient};
use std::collections::HashMap;
use std::time::Duration;
use url::Url;

/// Snapshot of the process environment. Non-UTF-8 entries are skipped.
pub(crate) fn environment() -> HashMap<String, String> {
    std::env::vars_os()
        .filter_map(|(key, value)| Some((key.into_string().ok()?, value.into_string().ok()?)))
        .collect()
}

/// Client able to reach every address in `addresses`
pub(crate) fn network_client(
    addresses: &[Url],
    timeout: Duration,
) -> BuildCacheResult<TokioNetworkClient<LocalDirTransport>> {
    if let Some(address) = addresses.iter().find(|a| !LocalDirTransport::supports(a)) {
        return Err(BuildCacheError::UnsupportedTransport(address.scheme().to_string()));
    }
    TokioNetworkClient::new(LocalDirTransport::new(), timeout)
}
