//! Async transport abstraction and its callback adapter
//!
//! A [`Transport`] performs the actual I/O. [`TokioNetworkClient`] exposes it
//! through the callback-based [`NetworkClient`] interface, running every
//! operation on a runtime it owns and turning an elapsed request timeout into
//! [`NetworkClientError::Timeout`].

use super::{Completion, NetworkClient, NetworkClientError, NetworkResult};
use crate::error::{BuildCacheError, BuildCacheResult};
use async_trait::async_trait;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::{Builder, Runtime};
use tracing::debug;
use url::Url;

/// Abstract remote cache transport
///
/// Implementations report failures with the shared [`NetworkClientError`]
/// taxonomy. Timeouts are enforced by the adapter, not the transport.
#[async_trait]
pub trait Transport: Send + Sync + 'static {
    /// Check whether an object exists at `url`
    async fn file_exists(&self, url: &Url) -> NetworkResult<bool>;

    /// Read the whole object at `url`
    async fn fetch(&self, url: &Url) -> NetworkResult<Vec<u8>>;

    /// Store the object at `url` into the local file `location`
    async fn download(&self, url: &Url, location: &Path) -> NetworkResult<()>;

    /// Store the local `file` at `url`
    async fn upload(&self, file: &Path, url: &Url) -> NetworkResult<()>;

    /// Create an empty object at `url`
    async fn create(&self, url: &Url) -> NetworkResult<()>;

    /// Human-readable transport name for logs
    fn transport_name(&self) -> &'static str;
}

/// Runs a [`Transport`] behind the callback interface
pub struct TokioNetworkClient<T> {
    transport: Arc<T>,
    runtime: Runtime,
    timeout: Duration,
}

impl<T: Transport> TokioNetworkClient<T> {
    /// Create a client with its own runtime and the given request timeout
    pub fn new(transport: T, timeout: Duration) -> BuildCacheResult<Self> {
        let runtime = Builder::new_multi_thread()
            .worker_threads(2)
            .thread_name("buildcache-net")
            .enable_all()
            .build()
            .map_err(|e| BuildCacheError::io("starting network runtime", e))?;

        debug!(
            "Using {} transport with {:?} request timeout",
            transport.transport_name(),
            timeout
        );

        Ok(Self {
            transport: Arc::new(transport),
            runtime,
            timeout,
        })
    }

    /// Request timeout applied to every operation
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    fn dispatch<R, F, Fut>(&self, completion: Completion<R>, operation: F)
    where
        R: Send + 'static,
        F: FnOnce(Arc<T>) -> Fut,
        Fut: Future<Output = NetworkResult<R>> + Send + 'static,
    {
        let timeout = self.timeout;
        let request = operation(Arc::clone(&self.transport));
        self.runtime.spawn(async move {
            let result = match tokio::time::timeout(timeout, request).await {
                Ok(result) => result,
                Err(_) => Err(NetworkClientError::Timeout),
            };
            completion.complete(result);
        });
    }
}

impl<T: Transport> NetworkClient for TokioNetworkClient<T> {
    fn file_exists(&self, url: &Url, completion: Completion<bool>) {
        let url = url.clone();
        self.dispatch(completion, move |transport| async move {
            transport.file_exists(&url).await
        });
    }

    fn fetch(&self, url: &Url, completion: Completion<Vec<u8>>) {
        let url = url.clone();
        self.dispatch(completion, move |transport| async move {
            transport.fetch(&url).await
        });
    }

    fn download(&self, url: &Url, location: &Path, completion: Completion<()>) {
        let url = url.clone();
        let location = location.to_path_buf();
        self.dispatch(completion, move |transport| async move {
            transport.download(&url, &location).await
        });
    }

    fn upload(&self, file: &Path, url: &Url, completion: Completion<()>) {
        let file: PathBuf = file.to_path_buf();
        let url = url.clone();
        self.dispatch(completion, move |transport| async move {
            transport.upload(&file, &url).await
        });
    }

    fn create(&self, url: &Url, completion: Completion<()>) {
        let url = url.clone();
        self.dispatch(completion, move |transport| async move {
            transport.create(&url).await
        });
    }
}
