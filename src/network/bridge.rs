//! Blocking adapter over the callback-based [`NetworkClient`]

use super::{Completion, NetworkClient, NetworkClientError, NetworkResult};
use std::path::Path;
use url::Url;

/// Issue a callback-based operation and block until its completion fires.
///
/// `action` receives the completion handle and must start the operation
/// exactly once; its arguments are captured by the closure, so one adapter
/// serves every arity. The wait has no timeout of its own: the transport is
/// expected to report `Timeout` itself. A completion dropped without a
/// result yields `NoResponse`.
///
/// Must not be called from within an async runtime context.
pub fn execute_synchronous<T, F>(action: F) -> NetworkResult<T>
where
    F: FnOnce(Completion<T>),
{
    let (completion, handoff) = Completion::channel();
    action(completion);
    handoff
        .blocking_recv()
        .unwrap_or(Err(NetworkClientError::NoResponse))
}

/// Synchronous variants of every [`NetworkClient`] operation
pub trait SynchronousNetworkClient: NetworkClient {
    fn file_exists_synchronously(&self, url: &Url) -> NetworkResult<bool> {
        execute_synchronous(|completion| self.file_exists(url, completion))
    }

    fn fetch_synchronously(&self, url: &Url) -> NetworkResult<Vec<u8>> {
        execute_synchronous(|completion| self.fetch(url, completion))
    }

    fn download_synchronously(&self, url: &Url, location: &Path) -> NetworkResult<()> {
        execute_synchronous(|completion| self.download(url, location, completion))
    }

    fn upload_synchronously(&self, file: &Path, url: &Url) -> NetworkResult<()> {
        execute_synchronous(|completion| self.upload(file, url, completion))
    }

    fn create_synchronously(&self, url: &Url) -> NetworkResult<()> {
        execute_synchronous(|completion| self.create(url, completion))
    }
}

impl<C: NetworkClient + ?Sized> SynchronousNetworkClient for C {}
