//! Remote cache network layer
//!
//! The transport speaks in callbacks: every operation is single-shot and
//! delivers exactly one terminal result through a [`Completion`]. Build
//! steps are strictly sequential, so [`SynchronousNetworkClient`] turns each
//! operation into a blocking call.
//!
//! - [`TokioNetworkClient`] runs an async [`Transport`] on a private runtime
//!   and enforces the request timeout
//! - [`LocalDirTransport`] serves `file://` cache roots

mod bridge;
pub mod local;
pub mod transport;

pub use bridge::{execute_synchronous, SynchronousNetworkClient};
pub use local::LocalDirTransport;
pub use transport::{TokioNetworkClient, Transport};

use std::path::Path;
use thiserror::Error;
use tokio::sync::oneshot;
use url::Url;

/// Result of a single network operation
pub type NetworkResult<T> = Result<T, NetworkClientError>;

/// Failures shared by every network operation
#[derive(Error, Debug)]
pub enum NetworkClientError {
    /// The completion was released without ever receiving a result
    #[error("no response received")]
    NoResponse,

    #[error("response body is missing")]
    MissingBody,

    /// Non-2xx status code
    #[error("unsuccessful response status {0}")]
    UnsuccessfulStatus(u16),

    /// Transport produced neither a response nor an error
    #[error("transport returned neither a response nor an error")]
    InconsistentTransport,

    #[error("request timed out")]
    Timeout,

    #[error("{0}")]
    Other(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl NetworkClientError {
    /// Wrap an arbitrary transport failure
    pub fn other(cause: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Self::Other(cause.into())
    }
}

/// Single-shot completion handle handed to a transport operation.
///
/// Consuming `complete` makes a second result impossible. Dropping the handle
/// without completing releases the waiting caller with `NoResponse`.
#[derive(Debug)]
pub struct Completion<T> {
    tx: oneshot::Sender<NetworkResult<T>>,
}

impl<T> Completion<T> {
    pub(crate) fn channel() -> (Self, oneshot::Receiver<NetworkResult<T>>) {
        let (tx, rx) = oneshot::channel();
        (Self { tx }, rx)
    }

    /// Deliver the terminal result
    pub fn complete(self, result: NetworkResult<T>) {
        if self.tx.send(result).is_err() {
            tracing::debug!("Network result delivered after the caller stopped waiting");
        }
    }
}

/// Callback-based remote cache transport
pub trait NetworkClient: Send + Sync {
    fn file_exists(&self, url: &Url, completion: Completion<bool>);

    fn fetch(&self, url: &Url, completion: Completion<Vec<u8>>);

    fn download(&self, url: &Url, location: &Path, completion: Completion<()>);

    fn upload(&self, file: &Path, url: &Url, completion: Completion<()>);

    /// Creates an empty object at the remote location
    fn create(&self, url: &Url, completion: Completion<()>);
}
