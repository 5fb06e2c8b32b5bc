//! Directory-backed transport for `file://` cache roots
//!
//! Lets a shared or local directory act as the cache server. Missing objects
//! behave like an HTTP 404.

use super::transport::Transport;
use super::{NetworkClientError, NetworkResult};
use async_trait::async_trait;
use std::io;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;
use url::Url;

const NOT_FOUND: u16 = 404;

/// Serves cache objects from the local filesystem
#[derive(Debug, Default, Clone)]
pub struct LocalDirTransport;

impl LocalDirTransport {
    pub fn new() -> Self {
        Self
    }

    /// Whether this transport can serve `url`
    pub fn supports(url: &Url) -> bool {
        url.scheme() == "file"
    }

    fn object_path(url: &Url) -> NetworkResult<PathBuf> {
        if !Self::supports(url) {
            return Err(NetworkClientError::other(format!(
                "unsupported scheme '{}' for local transport",
                url.scheme()
            )));
        }
        url.to_file_path()
            .map_err(|_| NetworkClientError::other(format!("not a local path: {}", url)))
    }
}

fn map_io(error: io::Error) -> NetworkClientError {
    match error.kind() {
        io::ErrorKind::NotFound => NetworkClientError::UnsuccessfulStatus(NOT_FOUND),
        _ => NetworkClientError::other(error),
    }
}

async fn ensure_parent(path: &Path) -> NetworkResult<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .await
            .map_err(NetworkClientError::other)?;
    }
    Ok(())
}

#[async_trait]
impl Transport for LocalDirTransport {
    async fn file_exists(&self, url: &Url) -> NetworkResult<bool> {
        let path = Self::object_path(url)?;
        let exists = fs::try_exists(&path)
            .await
            .map_err(NetworkClientError::other)?;
        debug!("{} exists: {}", path.display(), exists);
        Ok(exists)
    }

    async fn fetch(&self, url: &Url) -> NetworkResult<Vec<u8>> {
        let path = Self::object_path(url)?;
        fs::read(&path).await.map_err(map_io)
    }

    async fn download(&self, url: &Url, location: &Path) -> NetworkResult<()> {
        let path = Self::object_path(url)?;
        if !fs::try_exists(&path).await.map_err(map_io)? {
            return Err(NetworkClientError::UnsuccessfulStatus(NOT_FOUND));
        }
        ensure_parent(location).await?;
        fs::copy(&path, location).await.map_err(map_io)?;
        debug!("Downloaded {} to {}", path.display(), location.display());
        Ok(())
    }

    async fn upload(&self, file: &Path, url: &Url) -> NetworkResult<()> {
        let path = Self::object_path(url)?;
        ensure_parent(&path).await?;
        fs::copy(file, &path).await.map_err(map_io)?;
        debug!("Uploaded {} to {}", file.display(), path.display());
        Ok(())
    }

    async fn create(&self, url: &Url) -> NetworkResult<()> {
        let path = Self::object_path(url)?;
        ensure_parent(&path).await?;
        fs::write(&path, b"").await.map_err(NetworkClientError::other)
    }

    fn transport_name(&self) -> &'static str {
        "local directory"
    }
}
