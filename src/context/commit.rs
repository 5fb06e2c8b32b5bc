//! Remote commit availability

use serde::Serialize;
use std::fs;
use std::path::Path;
use tracing::debug;

/// Whether a remote commit to reuse artifacts from was resolved
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum RemoteCommitInfo {
    Available { commit: String },
    Unavailable,
}

impl RemoteCommitInfo {
    /// Resolve from raw marker content. Absent or blank content is unavailable.
    pub fn resolve(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            Some(commit) if !commit.is_empty() => Self::Available {
                commit: commit.to_string(),
            },
            _ => Self::Unavailable,
        }
    }

    /// Read the commit marker file. A missing or unreadable marker is an
    /// expected condition and resolves to `Unavailable`.
    pub fn read_from(path: &Path) -> Self {
        match fs::read_to_string(path) {
            Ok(content) => Self::resolve(Some(&content)),
            Err(e) => {
                debug!("Remote commit marker {} unreadable: {}", path.display(), e);
                Self::Unavailable
            }
        }
    }

    pub fn commit(&self) -> Option<&str> {
        match self {
            Self::Available { commit } => Some(commit),
            Self::Unavailable => None,
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self, Self::Available { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn none_is_unavailable() {
        assert_eq!(RemoteCommitInfo::resolve(None), RemoteCommitInfo::Unavailable);
    }

    #[test]
    fn blank_is_unavailable() {
        assert_eq!(RemoteCommitInfo::resolve(Some("")), RemoteCommitInfo::Unavailable);
        assert_eq!(
            RemoteCommitInfo::resolve(Some(" \n\t ")),
            RemoteCommitInfo::Unavailable
        );
    }

    #[test]
    fn trims_commit() {
        let info = RemoteCommitInfo::resolve(Some("  abc123\n"));
        assert_eq!(
            info,
            RemoteCommitInfo::Available {
                commit: "abc123".to_string()
            }
        );
        assert_eq!(info.commit(), Some("abc123"));
        assert!(info.is_available());
    }

    #[test]
    fn reads_marker_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("arc.rc");
        fs::write(&path, "123\n").unwrap();

        assert_eq!(RemoteCommitInfo::read_from(&path).commit(), Some("123"));
    }

    #[test]
    fn empty_marker_file_is_unavailable() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("arc.rc");
        fs::write(&path, "").unwrap();

        assert_eq!(RemoteCommitInfo::read_from(&path), RemoteCommitInfo::Unavailable);
    }

    #[test]
    fn missing_marker_file_is_unavailable() {
        let dir = TempDir::new().unwrap();
        let info = RemoteCommitInfo::read_from(&dir.path().join("missing.rc"));
        assert_eq!(info, RemoteCommitInfo::Unavailable);
    }

    #[test]
    fn serializes_with_state_tag() {
        let json = serde_json::to_value(RemoteCommitInfo::resolve(Some("abc"))).unwrap();
        assert_eq!(json["state"], "available");
        assert_eq!(json["commit"], "abc");
    }
}
