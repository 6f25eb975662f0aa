//! File-System Content Store
//!
//! Implements `ContentResolver` over a directory of `<content id>.json`
//! metadata files.

use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::domain::{ContentId, MetadataRecord, ResolveError};
use crate::ports::outbound::ContentResolver;

/// Resolves content identifiers to JSON files under a root directory.
pub struct FileSystemResolver {
    root: PathBuf,
}

impl FileSystemResolver {
    /// Store rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path for a content id. Ids that could escape the root are malformed.
    pub fn path_for(&self, content_id: &ContentId) -> Result<PathBuf, ResolveError> {
        let id = content_id.as_str();
        if id.is_empty() || id.contains(|c: char| c == '/' || c == '\\') || id.contains("..") {
            return Err(ResolveError::Malformed {
                pointer: id.to_string(),
                reason: "not a plain content identifier".to_string(),
            });
        }
        Ok(self.root.join(format!("{id}.json")))
    }
}

#[async_trait]
impl ContentResolver for FileSystemResolver {
    async fn resolve(&self, content_id: &ContentId) -> Result<MetadataRecord, ResolveError> {
        let path = self.path_for(content_id)?;
        debug!("[feed] Reading {}", path.display());

        let raw = tokio::fs::read(&path).await.map_err(|e| match e.kind() {
            ErrorKind::NotFound => ResolveError::NotFound(content_id.to_string()),
            _ => ResolveError::Transport(format!("{}: {e}", path.display())),
        })?;

        serde_json::from_slice(&raw).map_err(|e| ResolveError::Malformed {
            pointer: content_id.to_string(),
            reason: e.to_string(),
        })
    }
}
