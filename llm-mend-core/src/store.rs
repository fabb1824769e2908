use crate::contract::{ContentStore, StoreError};
use async_trait::async_trait;
use std::path::Path;
use tracing::{debug, error};

/// Filesystem-backed [`ContentStore`]: UTF-8 text, whole-file reads and truncating writes.
#[derive(Debug, Default, Clone, Copy)]
pub struct FsContentStore;

impl FsContentStore {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ContentStore for FsContentStore {
    async fn read(&self, path: &Path) -> Result<String, StoreError> {
        let bytes = tokio::fs::read(path).await.map_err(|e| {
            error!(error = ?e, path = %path.display(), "Failed to read file");
            StoreError::Io {
                op: "read",
                path: path.to_path_buf(),
                source: e,
            }
        })?;
        let text = String::from_utf8(bytes).map_err(|e| {
            error!(error = %e, path = %path.display(), "File is not valid UTF-8");
            StoreError::Decode {
                path: path.to_path_buf(),
                source: e,
            }
        })?;
        debug!(path = %path.display(), size = text.len(), "Read file");
        Ok(text)
    }

    async fn write(&self, path: &Path, content: &str) -> Result<(), StoreError> {
        // tokio::fs::write flushes and closes before resolving
        tokio::fs::write(path, content).await.map_err(|e| {
            error!(error = ?e, path = %path.display(), "Failed to write file");
            StoreError::Io {
                op: "write",
                path: path.to_path_buf(),
                source: e,
            }
        })?;
        debug!(path = %path.display(), size = content.len(), "Wrote file");
        Ok(())
    }
}
