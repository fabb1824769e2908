//! Enumerates candidate files under a root directory.

use std::path::{Path, PathBuf};
use tracing::{debug, info};

#[derive(Debug, thiserror::Error)]
#[error("failed to scan {}: {source}", .path.display())]
pub struct DiscoveryError {
    pub path: PathBuf,
    #[source]
    pub source: std::io::Error,
}

/// Recursively collect regular files at or below `root` whose name ends with `suffix`.
///
/// A missing root yields an empty list. Symlinks are not followed. The result is
/// sorted so repeated runs over the same tree see the same order.
pub fn discover(root: &Path, suffix: &str) -> Result<Vec<PathBuf>, DiscoveryError> {
    info!(root = %root.display(), suffix, "Discovering files");

    match std::fs::metadata(root) {
        Ok(meta) if meta.is_dir() => {}
        Ok(_) => {
            debug!(root = %root.display(), "Root is not a directory, nothing to discover");
            return Ok(Vec::new());
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!(root = %root.display(), "Root does not exist, nothing to discover");
            return Ok(Vec::new());
        }
        Err(e) => {
            return Err(DiscoveryError {
                path: root.to_path_buf(),
                source: e,
            })
        }
    }

    fn visit_dir(dir: &Path, suffix: &str, results: &mut Vec<PathBuf>) -> Result<(), DiscoveryError> {
        let wrap = |e: std::io::Error| DiscoveryError {
            path: dir.to_path_buf(),
            source: e,
        };
        for entry_res in std::fs::read_dir(dir).map_err(wrap)? {
            let entry = entry_res.map_err(wrap)?;
            let file_type = entry.file_type().map_err(wrap)?;
            let path = entry.path();
            if file_type.is_dir() {
                visit_dir(&path, suffix, results)?;
            } else if file_type.is_file() {
                // Raw bytes, so names that are not valid UTF-8 still match.
                if entry
                    .file_name()
                    .as_encoded_bytes()
                    .ends_with(suffix.as_bytes())
                {
                    results.push(path);
                } else {
                    debug!(path = %path.display(), "Skipping non-matching file");
                }
            }
        }
        Ok(())
    }

    let mut results = Vec::new();
    visit_dir(root, suffix, &mut results)?;
    results.sort();

    info!(count = results.len(), "Discovery complete");
    Ok(results)
}
