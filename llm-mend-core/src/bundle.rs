//! Pack a directory of source files into one annotated document, and unpack it again.
//!
//! Each entry starts with a marker line `// File: <relative/path>` followed by the file's
//! content verbatim. [`pack`] appends one newline after every entry, which
//! [`parse_bundle`] strips again, so packing and parsing recovers the original contents.

use regex::Regex;
use std::path::{Component, Path, PathBuf};
use tracing::{debug, info};

use crate::discovery::{discover, DiscoveryError};

pub const MARKER_PREFIX: &str = "// File:";

#[derive(Debug, thiserror::Error)]
pub enum BundleError {
    #[error(transparent)]
    Discovery(#[from] DiscoveryError),
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{} is not valid UTF-8", .0.display())]
    Decode(PathBuf),
    #[error("refusing to unpack unsafe path {0:?}")]
    UnsafePath(String),
    #[error("invalid marker pattern: {0}")]
    Pattern(#[from] regex::Error),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BundleEntry {
    /// '/'-separated path relative to the bundle root.
    pub path: String,
    pub content: String,
}

const MARKER_PATTERN: &str = r"^//\s*File:\s*(\S+)";

/// Concatenate every file under `root` ending in `suffix` into one bundle.
pub fn pack(root: &Path, suffix: &str) -> Result<String, BundleError> {
    let mut bundle = String::new();
    let paths = discover(root, suffix)?;
    for path in &paths {
        let bytes = std::fs::read(path).map_err(|e| BundleError::Io {
            path: path.clone(),
            source: e,
        })?;
        let content = String::from_utf8(bytes).map_err(|_| BundleError::Decode(path.clone()))?;
        let rel = path.strip_prefix(root).unwrap_or(path);
        let rel = rel
            .components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect::<Vec<_>>()
            .join("/");
        debug!(path = %rel, size = content.len(), "Packing file");
        bundle.push_str(MARKER_PREFIX);
        bundle.push(' ');
        bundle.push_str(&rel);
        bundle.push('\n');
        bundle.push_str(&content);
        bundle.push('\n');
    }
    info!(root = %root.display(), files = paths.len(), "Packed bundle");
    Ok(bundle)
}

/// Split a bundle into its entries. Text before the first marker is ignored and a
/// repeated path keeps the content of its last occurrence.
pub fn parse_bundle(text: &str) -> Result<Vec<BundleEntry>, BundleError> {
    let marker = Regex::new(MARKER_PATTERN)?;
    let mut entries: Vec<BundleEntry> = Vec::new();
    let mut current: Option<BundleEntry> = None;

    fn finish(entries: &mut Vec<BundleEntry>, mut entry: BundleEntry) {
        if entry.content.ends_with('\n') {
            entry.content.pop();
        }
        match entries.iter_mut().find(|e| e.path == entry.path) {
            Some(existing) => existing.content = entry.content,
            None => entries.push(entry),
        }
    }

    for line in text.split_inclusive('\n') {
        if let Some(caps) = marker.captures(line.trim_end_matches(['\r', '\n'])) {
            if let Some(done) = current.take() {
                finish(&mut entries, done);
            }
            current = Some(BundleEntry {
                path: caps[1].to_string(),
                content: String::new(),
            });
        } else if let Some(entry) = current.as_mut() {
            entry.content.push_str(line);
        }
    }
    if let Some(done) = current {
        finish(&mut entries, done);
    }
    Ok(entries)
}

fn safe_relative(path: &str) -> Result<PathBuf, BundleError> {
    let candidate = Path::new(path);
    let safe = candidate
        .components()
        .all(|c| matches!(c, Component::Normal(_) | Component::CurDir));
    if safe && candidate.components().next().is_some() {
        Ok(candidate.to_path_buf())
    } else {
        Err(BundleError::UnsafePath(path.to_string()))
    }
}

/// Write `entries` under `out_root`, creating directories as needed.
/// Returns the written paths in entry order.
pub fn unpack(entries: &[BundleEntry], out_root: &Path) -> Result<Vec<PathBuf>, BundleError> {
    // Validate everything before touching the filesystem.
    let targets = entries
        .iter()
        .map(|entry| safe_relative(&entry.path).map(|rel| out_root.join(rel)))
        .collect::<Result<Vec<_>, _>>()?;

    for (entry, target) in entries.iter().zip(&targets) {
        if let Some(parent) = target.parent() {
            std::fs::create_dir_all(parent).map_err(|e| BundleError::Io {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }
        std::fs::write(target, &entry.content).map_err(|e| BundleError::Io {
            path: target.clone(),
            source: e,
        })?;
        debug!(path = %target.display(), size = entry.content.len(), "Unpacked file");
    }
    info!(out_root = %out_root.display(), files = targets.len(), "Unpacked bundle");
    Ok(targets)
}
