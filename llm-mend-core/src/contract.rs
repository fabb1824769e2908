//! # contract: seams of the mend pipeline
//!
//! This module defines the traits the pipeline is generic over, and the plain
//! data types that flow between its stages:
//!
//! - [`ContentStore`]: whole-file text reads and writes against durable storage.
//! - [`CompletionService`]: one request/response exchange with a text-generation service.
//! - [`Console`]: the human on the other side of the review loop.
//!
//! Each trait is annotated for `mockall` (behind the `test-export-mocks` feature,
//! on by default) so integration tests can substitute deterministic doubles.
//! Real implementations live next to the code that owns them
//! ([`crate::store::FsContentStore`], [`crate::transform::OpenAiCompletionService`])
//! or in the CLI crate (the stdin console).

use async_trait::async_trait;
#[allow(unused_imports)]
use mockall::{automock, predicate::*};
use std::path::{Path, PathBuf};

/// One discovered file moving through the pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Item {
    pub path: PathBuf,
    /// Content as read from the store at the start of the item's task.
    pub content: String,
    /// Proposed replacement, present only after a successful transformation.
    pub transformed: Option<String>,
}

impl Item {
    pub fn new(path: PathBuf, content: String) -> Self {
        Self {
            path,
            content,
            transformed: None,
        }
    }
}

/// Instruction plus payload for a single transformation attempt.
///
/// Built fresh per attempt (initial or guided retry) and never mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransformRequest {
    pub instruction: String,
    pub content: String,
}

/// Verdict of the transformation client on one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransformOutcome {
    Success(String),
    Failure(String),
}

/// What the reviewer decided about a proposed transformation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReviewDecision {
    Accept,
    /// Free-text guidance to resubmit to the service.
    Guide(String),
    Reject,
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("failed to {op} {}: {source}", .path.display())]
    Io {
        op: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{} is not valid UTF-8: {source}", .path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: std::string::FromUtf8Error,
    },
}

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("service returned HTTP {status}: {body}")]
    Status { status: u16, body: String },
    #[error("could not decode service response: {0}")]
    Decode(String),
    #[error("service response contained no content")]
    EmptyResponse,
}

/// Whole-item text storage. Every call opens, fully reads or writes, and releases
/// the underlying handle before returning, including on error.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// Load the full content of `path` as UTF-8 text.
    async fn read(&self, path: &Path) -> Result<String, StoreError>;

    /// Truncate `path` and replace its content with `content`.
    async fn write(&self, path: &Path, content: &str) -> Result<(), StoreError>;
}

/// A single chat-style exchange with an external text-generation service.
///
/// Implementations return raw errors; converting them into
/// [`TransformOutcome::Failure`] is the job of [`crate::transform::TransformationClient`].
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait CompletionService: Send + Sync {
    async fn complete(&self, request: &TransformRequest) -> Result<String, ServiceError>;
}

/// The human reviewer.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait Console: Send + Sync {
    /// Present a proposed replacement for `item` in full.
    async fn show_proposal(&self, item: &Path, proposal: &str) -> std::io::Result<()>;

    /// Show `prompt` and wait for one line of input about `item`.
    /// `Ok(None)` means the input source is exhausted.
    async fn read_line(&self, item: &Path, prompt: &str) -> std::io::Result<Option<String>>;
}
