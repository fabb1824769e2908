//! High-level pipeline: orchestrates discover → read → transform → review for a directory.
//!
//! [`Pipeline::run`] discovers every matching file under a root and launches one task per
//! file. Each task runs strictly in sequence:
//!   - read the file through the [`ContentStore`]
//!   - submit it through the [`TransformationClient`]
//!   - on success, hand the proposal to the [`ReviewLoop`]
//!
//! Tasks are futures polled together on the caller's task: no threads, no spawning.
//! With [`PipelineConfig::max_concurrency`] unset, every task starts immediately.
//! Otherwise at most that many are in flight at once.
//!
//! # Error Handling
//! - Discovery errors abort the whole run and are returned to the caller.
//! - Service errors never reach this module; the client reports them as
//!   [`TransformOutcome::Failure`] and the item ends as [`ItemOutcome::ServiceFailed`].
//! - Store errors abort only the item they happened on. They are logged as faults and
//!   recorded as [`ItemOutcome::Faulted`]; other items keep going.
//!
//! The returned [`RunReport`] lists each item's terminal outcome, which is exactly what
//! was already logged while the run progressed.

use futures::future::join_all;
use futures::stream::{self, StreamExt};
use std::path::{Path, PathBuf};
use tracing::{error, info, Instrument};

use crate::config::PipelineConfig;
use crate::contract::{CompletionService, Console, ContentStore, Item, StoreError, TransformOutcome};
use crate::discovery::{discover, DiscoveryError};
use crate::review::{ReviewLoop, ReviewState};
use crate::transform::TransformationClient;

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// How a single item's task ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemOutcome {
    Accepted,
    Guided,
    Rejected,
    /// The service could not produce a transformation; the review loop was not entered.
    ServiceFailed(String),
    /// A store error aborted the item's task.
    Faulted(String),
}

impl From<ReviewState> for ItemOutcome {
    fn from(state: ReviewState) -> Self {
        match state {
            ReviewState::Accepted => ItemOutcome::Accepted,
            ReviewState::Guided => ItemOutcome::Guided,
            ReviewState::Rejected => ItemOutcome::Rejected,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemReport {
    pub path: PathBuf,
    pub outcome: ItemOutcome,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    /// One entry per discovered item, sorted by path.
    pub items: Vec<ItemReport>,
}

impl RunReport {
    pub fn outcome_for(&self, path: &Path) -> Option<&ItemOutcome> {
        self.items
            .iter()
            .find(|item| item.path == path)
            .map(|item| &item.outcome)
    }

    pub fn count(&self, pred: impl Fn(&ItemOutcome) -> bool) -> usize {
        self.items.iter().filter(|item| pred(&item.outcome)).count()
    }
}

pub struct Pipeline<'a, St, Sv, Co> {
    store: &'a St,
    client: &'a TransformationClient<Sv>,
    review: ReviewLoop<'a, St, Sv, Co>,
    suffix: String,
    config: PipelineConfig,
}

impl<'a, St, Sv, Co> Pipeline<'a, St, Sv, Co>
where
    St: ContentStore,
    Sv: CompletionService,
    Co: Console,
{
    pub fn new(
        store: &'a St,
        client: &'a TransformationClient<Sv>,
        console: &'a Co,
        suffix: impl Into<String>,
        config: PipelineConfig,
    ) -> Self {
        Self {
            store,
            client,
            review: ReviewLoop::new(store, client, console),
            suffix: suffix.into(),
            config,
        }
    }

    /// Process every matching file under `root` and wait for all of them to finish.
    pub async fn run(&self, root: &Path) -> Result<RunReport, DiscoveryError> {
        let paths = discover(root, &self.suffix)?;
        info!(
            root = %root.display(),
            items = paths.len(),
            max_concurrency = ?self.config.max_concurrency,
            "[RUN] Launching item tasks"
        );

        let tasks = paths.into_iter().map(|path| {
            let span = tracing::info_span!("item", path = %path.display());
            async move {
                let outcome = match self.process_item(&path).await {
                    Ok(outcome) => outcome,
                    Err(e) => {
                        error!(error = %e, path = %path.display(), "[RUN][ERROR] Item task aborted");
                        ItemOutcome::Faulted(e.to_string())
                    }
                };
                ItemReport { path, outcome }
            }
            .instrument(span)
        });

        let mut items: Vec<ItemReport> = match self.config.max_concurrency {
            None => join_all(tasks).await,
            Some(limit) => stream::iter(tasks).buffer_unordered(limit.get()).collect().await,
        };
        items.sort_by(|a, b| a.path.cmp(&b.path));

        let report = RunReport { items };
        info!(
            accepted = report.count(|o| matches!(o, ItemOutcome::Accepted)),
            guided = report.count(|o| matches!(o, ItemOutcome::Guided)),
            rejected = report.count(|o| matches!(o, ItemOutcome::Rejected)),
            service_failed = report.count(|o| matches!(o, ItemOutcome::ServiceFailed(_))),
            faulted = report.count(|o| matches!(o, ItemOutcome::Faulted(_))),
            "[RUN] All item tasks complete"
        );
        Ok(report)
    }

    /// One item's task: read → transform → review.
    pub async fn process_item(&self, path: &Path) -> Result<ItemOutcome, PipelineError> {
        let content = self.store.read(path).await?;
        let mut item = Item::new(path.to_path_buf(), content);

        match self.client.transform(&item.content).await {
            TransformOutcome::Success(proposal) => {
                item.transformed = Some(proposal);
                let state = self.review.review(&item).await?;
                Ok(state.into())
            }
            TransformOutcome::Failure(reason) => {
                error!(path = %path.display(), error = %reason, "Error improving file");
                Ok(ItemOutcome::ServiceFailed(reason))
            }
        }
    }
}
