//! Per-item review: present a proposal, collect a decision, act on it.
//!
//! The loop starts once a transformation has succeeded and ends in exactly one of
//! [`ReviewState::Accepted`], [`ReviewState::Guided`] or [`ReviewState::Rejected`].
//! Only `Accepted` touches the store.
//!
//! A guided retry sends the reviewer's guidance to the service as a new request, but
//! its result is only logged. It is neither reviewed nor written back.
//!
//! Items reviewed concurrently share one console. Showing a proposal, reading the
//! decision and reading any guidance happen inside one exclusive session per item, so
//! a line typed for one item is never taken as another item's answer.

use crate::contract::{
    CompletionService, Console, ContentStore, Item, ReviewDecision, StoreError, TransformOutcome,
};
use crate::transform::TransformationClient;
use std::path::Path;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

pub const ACCEPT_PROMPT: &str = "Do you accept these changes? (yes/no/guide): ";
pub const GUIDANCE_PROMPT: &str = "Provide guidance to the AI: ";

/// Terminal states of the review loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewState {
    Accepted,
    Guided,
    Rejected,
}

#[derive(Debug, PartialEq, Eq)]
enum Reply {
    Yes,
    Guide,
    Other,
}

fn classify(reply: Option<&str>) -> Reply {
    match reply.map(|r| r.trim().to_lowercase()).as_deref() {
        Some("yes") => Reply::Yes,
        Some("guide") => Reply::Guide,
        _ => Reply::Other,
    }
}

pub struct ReviewLoop<'a, St, Sv, Co> {
    store: &'a St,
    client: &'a TransformationClient<Sv>,
    console: &'a Co,
    session: Mutex<()>,
}

impl<'a, St, Sv, Co> ReviewLoop<'a, St, Sv, Co>
where
    St: ContentStore,
    Sv: CompletionService,
    Co: Console,
{
    pub fn new(store: &'a St, client: &'a TransformationClient<Sv>, console: &'a Co) -> Self {
        Self {
            store,
            client,
            console,
            session: Mutex::new(()),
        }
    }

    /// Drive the review of `item`'s proposed transformation to a terminal state.
    ///
    /// Store write failures on acceptance propagate; console failures count as a rejection.
    pub async fn review(&self, item: &Item) -> Result<ReviewState, StoreError> {
        let path = item.path.as_path();
        let Some(proposal) = item.transformed.as_deref() else {
            warn!(path = %path.display(), "No proposal to review");
            return Ok(ReviewState::Rejected);
        };

        let decision = {
            let _session = self.session.lock().await;
            info!(path = %path.display(), size = proposal.len(), "Presenting suggestion for review");
            if let Err(e) = self.console.show_proposal(path, proposal).await {
                warn!(error = %e, path = %path.display(), "Could not present suggestion; leaving file untouched");
                return Ok(ReviewState::Rejected);
            }
            self.decide(path).await
        };

        match decision {
            ReviewDecision::Accept => {
                self.store.write(path, proposal).await?;
                info!(path = %path.display(), "Improved code written back");
                Ok(ReviewState::Accepted)
            }
            ReviewDecision::Guide(guidance) => {
                info!(path = %path.display(), "Resubmitting with reviewer guidance");
                match self.client.transform(&guidance).await {
                    TransformOutcome::Success(text) => {
                        info!(
                            path = %path.display(),
                            size = text.len(),
                            "Guided suggestion received; it is not reviewed or written"
                        );
                        debug!(path = %path.display(), suggestion = %text, "Guided suggestion");
                    }
                    TransformOutcome::Failure(reason) => {
                        warn!(path = %path.display(), error = %reason, "Guided resubmission failed");
                    }
                }
                Ok(ReviewState::Guided)
            }
            ReviewDecision::Reject => {
                info!(path = %path.display(), "No changes made to the original code");
                Ok(ReviewState::Rejected)
            }
        }
    }

    async fn decide(&self, path: &Path) -> ReviewDecision {
        let reply = self.prompt(path, ACCEPT_PROMPT).await;
        match classify(reply.as_deref()) {
            Reply::Yes => ReviewDecision::Accept,
            Reply::Guide => {
                let guidance = self.prompt(path, GUIDANCE_PROMPT).await.unwrap_or_default();
                ReviewDecision::Guide(guidance)
            }
            Reply::Other => ReviewDecision::Reject,
        }
    }

    async fn prompt(&self, path: &Path, prompt: &str) -> Option<String> {
        match self.console.read_line(path, prompt).await {
            Ok(line) => line,
            Err(e) => {
                warn!(error = %e, path = %path.display(), "Failed to read reviewer input");
                None
            }
        }
    }
}
