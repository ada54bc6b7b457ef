//! Relation fan-out.
//!
//! One upsert per genre or director, all dispatched at once. Each upsert runs
//! as its own task so a failing sibling never cancels a request that is
//! already in flight. There is no rollback: whatever the backend committed
//! stays committed.

use std::str::FromStr;
use std::sync::Arc;

use futures::stream::{FuturesUnordered, StreamExt};
use thiserror::Error;
use tracing::{debug, warn};

use cinema_shared::{CatalogError, Credentials, MovieId, RelationKind, RelationSet, UpsertMode};

use crate::backend::CatalogBackend;

/// How a batch settles once an upsert fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JoinPolicy {
    /// Report only the first rejection. Siblings still run to completion.
    #[default]
    FailFast,
    /// Wait for every upsert and report each failed item.
    AllSettled,
}

#[derive(Debug, Error)]
#[error("unknown relation join policy '{0}' (expected fail-fast or all-settled)")]
pub struct ParseJoinPolicyError(String);

impl FromStr for JoinPolicy {
    type Err = ParseJoinPolicyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fail-fast" | "fail_fast" | "failfast" => Ok(Self::FailFast),
            "all-settled" | "all_settled" | "allsettled" => Ok(Self::AllSettled),
            other => Err(ParseJoinPolicyError(other.to_string())),
        }
    }
}

/// One relation item that was not confirmed by the backend.
#[derive(Debug, Clone, PartialEq)]
pub struct RelationFailure {
    pub kind: RelationKind,
    pub item: String,
    pub error: CatalogError,
}

pub struct RelationSynchronizer {
    backend: Arc<dyn CatalogBackend>,
    policy: JoinPolicy,
}

impl RelationSynchronizer {
    pub fn new(backend: Arc<dyn CatalogBackend>, policy: JoinPolicy) -> Self {
        Self { backend, policy }
    }

    pub fn policy(&self) -> JoinPolicy {
        self.policy
    }

    /// Upsert every item of `items` for `movie_id`.
    ///
    /// Resolves once every upsert has finished, `Ok` only if all succeeded.
    /// Under [`JoinPolicy::FailFast`] the error holds the first observed
    /// failure; under [`JoinPolicy::AllSettled`] it holds all of them.
    pub async fn sync_all(
        &self,
        movie_id: MovieId,
        items: &RelationSet,
        kind: RelationKind,
        mode: UpsertMode,
        credentials: &Credentials,
    ) -> Result<(), Vec<RelationFailure>> {
        let mut pending: FuturesUnordered<_> = items
            .iter()
            .map(|item| {
                let backend = Arc::clone(&self.backend);
                let credentials = credentials.clone();
                let name = item.clone();
                let task = tokio::spawn(async move {
                    backend
                        .upsert_relation(kind, movie_id, &name, &credentials, mode)
                        .await
                });
                let item = item.clone();
                async move {
                    let result = match task.await {
                        Ok(result) => result,
                        Err(e) => Err(CatalogError::Network(format!(
                            "{kind} upsert task ended abnormally: {e}"
                        ))),
                    };
                    (item, result)
                }
            })
            .collect();

        debug!(movie_id = %movie_id, %kind, ?mode, count = items.len(), "Dispatched relation upserts");

        // Every dispatched upsert is awaited before returning, so a caller
        // holding a write lock covers the whole batch. FailFast only limits
        // what gets reported.
        let mut failures = Vec::new();
        while let Some((item, result)) = pending.next().await {
            let Err(error) = result else { continue };

            warn!(movie_id = %movie_id, %kind, item = %item, error = %error, "Relation upsert failed");
            if self.policy == JoinPolicy::AllSettled || failures.is_empty() {
                failures.push(RelationFailure { kind, item, error });
            }
        }

        if failures.is_empty() {
            Ok(())
        } else {
            Err(failures)
        }
    }
}
