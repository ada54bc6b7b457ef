//! Aggregate write coordination.
//!
//! A movie is one primary record plus two relation sets, persisted through
//! separate requests with no backend transaction. The coordinator runs each
//! write as
//!
//! ```text
//! Idle -> Validating -> PersistingPrimary -> PersistingRelations -> Settled -> Idle
//! ```
//!
//! and owns the partial-failure policy: a failed primary write aborts the
//! attempt, a failed relation write downgrades it to a partial failure. The
//! catalog cache is always reconciled by refetching after a committed write.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError};

use tokio::sync::{watch, Mutex, OwnedMutexGuard};
use tracing::{debug, info, instrument, warn};

use cinema_shared::{
    CatalogError, Credentials, MovieDraft, MovieId, RelationKind, Submission, UpsertMode,
};

use crate::backend::CatalogBackend;
use crate::cache::CatalogCache;
use crate::outcome::{AdminAction, PartialSync, Settlement, WriteOutcome, WritePhase};
use crate::relations::{JoinPolicy, RelationSynchronizer};
use crate::reporter::StatusReporter;

/// Serialization slot for writes.
///
/// Creates have no identity yet and share one slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WriteKey {
    Draft,
    Movie(MovieId),
}

/// One async mutex per key, created on demand and dropped again once no
/// writer holds or waits for it.
#[derive(Default)]
struct WriteLocks {
    slots: std::sync::Mutex<HashMap<WriteKey, Arc<Mutex<()>>>>,
}

impl WriteLocks {
    async fn acquire(&self, key: WriteKey) -> WriteSlot<'_> {
        let slot = {
            let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
            Arc::clone(slots.entry(key).or_default())
        };
        WriteSlot {
            locks: self,
            key,
            guard: Some(slot.lock_owned().await),
        }
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.slots.lock().unwrap_or_else(PoisonError::into_inner).len()
    }
}

struct WriteSlot<'a> {
    locks: &'a WriteLocks,
    key: WriteKey,
    guard: Option<OwnedMutexGuard<()>>,
}

impl Drop for WriteSlot<'_> {
    fn drop(&mut self) {
        drop(self.guard.take());

        // waiters clone the slot under the map lock, so a count of one means
        // the map holds the last reference
        let mut slots = self.locks.slots.lock().unwrap_or_else(PoisonError::into_inner);
        if slots
            .get(&self.key)
            .is_some_and(|slot| Arc::strong_count(slot) == 1)
        {
            slots.remove(&self.key);
        }
    }
}

pub struct WriteCoordinator {
    backend: Arc<dyn CatalogBackend>,
    cache: Arc<CatalogCache>,
    relations: RelationSynchronizer,
    reporter: Arc<dyn StatusReporter>,
    locks: WriteLocks,
    phase: watch::Sender<WritePhase>,
}

impl WriteCoordinator {
    pub fn new(
        backend: Arc<dyn CatalogBackend>,
        cache: Arc<CatalogCache>,
        reporter: Arc<dyn StatusReporter>,
        policy: JoinPolicy,
    ) -> Self {
        let (phase, _) = watch::channel(WritePhase::Idle);
        Self {
            relations: RelationSynchronizer::new(Arc::clone(&backend), policy),
            backend,
            cache,
            reporter,
            locks: WriteLocks::default(),
            phase,
        }
    }

    pub fn cache(&self) -> &Arc<CatalogCache> {
        &self.cache
    }

    /// Most recent phase transition.
    ///
    /// Writes on different keys run concurrently, so this reflects whichever
    /// attempt moved last.
    pub fn phase(&self) -> WritePhase {
        *self.phase.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<WritePhase> {
        self.phase.subscribe()
    }

    /// Create a new movie from `draft`.
    #[instrument(skip_all, fields(action = "create"))]
    pub async fn create(&self, draft: &MovieDraft, credentials: &Credentials) -> Settlement {
        let _slot = self.locks.acquire(WriteKey::Draft).await;
        let settlement = self.run_create(draft, credentials).await;
        self.settle(AdminAction::Create, settlement)
    }

    /// Replace movie `id` with `draft` and reissue both relation sets.
    #[instrument(skip_all, fields(action = "update", movie_id = %id))]
    pub async fn update(
        &self,
        id: MovieId,
        draft: &MovieDraft,
        credentials: &Credentials,
    ) -> Settlement {
        let _slot = self.locks.acquire(WriteKey::Movie(id)).await;
        let settlement = self.run_update(id, draft, credentials).await;
        self.settle(AdminAction::Update(id), settlement)
    }

    /// Delete movie `id`. A confirmed delete is applied to the cache directly.
    #[instrument(skip_all, fields(action = "delete", movie_id = %id))]
    pub async fn delete(&self, id: MovieId) -> Settlement {
        let _slot = self.locks.acquire(WriteKey::Movie(id)).await;

        self.enter(WritePhase::PersistingPrimary);
        let settlement = match self.backend.delete_movie(id).await {
            Ok(()) => {
                self.cache.remove(id).await;
                Settlement::Success { movie_id: id }
            }
            Err(e) => Settlement::Failure(e),
        };
        self.settle(AdminAction::Delete(id), settlement)
    }

    async fn run_create(&self, draft: &MovieDraft, credentials: &Credentials) -> Settlement {
        let submission = match self.validate(draft) {
            Ok(s) => s,
            Err(e) => return Settlement::Failure(e),
        };

        self.enter(WritePhase::PersistingPrimary);
        let receipt = match self
            .backend
            .create_movie(&submission.primary, credentials)
            .await
        {
            Ok(receipt) => receipt,
            Err(e) => return Settlement::Failure(e),
        };

        let Some(movie_id) = receipt.id else {
            warn!("Create response carried no identifier; skipping relations");
            self.reconcile().await;
            return Settlement::PartialFailure(PartialSync::MissingIdentifier);
        };
        info!(movie_id = %movie_id, "Primary record created");

        self.persist_relations(movie_id, &submission, credentials, UpsertMode::Insert)
            .await
    }

    async fn run_update(
        &self,
        id: MovieId,
        draft: &MovieDraft,
        credentials: &Credentials,
    ) -> Settlement {
        let submission = match self.validate(draft) {
            Ok(s) => s,
            Err(e) => return Settlement::Failure(e),
        };

        self.enter(WritePhase::PersistingPrimary);
        if let Err(e) = self.backend.update_movie(id, &submission.primary).await {
            return Settlement::Failure(e);
        }
        info!(movie_id = %id, "Primary record updated");

        self.persist_relations(id, &submission, credentials, UpsertMode::Update)
            .await
    }

    fn validate(&self, draft: &MovieDraft) -> Result<Submission, CatalogError> {
        self.enter(WritePhase::Validating);
        Submission::try_from(draft).map_err(|e| {
            debug!(error = %e, "Draft rejected by validator");
            CatalogError::from(e)
        })
    }

    /// Upsert every genre and director, both kinds at once, then refetch.
    async fn persist_relations(
        &self,
        movie_id: MovieId,
        submission: &Submission,
        credentials: &Credentials,
        mode: UpsertMode,
    ) -> Settlement {
        self.enter(WritePhase::PersistingRelations);

        let (genres, directors) = tokio::join!(
            self.relations.sync_all(
                movie_id,
                &submission.genres,
                RelationKind::Genre,
                mode,
                credentials,
            ),
            self.relations.sync_all(
                movie_id,
                &submission.directors,
                RelationKind::Director,
                mode,
                credentials,
            ),
        );

        let failures: Vec<_> = [genres, directors]
            .into_iter()
            .filter_map(Result::err)
            .flatten()
            .collect();

        // cache shows whatever subset the backend actually committed
        self.reconcile().await;

        if failures.is_empty() {
            Settlement::Success { movie_id }
        } else {
            Settlement::PartialFailure(PartialSync::RelationsIncomplete { movie_id, failures })
        }
    }

    async fn reconcile(&self) {
        if let Err(e) = self.cache.refresh().await {
            warn!(error = %e, "Catalog refresh after write failed; keeping cached list");
        }
    }

    fn enter(&self, phase: WritePhase) {
        debug!(?phase, "Write phase");
        self.phase.send_replace(phase);
    }

    fn settle(&self, action: AdminAction, settlement: Settlement) -> Settlement {
        self.enter(WritePhase::Settled(settlement.kind()));
        self.reporter.report(&WriteOutcome {
            action,
            settlement: settlement.clone(),
        });
        self.enter(WritePhase::Idle);
        settlement
    }
}
