//! In-memory mirror of the backend's movie list.
//!
//! The cache is only ever reconciled by a full refetch; writes never patch it
//! locally, except for a confirmed delete.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{debug, info};

use cinema_shared::error::Result;
use cinema_shared::{Movie, MovieId};

use crate::backend::CatalogBackend;

#[derive(Debug, Default)]
struct Snapshot {
    movies: Vec<Movie>,
    /// Ticket of the refresh that produced `movies`.
    generation: u64,
}

pub struct CatalogCache {
    backend: Arc<dyn CatalogBackend>,
    snapshot: RwLock<Snapshot>,
    tickets: AtomicU64,
}

impl CatalogCache {
    pub fn new(backend: Arc<dyn CatalogBackend>) -> Self {
        Self {
            backend,
            snapshot: RwLock::new(Snapshot::default()),
            tickets: AtomicU64::new(0),
        }
    }

    /// Replace the cached list with the backend's current listing.
    ///
    /// Overlapping refreshes may complete out of order; a response is only
    /// applied if no later-started refresh or local removal has been applied
    /// already.
    pub async fn refresh(&self) -> Result<Vec<Movie>> {
        let ticket = self.tickets.fetch_add(1, Ordering::SeqCst) + 1;
        let movies = self.backend.list_movies().await?;

        let mut snapshot = self.snapshot.write().await;
        if ticket > snapshot.generation {
            snapshot.movies = movies;
            snapshot.generation = ticket;
            info!(count = snapshot.movies.len(), "Catalog cache refreshed");
        } else {
            debug!(ticket, current = snapshot.generation, "Discarded stale catalog listing");
        }
        Ok(snapshot.movies.clone())
    }

    /// Drop one entry after a confirmed delete.
    ///
    /// Counts as a newer state than any refresh already in flight, so a
    /// listing fetched before the delete cannot bring the entry back.
    pub async fn remove(&self, id: MovieId) -> bool {
        let mut snapshot = self.snapshot.write().await;
        snapshot.generation = self.tickets.fetch_add(1, Ordering::SeqCst) + 1;
        let before = snapshot.movies.len();
        snapshot.movies.retain(|m| m.id != id);
        let removed = snapshot.movies.len() != before;
        if removed {
            debug!(movie_id = %id, "Removed movie from catalog cache");
        }
        removed
    }

    pub async fn all(&self) -> Vec<Movie> {
        self.snapshot.read().await.movies.clone()
    }

    pub async fn get(&self, id: MovieId) -> Option<Movie> {
        self.snapshot
            .read()
            .await
            .movies
            .iter()
            .find(|m| m.id == id)
            .cloned()
    }

    pub async fn len(&self) -> usize {
        self.snapshot.read().await.movies.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}
