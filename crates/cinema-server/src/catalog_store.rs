//! In-memory movie catalog.
//!
//! Movies and their relation rows live behind one lock, so a delete drops a
//! movie and its relations together. Relation rows are unique per
//! `(movie, name)`; writing an existing pair is a no-op.

use std::collections::BTreeMap;

use tokio::sync::RwLock;
use tracing::{debug, info};

use cinema_shared::{Movie, MovieId, MoviePrimary, RelationKind, RelationSet};

use crate::error::ServerError;

#[derive(Debug)]
struct Catalog {
    movies: BTreeMap<MovieId, Movie>,
    next_id: u64,
}

pub struct CatalogStore {
    inner: RwLock<Catalog>,
}

impl Default for CatalogStore {
    fn default() -> Self {
        Self::new()
    }
}

impl CatalogStore {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Catalog {
                movies: BTreeMap::new(),
                next_id: 1,
            }),
        }
    }

    /// Every movie with its relations, ordered by id.
    pub async fn list(&self) -> Vec<Movie> {
        self.inner.read().await.movies.values().cloned().collect()
    }

    pub async fn get(&self, id: MovieId) -> Option<Movie> {
        self.inner.read().await.movies.get(&id).cloned()
    }

    /// Insert a new movie and return its assigned id.
    pub async fn create(&self, primary: MoviePrimary) -> MovieId {
        let mut catalog = self.inner.write().await;
        let id = MovieId(catalog.next_id);
        catalog.next_id += 1;

        info!(movie_id = %id, name = %primary.name, "Movie created");
        catalog.movies.insert(
            id,
            Movie {
                id,
                primary,
                genres: RelationSet::new(),
                directors: RelationSet::new(),
            },
        );
        id
    }

    pub async fn update(&self, id: MovieId, primary: MoviePrimary) -> Result<(), ServerError> {
        let mut catalog = self.inner.write().await;
        let movie = catalog
            .movies
            .get_mut(&id)
            .ok_or(ServerError::MovieNotFound(id))?;
        movie.primary = primary;
        info!(movie_id = %id, "Movie updated");
        Ok(())
    }

    pub async fn delete(&self, id: MovieId) -> Result<(), ServerError> {
        let mut catalog = self.inner.write().await;
        catalog
            .movies
            .remove(&id)
            .ok_or(ServerError::MovieNotFound(id))?;
        info!(movie_id = %id, "Movie deleted");
        Ok(())
    }

    /// Link `name` to movie `id`. Returns `true` if a new row was written.
    pub async fn upsert_relation(
        &self,
        id: MovieId,
        kind: RelationKind,
        name: &str,
    ) -> Result<bool, ServerError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ServerError::BadRequest(format!("{} must not be empty", kind.field())));
        }

        let mut catalog = self.inner.write().await;
        let movie = catalog
            .movies
            .get_mut(&id)
            .ok_or(ServerError::MovieNotFound(id))?;

        let set = match kind {
            RelationKind::Genre => &mut movie.genres,
            RelationKind::Director => &mut movie.directors,
        };
        let inserted = set.insert(name);
        debug!(movie_id = %id, %kind, name, inserted, "Relation upserted");
        Ok(inserted)
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.movies.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}
