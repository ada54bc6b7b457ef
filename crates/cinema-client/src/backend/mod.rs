//! Catalog backend port.
//!
//! The engine only talks to the backend through [`CatalogBackend`]. The
//! production adapter is [`HttpBackend`]; tests substitute an in-memory fake.

mod http;

use async_trait::async_trait;

use cinema_shared::error::Result;
use cinema_shared::{CreateReceipt, Credentials, Movie, MovieId, MoviePrimary, RelationKind, UpsertMode};

pub use http::HttpBackend;

/// Transport-agnostic view of the catalog endpoints.
///
/// Every method either resolves with the structured success payload or fails
/// with a [`cinema_shared::CatalogError::Network`] /
/// [`cinema_shared::CatalogError::Server`].
#[async_trait]
pub trait CatalogBackend: Send + Sync {
    async fn list_movies(&self) -> Result<Vec<Movie>>;

    async fn create_movie(
        &self,
        primary: &MoviePrimary,
        credentials: &Credentials,
    ) -> Result<CreateReceipt>;

    async fn update_movie(&self, id: MovieId, primary: &MoviePrimary) -> Result<()>;

    async fn delete_movie(&self, id: MovieId) -> Result<()>;

    async fn upsert_genre(
        &self,
        movie_id: MovieId,
        name: &str,
        credentials: &Credentials,
        mode: UpsertMode,
    ) -> Result<()>;

    async fn upsert_director(
        &self,
        movie_id: MovieId,
        name: &str,
        credentials: &Credentials,
        mode: UpsertMode,
    ) -> Result<()>;

    async fn upsert_relation(
        &self,
        kind: RelationKind,
        movie_id: MovieId,
        name: &str,
        credentials: &Credentials,
        mode: UpsertMode,
    ) -> Result<()> {
        match kind {
            RelationKind::Genre => self.upsert_genre(movie_id, name, credentials, mode).await,
            RelationKind::Director => {
                self.upsert_director(movie_id, name, credentials, mode).await
            }
        }
    }
}
