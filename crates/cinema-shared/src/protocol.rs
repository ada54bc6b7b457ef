//! Request and response bodies exchanged with the catalog backend.
//!
//! Field names follow the backend's JSON contract (`movieId`, `last_id`,
//! `top_cast`), not Rust naming.

use serde::{Deserialize, Serialize};

use crate::types::{Credentials, MovieId, MoviePrimary, RelationKind};

/// Body of `POST /adminMovieAdd`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateMovieRequest {
    #[serde(flatten)]
    pub credentials: Credentials,
    #[serde(flatten)]
    pub primary: MoviePrimary,
}

/// Body of `POST|PUT /genreInsert` and `POST|PUT /directorInsert`.
///
/// Exactly one of `genre` / `director` is set, matching the endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelationUpsertRequest {
    #[serde(flatten)]
    pub credentials: Credentials,
    #[serde(rename = "movieId")]
    pub movie_id: MovieId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub genre: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub director: Option<String>,
}

impl RelationUpsertRequest {
    pub fn new(
        kind: RelationKind,
        movie_id: MovieId,
        item: impl Into<String>,
        credentials: Credentials,
    ) -> Self {
        let item = Some(item.into());
        let (genre, director) = match kind {
            RelationKind::Genre => (item, None),
            RelationKind::Director => (None, item),
        };
        Self {
            credentials,
            movie_id,
            genre,
            director,
        }
    }

    /// The item carried for `kind`, if the body has one.
    pub fn item(&self, kind: RelationKind) -> Option<&str> {
        match kind {
            RelationKind::Genre => self.genre.as_deref(),
            RelationKind::Director => self.director.as_deref(),
        }
    }
}

/// Success body of `POST /adminMovieAdd`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateMovieResponse {
    pub last_id: MovieId,
}

/// Failure body returned by the backend on any endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub message: Option<String>,
}

impl ErrorBody {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
        }
    }

    /// Extract a usable message from a raw failure body, or fall back.
    pub fn message_or(body: &[u8], fallback: &str) -> String {
        serde_json::from_slice::<ErrorBody>(body)
            .ok()
            .and_then(|b| b.message)
            .map(|m| m.trim().to_string())
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| fallback.to_string())
    }
}
