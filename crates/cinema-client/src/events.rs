use serde::Serialize;

use cinema_shared::MovieId;

use crate::outcome::{AdminAction, Settlement, WriteOutcome};

pub const EVENT_MOVIE_SAVED: &str = "movie-saved";
pub const EVENT_MOVIE_PARTIALLY_SAVED: &str = "movie-partially-saved";
pub const EVENT_MOVIE_DELETED: &str = "movie-deleted";
pub const EVENT_MOVIE_WRITE_FAILED: &str = "movie-write-failed";

/// Serializable outcome forwarded to the UI layer for toast rendering.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OutcomePayload {
    pub event: &'static str,
    pub action: &'static str,
    pub movie_id: Option<MovieId>,
    pub message: String,
}

impl From<&WriteOutcome> for OutcomePayload {
    fn from(outcome: &WriteOutcome) -> Self {
        let event = match (&outcome.settlement, outcome.action) {
            (Settlement::Success { .. }, AdminAction::Delete(_)) => EVENT_MOVIE_DELETED,
            (Settlement::Success { .. }, _) => EVENT_MOVIE_SAVED,
            (Settlement::PartialFailure(_), _) => EVENT_MOVIE_PARTIALLY_SAVED,
            (Settlement::Failure(_), _) => EVENT_MOVIE_WRITE_FAILED,
        };

        Self {
            event,
            action: outcome.action.tag(),
            movie_id: outcome
                .settlement
                .movie_id()
                .or_else(|| outcome.action.target()),
            message: outcome.message(),
        }
    }
}
