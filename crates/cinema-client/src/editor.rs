//! Admin form state and operator commands.
//!
//! Holds the single draft the operator is editing and routes submissions to
//! the [`WriteCoordinator`]. The draft survives a failed write so it can be
//! corrected and resubmitted; any committed write clears it.

use std::str::FromStr;
use std::sync::Arc;

use thiserror::Error;
use tokio::sync::watch;
use tracing::{debug, info};

use cinema_shared::{Credentials, MovieDraft, MovieId, RelationSet};

use crate::coordinator::WriteCoordinator;
use crate::outcome::{AdminAction, Settlement};

/// Editable form field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DraftField {
    Name,
    ImagePath,
    Language,
    Synopsis,
    Rating,
    Duration,
    Cast,
    ReleaseDate,
    Genres,
    Directors,
}

#[derive(Debug, Error)]
#[error("unknown draft field '{0}'")]
pub struct UnknownFieldError(String);

impl FromStr for DraftField {
    type Err = UnknownFieldError;

    /// Accepts both the form input names and the snake_case wire names.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "movieName" | "name" => Self::Name,
            "imagePath" | "image_path" => Self::ImagePath,
            "language" => Self::Language,
            "description" | "synopsis" => Self::Synopsis,
            "rating" => Self::Rating,
            "duration" => Self::Duration,
            "cast" | "top_cast" => Self::Cast,
            "relDate" | "release_date" => Self::ReleaseDate,
            "genres" => Self::Genres,
            "directors" => Self::Directors,
            other => return Err(UnknownFieldError(other.to_string())),
        })
    }
}

pub struct AdminEditor {
    coordinator: Arc<WriteCoordinator>,
    credentials: Credentials,
    draft: MovieDraft,
    editing: Option<MovieId>,
    is_open: bool,
    saving: Arc<watch::Sender<bool>>,
}

/// Marks the owning editor busy until dropped, including when the write
/// future is abandoned mid-flight.
struct SavingGuard(Arc<watch::Sender<bool>>);

impl SavingGuard {
    fn begin(saving: &Arc<watch::Sender<bool>>) -> Self {
        saving.send_replace(true);
        Self(Arc::clone(saving))
    }
}

impl Drop for SavingGuard {
    fn drop(&mut self) {
        self.0.send_replace(false);
    }
}

impl AdminEditor {
    pub fn new(coordinator: Arc<WriteCoordinator>, credentials: Credentials) -> Self {
        Self {
            coordinator,
            credentials,
            draft: MovieDraft::default(),
            editing: None,
            is_open: false,
            saving: Arc::new(watch::channel(false).0),
        }
    }

    pub fn draft(&self) -> &MovieDraft {
        &self.draft
    }

    pub fn editing(&self) -> Option<MovieId> {
        self.editing
    }

    pub fn is_open(&self) -> bool {
        self.is_open
    }

    /// Show or hide the form. Hiding discards any edit in progress.
    pub fn toggle(&mut self) {
        self.is_open = !self.is_open;
        if !self.is_open {
            self.reset();
        }
    }

    /// True while a write dispatched by this editor is in flight.
    pub fn is_saving(&self) -> bool {
        *self.saving.borrow()
    }

    pub fn watch_saving(&self) -> watch::Receiver<bool> {
        self.saving.subscribe()
    }

    /// Store raw input for one field.
    pub fn set_field(&mut self, field: DraftField, raw: &str) {
        let d = &mut self.draft;
        match field {
            DraftField::Name => d.name = raw.to_string(),
            DraftField::ImagePath => d.image_path = raw.to_string(),
            DraftField::Language => d.language = raw.to_string(),
            DraftField::Synopsis => d.synopsis = raw.to_string(),
            DraftField::Rating => d.rating = raw.trim().parse().ok(),
            DraftField::Duration => d.duration = raw.to_string(),
            DraftField::Cast => d.cast = raw.to_string(),
            DraftField::ReleaseDate => d.release_date = raw.to_string(),
            DraftField::Genres => d.genres = RelationSet::parse_list(raw),
            DraftField::Directors => d.directors = RelationSet::parse_list(raw),
        }
    }

    /// Load a cached movie into the form for editing.
    ///
    /// Returns `false` and leaves the form untouched if `id` is not cached.
    pub async fn begin_edit(&mut self, id: MovieId) -> bool {
        let Some(movie) = self.coordinator.cache().get(id).await else {
            debug!(movie_id = %id, "Edit requested for uncached movie");
            return false;
        };

        self.draft = MovieDraft::from_movie(&movie);
        self.editing = Some(id);
        self.is_open = true;
        true
    }

    pub fn cancel_edit(&mut self) {
        self.reset();
    }

    /// Mirrors the form's submit button: enabled when idle and every field
    /// has a value.
    pub fn can_submit(&self) -> bool {
        let d = &self.draft;
        let filled = [
            &d.name,
            &d.image_path,
            &d.language,
            &d.synopsis,
            &d.duration,
            &d.cast,
            &d.release_date,
        ]
        .iter()
        .all(|s| !s.trim().is_empty());

        !self.is_saving()
            && filled
            && d.rating.is_some()
            && !d.genres.is_empty()
            && !d.directors.is_empty()
    }

    /// Create the draft, or update the movie being edited.
    pub async fn submit(&mut self) -> Settlement {
        let action = match self.editing {
            Some(id) => AdminAction::Update(id),
            None => AdminAction::Create,
        };
        self.dispatch(action).await
    }

    pub async fn delete(&mut self, id: MovieId) -> Settlement {
        self.dispatch(AdminAction::Delete(id)).await
    }

    /// Route an operator action to the coordinator.
    pub async fn dispatch(&mut self, action: AdminAction) -> Settlement {
        let saving = SavingGuard::begin(&self.saving);
        let settlement = match action {
            AdminAction::Create => {
                self.coordinator
                    .create(&self.draft, &self.credentials)
                    .await
            }
            AdminAction::Update(id) => {
                self.coordinator
                    .update(id, &self.draft, &self.credentials)
                    .await
            }
            AdminAction::Delete(id) => self.coordinator.delete(id).await,
        };
        drop(saving);

        let clears_form = match action {
            AdminAction::Create | AdminAction::Update(_) => settlement.is_committed(),
            AdminAction::Delete(id) => settlement.is_success() && self.editing == Some(id),
        };
        if clears_form {
            info!(action = action.tag(), "Clearing admin form");
            self.reset();
        }

        settlement
    }

    fn reset(&mut self) {
        self.draft = MovieDraft::default();
        self.editing = None;
        self.is_open = false;
    }
}
