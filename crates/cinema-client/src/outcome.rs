//! Write attempt lifecycle and settlements.

use cinema_shared::{CatalogError, MovieId};

use crate::relations::RelationFailure;

/// Operator action tag handed in by the admin UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AdminAction {
    Create,
    Update(MovieId),
    Delete(MovieId),
}

impl AdminAction {
    pub fn target(&self) -> Option<MovieId> {
        match self {
            Self::Create => None,
            Self::Update(id) | Self::Delete(id) => Some(*id),
        }
    }

    pub fn tag(&self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Update(_) => "update",
            Self::Delete(_) => "delete",
        }
    }
}

/// Where the coordinator is within a write attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WritePhase {
    #[default]
    Idle,
    Validating,
    PersistingPrimary,
    PersistingRelations,
    Settled(SettlementKind),
}

impl WritePhase {
    /// True while a write is between submission and settlement.
    pub fn is_busy(&self) -> bool {
        matches!(
            self,
            Self::Validating | Self::PersistingPrimary | Self::PersistingRelations
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettlementKind {
    Success,
    PartialFailure,
    Failure,
}

/// Why a committed primary record is not fully linked.
#[derive(Debug, Clone, PartialEq)]
pub enum PartialSync {
    /// Create succeeded but returned no id, so no relation was written.
    MissingIdentifier,
    /// Primary committed; some relation upserts were not confirmed and may or
    /// may not exist on the backend.
    RelationsIncomplete {
        movie_id: MovieId,
        failures: Vec<RelationFailure>,
    },
}

/// Terminal state of one write attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum Settlement {
    Success { movie_id: MovieId },
    PartialFailure(PartialSync),
    Failure(CatalogError),
}

impl Settlement {
    pub fn kind(&self) -> SettlementKind {
        match self {
            Self::Success { .. } => SettlementKind::Success,
            Self::PartialFailure(_) => SettlementKind::PartialFailure,
            Self::Failure(_) => SettlementKind::Failure,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    /// True when the primary record exists on the backend after this write.
    pub fn is_committed(&self) -> bool {
        !matches!(self, Self::Failure(_))
    }

    pub fn movie_id(&self) -> Option<MovieId> {
        match self {
            Self::Success { movie_id } => Some(*movie_id),
            Self::PartialFailure(PartialSync::RelationsIncomplete { movie_id, .. }) => {
                Some(*movie_id)
            }
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&CatalogError> {
        match self {
            Self::Failure(e) => Some(e),
            _ => None,
        }
    }
}

/// What gets handed to the status reporter.
#[derive(Debug, Clone, PartialEq)]
pub struct WriteOutcome {
    pub action: AdminAction,
    pub settlement: Settlement,
}

impl WriteOutcome {
    /// Operator-facing text for this outcome.
    pub fn message(&self) -> String {
        match (&self.settlement, self.action) {
            (Settlement::Success { .. }, AdminAction::Create) => "Movie added successfully".into(),
            (Settlement::Success { .. }, AdminAction::Update(_)) => {
                "Movie updated successfully".into()
            }
            (Settlement::Success { .. }, AdminAction::Delete(_)) => {
                "Movie deleted successfully".into()
            }
            (Settlement::PartialFailure(PartialSync::MissingIdentifier), _) => {
                "Movie saved, but the server did not return its id; genres and directors were not linked".into()
            }
            (Settlement::PartialFailure(PartialSync::RelationsIncomplete { failures, .. }), _) => {
                let items: Vec<&str> = failures.iter().map(|f| f.item.as_str()).collect();
                format!(
                    "Movie saved, but some genres or directors may be missing ({})",
                    items.join(", ")
                )
            }
            (Settlement::Failure(e), _) => e.operator_message(),
        }
    }
}
