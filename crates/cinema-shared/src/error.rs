use thiserror::Error;

/// A draft violated one of the field rules. Never reaches the network.
///
/// Variants are declared in the order the validator checks them.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Movie name is required")]
    MissingName,

    #[error("Image path is required")]
    MissingImagePath,

    #[error("Language is required")]
    MissingLanguage,

    #[error("Synopsis is required")]
    MissingSynopsis,

    #[error("Rating must be a number between 0 and 10")]
    InvalidRating,

    #[error("Duration is required")]
    MissingDuration,

    #[error("Top cast is required")]
    MissingCast,

    #[error("Release date must use the yyyy-mm-dd format")]
    InvalidReleaseDate,

    #[error("At least one genre is required")]
    MissingGenres,

    #[error("At least one director is required")]
    MissingDirectors,
}

/// Errors produced by catalog operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CatalogError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// The request never produced a response.
    #[error("Network error: {0}")]
    Network(String),

    /// The backend answered with a failure.
    #[error("Server error: {message}")]
    Server {
        status: Option<u16>,
        message: String,
    },
}

impl CatalogError {
    pub fn server(status: Option<u16>, message: impl Into<String>) -> Self {
        Self::Server {
            status,
            message: message.into(),
        }
    }

    /// Text shown to the operator, without the category prefix.
    pub fn operator_message(&self) -> String {
        match self {
            Self::Validation(e) => e.to_string(),
            Self::Network(msg) => msg.clone(),
            Self::Server { message, .. } => message.clone(),
        }
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    pub fn is_network(&self) -> bool {
        matches!(self, Self::Network(_))
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Server { status, .. } => *status,
            _ => None,
        }
    }
}

/// Convenience alias used throughout the workspace.
pub type Result<T> = std::result::Result<T, CatalogError>;
