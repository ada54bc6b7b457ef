//! # cinema-shared
//!
//! Catalog vocabulary shared by the storefront client engine and the
//! reference backend: the movie aggregate, its wire shapes, the draft
//! validator and the error taxonomy.

pub mod constants;
pub mod error;
pub mod protocol;
pub mod types;
pub mod validation;

pub use error::{CatalogError, ValidationError};
pub use types::{
    CreateReceipt, Credentials, Movie, MovieDraft, MovieId, MoviePrimary, RelationKind,
    RelationSet, Submission, UpsertMode,
};
pub use validation::validate;
