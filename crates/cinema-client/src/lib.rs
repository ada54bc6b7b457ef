//! # cinema-client
//!
//! Catalog write-synchronization engine for the cinema admin console.
//!
//! A movie is persisted as one primary record plus genre and director
//! relation rows, each written through its own backend request. The
//! [`WriteCoordinator`] sequences those requests, classifies the result as
//! success, partial failure or failure, and keeps the [`CatalogCache`] in
//! step with the backend.

pub mod backend;
pub mod cache;
pub mod config;
pub mod coordinator;
pub mod editor;
pub mod events;
pub mod outcome;
pub mod relations;
pub mod reporter;

#[cfg(test)]
mod testing;

use tracing_subscriber::{fmt, EnvFilter};

pub use backend::{CatalogBackend, HttpBackend};
pub use cache::CatalogCache;
pub use config::ClientConfig;
pub use coordinator::{WriteCoordinator, WriteKey};
pub use editor::{AdminEditor, DraftField};
pub use outcome::{AdminAction, PartialSync, Settlement, SettlementKind, WriteOutcome, WritePhase};
pub use relations::{JoinPolicy, RelationFailure, RelationSynchronizer};
pub use reporter::{ChannelReporter, StatusReporter, TracingReporter};

/// Install the global tracing subscriber (respects `RUST_LOG`).
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("cinema_client=debug,cinema_shared=info,warn"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .init();
}
