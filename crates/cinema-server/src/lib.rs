//! # cinema-server
//!
//! Reference catalog backend for the cinema admin console.
//!
//! Serves the movie listing, primary record writes and the genre/director
//! relation upserts over HTTP/JSON from an in-memory store. Relation upserts
//! are idempotent per `(movieId, name)`, which the client engine relies on
//! when it reissues a full relation set on every update.

pub mod api;
pub mod catalog_store;
pub mod config;
pub mod error;
