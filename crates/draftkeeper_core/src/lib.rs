//! Core library for Draftkeeper (autosave coordinator, config, storage, models).

/// Debounced autosave coordinator and its building blocks.
pub mod autosave;
/// Configuration loading and defaults.
pub mod config;
/// Shared constants used across Draftkeeper crates.
pub mod constants;
/// Document storage backed by redb.
pub mod db;
/// Error types for storage and persistence.
pub mod error;
/// Data models for API requests and persistence.
pub mod models;

#[cfg(test)]
pub(crate) mod test_support;

pub use autosave::{
    persist_fn, spawn_autosave, AutosaveHandle, AutosaveOptions, DraftContent, FnPersist,
    Persist, PersistFuture, SaveOutcome, SaveState, SaveStatus,
};
pub use config::Config;
pub use constants::*;
pub use db::Database;
pub use error::{AppError, PersistenceError};
pub use models::document::DocumentId;
