//! Draftkeeper: a debounced autosave coordinator with an HTTP persistence endpoint.
//!
//! This crate re-exports the server surface and the coordinator API so
//! embedders can depend on a single package.

pub use draftkeeper_core::{
    autosave, config, constants, db, error, models, persist_fn, spawn_autosave, AppError,
    AutosaveHandle, AutosaveOptions, Config, Database, DocumentId, DraftContent, Persist,
    PersistFuture, PersistenceError, SaveOutcome, SaveState, SaveStatus, DEFAULT_PORT,
};
pub use draftkeeper_server::{
    create_app, resolve_bind_address, serve_router, AppState, EditLockError, EditLockManager,
    LockOwnerId,
};
