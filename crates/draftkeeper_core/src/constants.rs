//! Shared constants used across Draftkeeper crates.

/// Default API port for the persistence endpoint.
pub const DEFAULT_PORT: u16 = 38517;

/// Default maximum document size accepted by the API layer.
pub const DEFAULT_MAX_DOCUMENT_SIZE: usize = 5 * 1024 * 1024;

/// Default quiet period before an edit is persisted, in milliseconds.
pub const DEFAULT_AUTO_SAVE_INTERVAL_MS: u64 = 2_000;

/// How long `Saved`/`Error` stay visible before reverting to `Idle`, in milliseconds.
pub const DEFAULT_STATUS_DISPLAY_MS: u64 = 2_500;

/// Default base URL for CLI/API clients.
pub const DEFAULT_CLI_SERVER_URL: &str = "http://127.0.0.1:38517";

/// Request header carrying the edit-lock owner id.
pub const OWNER_HEADER: &str = "x-draftkeeper-owner";

/// Default page size for document listings.
pub const DEFAULT_LIST_DOCUMENTS_LIMIT: usize = 50;
/// Upper bound for document listings.
pub const MAX_LIST_DOCUMENTS_LIMIT: usize = 500;
