//! HTTP request handlers.

/// Document read/write endpoints.
pub mod document;
/// Edit lock endpoints.
pub mod lock;

use crate::locks::{EditLockError, LockOwnerId};
use axum::http::HeaderMap;
use draftkeeper_core::{AppError, OWNER_HEADER};

const MAX_DOCUMENT_ID_LEN: usize = 128;

/// Reject ids that cannot be used as a path segment and table key.
pub(crate) fn validate_document_id(id: &str) -> Result<(), AppError> {
    let valid_chars = id
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'));
    if id.is_empty() || id.len() > MAX_DOCUMENT_ID_LEN || !valid_chars {
        return Err(AppError::BadRequest(format!(
            "Invalid document id '{}': use 1-{} characters from [A-Za-z0-9._-]",
            id, MAX_DOCUMENT_ID_LEN
        )));
    }
    Ok(())
}

/// Owner id from the `x-draftkeeper-owner` header, if present and non-blank.
pub(crate) fn owner_from_headers(headers: &HeaderMap) -> Option<LockOwnerId> {
    headers
        .get(OWNER_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(LockOwnerId::new)
}

pub(crate) fn map_lock_error(err: EditLockError) -> AppError {
    match err {
        EditLockError::Held { .. } => AppError::Locked(err.to_string()),
        EditLockError::NotHeld { .. } => AppError::BadRequest(err.to_string()),
        EditLockError::Poisoned => {
            AppError::StorageMessage("Edit lock manager is unavailable.".to_string())
        }
    }
}
