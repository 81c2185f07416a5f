//! Edit lock HTTP handlers.

use super::{map_lock_error, owner_from_headers, validate_document_id};
use crate::{error::HttpError, locks::LockOwnerId, AppState};
use axum::{
    extract::{Path, State},
    http::HeaderMap,
    Json,
};
use draftkeeper_core::{AppError, OWNER_HEADER};
use serde_json::{json, Value};

fn required_owner(headers: &HeaderMap) -> Result<LockOwnerId, AppError> {
    owner_from_headers(headers)
        .ok_or_else(|| AppError::BadRequest(format!("Missing {} header", OWNER_HEADER)))
}

/// Acquire the edit lock for a document on behalf of the caller.
///
/// # Errors
/// Returns 400 without an owner header and 423 when another owner holds the lock.
pub async fn acquire_lock(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Result<Json<Value>, HttpError> {
    validate_document_id(&id)?;
    let owner = required_owner(&headers)?;
    state.locks.acquire(&id, &owner).map_err(map_lock_error)?;
    tracing::debug!(document = %id, owner = %owner, "edit lock acquired");
    Ok(Json(json!({ "id": id, "owner": owner.as_str() })))
}

/// Release the caller's edit lock.
///
/// # Errors
/// Returns 400 without an owner header or when the caller is not the holder.
pub async fn release_lock(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Result<Json<Value>, HttpError> {
    validate_document_id(&id)?;
    let owner = required_owner(&headers)?;
    state.locks.release(&id, &owner).map_err(map_lock_error)?;
    tracing::debug!(document = %id, owner = %owner, "edit lock released");
    Ok(Json(json!({ "success": true })))
}
