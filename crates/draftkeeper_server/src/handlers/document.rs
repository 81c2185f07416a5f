//! Document HTTP handlers.

use super::{map_lock_error, owner_from_headers, validate_document_id};
use crate::{error::HttpError, AppState};
use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderMap, HeaderValue},
    response::{IntoResponse, Response},
    Json,
};
use draftkeeper_core::models::document::{DocumentMeta, ListQuery, UpdateDocumentRequest};
use draftkeeper_core::{AppError, DEFAULT_LIST_DOCUMENTS_LIMIT, MAX_LIST_DOCUMENTS_LIMIT};

fn normalized_limit(limit: Option<usize>) -> usize {
    limit
        .unwrap_or(DEFAULT_LIST_DOCUMENTS_LIMIT)
        .min(MAX_LIST_DOCUMENTS_LIMIT)
}

/// Fetch a document by id.
///
/// The response carries the content hash as its `ETag`.
///
/// # Errors
/// Returns 404 when the document does not exist.
pub async fn get_document(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, HttpError> {
    validate_document_id(&id)?;
    let document = state.db.documents.get(&id)?.ok_or(AppError::NotFound)?;

    let mut response = Json(&document).into_response();
    if let Ok(etag) = HeaderValue::from_str(&format!("\"{}\"", document.content_hash)) {
        response.headers_mut().insert(header::ETAG, etag);
    }
    Ok(response)
}

/// Create or replace a document's content.
///
/// # Returns
/// The stored document. Its revision only advances when the content changed.
///
/// # Errors
/// Returns 400 for invalid ids, 413 when the content exceeds
/// `max_document_size`, and 423 when another owner holds the edit lock.
pub async fn put_document(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
    Json(req): Json<UpdateDocumentRequest>,
) -> Result<Response, HttpError> {
    validate_document_id(&id)?;

    let limit = state.config.max_document_size;
    if req.content.len() > limit {
        return Err(AppError::PayloadTooLarge { limit }.into());
    }

    let owner = owner_from_headers(&headers);
    state
        .locks
        .check_can_edit(&id, owner.as_ref())
        .map_err(map_lock_error)?;

    let result = state.db.documents.upsert(&id, req.content)?;
    if result.changed {
        tracing::info!(
            document = %id,
            revision = result.document.revision,
            "document saved"
        );
    } else {
        tracing::debug!(document = %id, "content unchanged; revision kept");
    }
    Ok(Json(result.document).into_response())
}

/// List document metadata, most recently updated first.
///
/// # Errors
/// Returns an error if listing fails.
pub async fn list_documents(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<DocumentMeta>>, HttpError> {
    let limit = normalized_limit(query.limit);
    Ok(Json(state.db.documents.list_meta(limit)?))
}
