//! HTTP error mapping for API handlers.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use draftkeeper_core::AppError;
use serde_json::json;

/// Handler error that renders as `{"error": "..."}` with a matching status.
#[derive(Debug)]
pub struct HttpError(pub AppError);

impl From<AppError> for HttpError {
    fn from(value: AppError) -> Self {
        Self(value)
    }
}

impl HttpError {
    /// Status code this error is reported with.
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Locked(_) => StatusCode::LOCKED,
            AppError::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self.0 {
            AppError::NotFound
            | AppError::BadRequest(_)
            | AppError::Locked(_)
            | AppError::PayloadTooLarge { .. } => self.0.to_string(),
            AppError::Database(_) | AppError::StorageMessage(_) => {
                tracing::error!("Database error: {}", self.0);
                "Database error".to_string()
            }
            other => {
                tracing::error!("Internal error: {:?}", other);
                "Internal server error".to_string()
            }
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::HttpError;
    use axum::http::StatusCode;
    use draftkeeper_core::AppError;

    #[test]
    fn client_errors_map_to_specific_statuses() {
        let cases = [
            (AppError::NotFound, StatusCode::NOT_FOUND),
            (AppError::BadRequest("x".into()), StatusCode::BAD_REQUEST),
            (AppError::Locked("held".into()), StatusCode::LOCKED),
            (
                AppError::PayloadTooLarge { limit: 10 },
                StatusCode::PAYLOAD_TOO_LARGE,
            ),
            (
                AppError::StorageMessage("disk".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (err, expected) in cases {
            assert_eq!(HttpError::from(err).status(), expected);
        }
    }
}
