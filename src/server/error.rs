//! HTTP mapping for [`BrowserError`].

use crate::BrowserError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

/// Error returned by protected handlers.
///
/// Bodies are plain text, so the frontend can show them verbatim.
#[derive(Debug)]
pub struct ApiError(pub BrowserError);

impl From<BrowserError> for ApiError {
    fn from(err: BrowserError) -> Self {
        Self(err)
    }
}

impl ApiError {
    /// Status code and user-facing message for this error.
    pub fn status_and_message(&self) -> (StatusCode, String) {
        match &self.0 {
            BrowserError::Validation(msg) | BrowserError::InvalidInput(msg) => {
                (StatusCode::BAD_REQUEST, msg.clone())
            }
            BrowserError::Unauthenticated => {
                (StatusCode::UNAUTHORIZED, BrowserError::Unauthenticated.to_string())
            }
            BrowserError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            BrowserError::Connection { .. } => (StatusCode::BAD_GATEWAY, self.0.to_string()),
            BrowserError::Storage {
                operation,
                code,
                message,
            } => storage_status(operation, code.as_deref(), message),
            BrowserError::Io(_) | BrowserError::Json(_) | BrowserError::Other(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, self.0.to_string())
            }
        }
    }
}

fn storage_status(operation: &str, code: Option<&str>, message: &str) -> (StatusCode, String) {
    match (operation, code) {
        (_, Some("BucketNotEmpty")) => (
            StatusCode::CONFLICT,
            "Cannot delete bucket: The bucket is not empty. Please delete all objects first."
                .to_string(),
        ),
        (_, Some("NoSuchBucket")) => (StatusCode::NOT_FOUND, "Bucket not found.".to_string()),
        (_, Some("NoSuchKey")) => (StatusCode::NOT_FOUND, "Object not found.".to_string()),
        ("delete_bucket", Some("AccessDenied")) => (
            StatusCode::FORBIDDEN,
            "Access denied: You don't have permission to delete this bucket.".to_string(),
        ),
        (_, Some("AccessDenied")) => (
            StatusCode::FORBIDDEN,
            "Access denied: You don't have permission to perform this operation.".to_string(),
        ),
        (_, Some("BucketAlreadyExists" | "BucketAlreadyOwnedByYou")) => {
            (StatusCode::CONFLICT, message.to_string())
        }
        _ => (StatusCode::INTERNAL_SERVER_ERROR, message.to_string()),
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = self.status_and_message();

        if status.is_server_error() {
            tracing::error!(status = status.as_u16(), error = %self.0, "request failed");
        } else if status != StatusCode::UNAUTHORIZED {
            tracing::warn!(status = status.as_u16(), error = %self.0, "request rejected");
        }

        (status, message).into_response()
    }
}
