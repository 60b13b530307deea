//! Shared HTTP response types and domain error mapping

pub mod validated_json;

pub use validated_json::ValidatedJson;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use tracing::error;
use utoipa::ToSchema;

use crate::domain::{DomainError, ErrorKind};
use crate::shared::{MessageKey, Messages};

/// Success body: `{ "message": "..." }`
#[derive(Debug, Serialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Error body shared by every failing endpoint: `{ "errors": [...] }`
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub errors: Vec<String>,
}

/// Status code plus localized error list
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub errors: Vec<String>,
}

impl ApiError {
    pub fn new(status: StatusCode, errors: Vec<String>) -> Self {
        Self { status, errors }
    }

    /// Malformed or unreadable request body.
    pub fn invalid_request(messages: &Messages) -> Self {
        Self::new(
            StatusCode::BAD_REQUEST,
            vec![messages.text(MessageKey::InvalidRequest).to_string()],
        )
    }

    /// Map a domain error to its response class with localized text.
    /// Storage details only go to the log.
    pub fn from_domain(messages: &Messages, err: DomainError) -> Self {
        let status = status_for(err.kind());
        if status == StatusCode::INTERNAL_SERVER_ERROR {
            error!(error = %err, "Request failed with internal error");
        }
        Self::new(status, messages.error(&err))
    }
}

pub fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::Validation | ErrorKind::Conflict => StatusCode::BAD_REQUEST,
        ErrorKind::NotFound => StatusCode::NOT_FOUND,
        ErrorKind::Authentication | ErrorKind::LockedOut => StatusCode::UNAUTHORIZED,
        ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(ErrorResponse { errors: self.errors })).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statuses_follow_error_kind() {
        assert_eq!(status_for(ErrorKind::Validation), StatusCode::BAD_REQUEST);
        assert_eq!(status_for(ErrorKind::Conflict), StatusCode::BAD_REQUEST);
        assert_eq!(status_for(ErrorKind::NotFound), StatusCode::NOT_FOUND);
        assert_eq!(status_for(ErrorKind::Authentication), StatusCode::UNAUTHORIZED);
        assert_eq!(status_for(ErrorKind::LockedOut), StatusCode::UNAUTHORIZED);
        assert_eq!(status_for(ErrorKind::Internal), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn storage_errors_hide_details() {
        let messages = Messages::default();
        let err = ApiError::from_domain(&messages, DomainError::Storage("disk on fire".into()));
        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.errors, vec![messages.text(MessageKey::DefaultError).to_string()]);
    }
}
