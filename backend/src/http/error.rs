//! HTTP error handling and response types.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::{error, warn};

use crate::service::ServiceError;

/// Message attached to requests refused by configuration.
pub const FORBIDDEN_REQUEST: &str = "FORBIDDEN_REQUEST";

/// Error text of mutating requests refused in read-only mode.
pub const READ_ONLY_ERROR: &str = "The API is disabled because the service is put in read-only mode";

/// API error response body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// What went wrong
    pub error: String,
    /// Detail of the failure; the status reason phrase when none is known
    pub message: String,
}

/// Error returned by handlers: a status and the body sent with it.
#[derive(Debug, Clone)]
pub struct ApiError {
    pub status: StatusCode,
    pub body: ErrorResponse,
}

fn reason(status: StatusCode) -> &'static str {
    status.canonical_reason().unwrap_or("Unknown")
}

impl ApiError {
    pub fn new(status: StatusCode, error: impl Into<String>) -> Self {
        Self {
            status,
            body: ErrorResponse {
                error: error.into(),
                message: reason(status).to_string(),
            },
        }
    }

    /// Replace the default reason-phrase message.
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.body.message = message.into();
        self
    }

    pub fn bad_request(error: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, error)
    }

    pub fn unauthorized(error: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, error)
    }

    pub fn forbidden(error: impl Into<String>) -> Self {
        Self::new(StatusCode::FORBIDDEN, error)
    }

    pub fn not_found(error: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, error)
    }

    pub fn unprocessable(error: impl Into<String>) -> Self {
        Self::new(StatusCode::UNPROCESSABLE_ENTITY, error)
    }

    pub fn internal(error: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, error)
    }

    /// Mutation refused because the API is read-only.
    pub fn read_only() -> Self {
        Self::forbidden(READ_ONLY_ERROR).with_message(FORBIDDEN_REQUEST)
    }

    /// Map a service failure to `status`, carrying its detail as the message.
    pub fn service(status: StatusCode, err: ServiceError) -> Self {
        let api_error = Self::new(status, err.description);
        match err.message {
            Some(message) => api_error.with_message(message),
            None => api_error,
        }
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}: {}", self.status.as_u16(), self.body.message, self.body.error)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            error!(
                status = self.status.as_u16(),
                error = %self.body.error,
                message = %self.body.message,
                "Request failed"
            );
        } else {
            warn!(
                status = self.status.as_u16(),
                error = %self.body.error,
                message = %self.body.message,
                "Request rejected"
            );
        }

        (self.status, Json(self.body)).into_response()
    }
}

/// Result type of handlers.
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::ErrorKind;

    #[test]
    fn test_message_defaults_to_reason_phrase() {
        let err = ApiError::not_found("Host not found");
        assert_eq!(err.status, StatusCode::NOT_FOUND);
        assert_eq!(err.body.message, "Not Found");
        assert_eq!(
            ApiError::unprocessable("x").body.message,
            "Unprocessable Entity"
        );
    }

    #[test]
    fn test_read_only_body() {
        let err = ApiError::read_only();
        assert_eq!(err.status, StatusCode::FORBIDDEN);
        assert_eq!(err.body.message, FORBIDDEN_REQUEST);
        assert_eq!(err.body.error, READ_ONLY_ERROR);
    }

    #[test]
    fn test_service_error_detail_becomes_message() {
        let err = ApiError::service(
            StatusCode::NOT_FOUND,
            ServiceError::new(ErrorKind::GroupNotFound).with_message("Test"),
        );
        assert_eq!(err.body.error, "Group not found");
        assert_eq!(err.body.message, "Test");

        let err = ApiError::service(StatusCode::NOT_FOUND, ServiceError::new(ErrorKind::GroupNotFound));
        assert_eq!(err.body.message, "Not Found");
    }
}
