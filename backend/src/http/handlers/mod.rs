//! HTTP handlers for the REST API.
//!
//! Every handler follows the same shape: parse the request, call one
//! service method, map the outcome to a status. Mutating handlers check
//! the read-only gate before touching the body.

pub mod admin;
pub mod agreements;
pub mod alerts;
pub mod contracts;
pub mod databases;
pub mod exadata;
pub mod hosts;
pub mod scenarios;
pub mod settings;
pub mod stats;
pub mod system;
pub mod uploads;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::Value;

use super::error::ApiError;
use crate::service::{ErrorKind, ServiceError};

/// Status picked for a service error: the first matching kind wins,
/// anything else falls back to `fallback`.
pub(crate) fn error_ladder(
    ladder: &'static [(ErrorKind, StatusCode)],
    fallback: StatusCode,
) -> impl Fn(ServiceError) -> ApiError {
    move |err| {
        let status = ladder
            .iter()
            .find(|(kind, _)| err.is(*kind))
            .map_or(fallback, |(_, status)| *status);
        ApiError::service(status, err)
    }
}

/// Any service error is a 500.
pub(crate) fn internal(err: ServiceError) -> ApiError {
    ApiError::service(StatusCode::INTERNAL_SERVER_ERROR, err)
}

/// Any service error is a 422.
pub(crate) fn unprocessable(err: ServiceError) -> ApiError {
    ApiError::service(StatusCode::UNPROCESSABLE_ENTITY, err)
}

/// 200 with a JSON `null` body.
pub(crate) fn null_ok() -> Response {
    Json(Value::Null).into_response()
}

pub(crate) fn no_content() -> Response {
    StatusCode::NO_CONTENT.into_response()
}
