//! Request middleware resolving the bearer token into a [`CurrentUser`].

use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
    Extension,
};
use tracing::debug;

use super::{AuthError, CurrentUser};
use crate::http::error::ApiError;
use crate::http::state::AppState;
use crate::service::ErrorKind;

fn bearer_token(request: &Request) -> Result<&str, AuthError> {
    request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or(AuthError::MissingToken)
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::Service(err) => ApiError::service(axum::http::StatusCode::INTERNAL_SERVER_ERROR, err),
            AuthError::Signing(err) => ApiError::internal(err.to_string()),
            other => ApiError::unauthorized(other.to_string()),
        }
    }
}

/// Reject requests without a valid token; attach the caller otherwise.
pub async fn require_user(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = bearer_token(&request)?;
    let user = state.authenticator.authenticate(token).await?;
    debug!(username = %user.username, "Authenticated request");

    request.extensions_mut().insert(CurrentUser(user));
    Ok(next.run(request).await)
}

/// Reject callers that are not administrators. Runs after [`require_user`].
pub async fn require_admin(
    Extension(user): Extension<CurrentUser>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    if !user.is_admin() {
        return Err(ApiError::forbidden(ErrorKind::PermissionDenied.as_str()));
    }
    Ok(next.run(request).await)
}
