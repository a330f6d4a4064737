//! Public endpoints: liveness and login.

use axum::{body::Body, extract::State, Json};

use crate::auth::{LoginRequest, LoginResponse};
use crate::http::error::ApiResult;
use crate::http::params::decode_json;
use crate::http::state::AppState;

/// GET /ping
pub async fn ping() -> Json<&'static str> {
    Json("Pong")
}

/// POST /user/login
pub async fn login(State(state): State<AppState>, body: Body) -> ApiResult<Json<LoginResponse>> {
    let request: LoginRequest = decode_json(body).await?;
    let token = state.authenticator.login(&request.username, &request.password).await?;
    Ok(Json(LoginResponse { token }))
}
