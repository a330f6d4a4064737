//! Alert search and acknowledgement.

use axum::{
    body::Body,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::Response,
};

use super::{error_ladder, internal, no_content};
use crate::http::error::ApiResult;
use crate::http::negotiate::respond_negotiated;
use crate::http::params::{decode_json, ensure_writable, page_response, QueryParams};
use crate::http::state::AppState;
use crate::model::AckAlertsRequest;
use crate::service::ErrorKind;

/// GET /alerts
pub async fn search_alerts(
    State(state): State<AppState>,
    headers: HeaderMap,
    params: QueryParams,
) -> ApiResult<Response> {
    let filter = params.alerts_filter()?;

    respond_negotiated(
        &headers,
        "alerts.xlsx",
        async {
            let alerts = state.service.search_alerts(&filter).await.map_err(internal)?;
            page_response(&filter.search, alerts)
        },
        async { state.service.search_alerts_as_xlsx(&filter).await.map_err(internal) },
    )
    .await
}

/// POST /alerts/ack
pub async fn ack_alerts(State(state): State<AppState>, body: Body) -> ApiResult<Response> {
    ensure_writable(&state)?;
    let request: AckAlertsRequest = decode_json(body).await?;

    state
        .service
        .ack_alerts(request.ids)
        .await
        .map_err(error_ladder(
            &[(ErrorKind::AlertNotFound, StatusCode::NOT_FOUND)],
            StatusCode::INTERNAL_SERVER_ERROR,
        ))?;
    Ok(no_content())
}
