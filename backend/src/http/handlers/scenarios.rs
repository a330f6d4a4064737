//! What-if license scenarios.
//!
//! Every service failure maps to 422, lookups of unknown scenarios included.

use axum::{
    body::Body,
    extract::{Path, State},
    response::Response,
    Json,
};

use super::{no_content, unprocessable};
use crate::http::error::ApiResult;
use crate::http::params::{decode_json, ensure_writable, parse_object_id, QueryParams};
use crate::http::state::AppState;
use crate::model::{
    CreateScenarioRequest, LicenseCompliance, LicenseUsedCluster, LicenseUsedDatabase, LicenseUsedHost,
    Scenario, ScenarioLicenses, ScenarioSummary,
};

async fn load(state: &AppState, id: &str) -> ApiResult<Scenario> {
    let id = parse_object_id(id)?;
    state.service.get_scenario(id).await.map_err(unprocessable)
}

/// POST /scenarios
pub async fn create_scenario(
    State(state): State<AppState>,
    params: QueryParams,
    body: Body,
) -> ApiResult<Json<ScenarioSummary>> {
    ensure_writable(&state)?;
    let filter = params.global_filter()?;
    let request: CreateScenarioRequest = decode_json(body).await?;

    let scenario = state
        .service
        .create_scenario(request, &filter)
        .await
        .map_err(unprocessable)?;
    Ok(Json(scenario.summary()))
}

/// GET /scenarios
pub async fn list_scenarios(State(state): State<AppState>) -> ApiResult<Json<Vec<ScenarioSummary>>> {
    let scenarios = state.service.get_scenarios().await.map_err(unprocessable)?;
    Ok(Json(scenarios.iter().map(Scenario::summary).collect()))
}

/// GET /scenarios/{id}
pub async fn get_scenario(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<ScenarioSummary>> {
    Ok(Json(load(&state, &id).await?.summary()))
}

/// DELETE /scenarios/{id}
pub async fn remove_scenario(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Response> {
    ensure_writable(&state)?;
    let id = parse_object_id(&id)?;
    state.service.remove_scenario(id).await.map_err(unprocessable)?;
    Ok(no_content())
}

/// GET /scenarios/{id}/license-compliance
pub async fn get_scenario_license_compliance(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<ScenarioLicenses<LicenseCompliance>>> {
    Ok(Json(load(&state, &id).await?.compliance()))
}

/// GET /scenarios/{id}/license-used-database
pub async fn get_scenario_license_used_database(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<ScenarioLicenses<LicenseUsedDatabase>>> {
    Ok(Json(load(&state, &id).await?.used_per_database()))
}

/// GET /scenarios/{id}/license-used-host
pub async fn get_scenario_license_used_host(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<ScenarioLicenses<LicenseUsedHost>>> {
    Ok(Json(load(&state, &id).await?.used_per_host()))
}

/// GET /scenarios/{id}/license-used-cluster
pub async fn get_scenario_license_used_cluster(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<ScenarioLicenses<LicenseUsedCluster>>> {
    Ok(Json(load(&state, &id).await?.used_per_cluster()))
}
