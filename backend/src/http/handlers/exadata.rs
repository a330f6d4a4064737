//! Exadata racks. Every service failure here is reported as 422.

use axum::{
    body::Body,
    extract::{Path, State},
    http::HeaderMap,
    response::Response,
    Json,
};

use super::{no_content, unprocessable};
use crate::http::error::ApiResult;
use crate::http::negotiate::{require_xlsx, xlsx_response};
use crate::http::params::{decode_json, ensure_writable, QueryParams};
use crate::http::state::AppState;
use crate::model::{
    ComponentClusterNamesUpdate, ExadataInstance, ExadataPatchAdvisor, ExadataRdma, VmClusterNameUpdate,
};

async fn list_instances(state: &AppState, params: &QueryParams, hidden: bool) -> ApiResult<Json<Vec<ExadataInstance>>> {
    let filter = params.global_filter()?;
    let instances = state
        .service
        .list_exadata_instances(&filter, hidden)
        .await
        .map_err(unprocessable)?;
    Ok(Json(instances))
}

/// GET /hosts/technologies/oracle/exadata
pub async fn list_exadata_instances(
    State(state): State<AppState>,
    params: QueryParams,
) -> ApiResult<Json<Vec<ExadataInstance>>> {
    list_instances(&state, &params, false).await
}

/// GET /hosts/technologies/oracle/exadata/hidden
pub async fn list_hidden_exadata_instances(
    State(state): State<AppState>,
    params: QueryParams,
) -> ApiResult<Json<Vec<ExadataInstance>>> {
    list_instances(&state, &params, true).await
}

/// GET /hosts/technologies/oracle/exadata/export
pub async fn export_exadata_instances(State(state): State<AppState>, headers: HeaderMap) -> ApiResult<Response> {
    require_xlsx(&headers)?;
    let workbook = state
        .service
        .get_all_exadata_instances_as_xlsx()
        .await
        .map_err(unprocessable)?;
    xlsx_response(workbook, "exadata.xlsx")
}

/// GET /hosts/technologies/oracle/exadata/patch-advisors/export
pub async fn export_exadata_patch_advisors(State(state): State<AppState>, headers: HeaderMap) -> ApiResult<Response> {
    require_xlsx(&headers)?;
    let workbook = state
        .service
        .get_all_exadata_patch_advisors_as_xlsx()
        .await
        .map_err(unprocessable)?;
    xlsx_response(workbook, "exadata_patch_advisors.xlsx")
}

/// GET /hosts/technologies/oracle/exadata/{rackID}
pub async fn get_exadata_instance(
    State(state): State<AppState>,
    Path(rack_id): Path<String>,
) -> ApiResult<Json<ExadataInstance>> {
    let instance = state
        .service
        .get_exadata_instance(&rack_id)
        .await
        .map_err(unprocessable)?;
    Ok(Json(instance))
}

/// GET /hosts/technologies/oracle/exadata/{rackID}/patch-advisors
pub async fn get_exadata_patch_advisors(
    State(state): State<AppState>,
    Path(rack_id): Path<String>,
) -> ApiResult<Json<Vec<ExadataPatchAdvisor>>> {
    let advisors = state
        .service
        .get_exadata_patch_advisors(&rack_id)
        .await
        .map_err(unprocessable)?;
    Ok(Json(advisors))
}

/// PUT /hosts/technologies/oracle/exadata/{rackID}/vms/{hostID}/{name}/cluster-name
pub async fn update_exadata_vm_cluster_name(
    State(state): State<AppState>,
    Path((rack_id, host_id, vm_name)): Path<(String, String, String)>,
    body: Body,
) -> ApiResult<Response> {
    ensure_writable(&state)?;
    let update: VmClusterNameUpdate = decode_json(body).await?;

    state
        .service
        .update_exadata_vm_cluster_name(&rack_id, &host_id, &vm_name, &update.cluster_name)
        .await
        .map_err(unprocessable)?;
    Ok(no_content())
}

/// PUT /hosts/technologies/oracle/exadata/{rackID}/components/{hostID}/cluster-names
pub async fn update_exadata_component_cluster_names(
    State(state): State<AppState>,
    Path((rack_id, host_id)): Path<(String, String)>,
    body: Body,
) -> ApiResult<Response> {
    ensure_writable(&state)?;
    let update: ComponentClusterNamesUpdate = decode_json(body).await?;

    state
        .service
        .update_exadata_component_cluster_names(&rack_id, &host_id, update.cluster_names)
        .await
        .map_err(unprocessable)?;
    Ok(no_content())
}

/// PUT /hosts/technologies/oracle/exadata/{rackID}/rdma
pub async fn update_exadata_rdma(
    State(state): State<AppState>,
    Path(rack_id): Path<String>,
    body: Body,
) -> ApiResult<Response> {
    ensure_writable(&state)?;
    let rdma: ExadataRdma = decode_json(body).await?;

    state
        .service
        .update_exadata_rdma(&rack_id, rdma)
        .await
        .map_err(unprocessable)?;
    Ok(no_content())
}

/// POST /hosts/technologies/oracle/exadata/{rackID}/hide
pub async fn hide_exadata_instance(State(state): State<AppState>, Path(rack_id): Path<String>) -> ApiResult<Response> {
    ensure_writable(&state)?;
    state
        .service
        .hide_exadata_instance(&rack_id)
        .await
        .map_err(unprocessable)?;
    Ok(no_content())
}

/// DELETE /hosts/technologies/oracle/exadata/{rackID}/hide
pub async fn show_exadata_instance(State(state): State<AppState>, Path(rack_id): Path<String>) -> ApiResult<Response> {
    ensure_writable(&state)?;
    state
        .service
        .show_exadata_instance(&rack_id)
        .await
        .map_err(unprocessable)?;
    Ok(no_content())
}
