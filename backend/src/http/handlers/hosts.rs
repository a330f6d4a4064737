//! Host endpoints: search, detail, archiving, patching functions, database
//! tags, ignored licenses and hypervisor clusters.

use axum::{
    body::Body,
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::Response,
    Json,
};

use super::{error_ladder, internal, no_content, null_ok};
use crate::auth::CurrentUser;
use crate::http::error::{ApiError, ApiResult, FORBIDDEN_REQUEST};
use crate::http::negotiate::respond_negotiated;
use crate::http::params::{decode_json, ensure_writable, page_response, read_body_text, str2bool, QueryParams};
use crate::http::state::AppState;
use crate::model::filter::max_time;
use crate::model::{ClusterDetail, Host, HostsMode, PatchingFunction, PatchingFunctionRequest};
use crate::service::ErrorKind;

const HOST_NOT_FOUND: &[(ErrorKind, StatusCode)] = &[(ErrorKind::HostNotFound, StatusCode::NOT_FOUND)];

const DATABASE_NOT_FOUND: &[(ErrorKind, StatusCode)] = &[
    (ErrorKind::HostNotFound, StatusCode::NOT_FOUND),
    (ErrorKind::NotFound, StatusCode::NOT_FOUND),
];

/// GET /hosts
pub async fn search_hosts(
    State(state): State<AppState>,
    headers: HeaderMap,
    params: QueryParams,
) -> ApiResult<Response> {
    let mode: HostsMode = params
        .str("mode")
        .parse()
        .map_err(|err: crate::model::ValidationError| ApiError::unprocessable(err.to_string()))?;
    let filter = params.search_filter()?;

    respond_negotiated(
        &headers,
        "hosts.xlsx",
        async {
            let hosts = state.service.search_hosts(mode, &filter).await.map_err(internal)?;
            page_response(&filter, hosts)
        },
        async { state.service.search_hosts_as_xlsx(&filter).await.map_err(internal) },
    )
    .await
}

/// GET /hosts/{hostname}
pub async fn get_host(State(state): State<AppState>, Path(hostname): Path<String>) -> ApiResult<Json<Host>> {
    let host = state
        .service
        .get_host(&hostname)
        .await
        .map_err(error_ladder(HOST_NOT_FOUND, StatusCode::INTERNAL_SERVER_ERROR))?;
    Ok(Json(host))
}

/// Fetch a host the caller is allowed to see.
///
/// Fails with 403 when the host's location is outside the caller's roles.
pub(super) async fn accessible_host(state: &AppState, user: &CurrentUser, hostname: &str) -> ApiResult<Host> {
    let host = state
        .service
        .get_host(hostname)
        .await
        .map_err(error_ladder(HOST_NOT_FOUND, StatusCode::INTERNAL_SERVER_ERROR))?;
    let locations = state.service.list_user_locations(&user.0).await.map_err(internal)?;
    if !locations.contains(&host.location) {
        return Err(ApiError::forbidden(ErrorKind::PermissionDenied.as_str()));
    }
    Ok(host)
}

/// DELETE /hosts/{hostname}
pub async fn archive_host(State(state): State<AppState>, Path(hostname): Path<String>) -> ApiResult<Response> {
    ensure_writable(&state)?;
    state
        .service
        .archive_host(&hostname)
        .await
        .map_err(error_ladder(HOST_NOT_FOUND, StatusCode::INTERNAL_SERVER_ERROR))?;
    Ok(no_content())
}

/// GET /hosts/{hostname}/patching-function
pub async fn get_patching_function(
    State(state): State<AppState>,
    Path(hostname): Path<String>,
) -> ApiResult<Json<PatchingFunction>> {
    let function = state
        .service
        .get_patching_function(&hostname)
        .await
        .map_err(error_ladder(
            &[
                (ErrorKind::PatchingFunctionNotFound, StatusCode::NOT_FOUND),
                (ErrorKind::HostNotFound, StatusCode::NOT_FOUND),
            ],
            StatusCode::INTERNAL_SERVER_ERROR,
        ))?;
    Ok(Json(function))
}

/// PUT /hosts/{hostname}/patching-function
pub async fn set_patching_function(
    State(state): State<AppState>,
    Path(hostname): Path<String>,
    body: Body,
) -> ApiResult<Json<PatchingFunction>> {
    ensure_writable(&state)?;
    if !state.config.api_service.enable_inserting_custom_patching_function {
        return Err(
            ApiError::forbidden("The insertion of custom patching function is disabled")
                .with_message(FORBIDDEN_REQUEST),
        );
    }

    let request: PatchingFunctionRequest = decode_json(body).await?;
    request
        .validate()
        .map_err(|err| ApiError::bad_request(err.to_string()))?;

    let function = state
        .service
        .set_patching_function(&hostname, request)
        .await
        .map_err(error_ladder(HOST_NOT_FOUND, StatusCode::INTERNAL_SERVER_ERROR))?;
    Ok(Json(function))
}

/// DELETE /hosts/{hostname}/patching-function
pub async fn delete_patching_function(
    State(state): State<AppState>,
    Path(hostname): Path<String>,
) -> ApiResult<Response> {
    ensure_writable(&state)?;
    state
        .service
        .delete_patching_function(&hostname)
        .await
        .map_err(error_ladder(HOST_NOT_FOUND, StatusCode::INTERNAL_SERVER_ERROR))?;
    Ok(no_content())
}

/// POST /hosts/{hostname}/technologies/oracle/databases/{dbname}/tags
///
/// The body is the bare tag.
pub async fn add_tag_to_oracle_database(
    State(state): State<AppState>,
    Path((hostname, dbname)): Path<(String, String)>,
    body: Body,
) -> ApiResult<Response> {
    ensure_writable(&state)?;
    let tag = read_body_text(body).await?;

    state
        .service
        .add_tag_to_oracle_database(&hostname, &dbname, &tag)
        .await
        .map_err(error_ladder(DATABASE_NOT_FOUND, StatusCode::INTERNAL_SERVER_ERROR))?;
    Ok(null_ok())
}

/// DELETE /hosts/{hostname}/technologies/oracle/databases/{dbname}/tags/{tagname}
pub async fn delete_tag_of_oracle_database(
    State(state): State<AppState>,
    Path((hostname, dbname, tag)): Path<(String, String, String)>,
) -> ApiResult<Response> {
    ensure_writable(&state)?;
    state
        .service
        .delete_tag_of_oracle_database(&hostname, &dbname, &tag)
        .await
        .map_err(error_ladder(DATABASE_NOT_FOUND, StatusCode::INTERNAL_SERVER_ERROR))?;
    Ok(no_content())
}

/// PUT /hosts/{hostname}/technologies/oracle/databases/{dbname}/licenses/{licenseTypeID}/ignored/{ignored}
pub async fn set_license_ignored_field(
    State(state): State<AppState>,
    Path((hostname, dbname, license_type_id, ignored)): Path<(String, String, String, String)>,
) -> ApiResult<Response> {
    ensure_writable(&state)?;
    let ignored = str2bool(&ignored, false)?;

    state
        .service
        .set_license_ignored_field(&hostname, &dbname, &license_type_id, ignored)
        .await
        .map_err(error_ladder(
            &[
                (ErrorKind::LicenseTypeIdNotFound, StatusCode::NOT_FOUND),
                (ErrorKind::HostNotFound, StatusCode::NOT_FOUND),
                (ErrorKind::NotFound, StatusCode::NOT_FOUND),
            ],
            StatusCode::INTERNAL_SERVER_ERROR,
        ))?;
    Ok(null_ok())
}

/// GET /clusters
pub async fn search_clusters(
    State(state): State<AppState>,
    headers: HeaderMap,
    params: QueryParams,
) -> ApiResult<Response> {
    let full = params.bool("full", false)?;
    let filter = params.search_filter()?;

    respond_negotiated(
        &headers,
        "clusters.xlsx",
        async {
            let clusters = state.service.search_clusters(full, &filter).await.map_err(internal)?;
            page_response(&filter, clusters)
        },
        async { state.service.search_clusters_as_xlsx(&filter).await.map_err(internal) },
    )
    .await
}

/// GET /clusters/{name}
pub async fn get_cluster(
    State(state): State<AppState>,
    Path(name): Path<String>,
    params: QueryParams,
) -> ApiResult<Json<ClusterDetail>> {
    let older_than = params.time("older-than", max_time())?;
    let cluster = state
        .service
        .get_cluster(&name, older_than)
        .await
        .map_err(error_ladder(
            &[(ErrorKind::ClusterNotFound, StatusCode::NOT_FOUND)],
            StatusCode::INTERNAL_SERVER_ERROR,
        ))?;
    Ok(Json(cluster))
}

/// GET /locations
pub async fn list_locations(State(state): State<AppState>, params: QueryParams) -> ApiResult<Json<Vec<String>>> {
    let filter = params.global_filter()?;
    let locations = state.service.list_locations(&filter).await.map_err(internal)?;
    Ok(Json(locations))
}

/// GET /environments
pub async fn list_environments(State(state): State<AppState>, params: QueryParams) -> ApiResult<Json<Vec<String>>> {
    let filter = params.global_filter()?;
    let environments = state.service.list_environments(&filter).await.map_err(internal)?;
    Ok(Json(environments))
}
