//! Oracle database searches, fleet-wide database views and missing databases.

use axum::{
    body::Body,
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Extension, Json,
};
use serde_json::{json, Value};

use super::hosts::accessible_host;
use super::{error_ladder, internal, no_content, unprocessable};
use crate::auth::CurrentUser;
use crate::http::error::{ApiError, ApiResult};
use crate::http::negotiate::respond_negotiated;
use crate::http::params::{decode_json, ensure_writable, page_response, str2bool, QueryParams};
use crate::http::state::AppState;
use crate::model::{MissingDatabase, OracleDatabaseAgreementPart, OracleDatabaseMissingDbs};
use crate::service::ErrorKind;

/// GET /hosts/technologies/oracle/databases
pub async fn search_oracle_databases(
    State(state): State<AppState>,
    headers: HeaderMap,
    params: QueryParams,
) -> ApiResult<Response> {
    let filter = params.search_filter()?;

    respond_negotiated(
        &headers,
        "oracle_databases.xlsx",
        async {
            let rows = state.service.search_oracle_databases(&filter).await.map_err(internal)?;
            page_response(&filter, rows)
        },
        async {
            state
                .service
                .search_oracle_databases_as_xlsx(&filter)
                .await
                .map_err(internal)
        },
    )
    .await
}

/// GET /hosts/technologies/oracle/databases/addms
pub async fn search_oracle_database_addms(
    State(state): State<AppState>,
    headers: HeaderMap,
    params: QueryParams,
) -> ApiResult<Response> {
    let filter = params.search_filter()?;

    respond_negotiated(
        &headers,
        "addms.xlsx",
        async {
            let rows = state
                .service
                .search_oracle_database_addms(&filter)
                .await
                .map_err(internal)?;
            page_response(&filter, rows)
        },
        async {
            state
                .service
                .search_oracle_database_addms_as_xlsx(&filter)
                .await
                .map_err(internal)
        },
    )
    .await
}

/// GET /hosts/technologies/oracle/databases/segment-advisors
pub async fn search_oracle_database_segment_advisors(
    State(state): State<AppState>,
    headers: HeaderMap,
    params: QueryParams,
) -> ApiResult<Response> {
    let filter = params.advisor_filter(state.now())?;

    respond_negotiated(
        &headers,
        "segment_advisors.xlsx",
        async {
            let rows = state
                .service
                .search_oracle_database_segment_advisors(&filter)
                .await
                .map_err(internal)?;
            page_response(&filter.search, rows)
        },
        async {
            state
                .service
                .search_oracle_database_segment_advisors_as_xlsx(&filter)
                .await
                .map_err(internal)
        },
    )
    .await
}

/// GET /hosts/technologies/oracle/databases/patch-advisors
pub async fn search_oracle_database_patch_advisors(
    State(state): State<AppState>,
    headers: HeaderMap,
    params: QueryParams,
) -> ApiResult<Response> {
    let filter = params.advisor_filter(state.now())?;

    respond_negotiated(
        &headers,
        "patch_advisors.xlsx",
        async {
            let rows = state
                .service
                .search_oracle_database_patch_advisors(&filter)
                .await
                .map_err(internal)?;
            page_response(&filter.search, rows)
        },
        async {
            state
                .service
                .search_oracle_database_patch_advisors_as_xlsx(&filter)
                .await
                .map_err(internal)
        },
    )
    .await
}

/// GET /hosts/technologies/oracle/databases/agreements-parts
pub async fn get_oracle_database_agreement_parts(
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<OracleDatabaseAgreementPart>>> {
    let parts = state
        .service
        .get_oracle_database_agreement_parts()
        .await
        .map_err(internal)?;
    Ok(Json(parts))
}

/// GET /hosts/technologies/all/databases
pub async fn list_all_databases(
    State(state): State<AppState>,
    headers: HeaderMap,
    params: QueryParams,
) -> ApiResult<Response> {
    let filter = params.global_filter()?;

    respond_negotiated(
        &headers,
        "all_databases.xlsx",
        async {
            let databases = state.service.list_all_databases(&filter).await.map_err(internal)?;
            Ok::<_, ApiError>(Json(databases).into_response())
        },
        async { state.service.list_all_databases_as_xlsx(&filter).await.map_err(internal) },
    )
    .await
}

/// GET /hosts/technologies/all/databases/statistics
pub async fn get_databases_statistics(State(state): State<AppState>, params: QueryParams) -> ApiResult<Json<Value>> {
    let filter = params.global_filter()?;
    let stats = state.service.get_databases_statistics(&filter).await.map_err(internal)?;
    Ok(Json(stats))
}

/// GET /hosts/technologies/all/databases/licenses-used
pub async fn get_used_licenses_per_database(
    State(state): State<AppState>,
    params: QueryParams,
) -> ApiResult<Json<Vec<Value>>> {
    let filter = params.global_filter()?;
    let licenses = state
        .service
        .get_used_licenses_per_database(&filter)
        .await
        .map_err(internal)?;
    Ok(Json(licenses))
}

/// GET /hosts/technologies/all/databases/licenses-compliance
pub async fn get_licenses_compliance(
    State(state): State<AppState>,
    headers: HeaderMap,
    params: QueryParams,
) -> ApiResult<Response> {
    let filter = params.global_filter()?;

    respond_negotiated(
        &headers,
        "licenses_compliance.xlsx",
        async {
            let compliance = state.service.get_licenses_compliance(&filter).await.map_err(internal)?;
            Ok::<_, ApiError>(Json(json!({ "licensesCompliance": compliance })).into_response())
        },
        async {
            state
                .service
                .get_licenses_compliance_as_xlsx(&filter)
                .await
                .map_err(internal)
        },
    )
    .await
}

/// GET /hosts/missing-dbs
pub async fn get_missing_databases(
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<OracleDatabaseMissingDbs>>> {
    let missing = state.service.get_missing_databases().await.map_err(unprocessable)?;
    Ok(Json(missing))
}

/// GET /hosts/{hostname}/missing-dbs
pub async fn get_missing_databases_by_hostname(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(hostname): Path<String>,
) -> ApiResult<Json<Vec<MissingDatabase>>> {
    accessible_host(&state, &user, &hostname).await?;

    let missing = state
        .service
        .get_missing_databases_by_hostname(&hostname)
        .await
        .map_err(unprocessable)?;
    Ok(Json(missing))
}

/// PUT /hosts/{hostname}/missing-dbs/{dbname}/ignored/{ignored}
///
/// The body carries the `ignoredComment`.
pub async fn update_missing_database_ignored_field(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path((hostname, dbname, ignored)): Path<(String, String, String)>,
    body: Body,
) -> ApiResult<Response> {
    ensure_writable(&state)?;
    let ignored = str2bool(&ignored, false)?;
    accessible_host(&state, &user, &hostname).await?;
    let request: MissingDatabase = decode_json(body).await?;

    state
        .service
        .update_missing_database_ignored_field(&hostname, &dbname, ignored, &request.ignored_comment)
        .await
        .map_err(error_ladder(
            &[
                (ErrorKind::HostNotFound, StatusCode::NOT_FOUND),
                (ErrorKind::NotFound, StatusCode::NOT_FOUND),
            ],
            StatusCode::INTERNAL_SERVER_ERROR,
        ))?;
    Ok(no_content())
}
