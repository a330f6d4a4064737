//! Oracle database and MySQL agreements.

use axum::{
    body::Body,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};

use super::{error_ladder, internal, no_content, null_ok};
use crate::http::error::{ApiError, ApiResult};
use crate::http::params::{decode_json, ensure_writable, parse_object_id, read_body_text, QueryParams};
use crate::http::state::AppState;
use crate::model::{MySqlAgreement, OracleDatabaseAgreement, OracleDatabaseAgreementFe};
use crate::service::ErrorKind;

const SAVE_ERRORS: &[(ErrorKind, StatusCode)] = &[
    (ErrorKind::AgreementNotFound, StatusCode::UNPROCESSABLE_ENTITY),
    (ErrorKind::LicenseTypeIdNotFound, StatusCode::UNPROCESSABLE_ENTITY),
];

const MYSQL_NOT_FOUND: &[(ErrorKind, StatusCode)] = &[(ErrorKind::NotFound, StatusCode::NOT_FOUND)];

fn check(agreement: &OracleDatabaseAgreement) -> ApiResult<()> {
    agreement
        .check()
        .map_err(|err| ApiError::bad_request(err.to_string()))
}

/// POST /agreements/oracle/database
pub async fn add_oracle_database_agreement(
    State(state): State<AppState>,
    body: Body,
) -> ApiResult<Json<OracleDatabaseAgreementFe>> {
    ensure_writable(&state)?;
    let agreement: OracleDatabaseAgreement = decode_json(body).await?;
    if !agreement.id.is_nil() {
        return Err(ApiError::bad_request(
            "ID must be empty to add a new AssociatedLicenseType",
        ));
    }
    check(&agreement)?;

    let saved = state
        .service
        .add_oracle_database_agreement(agreement)
        .await
        .map_err(error_ladder(SAVE_ERRORS, StatusCode::INTERNAL_SERVER_ERROR))?;
    Ok(Json(saved))
}

/// PUT /agreements/oracle/database
pub async fn update_oracle_database_agreement(
    State(state): State<AppState>,
    body: Body,
) -> ApiResult<Json<OracleDatabaseAgreementFe>> {
    ensure_writable(&state)?;
    let agreement: OracleDatabaseAgreement = decode_json(body).await?;
    check(&agreement)?;

    let saved = state
        .service
        .update_oracle_database_agreement(agreement)
        .await
        .map_err(error_ladder(SAVE_ERRORS, StatusCode::INTERNAL_SERVER_ERROR))?;
    Ok(Json(saved))
}

/// GET /agreements/oracle/database
pub async fn get_oracle_database_agreements(
    State(state): State<AppState>,
    params: QueryParams,
) -> ApiResult<Json<Value>> {
    let filter = params.agreements_filter()?;
    let agreements = state
        .service
        .get_oracle_database_agreements(&filter)
        .await
        .map_err(internal)?;
    Ok(Json(json!({ "agreements": agreements })))
}

/// DELETE /agreements/oracle/database/{id}
pub async fn delete_oracle_database_agreement(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Response> {
    ensure_writable(&state)?;
    let id = parse_object_id(&id)?;

    state
        .service
        .delete_oracle_database_agreement(id)
        .await
        .map_err(error_ladder(
            &[(ErrorKind::AgreementNotFound, StatusCode::NOT_FOUND)],
            StatusCode::INTERNAL_SERVER_ERROR,
        ))?;
    Ok(null_ok())
}

/// POST /agreements/oracle/database/{id}/hosts
///
/// The body is the bare hostname.
pub async fn add_host_to_oracle_database_agreement(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Body,
) -> ApiResult<Response> {
    ensure_writable(&state)?;
    let id = parse_object_id(&id)?;
    let hostname = read_body_text(body).await?;

    state
        .service
        .add_host_to_oracle_database_agreement(id, &hostname)
        .await
        .map_err(error_ladder(
            &[
                (ErrorKind::AgreementNotFound, StatusCode::NOT_FOUND),
                (ErrorKind::NotInClusterHostNotFound, StatusCode::NOT_FOUND),
            ],
            StatusCode::INTERNAL_SERVER_ERROR,
        ))?;
    Ok(null_ok())
}

/// DELETE /agreements/oracle/database/{id}/hosts/{hostname}
pub async fn delete_host_from_oracle_database_agreement(
    State(state): State<AppState>,
    Path((id, hostname)): Path<(String, String)>,
) -> ApiResult<Response> {
    ensure_writable(&state)?;
    let id = parse_object_id(&id)?;

    state
        .service
        .delete_host_from_oracle_database_agreement(id, &hostname)
        .await
        .map_err(error_ladder(
            &[
                (ErrorKind::AgreementNotFound, StatusCode::NOT_FOUND),
                (ErrorKind::NotFound, StatusCode::NOT_FOUND),
            ],
            StatusCode::INTERNAL_SERVER_ERROR,
        ))?;
    Ok(null_ok())
}

// =============================================================================
// MySQL
// =============================================================================

fn check_mysql(agreement: &MySqlAgreement) -> ApiResult<()> {
    if !agreement.is_valid() {
        return Err(ApiError::bad_request("Agreement isn't valid"));
    }
    Ok(())
}

/// POST /agreements/mysql/database
pub async fn add_mysql_agreement(State(state): State<AppState>, body: Body) -> ApiResult<Response> {
    ensure_writable(&state)?;
    let agreement: MySqlAgreement = decode_json(body).await?;
    if !agreement.id.is_nil() {
        return Err(ApiError::bad_request("ID must be empty"));
    }
    check_mysql(&agreement)?;

    let saved = state.service.add_mysql_agreement(agreement).await.map_err(internal)?;
    Ok((StatusCode::CREATED, Json(saved)).into_response())
}

/// PUT /agreements/mysql/database/{id}
pub async fn update_mysql_agreement(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Body,
) -> ApiResult<Json<MySqlAgreement>> {
    ensure_writable(&state)?;
    let id = parse_object_id(&id)?;
    let agreement: MySqlAgreement = decode_json(body).await?;
    if agreement.id != id {
        return Err(ApiError::bad_request("Object ID does not correspond"));
    }
    check_mysql(&agreement)?;

    let saved = state
        .service
        .update_mysql_agreement(agreement)
        .await
        .map_err(error_ladder(MYSQL_NOT_FOUND, StatusCode::INTERNAL_SERVER_ERROR))?;
    Ok(Json(saved))
}

/// GET /agreements/mysql/database
pub async fn get_mysql_agreements(State(state): State<AppState>) -> ApiResult<Json<Value>> {
    let agreements = state.service.get_mysql_agreements().await.map_err(internal)?;
    Ok(Json(json!({ "agreements": agreements })))
}

/// DELETE /agreements/mysql/database/{id}
pub async fn delete_mysql_agreement(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Response> {
    ensure_writable(&state)?;
    let id = parse_object_id(&id)?;

    state
        .service
        .delete_mysql_agreement(id)
        .await
        .map_err(error_ladder(MYSQL_NOT_FOUND, StatusCode::INTERNAL_SERVER_ERROR))?;
    Ok(no_content())
}
