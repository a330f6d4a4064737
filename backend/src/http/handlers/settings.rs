//! License type catalog and frontend settings.

use std::collections::BTreeMap;

use axum::{
    body::Body,
    extract::{Path, State},
    http::StatusCode,
    response::Response,
    Json,
};

use super::{error_ladder, internal, null_ok};
use crate::http::error::{ApiError, ApiResult};
use crate::http::params::{decode_json, ensure_writable};
use crate::http::state::AppState;
use crate::model::{OracleDatabaseLicenseType, SqlServerDatabaseLicenseType};
use crate::service::ErrorKind;

const LICENSE_TYPE_NOT_FOUND: &[(ErrorKind, StatusCode)] =
    &[(ErrorKind::LicenseTypeIdNotFound, StatusCode::NOT_FOUND)];

/// GET /settings/oracle/database/license-types
pub async fn get_oracle_database_license_types(
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<OracleDatabaseLicenseType>>> {
    let license_types = state
        .service
        .get_oracle_database_license_types()
        .await
        .map_err(internal)?;
    Ok(Json(license_types))
}

/// POST /settings/oracle/database/license-types
///
/// The id is the vendor part number, chosen by the client.
pub async fn add_oracle_database_license_type(
    State(state): State<AppState>,
    body: Body,
) -> ApiResult<Json<OracleDatabaseLicenseType>> {
    ensure_writable(&state)?;
    let license_type: OracleDatabaseLicenseType = decode_json(body).await?;
    if license_type.id.trim().is_empty() {
        return Err(ApiError::bad_request("ID must not be empty"));
    }

    let saved = state
        .service
        .add_oracle_database_license_type(license_type)
        .await
        .map_err(error_ladder(
            &[(ErrorKind::Duplicated, StatusCode::BAD_REQUEST)],
            StatusCode::INTERNAL_SERVER_ERROR,
        ))?;
    Ok(Json(saved))
}

/// PUT /settings/oracle/database/license-types/{id}
pub async fn update_oracle_database_license_type(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Body,
) -> ApiResult<Json<OracleDatabaseLicenseType>> {
    ensure_writable(&state)?;
    let license_type: OracleDatabaseLicenseType = decode_json(body).await?;
    if license_type.id != id {
        return Err(ApiError::bad_request("Object ID does not correspond"));
    }

    let saved = state
        .service
        .update_oracle_database_license_type(license_type)
        .await
        .map_err(error_ladder(LICENSE_TYPE_NOT_FOUND, StatusCode::INTERNAL_SERVER_ERROR))?;
    Ok(Json(saved))
}

/// DELETE /settings/oracle/database/license-types/{id}
pub async fn delete_oracle_database_license_type(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Response> {
    ensure_writable(&state)?;
    state
        .service
        .delete_oracle_database_license_type(&id)
        .await
        .map_err(error_ladder(LICENSE_TYPE_NOT_FOUND, StatusCode::INTERNAL_SERVER_ERROR))?;
    Ok(null_ok())
}

/// GET /settings/microsoft/database/license-types
pub async fn get_sql_server_database_license_types(
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<SqlServerDatabaseLicenseType>>> {
    let license_types = state
        .service
        .get_sql_server_database_license_types()
        .await
        .map_err(internal)?;
    Ok(Json(license_types))
}

/// GET /settings/default-database-tag-choiches
pub async fn get_default_database_tag_choices(State(state): State<AppState>) -> Json<Vec<String>> {
    Json(state.config.api_service.default_database_tag_choices.clone())
}

/// GET /settings/features
pub async fn get_features(State(state): State<AppState>) -> Json<BTreeMap<String, bool>> {
    Json(state.config.features())
}
