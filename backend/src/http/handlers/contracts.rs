//! License contracts for Oracle, SQL Server and MySQL databases.

use axum::{
    body::Body,
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Extension, Json,
};
use serde_json::json;

use super::{error_ladder, internal, no_content, null_ok, unprocessable};
use crate::auth::CurrentUser;
use crate::http::error::{ApiError, ApiResult};
use crate::http::negotiate::respond_negotiated;
use crate::http::params::{decode_json, ensure_writable, parse_object_id, read_body_text, QueryParams};
use crate::http::state::AppState;
use crate::model::{
    MySqlContract, OracleDatabaseContract, OracleDatabaseContractFe, SqlServerDatabaseContract,
};
use crate::service::ErrorKind;

const NIL_ID_REQUIRED: &str = "ID must be empty to add a new AssociatedLicenseType";

const SAVE_ERRORS: &[(ErrorKind, StatusCode)] = &[
    (ErrorKind::ContractNotFound, StatusCode::UNPROCESSABLE_ENTITY),
    (ErrorKind::LicenseTypeIdNotFound, StatusCode::UNPROCESSABLE_ENTITY),
];

const CONTRACT_NOT_FOUND: &[(ErrorKind, StatusCode)] =
    &[(ErrorKind::ContractNotFound, StatusCode::NOT_FOUND)];

const MYSQL_NOT_FOUND: &[(ErrorKind, StatusCode)] = &[(ErrorKind::NotFound, StatusCode::NOT_FOUND)];

// =============================================================================
// Oracle/Database
// =============================================================================

fn check_oracle(contract: &OracleDatabaseContract) -> ApiResult<()> {
    contract
        .check()
        .map_err(|err| ApiError::bad_request(err.to_string()))
}

/// POST /contracts/oracle/database
pub async fn add_oracle_database_contract(
    State(state): State<AppState>,
    body: Body,
) -> ApiResult<Json<OracleDatabaseContractFe>> {
    ensure_writable(&state)?;
    let contract: OracleDatabaseContract = decode_json(body).await?;
    if !contract.id.is_nil() {
        return Err(ApiError::bad_request(NIL_ID_REQUIRED));
    }
    check_oracle(&contract)?;

    let saved = state
        .service
        .add_oracle_database_contract(contract)
        .await
        .map_err(error_ladder(SAVE_ERRORS, StatusCode::INTERNAL_SERVER_ERROR))?;
    Ok(Json(saved))
}

/// PUT /contracts/oracle/database
pub async fn update_oracle_database_contract(
    State(state): State<AppState>,
    body: Body,
) -> ApiResult<Json<OracleDatabaseContractFe>> {
    ensure_writable(&state)?;
    let contract: OracleDatabaseContract = decode_json(body).await?;
    check_oracle(&contract)?;

    let saved = state
        .service
        .update_oracle_database_contract(contract)
        .await
        .map_err(error_ladder(SAVE_ERRORS, StatusCode::INTERNAL_SERVER_ERROR))?;
    Ok(Json(saved))
}

/// GET /contracts/oracle/database
pub async fn get_oracle_database_contracts(
    State(state): State<AppState>,
    headers: HeaderMap,
    params: QueryParams,
) -> ApiResult<Response> {
    let filter = params.contracts_filter()?;

    respond_negotiated(
        &headers,
        "oracle_database_contracts.xlsx",
        async {
            let contracts = state
                .service
                .get_oracle_database_contracts(&filter)
                .await
                .map_err(internal)?;
            Ok::<_, ApiError>(Json(json!({ "contracts": contracts })).into_response())
        },
        async {
            state
                .service
                .get_oracle_database_contracts_as_xlsx(&filter)
                .await
                .map_err(internal)
        },
    )
    .await
}

/// DELETE /contracts/oracle/database/{id}
pub async fn delete_oracle_database_contract(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Response> {
    ensure_writable(&state)?;
    let id = parse_object_id(&id)?;

    state
        .service
        .delete_oracle_database_contract(id)
        .await
        .map_err(error_ladder(CONTRACT_NOT_FOUND, StatusCode::INTERNAL_SERVER_ERROR))?;
    Ok(null_ok())
}

/// POST /contracts/oracle/database/{id}/hosts
///
/// The body is the bare hostname.
pub async fn add_host_to_oracle_database_contract(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Body,
) -> ApiResult<Response> {
    ensure_writable(&state)?;
    let id = parse_object_id(&id)?;
    let hostname = read_body_text(body).await?;

    state
        .service
        .add_host_to_oracle_database_contract(id, &hostname)
        .await
        .map_err(error_ladder(
            &[
                (ErrorKind::ContractNotFound, StatusCode::NOT_FOUND),
                (ErrorKind::NotInClusterHostNotFound, StatusCode::NOT_FOUND),
            ],
            StatusCode::INTERNAL_SERVER_ERROR,
        ))?;
    Ok(null_ok())
}

/// DELETE /contracts/oracle/database/{id}/hosts/{hostname}
pub async fn delete_host_from_oracle_database_contract(
    State(state): State<AppState>,
    Path((id, hostname)): Path<(String, String)>,
) -> ApiResult<Response> {
    ensure_writable(&state)?;
    let id = parse_object_id(&id)?;

    state
        .service
        .delete_host_from_oracle_database_contract(id, &hostname)
        .await
        .map_err(error_ladder(
            &[
                (ErrorKind::ContractNotFound, StatusCode::NOT_FOUND),
                (ErrorKind::NotFound, StatusCode::NOT_FOUND),
            ],
            StatusCode::INTERNAL_SERVER_ERROR,
        ))?;
    Ok(null_ok())
}

// =============================================================================
// Microsoft/SQL Server
// =============================================================================

/// POST /contracts/microsoft/database
pub async fn add_sql_server_database_contract(
    State(state): State<AppState>,
    body: Body,
) -> ApiResult<Json<SqlServerDatabaseContract>> {
    ensure_writable(&state)?;
    let contract: SqlServerDatabaseContract = decode_json(body).await?;
    if !contract.id.is_nil() {
        return Err(ApiError::bad_request(NIL_ID_REQUIRED));
    }

    let saved = state
        .service
        .add_sql_server_database_contract(contract)
        .await
        .map_err(error_ladder(SAVE_ERRORS, StatusCode::INTERNAL_SERVER_ERROR))?;
    Ok(Json(saved))
}

/// PUT /contracts/microsoft/database
pub async fn update_sql_server_database_contract(
    State(state): State<AppState>,
    body: Body,
) -> ApiResult<Json<SqlServerDatabaseContract>> {
    ensure_writable(&state)?;
    let contract: SqlServerDatabaseContract = decode_json(body).await?;

    let saved = state
        .service
        .update_sql_server_database_contract(contract)
        .await
        .map_err(error_ladder(SAVE_ERRORS, StatusCode::INTERNAL_SERVER_ERROR))?;
    Ok(Json(saved))
}

/// GET /contracts/microsoft/database
pub async fn get_sql_server_database_contracts(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> ApiResult<Response> {
    respond_negotiated(
        &headers,
        "sqlserver_database_contracts.xlsx",
        async {
            let contracts = state
                .service
                .get_sql_server_database_contracts()
                .await
                .map_err(internal)?;
            Ok::<_, ApiError>(Json(json!({ "contracts": contracts })).into_response())
        },
        async {
            state
                .service
                .get_sql_server_database_contracts_as_xlsx()
                .await
                .map_err(internal)
        },
    )
    .await
}

/// DELETE /contracts/microsoft/database/{id}
pub async fn delete_sql_server_database_contract(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Response> {
    ensure_writable(&state)?;
    let id = parse_object_id(&id)?;

    state
        .service
        .delete_sql_server_database_contract(id)
        .await
        .map_err(error_ladder(CONTRACT_NOT_FOUND, StatusCode::INTERNAL_SERVER_ERROR))?;
    Ok(null_ok())
}

// =============================================================================
// MySQL
// =============================================================================

fn check_mysql(contract: &MySqlContract) -> ApiResult<()> {
    if !contract.is_valid() {
        return Err(ApiError::bad_request("Contract isn't valid"));
    }
    Ok(())
}

/// POST /contracts/mysql/database
pub async fn add_mysql_contract(State(state): State<AppState>, body: Body) -> ApiResult<Response> {
    ensure_writable(&state)?;
    let contract: MySqlContract = decode_json(body).await?;
    if !contract.id.is_nil() {
        return Err(ApiError::bad_request("ID must be empty"));
    }
    check_mysql(&contract)?;

    let saved = state.service.add_mysql_contract(contract).await.map_err(internal)?;
    Ok((StatusCode::CREATED, Json(saved)).into_response())
}

/// PUT /contracts/mysql/database/{id}
pub async fn update_mysql_contract(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Body,
) -> ApiResult<Json<MySqlContract>> {
    ensure_writable(&state)?;
    let id = parse_object_id(&id)?;
    let contract: MySqlContract = decode_json(body).await?;
    if contract.id != id {
        return Err(ApiError::bad_request("Object ID does not correspond"));
    }
    check_mysql(&contract)?;

    let saved = state
        .service
        .update_mysql_contract(contract)
        .await
        .map_err(error_ladder(MYSQL_NOT_FOUND, StatusCode::INTERNAL_SERVER_ERROR))?;
    Ok(Json(saved))
}

/// GET /contracts/mysql/database
///
/// Only contracts in the locations visible to the caller.
pub async fn get_mysql_contracts(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    headers: HeaderMap,
) -> ApiResult<Response> {
    let locations = state
        .service
        .list_user_locations(&user.0)
        .await
        .map_err(unprocessable)?;

    respond_negotiated(
        &headers,
        "mysql_contracts.xlsx",
        async {
            let contracts = state.service.get_mysql_contracts(&locations).await.map_err(internal)?;
            Ok::<_, ApiError>(Json(json!({ "contracts": contracts })).into_response())
        },
        async {
            state
                .service
                .get_mysql_contracts_as_xlsx(&locations)
                .await
                .map_err(internal)
        },
    )
    .await
}

/// DELETE /contracts/mysql/database/{id}
pub async fn delete_mysql_contract(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Response> {
    ensure_writable(&state)?;
    let id = parse_object_id(&id)?;

    state
        .service
        .delete_mysql_contract(id)
        .await
        .map_err(error_ladder(MYSQL_NOT_FOUND, StatusCode::INTERNAL_SERVER_ERROR))?;
    Ok(no_content())
}
