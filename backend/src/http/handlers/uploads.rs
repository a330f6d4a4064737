//! Contract CSV upload and sample download.

use axum::{
    extract::{FromRequest, Multipart, Path, Request, State},
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use tokio::sync::oneshot;
use tracing::{debug, info};

use super::{error_ladder, no_content};
use crate::export::{csv, CSV_CONTENT_TYPE};
use crate::http::error::{ApiError, ApiResult};
use crate::http::params::ensure_writable;
use crate::http::state::AppState;
use crate::model::DatabaseType;
use crate::service::ErrorKind;

/// Multipart field carrying the CSV file.
pub const UPLOAD_FIELD: &str = "file";

const IMPORT_REJECTED: &[(ErrorKind, StatusCode)] = &[
    (ErrorKind::Validation, StatusCode::UNPROCESSABLE_ENTITY),
    (ErrorKind::LicenseTypeIdNotFound, StatusCode::UNPROCESSABLE_ENTITY),
];

fn database_type(raw: &str) -> ApiResult<DatabaseType> {
    raw.parse()
        .map_err(|err: crate::model::ValidationError| ApiError::bad_request(err.to_string()))
}

/// Pull the bytes of the `file` field out of the form.
async fn read_upload(mut multipart: Multipart) -> ApiResult<Vec<u8>> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|err| ApiError::bad_request(err.body_text()))?
    {
        if field.name() == Some(UPLOAD_FIELD) {
            let bytes = field
                .bytes()
                .await
                .map_err(|err| ApiError::bad_request(err.body_text()))?;
            return Ok(bytes.to_vec());
        }
    }
    Err(ApiError::bad_request(format!(
        "Missing form field \"{}\"",
        UPLOAD_FIELD
    )))
}

/// POST /contracts/{databaseType}/upload
///
/// The CSV is decoded on a worker task; the request stays open until the
/// worker reports back.
pub async fn upload_contracts(
    State(state): State<AppState>,
    Path(raw_type): Path<String>,
    request: Request,
) -> ApiResult<Response> {
    ensure_writable(&state)?;
    let db_type = database_type(&raw_type)?;

    let multipart = Multipart::from_request(request, &state)
        .await
        .map_err(|err| ApiError::bad_request(err.body_text()))?;
    let content = read_upload(multipart).await?;

    let (tx, rx) = oneshot::channel();
    tokio::spawn(async move {
        let parsed = csv::parse_contracts(db_type, &content);
        // The receiver only goes away if the request was dropped.
        let _ = tx.send(parsed);
    });

    let contracts = rx
        .await
        .map_err(|err| ApiError::internal(err.to_string()))?
        .map_err(|err| ApiError::bad_request(err.to_string()))?;
    debug!(db_type = db_type.as_str(), rows = contracts.len(), "Decoded contracts upload");

    let imported = state
        .service
        .import_contracts(contracts)
        .await
        .map_err(error_ladder(IMPORT_REJECTED, StatusCode::INTERNAL_SERVER_ERROR))?;
    info!(db_type = db_type.as_str(), imported, "Imported contracts");
    Ok(no_content())
}

/// GET /contracts/{databaseType}/sample
pub async fn get_contracts_sample(Path(raw_type): Path<String>) -> ApiResult<Response> {
    let db_type = database_type(&raw_type)?;
    let sample = csv::contracts_sample(db_type).map_err(|err| ApiError::internal(err.to_string()))?;

    let disposition = format!("attachment; filename=sample_{}_contracts.csv", db_type.as_str());
    let disposition = HeaderValue::from_str(&disposition).map_err(|err| ApiError::internal(err.to_string()))?;
    Ok((
        [
            (header::CONTENT_TYPE, HeaderValue::from_static(CSV_CONTENT_TYPE)),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        sample,
    )
        .into_response())
}
