//! Query, path and body parsing shared by the handlers.
//!
//! Query values go through typed-with-default conversions: an empty value
//! yields the default, anything unparsable is a 422 whose `message` names
//! the conversion that failed.

use std::collections::HashMap;

use axum::{
    body::{Body, Bytes},
    extract::{FromRequestParts, Query},
    http::{request::Parts, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Months, Utc};
use http_body_util::{BodyExt, LengthLimitError, Limited};
use serde::de::DeserializeOwned;
use serde_json::Value;

use super::error::{ApiError, ApiResult};
use super::state::AppState;
use crate::model::filter::{max_time, UNSET};
use crate::model::{
    AdvisorFilter, AlertsFilter, CountRange, GlobalFilter, ObjectId, OracleDatabaseAgreementsFilter,
    OracleDatabaseContractsFilter, SearchFilter,
};

/// Default trailing window of the advisor searches, in months.
pub const DEFAULT_WINDOW_TIME: i32 = 6;

/// A query value that could not be converted.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{class}: {detail}")]
pub struct ParamError {
    pub class: &'static str,
    pub detail: String,
}

impl From<ParamError> for ApiError {
    fn from(err: ParamError) -> Self {
        ApiError::unprocessable(err.detail).with_message(err.class)
    }
}

/// Parse a boolean; accepts the usual spellings of true and false.
pub fn str2bool(raw: &str, default: bool) -> Result<bool, ParamError> {
    match raw {
        "" => Ok(default),
        "1" | "t" | "T" | "TRUE" | "true" | "True" => Ok(true),
        "0" | "f" | "F" | "FALSE" | "false" | "False" => Ok(false),
        other => Err(ParamError {
            class: "Unable to parse string to bool",
            detail: format!("parsing {:?}: invalid syntax", other),
        }),
    }
}

pub fn str2int(raw: &str, default: i32) -> Result<i32, ParamError> {
    if raw.is_empty() {
        return Ok(default);
    }
    raw.parse::<i32>().map_err(|err| ParamError {
        class: "Unable to parse string to int",
        detail: match err.kind() {
            std::num::IntErrorKind::PosOverflow | std::num::IntErrorKind::NegOverflow => {
                format!("parsing {:?}: value out of range", raw)
            }
            _ => format!("parsing {:?}: invalid syntax", raw),
        },
    })
}

/// Parse an RFC 3339 timestamp.
pub fn str2time(raw: &str, default: DateTime<Utc>) -> Result<DateTime<Utc>, ParamError> {
    if raw.is_empty() {
        return Ok(default);
    }
    DateTime::parse_from_rfc3339(raw)
        .map(|time| time.with_timezone(&Utc))
        .map_err(|err| ParamError {
            class: "Unable to parse string to time",
            detail: format!("parsing time {:?}: {}", raw, err),
        })
}

/// Raw query string values, keyed by parameter name.
#[derive(Debug, Clone, Default)]
pub struct QueryParams(HashMap<String, String>);

impl<S: Send + Sync> FromRequestParts<S> for QueryParams {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(params) = Query::<HashMap<String, String>>::from_request_parts(parts, state)
            .await
            .map_err(|err| ApiError::bad_request(err.body_text()))?;
        Ok(Self(params))
    }
}

impl<const N: usize> From<[(&str, &str); N]> for QueryParams {
    fn from(pairs: [(&str, &str); N]) -> Self {
        Self(
            pairs
                .into_iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }
}

impl QueryParams {
    /// The value of `key`, or the empty string.
    pub fn str(&self, key: &str) -> &str {
        self.0.get(key).map(String::as_str).unwrap_or_default()
    }

    pub fn bool(&self, key: &str, default: bool) -> Result<bool, ParamError> {
        str2bool(self.str(key), default)
    }

    pub fn int(&self, key: &str, default: i32) -> Result<i32, ParamError> {
        str2int(self.str(key), default)
    }

    pub fn time(&self, key: &str, default: DateTime<Utc>) -> Result<DateTime<Utc>, ParamError> {
        str2time(self.str(key), default)
    }

    /// Tri-state flag: `true`, `false`, or unset (empty or `NULL`).
    pub fn tri_state(&self, key: &str) -> ApiResult<Option<bool>> {
        match self.str(key) {
            "true" => Ok(Some(true)),
            "false" => Ok(Some(false)),
            "" | "NULL" => Ok(None),
            _ => Err(ApiError::unprocessable(format!("Invalid value for {}", key))),
        }
    }

    fn range(&self, prefix: &str) -> Result<CountRange, ParamError> {
        Ok(CountRange {
            lte: self.int(&format!("{}-lte", prefix), UNSET)?,
            gte: self.int(&format!("{}-gte", prefix), UNSET)?,
        })
    }

    /// `location`, `environment` and `older-than`.
    pub fn global_filter(&self) -> ApiResult<GlobalFilter> {
        Ok(GlobalFilter {
            location: self.str("location").to_string(),
            environment: self.str("environment").to_string(),
            older_than: self.time("older-than", max_time())?,
        })
    }

    /// Search, sort and pagination parameters plus the global filter.
    pub fn search_filter(&self) -> ApiResult<SearchFilter> {
        Ok(SearchFilter {
            search: self.str("search").to_string(),
            sort_by: self.str("sort-by").to_string(),
            sort_desc: self.bool("sort-desc", false)?,
            page: self.int("page", UNSET)?,
            size: self.int("size", UNSET)?,
            global: self.global_filter()?,
        })
    }

    /// Search filter plus the `window-time` cutoff (months before `now`).
    pub fn advisor_filter(&self, now: DateTime<Utc>) -> ApiResult<AdvisorFilter> {
        let search = self.search_filter()?;
        Ok(AdvisorFilter {
            search,
            window_start: self.window_start(now)?,
            status: self.str("status").to_string(),
        })
    }

    pub fn window_start(&self, now: DateTime<Utc>) -> ApiResult<DateTime<Utc>> {
        let months = self.int("window-time", DEFAULT_WINDOW_TIME)?;
        let months = u32::try_from(months)
            .map_err(|_| ApiError::unprocessable("Invalid value for window-time"))?;
        Ok(now.checked_sub_months(Months::new(months)).unwrap_or(DateTime::<Utc>::MIN_UTC))
    }

    pub fn agreements_filter(&self) -> ApiResult<OracleDatabaseAgreementsFilter> {
        Ok(OracleDatabaseAgreementsFilter {
            agreement_id: self.str("agreement-id").to_string(),
            license_type_id: self.str("license-type-id").to_string(),
            item_description: self.str("item-description").to_string(),
            csi: self.str("csi").to_string(),
            metric: self.str("metrics").to_string(),
            reference_number: self.str("reference-number").to_string(),
            unlimited: self.tri_state("unlimited")?,
            catch_all: self.tri_state("catch-all")?,
            licenses_per_core: self.range("licenses-per-core")?,
            licenses_per_user: self.range("licenses-per-user")?,
            available_licenses_per_core: self.range("available-licenses-per-core")?,
            available_licenses_per_user: self.range("available-licenses-per-user")?,
        })
    }

    pub fn contracts_filter(&self) -> ApiResult<OracleDatabaseContractsFilter> {
        Ok(OracleDatabaseContractsFilter {
            contract_id: self.str("contract-id").to_string(),
            license_type_id: self.str("license-type-id").to_string(),
            item_description: self.str("item-description").to_string(),
            csi: self.str("csi").to_string(),
            metric: self.str("metric").to_string(),
            reference_number: self.str("reference-number").to_string(),
            unlimited: self.tri_state("unlimited")?,
            basket: self.tri_state("basket")?,
            licenses_per_core: self.range("licenses-per-core")?,
            licenses_per_user: self.range("licenses-per-user")?,
            available_licenses_per_core: self.range("available-licenses-per-core")?,
            available_licenses_per_user: self.range("available-licenses-per-user")?,
        })
    }

    pub fn alerts_filter(&self) -> ApiResult<AlertsFilter> {
        Ok(AlertsFilter {
            search: self.search_filter()?,
            category: self.str("category").to_string(),
            severity: self.str("severity").to_string(),
            status: self.str("status").to_string(),
            from: self.time("from", DateTime::<Utc>::MIN_UTC)?,
            to: self.time("to", max_time())?,
        })
    }
}

/// Parse an object id taken from a path segment.
pub fn parse_object_id(raw: &str) -> ApiResult<ObjectId> {
    ObjectId::parse_str(raw).map_err(|err| ApiError::unprocessable(err.to_string()))
}

/// Largest JSON or text body a handler will buffer.
pub const MAX_BODY_BYTES: usize = 2 * 1024 * 1024;

/// Read the whole request body, refusing anything over [`MAX_BODY_BYTES`].
pub async fn read_body(body: Body) -> ApiResult<Bytes> {
    match Limited::new(body, MAX_BODY_BYTES).collect().await {
        Ok(collected) => Ok(collected.to_bytes()),
        Err(err) if err.is::<LengthLimitError>() => {
            Err(ApiError::new(StatusCode::PAYLOAD_TOO_LARGE, err.to_string()))
        }
        Err(err) => Err(ApiError::bad_request(err.to_string())),
    }
}

/// Read the request body as text, used by endpoints taking a bare value.
pub async fn read_body_text(body: Body) -> ApiResult<String> {
    let bytes = read_body(body).await?;
    String::from_utf8(bytes.to_vec()).map_err(|err| ApiError::bad_request(err.to_string()))
}

/// Render a serde_json error the way clients expect it.
fn json_error_text(err: &serde_json::Error) -> String {
    let text = err.to_string();
    if let Some(rest) = text.strip_prefix("unknown field `") {
        if let Some((field, _)) = rest.split_once('`') {
            return format!("json: unknown field \"{}\"", field);
        }
    }
    format!("json: {}", text)
}

/// Decode a JSON body, rejecting fields the target type does not declare.
pub async fn decode_json<T: DeserializeOwned>(body: Body) -> ApiResult<T> {
    let bytes = read_body(body).await?;
    serde_json::from_slice(&bytes).map_err(|err| ApiError::bad_request(json_error_text(&err)))
}

/// Refuse mutations when the API is read-only. Runs before the body is read.
pub fn ensure_writable(state: &AppState) -> ApiResult<()> {
    if state.read_only() {
        return Err(ApiError::read_only());
    }
    Ok(())
}

/// The whole collection when unpaged, otherwise the page the service built.
pub fn page_response(filter: &SearchFilter, mut rows: Vec<Value>) -> ApiResult<Response> {
    if !filter.is_paged() {
        return Ok(Json(rows).into_response());
    }
    if rows.is_empty() {
        return Err(ApiError::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            "the service returned no page",
        ));
    }
    Ok(Json(rows.swap_remove(0)).into_response())
}
