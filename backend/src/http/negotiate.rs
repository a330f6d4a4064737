//! `Accept` header negotiation between JSON and spreadsheet responses.

use std::future::Future;

use axum::{
    http::{header, HeaderMap, HeaderValue},
    response::{IntoResponse, Response},
};
use mime::Mime;

use super::error::{ApiError, ApiResult};
use crate::export::XLSX_CONTENT_TYPE;

/// Response formats offered by the export endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Json,
    Xlsx,
}

impl Format {
    fn content_type(&self) -> &'static str {
        match self {
            Self::Json => "application/json",
            Self::Xlsx => XLSX_CONTENT_TYPE,
        }
    }
}

const OFFERS: [Format; 2] = [Format::Json, Format::Xlsx];

/// How well `range` matches `offer`: `None` for no match, otherwise a
/// specificity used to break ties between equal q-values.
fn specificity(range: &Mime, offer: &Mime) -> Option<u8> {
    if range.type_() == mime::STAR && range.subtype() == mime::STAR {
        return Some(0);
    }
    if range.type_() != offer.type_() {
        return None;
    }
    if range.subtype() == mime::STAR {
        return Some(1);
    }
    (range.subtype() == offer.subtype()).then_some(2)
}

fn quality(range: &Mime) -> f32 {
    range
        .get_param("q")
        .and_then(|q| q.as_str().parse::<f32>().ok())
        .unwrap_or(1.0)
}

/// Choose the best offered format for `accept`; JSON when nothing matches.
pub fn negotiate(accept: Option<&str>) -> Format {
    let Some(accept) = accept else {
        return Format::Json;
    };
    let ranges: Vec<Mime> = accept
        .split(',')
        .filter_map(|part| part.trim().parse::<Mime>().ok())
        .collect();

    let mut best = (Format::Json, 0.0_f32, 0_u8);
    for format in OFFERS {
        let Ok(offer) = format.content_type().parse::<Mime>() else {
            continue;
        };
        for range in &ranges {
            let Some(spec) = specificity(range, &offer) else {
                continue;
            };
            let q = quality(range);
            if q > best.1 || (q == best.1 && q > 0.0 && spec > best.2) {
                best = (format, q, spec);
            }
        }
    }
    best.0
}

pub fn negotiate_headers(headers: &HeaderMap) -> Format {
    negotiate(headers.get(header::ACCEPT).and_then(|v| v.to_str().ok()))
}

/// Run the JSON or the spreadsheet branch depending on the `Accept` header.
/// Only the chosen future is polled; a workbook is sent as `filename`.
pub async fn respond_negotiated<J, X>(
    headers: &HeaderMap,
    filename: &str,
    json: J,
    xlsx: X,
) -> ApiResult<Response>
where
    J: Future<Output = ApiResult<Response>>,
    X: Future<Output = ApiResult<Vec<u8>>>,
{
    match negotiate_headers(headers) {
        Format::Json => json.await,
        Format::Xlsx => xlsx_response(xlsx.await?, filename),
    }
}

/// Spreadsheet endpoints that accept nothing but the XLSX type.
pub fn require_xlsx(headers: &HeaderMap) -> ApiResult<()> {
    let accept = headers.get(header::ACCEPT).and_then(|v| v.to_str().ok());
    if accept != Some(XLSX_CONTENT_TYPE) {
        return Err(ApiError::bad_request("invalid Content-Type"));
    }
    Ok(())
}

pub fn xlsx_response(workbook: Vec<u8>, filename: &str) -> ApiResult<Response> {
    let disposition = HeaderValue::from_str(&format!("attachment; filename=\"{}\"", filename))
        .map_err(|err| ApiError::internal(err.to_string()))?;
    Ok((
        [
            (header::CONTENT_TYPE, HeaderValue::from_static(XLSX_CONTENT_TYPE)),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        workbook,
    )
        .into_response())
}
