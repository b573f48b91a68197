//! Response shaping.
//!
//! Every failure goes through one mapper so status codes and JSON
//! shape stay consistent across endpoints, and no upstream error
//! detail ever reaches the caller.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use propass_engine::EntitlementError;
use serde_json::json;

/// Maps an engine fault to its HTTP response.
pub fn failure(err: &EntitlementError) -> Response {
    let status =
        StatusCode::from_u16(err.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    let mut body = json!({
        "success": false,
        "message": err.to_string(),
    });
    if let EntitlementError::SubscriptionNotActive { status } = err {
        body["details"] = json!({ "status": status.label() });
    }
    (status, Json(body)).into_response()
}

/// Maps a revalidation fault: same mapping, plus the downgrade flag
/// the client needs to make an access decision without re-deriving
/// error semantics.
pub fn revalidation_failure(err: &EntitlementError) -> Response {
    let status =
        StatusCode::from_u16(err.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    let body = json!({
        "success": false,
        "active": false,
        "shouldDowngrade": err.should_downgrade(),
        "message": err.to_string(),
    });
    (status, Json(body)).into_response()
}
