//! Route handlers.

pub mod analyze;
pub mod graph;
pub mod health;

use axum::http::StatusCode;

pub(crate) fn bad_request(msg: impl ToString) -> (StatusCode, String) {
    (StatusCode::BAD_REQUEST, msg.to_string())
}

pub(crate) fn internal(e: anyhow::Error) -> (StatusCode, String) {
    tracing::error!(error = %e, "Request failed");
    (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
}
