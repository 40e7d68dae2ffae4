//! Maps `dfs_core::Error` onto the HTTP status codes named in spec §7.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use dfs_core::Error;
use dfs_core::wire::ErrorResponse;

pub struct ApiError(pub Error);

impl From<Error> for ApiError {
    fn from(e: Error) -> Self {
        ApiError(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match &self.0 {
            Error::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            Error::FileNotFound(f) => (StatusCode::NOT_FOUND, format!("file_not_found: {f}")),
            Error::MissingChunk(c) => (StatusCode::NOT_FOUND, format!("missing_chunk: {c}")),
            Error::NoDatanodesAvailable => {
                (StatusCode::SERVICE_UNAVAILABLE, "no_datanodes_available".to_string())
            }
            Error::CorruptedChunk(c) => {
                (StatusCode::INTERNAL_SERVER_ERROR, format!("corrupted_chunk: {c}"))
            }
            Error::TargetFailed(msg) => (StatusCode::INTERNAL_SERVER_ERROR, format!("target_failed: {msg}")),
            Error::ChecksumMismatch(c) => {
                (StatusCode::INTERNAL_SERVER_ERROR, format!("checksum_mismatch: {c}"))
            }
            Error::NoSource(c) => (StatusCode::NOT_FOUND, format!("no_source: {c}")),
            Error::TransientNetwork(host, msg) => {
                (StatusCode::INTERNAL_SERVER_ERROR, format!("transient_network to {host}: {msg}"))
            }
            Error::Io(e) => (StatusCode::INTERNAL_SERVER_ERROR, format!("io_error: {e}")),
            Error::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg.clone()),
        };
        (status, Json(ErrorResponse::new(body))).into_response()
    }
}
