//! Storage node HTTP surface (§6) — one handler per endpoint, each a thin
//! shim over `dfs_services::node::NodeService`.

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;

use dfs_core::wire::{
    DeleteChunkRequest, GetChunkResponse, ReplicateChunkRequest, StatusResponse,
    StoreChunkRequest, StoreChunkResponse, VerifyChunkResponse,
};
use dfs_services::node::NodeService;

use crate::error::ApiError;

pub type NodeState = Arc<NodeService>;

pub fn router(state: NodeState) -> Router {
    Router::new()
        .route("/store_chunk", post(store_chunk))
        .route("/get_chunk", get(get_chunk))
        .route("/replicate_chunk", post(replicate_chunk))
        .route("/delete_chunk", post(delete_chunk))
        .route("/verify_chunk", get(verify_chunk))
        .with_state(state)
}

async fn store_chunk(
    State(node): State<NodeState>,
    Json(req): Json<StoreChunkRequest>,
) -> Result<Json<StoreChunkResponse>, ApiError> {
    Ok(Json(node.store_chunk(&req.chunk_id, req.filename.as_deref(), &req.data).await?))
}

#[derive(Deserialize)]
struct ChunkIdQuery {
    chunk_id: String,
}

async fn get_chunk(
    State(node): State<NodeState>,
    Query(q): Query<ChunkIdQuery>,
) -> Result<Json<GetChunkResponse>, ApiError> {
    let (data, sha256) = node.get_chunk(&q.chunk_id)?;
    Ok(Json(GetChunkResponse { data, sha256 }))
}

async fn replicate_chunk(
    State(node): State<NodeState>,
    Json(req): Json<ReplicateChunkRequest>,
) -> Result<Json<StatusResponse>, ApiError> {
    Ok(Json(node.replicate_chunk(&req.chunk_id, &req.target_host).await?))
}

async fn delete_chunk(
    State(node): State<NodeState>,
    Json(req): Json<DeleteChunkRequest>,
) -> Result<Json<StatusResponse>, ApiError> {
    let existed = node.delete_chunk(&req.chunk_id)?;
    if !existed {
        return Err(ApiError(dfs_core::Error::MissingChunk(req.chunk_id)));
    }
    Ok(Json(StatusResponse::new("deleted")))
}

async fn verify_chunk(
    State(node): State<NodeState>,
    Query(q): Query<ChunkIdQuery>,
) -> Result<Response, ApiError> {
    use dfs_services::node::store::VerifyStatus;

    let status = node.verify_chunk(&q.chunk_id).map_err(dfs_core::Error::Io)?;
    let body = VerifyChunkResponse { status: status.as_str().to_string() };
    match status {
        VerifyStatus::Missing => Err(ApiError(dfs_core::Error::MissingChunk(q.chunk_id))),
        // Corruption is a server-side integrity failure, not a successful
        // check — reported as 500 with the status body intact.
        VerifyStatus::Corrupted => Ok((StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()),
        VerifyStatus::Valid | VerifyStatus::Unknown => Ok(Json(body).into_response()),
    }
}
