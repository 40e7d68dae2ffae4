//! Coordinator HTTP surface (§6) — one handler per endpoint, each a thin
//! shim over `dfs_services::coordinator::CoordinatorService`.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::{ConnectInfo, Query, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;

use dfs_core::wire::{
    DeleteFileRequest, DownloadMetadataRequest, GetChunkMapResponse, GetChunksForDnResponse,
    HeartbeatRequest, ListFilesResponse, RegisterChunkRequest, ReplicationSuccessRequest,
    RequestRecoveryRequest, StatusResponse, UploadMetadataRequest, UploadMetadataResponse,
    VerifyFileResponse,
};
use dfs_services::coordinator::CoordinatorService;

use crate::error::ApiError;

pub type CoordinatorState = Arc<CoordinatorService>;

pub fn router(state: CoordinatorState) -> Router {
    Router::new()
        .route("/heartbeat", post(heartbeat))
        .route("/upload_metadata", post(upload_metadata))
        .route("/register_chunk", post(register_chunk))
        .route("/get_chunk_map", get(get_chunk_map))
        .route("/download_metadata", post(download_metadata))
        .route("/list_files", get(list_files))
        .route("/delete_file", post(delete_file))
        .route("/verify_file", get(verify_file))
        .route("/get_chunks_for_dn", get(get_chunks_for_dn))
        .route("/replication_success", post(replication_success))
        .route("/request_recovery", post(request_recovery))
        .with_state(state)
}

async fn heartbeat(
    State(state): State<CoordinatorState>,
    Json(req): Json<HeartbeatRequest>,
) -> Result<Json<StatusResponse>, ApiError> {
    Ok(Json(state.heartbeat(&req.dn_id, &req.host).await?))
}

async fn upload_metadata(
    State(state): State<CoordinatorState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    Json(req): Json<UploadMetadataRequest>,
) -> Result<Json<UploadMetadataResponse>, ApiError> {
    let client_ip = addr.ip().to_string();
    Ok(Json(
        state
            .upload_plan(&req.filename, req.num_chunks, &req.checksums, Some(&client_ip))
            .await?,
    ))
}

async fn register_chunk(
    State(state): State<CoordinatorState>,
    Json(req): Json<RegisterChunkRequest>,
) -> Result<Json<StatusResponse>, ApiError> {
    Ok(Json(state.register_chunk(&req.filename, &req.chunk_id, &req.dn_id).await?))
}

#[derive(Deserialize)]
struct FilenameQuery {
    filename: String,
}

async fn get_chunk_map(
    State(state): State<CoordinatorState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    Query(q): Query<FilenameQuery>,
) -> Result<Json<GetChunkMapResponse>, ApiError> {
    let client_ip = addr.ip().to_string();
    Ok(Json(state.get_chunk_map(&q.filename, Some(&client_ip))?))
}

async fn download_metadata(
    State(state): State<CoordinatorState>,
    Json(req): Json<DownloadMetadataRequest>,
) -> Result<Json<dfs_core::wire::DownloadMetadataResponse>, ApiError> {
    Ok(Json(state.download_metadata(&req.filename)?))
}

async fn list_files(State(state): State<CoordinatorState>) -> Json<ListFilesResponse> {
    Json(state.list_files())
}

async fn delete_file(
    State(state): State<CoordinatorState>,
    Json(req): Json<DeleteFileRequest>,
) -> Result<Json<dfs_core::wire::DeleteFileResponse>, ApiError> {
    Ok(Json(state.delete_file(&req.filename).await?))
}

async fn verify_file(
    State(state): State<CoordinatorState>,
    Query(q): Query<FilenameQuery>,
) -> Result<Json<VerifyFileResponse>, ApiError> {
    Ok(Json(state.verify_file(&q.filename).await?))
}

#[derive(Deserialize)]
struct DnIdQuery {
    dn_id: String,
}

async fn get_chunks_for_dn(
    State(state): State<CoordinatorState>,
    Query(q): Query<DnIdQuery>,
) -> Json<GetChunksForDnResponse> {
    Json(state.chunks_for_dn(&q.dn_id))
}

async fn replication_success(
    State(state): State<CoordinatorState>,
    Json(req): Json<ReplicationSuccessRequest>,
) -> Json<StatusResponse> {
    state.note_replication_success(&req.chunk_id, &req.from_dn, &req.to_dn);
    Json(StatusResponse::ok())
}

async fn request_recovery(
    State(state): State<CoordinatorState>,
    Json(req): Json<RequestRecoveryRequest>,
) -> Result<Json<StatusResponse>, ApiError> {
    Ok(Json(state.request_recovery(&req.chunk_id, &req.dn_id).await?))
}
