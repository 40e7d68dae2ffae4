//! Wire types — one `serde`-derived struct per request/response body in the
//! coordinator and storage-node HTTP contracts. Shared by `dfs-api` (which
//! serves them) and `dfs-services` (which constructs/parses them when making
//! outbound calls between roles), so neither has to guess the other's shape.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Generic `{"error": "..."}` body used for every non-2xx response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self { error: error.into() }
    }
}

/// Generic `{"status": "..."}` body used by several simple acks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    pub status: String,
}

impl StatusResponse {
    pub fn ok() -> Self {
        Self { status: "ok".to_string() }
    }

    pub fn new(status: impl Into<String>) -> Self {
        Self { status: status.into() }
    }
}

// ── Coordinator: /heartbeat ──────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeartbeatRequest {
    pub dn_id: String,
    pub host: String,
}

// ── Coordinator: /upload_metadata ────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadMetadataRequest {
    pub filename: String,
    pub num_chunks: usize,
    #[serde(default)]
    pub checksums: HashMap<String, String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkPlanEntry {
    pub chunk_id: String,
    pub datanodes: Vec<String>,
    pub dn_hosts: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadMetadataResponse {
    pub chunks: Vec<ChunkPlanEntry>,
}

// ── Coordinator: /register_chunk ─────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterChunkRequest {
    pub filename: String,
    pub chunk_id: String,
    pub dn_id: String,
}

// ── Coordinator: /get_chunk_map ──────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkMapEntry {
    pub chunk_id: String,
    pub dn_hosts: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetChunkMapResponse {
    pub chunks: Vec<ChunkMapEntry>,
}

// ── Coordinator: /download_metadata ──────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DownloadMetadataRequest {
    pub filename: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DownloadMetadataResponse {
    pub filename: String,
    pub chunks_info: HashMap<String, Vec<String>>,
}

// ── Coordinator: /list_files ─────────────────────────────────────────────────

pub type ListFilesResponse = HashMap<String, HashMap<String, Vec<String>>>;

// ── Coordinator: /delete_file ────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteFileRequest {
    pub filename: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteFileResponse {
    pub status: String,
    pub filename: String,
}

// ── Coordinator: /verify_file ────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerifyFileResponse {
    pub filename: String,
    pub status: HashMap<String, Vec<bool>>,
}

// ── Coordinator: /get_chunks_for_dn ──────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetChunksForDnResponse {
    pub chunks: Vec<String>,
}

// ── Coordinator: /replication_success ────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReplicationSuccessRequest {
    pub chunk_id: String,
    pub from_dn: String,
    pub to_dn: String,
}

// ── Coordinator: /request_recovery ───────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestRecoveryRequest {
    pub chunk_id: String,
    pub dn_id: String,
}

// ── Storage node: /store_chunk ───────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreChunkRequest {
    pub chunk_id: String,
    #[serde(default)]
    pub filename: Option<String>,
    pub data: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreChunkResponse {
    pub status: String,
    pub sha256: String,
}

// ── Storage node: /get_chunk ─────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetChunkResponse {
    pub data: String,
    pub sha256: String,
}

// ── Storage node: /replicate_chunk ───────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReplicateChunkRequest {
    pub chunk_id: String,
    pub target_host: String,
}

// ── Storage node: /delete_chunk ──────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteChunkRequest {
    pub chunk_id: String,
}

// ── Storage node: /verify_chunk ──────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerifyChunkResponse {
    pub status: String,
}
