//! The storage node's transport-independent operation surface (§4.4),
//! plus the outbound calls it makes to the coordinator and to peer nodes.

use std::time::Duration;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use dfs_core::config::NodeConfig;
use dfs_core::wire::{
    HeartbeatRequest, RegisterChunkRequest, ReplicationSuccessRequest, StatusResponse,
    StoreChunkResponse,
};
use dfs_core::{Error, Result};
use tracing::{info, warn};

use crate::http_client::post_json;
use crate::node::store::{ChunkStore, VerifyStatus};

pub struct NodeService {
    pub config: NodeConfig,
    pub store: ChunkStore,
    client: reqwest::Client,
}

impl NodeService {
    pub fn new(config: NodeConfig) -> std::io::Result<Self> {
        let store = ChunkStore::new(&config.data_dir)?;
        Ok(Self { config, store, client: reqwest::Client::new() })
    }

    /// `StoreChunk` — decode, write bytes+side-car, then best-effort notify
    /// the coordinator. Registration failure does not fail the store.
    pub async fn store_chunk(
        &self,
        chunk_id: &str,
        filename: Option<&str>,
        data_b64: &str,
    ) -> Result<StoreChunkResponse> {
        let data = BASE64
            .decode(data_b64)
            .map_err(|e| Error::BadRequest(format!("invalid base64: {e}")))?;

        let sha256 = self.store.store(chunk_id, &data)?;
        info!(chunk_id, bytes = data.len(), sha256 = %short(&sha256), "stored chunk");

        if let Some(filename) = filename {
            self.register_with_coordinator(filename, chunk_id).await;
        }

        Ok(StoreChunkResponse { status: "stored".to_string(), sha256 })
    }

    async fn register_with_coordinator(&self, filename: &str, chunk_id: &str) {
        let url = format!("{}/register_chunk", self.config.coordinator_url.trim_end_matches('/'));
        let req = RegisterChunkRequest {
            filename: filename.to_string(),
            chunk_id: chunk_id.to_string(),
            dn_id: self.config.dn_id.clone(),
        };
        match post_json::<_, StatusResponse>(
            &self.client,
            &url,
            &req,
            dfs_core::timing::TIMEOUT_COORDINATOR_CALL,
        )
        .await
        {
            Ok(_) => info!(chunk_id, filename, "registered chunk with coordinator"),
            Err(e) => warn!(chunk_id, filename, error = %e, "failed to register chunk with coordinator"),
        }
    }

    /// `GetChunk` — reads bytes, verifies against the side-car, base64-
    /// encodes for the wire. `Error::CorruptedChunk` on digest mismatch.
    pub fn get_chunk(&self, chunk_id: &str) -> Result<(String, String)> {
        let (data, sha256) = self.store.get(chunk_id)?;
        Ok((BASE64.encode(&data), sha256))
    }

    /// `DeleteChunk` — removes bytes and side-car. Returns whether the
    /// chunk existed.
    pub fn delete_chunk(&self, chunk_id: &str) -> Result<bool> {
        self.store.delete(chunk_id)
    }

    /// `VerifyChunk` — digest comparison without reading the bytes out.
    pub fn verify_chunk(&self, chunk_id: &str) -> std::io::Result<VerifyStatus> {
        self.store.verify(chunk_id)
    }

    /// `ReplicateChunk` — pushes the local chunk to `target_host`'s
    /// `/store_chunk`, checks the target's returned digest against our own
    /// side-car digest, and on match notifies the coordinator.
    pub async fn replicate_chunk(&self, chunk_id: &str, target_host: &str) -> Result<StatusResponse> {
        let (data, local_sha256) = self.store.get(chunk_id)?;

        let url = format!("{}/store_chunk", target_host.trim_end_matches('/'));
        let req = dfs_core::wire::StoreChunkRequest {
            chunk_id: chunk_id.to_string(),
            filename: None,
            data: BASE64.encode(&data),
        };
        let resp = post_json::<_, StoreChunkResponse>(
            &self.client,
            &url,
            &req,
            dfs_core::timing::TIMEOUT_REPLICATION_PUSH,
        )
        .await
        .map_err(|e| Error::TargetFailed(e.to_string()))?;

        if resp.sha256 != local_sha256 {
            return Err(Error::ChecksumMismatch(chunk_id.to_string()));
        }

        info!(chunk_id, target = target_host, "replicated chunk to peer");
        self.notify_replication_success(chunk_id, target_host).await;
        Ok(StatusResponse::new("replicated"))
    }

    async fn notify_replication_success(&self, chunk_id: &str, target_host: &str) {
        let url = format!("{}/replication_success", self.config.coordinator_url.trim_end_matches('/'));
        let req = ReplicationSuccessRequest {
            chunk_id: chunk_id.to_string(),
            from_dn: self.config.dn_id.clone(),
            to_dn: target_host.to_string(),
        };
        if let Err(e) = post_json::<_, StatusResponse>(
            &self.client,
            &url,
            &req,
            dfs_core::timing::TIMEOUT_COORDINATOR_CALL,
        )
        .await
        {
            warn!(chunk_id, error = %e, "failed to notify coordinator of replication");
        }
    }

    /// One heartbeat tick: POST `{dn_id, host}` with a short timeout and a
    /// retry budget on transport errors. Never panics or propagates — the
    /// loop logs and tries again next tick regardless.
    pub async fn send_heartbeat(&self) {
        let url = format!("{}/heartbeat", self.config.coordinator_url.trim_end_matches('/'));
        let req = HeartbeatRequest { dn_id: self.config.dn_id.clone(), host: self.config.host() };

        let mut attempt = 0;
        loop {
            attempt += 1;
            match post_json::<_, StatusResponse>(&self.client, &url, &req, dfs_core::timing::TIMEOUT_HEARTBEAT)
                .await
            {
                Ok(_) => {
                    info!(host = %req.host, "heartbeat sent to coordinator");
                    return;
                }
                Err(e) if attempt < self.config.heartbeat_retries => {
                    warn!(attempt, error = %e, "heartbeat attempt failed, retrying");
                }
                Err(e) => {
                    warn!(attempts = attempt, error = %e, "heartbeat failed, giving up until next tick");
                    return;
                }
            }
        }
    }

    pub fn client(&self) -> &reqwest::Client {
        &self.client
    }

    pub fn coordinator_call_timeout(&self) -> Duration {
        dfs_core::timing::TIMEOUT_COORDINATOR_CALL
    }
}

fn short(digest: &str) -> &str {
    &digest[..digest.len().min(12)]
}
