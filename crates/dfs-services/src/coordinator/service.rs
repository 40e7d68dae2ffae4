//! The coordinator's transport-independent operation surface (§4.1).
//! `dfs-api` binds each of these to an HTTP handler; nothing here knows
//! about axum or JSON wire shapes beyond the `dfs_core::wire` structs that
//! happen to be a convenient return type.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use dfs_core::wire::{
    ChunkMapEntry, ChunkPlanEntry, DeleteChunkRequest, DeleteFileResponse,
    DownloadMetadataResponse, GetChunkMapResponse, GetChunksForDnResponse, ListFilesResponse,
    StatusResponse, UploadMetadataResponse, VerifyChunkResponse, VerifyFileResponse,
};
use dfs_core::{Error, Result};
use tracing::{info, warn};

use crate::coordinator::placement::{assign_chunks, sort_by_priority};
use crate::coordinator::state::{now_secs, CoordinatorState, FileRecord, NodeRecord};
use crate::http_client::{get_json, post_json};

pub struct CoordinatorService {
    pub state: Arc<CoordinatorState>,
    client: reqwest::Client,
    replica_factor: usize,
    delete_timeout: Duration,
    verify_timeout: Duration,
    replicate_timeout: Duration,
}

impl CoordinatorService {
    pub fn new(
        state: Arc<CoordinatorState>,
        replica_factor: usize,
        delete_timeout: Duration,
        verify_timeout: Duration,
        replicate_timeout: Duration,
    ) -> Self {
        Self {
            state,
            client: reqwest::Client::new(),
            replica_factor,
            delete_timeout,
            verify_timeout,
            replicate_timeout,
        }
    }

    /// `Heartbeat(dn_id, host)` — upserts the SN record, never touches file
    /// records. Logs a revival when a previously-dead node checks back in.
    pub async fn heartbeat(&self, dn_id: &str, host: &str) -> Result<StatusResponse> {
        let now = now_secs();
        let was_dead = self
            .state
            .nodes
            .get(dn_id)
            .map(|r| !r.alive)
            .unwrap_or(false);

        self.state.nodes.insert(
            dn_id.to_string(),
            NodeRecord { host: host.to_string(), last_seen: now, alive: true },
        );

        if was_dead {
            info!(dn_id, "datanode revived via heartbeat");
        }

        self.state.save().await.map_err(Error::Io)?;
        Ok(StatusResponse::ok())
    }

    /// `UploadPlan(filename, num_chunks, checksums?)` — assigns replica
    /// slots round-robin over the prioritized alive set and persists the
    /// resulting chunk list/holder map immediately.
    pub async fn upload_plan(
        &self,
        filename: &str,
        num_chunks: usize,
        checksums: &HashMap<String, String>,
        client_ip: Option<&str>,
    ) -> Result<UploadMetadataResponse> {
        let alive = self.state.alive_dns();
        if alive.is_empty() {
            return Err(Error::NoDatanodesAvailable);
        }

        let prioritized = sort_by_priority(&alive, |dn| self.state.host_of(dn), client_ip);
        let plan = assign_chunks(&prioritized, num_chunks, self.replica_factor);

        let mut chunks = Vec::with_capacity(num_chunks);
        let mut chunks_info = HashMap::with_capacity(num_chunks);
        // The raw per-chunk slot list (may repeat a node when |A| < R, per
        // §4.2) is kept alongside the deduped holder set so the plan
        // response can still show every slot while `chunks_info` only ever
        // tracks set membership.
        let mut slot_lists = Vec::with_capacity(num_chunks);
        for (i, holders) in plan.into_iter().enumerate() {
            let chunk_id = dfs_core::chunk_id::chunk_id(filename, i);
            if let Some(digest) = checksums.get(&chunk_id) {
                self.state.checksums.insert(chunk_id.clone(), digest.clone());
            }
            chunks.push(chunk_id.clone());
            chunks_info.insert(chunk_id.clone(), dedup_preserve_order(holders.clone()));
            slot_lists.push((chunk_id, holders));
        }

        self.state.files.insert(
            filename.to_string(),
            FileRecord { chunks: chunks.clone(), chunks_info },
        );
        self.state.save().await.map_err(Error::Io)?;

        let result = slot_lists
            .into_iter()
            .map(|(chunk_id, datanodes)| {
                let dn_hosts = datanodes
                    .iter()
                    .filter_map(|dn| self.state.host_of(dn))
                    .collect();
                ChunkPlanEntry { chunk_id, datanodes, dn_hosts }
            })
            .collect();

        info!(filename, alive = alive.len(), "prepared upload plan");
        Ok(UploadMetadataResponse { chunks: result })
    }

    /// `RegisterChunk(filename, chunk_id, dn_id)` — idempotent holder-set
    /// insertion; creates the file/chunk entry on first sight.
    pub async fn register_chunk(
        &self,
        filename: &str,
        chunk_id: &str,
        dn_id: &str,
    ) -> Result<StatusResponse> {
        {
            let mut rec = self.state.files.entry(filename.to_string()).or_default();
            if !rec.chunks.iter().any(|c| c == chunk_id) {
                rec.chunks.push(chunk_id.to_string());
            }
            let holders = rec.chunks_info.entry(chunk_id.to_string()).or_default();
            if !holders.iter().any(|h| h == dn_id) {
                holders.push(dn_id.to_string());
            }
        }
        self.state.save().await.map_err(Error::Io)?;
        info!(filename, chunk_id, dn_id, "registered chunk holder");
        Ok(StatusResponse::new("registered"))
    }

    /// `GetChunkMap(filename, client_hint?)` — alive-filtered, proximity
    /// ordered holder hosts per chunk, in file reconstruction order.
    pub fn get_chunk_map(
        &self,
        filename: &str,
        client_ip: Option<&str>,
    ) -> Result<GetChunkMapResponse> {
        let rec = self
            .state
            .files
            .get(filename)
            .ok_or_else(|| Error::FileNotFound(filename.to_string()))?;

        let chunks = rec
            .chunks
            .iter()
            .map(|chunk_id| {
                let holders = rec.chunks_info.get(chunk_id).cloned().unwrap_or_default();
                let alive: Vec<String> =
                    holders.into_iter().filter(|dn| self.state.is_alive(dn)).collect();
                let prioritized = sort_by_priority(&alive, |dn| self.state.host_of(dn), client_ip);
                let dn_hosts = prioritized.iter().filter_map(|dn| self.state.host_of(dn)).collect();
                ChunkMapEntry { chunk_id: chunk_id.clone(), dn_hosts }
            })
            .collect();

        Ok(GetChunkMapResponse { chunks })
    }

    /// `download_metadata` — raw holder map, unfiltered by liveness. Used by
    /// the dashboard/CLI to show full placement history.
    pub fn download_metadata(&self, filename: &str) -> Result<DownloadMetadataResponse> {
        let rec = self
            .state
            .files
            .get(filename)
            .ok_or_else(|| Error::FileNotFound(filename.to_string()))?;
        Ok(DownloadMetadataResponse {
            filename: filename.to_string(),
            chunks_info: rec.chunks_info.clone(),
        })
    }

    /// `ListFiles()` — every file's full holder map (set membership, not
    /// filtered by liveness).
    pub fn list_files(&self) -> ListFilesResponse {
        self.state
            .files
            .iter()
            .map(|e| (e.key().clone(), e.value().chunks_info.clone()))
            .collect()
    }

    /// `GetChunksForDN(dn_id)` — every chunk this node currently holds,
    /// across all files.
    pub fn chunks_for_dn(&self, dn_id: &str) -> GetChunksForDnResponse {
        let mut chunks = Vec::new();
        for entry in self.state.files.iter() {
            for (chunk_id, holders) in &entry.value().chunks_info {
                if holders.iter().any(|h| h == dn_id) {
                    chunks.push(chunk_id.clone());
                }
            }
        }
        GetChunksForDnResponse { chunks }
    }

    /// `DeleteFile(filename)` — best-effort chunk delete on every historical
    /// holder, then the file record is dropped regardless of per-holder
    /// outcome.
    pub async fn delete_file(&self, filename: &str) -> Result<DeleteFileResponse> {
        let rec = self
            .state
            .files
            .get(filename)
            .map(|e| e.value().clone())
            .ok_or_else(|| Error::FileNotFound(filename.to_string()))?;

        for (chunk_id, holders) in &rec.chunks_info {
            for dn in holders {
                let Some(host) = self.state.host_of(dn) else { continue };
                let url = format!("{}/delete_chunk", host.trim_end_matches('/'));
                let req = DeleteChunkRequest { chunk_id: chunk_id.clone() };
                if let Err(e) =
                    post_json::<_, StatusResponse>(&self.client, &url, &req, self.delete_timeout).await
                {
                    warn!(chunk_id, dn_id = %dn, error = %e, "delete_chunk failed, ignoring");
                }
            }
        }

        self.state.files.remove(filename);
        self.state.save().await.map_err(Error::Io)?;
        info!(filename, "deleted file and its chunks from all datanodes");
        Ok(DeleteFileResponse { status: "deleted".to_string(), filename: filename.to_string() })
    }

    /// `VerifyFile(filename)` — per-chunk vector of booleans, one per
    /// historical holder in holder-set order. `true` iff the holder's
    /// `/verify_chunk` responded 200 (status `valid`/`unknown`); network
    /// failure or a 404/500 response both count as `false`.
    pub async fn verify_file(&self, filename: &str) -> Result<VerifyFileResponse> {
        let rec = self
            .state
            .files
            .get(filename)
            .map(|e| e.value().clone())
            .ok_or_else(|| Error::FileNotFound(filename.to_string()))?;

        let mut status = HashMap::with_capacity(rec.chunks_info.len());
        for (chunk_id, holders) in &rec.chunks_info {
            let mut ok_flags = Vec::with_capacity(holders.len());
            for dn in holders {
                let ok = match self.state.host_of(dn) {
                    Some(host) => {
                        let url = format!(
                            "{}/verify_chunk?chunk_id={}",
                            host.trim_end_matches('/'),
                            urlencode(chunk_id)
                        );
                        get_json::<VerifyChunkResponse>(&self.client, &url, self.verify_timeout)
                            .await
                            .map(|r| r.status == "valid" || r.status == "unknown" || r.status == "ok")
                            .unwrap_or(false)
                    }
                    None => false,
                };
                ok_flags.push(ok);
            }
            status.insert(chunk_id.clone(), ok_flags);
        }

        Ok(VerifyFileResponse { filename: filename.to_string(), status })
    }

    /// `RequestRecovery(chunk_id, dn_id)` — picks a healthy holder as
    /// source and instructs it to replicate directly to `dn_id`'s host.
    /// This is the operation the original `/request_recovery` handler meant
    /// to implement (it referenced undefined globals); here it is backed by
    /// the same node registry and file store as every other operation, so
    /// there's no separate stale source of truth.
    pub async fn request_recovery(&self, chunk_id: &str, dn_id: &str) -> Result<StatusResponse> {
        let (filename, _) = dfs_core::chunk_id::parse_chunk_id(chunk_id)
            .ok_or_else(|| Error::BadRequest(format!("malformed chunk id: {chunk_id}")))?;

        let holders = self
            .state
            .files
            .get(filename)
            .and_then(|f| f.chunks_info.get(chunk_id).cloned())
            .ok_or_else(|| Error::MissingChunk(chunk_id.to_string()))?;

        let mut healthy_sources: Vec<&String> = holders
            .iter()
            .filter(|dn| *dn != dn_id && self.state.is_alive(dn))
            .collect();
        healthy_sources.sort();

        let source_dn = healthy_sources
            .into_iter()
            .next()
            .ok_or_else(|| Error::NoSource(chunk_id.to_string()))?
            .clone();

        let source_host = self
            .state
            .host_of(&source_dn)
            .ok_or_else(|| Error::NoSource(chunk_id.to_string()))?;
        let target_host = self
            .state
            .host_of(dn_id)
            .ok_or_else(|| Error::NoSource(format!("target datanode not active: {dn_id}")))?;

        info!(chunk_id, source = %source_dn, target = dn_id, "coordinating recovery");

        let url = format!("{}/replicate_chunk", source_host.trim_end_matches('/'));
        let req = dfs_core::wire::ReplicateChunkRequest {
            chunk_id: chunk_id.to_string(),
            target_host,
        };
        post_json::<_, StatusResponse>(&self.client, &url, &req, self.replicate_timeout)
            .await
            .map_err(|e| Error::TargetFailed(e.to_string()))?;

        if let Some(mut rec) = self.state.files.get_mut(filename) {
            let holders = rec.chunks_info.entry(chunk_id.to_string()).or_default();
            if !holders.iter().any(|h| h == dn_id) {
                holders.push(dn_id.to_string());
            }
        }
        self.state.save().await.map_err(Error::Io)?;

        Ok(StatusResponse::new("recovery_started"))
    }

    /// `replication_success` — logged acknowledgement from a source SN
    /// after a heartbeat-triggered replication. The holder set is already
    /// updated by the replication controller itself; this call exists so
    /// the wire contract matches the original system's fire-and-forget ack.
    pub fn note_replication_success(&self, chunk_id: &str, from_dn: &str, to_dn: &str) {
        info!(chunk_id, from = from_dn, to = to_dn, "replication confirmed by source");
    }
}

fn dedup_preserve_order(items: Vec<String>) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    items.into_iter().filter(|i| seen.insert(i.clone())).collect()
}

fn urlencode(s: &str) -> String {
    percent_encode(s)
}

/// Minimal percent-encoding for the one query-string value we ever build
/// ourselves (`chunk_id`, which can contain dots but no other reserved
/// characters in practice); avoids pulling in a dedicated crate for this.
fn percent_encode(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for b in s.bytes() {
        match b {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(b as char)
            }
            _ => out.push_str(&format!("%{:02X}", b)),
        }
    }
    out
}
