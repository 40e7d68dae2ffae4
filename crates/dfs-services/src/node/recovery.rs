//! Storage node recovery loop (§4.5): periodically asks the coordinator
//! which chunks belong on this node, and pulls any that are missing
//! locally but have a live source elsewhere.
//!
//! The `get_chunks_for_dn` contract (§6) returns bare chunk IDs with no
//! embedded source hint — the node derives one itself by asking
//! `get_chunk_map` for the chunk's filename (chunk IDs encode their
//! filename) and picking the first other alive holder. A chunk with no
//! other alive holder has no source hint and is left for the coordinator's
//! own replication sweep, per spec.

use std::sync::Arc;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use dfs_core::wire::{GetChunkMapResponse, GetChunkResponse, GetChunksForDnResponse, RegisterChunkRequest, StatusResponse};
use tokio::sync::broadcast;
use tracing::{info, warn};

use crate::http_client::{get_json, post_json};
use crate::node::service::NodeService;

pub async fn run(node: Arc<NodeService>, mut shutdown: broadcast::Receiver<()>) {
    let mut ticker = tokio::time::interval(node.config.recovery_interval());
    loop {
        tokio::select! {
            _ = ticker.tick() => tick(&node).await,
            _ = shutdown.recv() => {
                info!("recovery loop shutting down");
                break;
            }
        }
    }
}

async fn tick(node: &NodeService) {
    let missing = match chunks_missing_locally(node).await {
        Ok(m) => m,
        Err(e) => {
            warn!(error = %e, "recovery check failed to reach coordinator");
            return;
        }
    };

    for chunk_id in missing {
        let Some((filename, _)) = dfs_core::chunk_id::parse_chunk_id(&chunk_id) else {
            continue;
        };
        let Some(source_host) = find_source_hint(node, filename, &chunk_id).await else {
            continue;
        };

        if let Err(e) = pull_chunk(node, filename, &chunk_id, &source_host).await {
            warn!(chunk_id, source = %source_host, error = %e, "failed to recover chunk from source");
        }
    }
}

async fn chunks_missing_locally(node: &NodeService) -> Result<Vec<String>, String> {
    let url = format!(
        "{}/get_chunks_for_dn?dn_id={}",
        node.config.coordinator_url.trim_end_matches('/'),
        node.config.dn_id
    );
    let resp: GetChunksForDnResponse =
        get_json(node.client(), &url, node.coordinator_call_timeout())
            .await
            .map_err(|e| e.to_string())?;

    Ok(resp.chunks.into_iter().filter(|c| !node.store.exists(c)).collect())
}

/// Finds another alive holder of `chunk_id` by asking the coordinator for
/// the current chunk map of `filename`, and returns its host if one
/// exists besides this node itself.
async fn find_source_hint(node: &NodeService, filename: &str, chunk_id: &str) -> Option<String> {
    let url = format!(
        "{}/get_chunk_map?filename={}",
        node.config.coordinator_url.trim_end_matches('/'),
        filename
    );
    let resp: GetChunkMapResponse =
        get_json(node.client(), &url, node.coordinator_call_timeout()).await.ok()?;

    let self_host = node.config.host();
    resp.chunks
        .into_iter()
        .find(|c| c.chunk_id == chunk_id)
        .and_then(|c| c.dn_hosts.into_iter().find(|h| h != &self_host))
}

async fn pull_chunk(node: &NodeService, filename: &str, chunk_id: &str, source_host: &str) -> Result<(), String> {
    let url = format!(
        "{}/get_chunk?chunk_id={}",
        source_host.trim_end_matches('/'),
        chunk_id
    );
    let resp: GetChunkResponse = get_json(node.client(), &url, dfs_core::timing::TIMEOUT_RECOVERY_PULL)
        .await
        .map_err(|e| e.to_string())?;

    let data = BASE64.decode(&resp.data).map_err(|e| e.to_string())?;
    node.store.store(chunk_id, &data).map_err(|e| e.to_string())?;
    info!(chunk_id, source = source_host, "recovered chunk from source");

    let register_url = format!("{}/register_chunk", node.config.coordinator_url.trim_end_matches('/'));
    let req = RegisterChunkRequest {
        filename: filename.to_string(),
        chunk_id: chunk_id.to_string(),
        dn_id: node.config.dn_id.clone(),
    };
    if let Err(e) =
        post_json::<_, StatusResponse>(node.client(), &register_url, &req, node.coordinator_call_timeout()).await
    {
        warn!(chunk_id, error = %e, "recovered chunk but failed to re-register with coordinator");
    }

    Ok(())
}
