//! Liveness monitor and replication sweep — the coordinator's one
//! background task, per spec §4.3.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use dfs_core::wire::{ReplicateChunkRequest, StatusResponse};
use tokio::sync::broadcast;
use tracing::{info, warn};

use crate::coordinator::state::{now_secs, CoordinatorState};
use crate::http_client::post_json;

pub struct ReplicationController {
    state: Arc<CoordinatorState>,
    client: reqwest::Client,
    replica_factor: usize,
    heartbeat_timeout: Duration,
    monitor_interval: Duration,
    replicate_timeout: Duration,
}

impl ReplicationController {
    pub fn new(
        state: Arc<CoordinatorState>,
        replica_factor: usize,
        heartbeat_timeout: Duration,
        monitor_interval: Duration,
        replicate_timeout: Duration,
    ) -> Self {
        Self {
            state,
            client: reqwest::Client::new(),
            replica_factor,
            heartbeat_timeout,
            monitor_interval,
            replicate_timeout,
        }
    }

    /// Runs until `shutdown` fires, ticking every `monitor_interval`.
    pub async fn run(self: Arc<Self>, mut shutdown: broadcast::Receiver<()>) {
        let mut ticker = tokio::time::interval(self.monitor_interval);
        loop {
            tokio::select! {
                _ = ticker.tick() => self.tick().await,
                _ = shutdown.recv() => {
                    info!("replication controller shutting down");
                    break;
                }
            }
        }
    }

    async fn tick(&self) {
        let (dead, revived) = detect_transitions(&self.state, self.heartbeat_timeout);
        if dead.is_empty() && revived.is_empty() {
            return;
        }
        for dn in &revived {
            info!(dn_id = %dn, "datanode marked ALIVE again (heartbeat received)");
        }
        for dn in &dead {
            warn!(dn_id = %dn, "datanode marked DEAD (no heartbeat within timeout)");
        }
        if let Err(e) = self.state.save().await {
            warn!(error = %e, "failed to persist liveness transition");
        }
        for dn in dead {
            let this = self.clone_refs();
            tokio::spawn(async move { this.sweep_for_dead_node(&dn).await });
        }
    }

    fn clone_refs(&self) -> SweepHandle {
        SweepHandle {
            state: self.state.clone(),
            client: self.client.clone(),
            replica_factor: self.replica_factor,
            replicate_timeout: self.replicate_timeout,
        }
    }

    async fn sweep_for_dead_node(&self, dead_dn: &str) {
        self.clone_refs().sweep_for_dead_node(dead_dn).await
    }
}

/// Scans all nodes, flips `alive` on timeout/revival, and returns the
/// (newly-dead, newly-revived) sets without performing any I/O.
fn detect_transitions(state: &CoordinatorState, heartbeat_timeout: Duration) -> (Vec<String>, Vec<String>) {
    let now = now_secs();
    let timeout_secs = heartbeat_timeout.as_secs_f64();
    let mut dead = Vec::new();
    let mut revived = Vec::new();

    for mut entry in state.nodes.iter_mut() {
        let stale = now - entry.last_seen > timeout_secs;
        if stale && entry.alive {
            entry.alive = false;
            dead.push(entry.key().clone());
        } else if !stale && !entry.alive {
            entry.alive = true;
            revived.push(entry.key().clone());
        }
    }

    (dead, revived)
}

struct SweepHandle {
    state: Arc<CoordinatorState>,
    client: reqwest::Client,
    replica_factor: usize,
    replicate_timeout: Duration,
}

impl SweepHandle {
    async fn sweep_for_dead_node(&self, dead_dn: &str) {
        let alive: HashSet<String> = self.state.alive_dns().into_iter().collect();
        let files: Vec<(String, Vec<String>)> = self
            .state
            .files
            .iter()
            .map(|e| (e.key().clone(), e.value().chunks.clone()))
            .collect();

        for (filename, chunks) in files {
            for chunk_id in chunks {
                let holders = self
                    .state
                    .files
                    .get(&filename)
                    .and_then(|f| f.chunks_info.get(&chunk_id).cloned())
                    .unwrap_or_default();

                if !holders.iter().any(|h| h == dead_dn) {
                    continue;
                }

                let Some((source, target)) =
                    plan_chunk_replication(&holders, &alive, self.replica_factor)
                else {
                    continue;
                };
                if source == target {
                    continue;
                }

                self.replicate_chunk(&filename, &chunk_id, &source, &target).await;
            }
        }
    }

    async fn replicate_chunk(&self, filename: &str, chunk_id: &str, source_dn: &str, target_dn: &str) {
        let (Some(source_host), Some(target_host)) =
            (self.state.host_of(source_dn), self.state.host_of(target_dn))
        else {
            return;
        };

        let url = format!("{}/replicate_chunk", source_host.trim_end_matches('/'));
        let req = ReplicateChunkRequest {
            chunk_id: chunk_id.to_string(),
            target_host: target_host.clone(),
        };

        match post_json::<_, StatusResponse>(&self.client, &url, &req, self.replicate_timeout).await {
            Ok(_) => {
                if let Some(mut rec) = self.state.files.get_mut(filename) {
                    let holders = rec.chunks_info.entry(chunk_id.to_string()).or_default();
                    if !holders.iter().any(|h| h == target_dn) {
                        holders.push(target_dn.to_string());
                    }
                }
                if let Err(e) = self.state.save().await {
                    warn!(error = %e, "failed to persist replication result");
                }
                info!(%chunk_id, from = %source_dn, to = %target_dn, "replicated chunk to restore factor");
            }
            Err(e) => {
                warn!(%chunk_id, from = %source_dn, to = %target_dn, error = %e, "replication attempt failed, next sweep will retry");
            }
        }
    }
}

/// Pure placement decision for one chunk on one dead node, per §4.3.
/// Returns `None` when nothing needs to change (already at factor, or no
/// alive replica to source from).
pub fn plan_chunk_replication(
    holders: &[String],
    alive: &HashSet<String>,
    replica_factor: usize,
) -> Option<(String, String)> {
    let alive_replicas: Vec<String> = holders.iter().filter(|h| alive.contains(*h)).cloned().collect();
    if alive_replicas.len() >= replica_factor {
        return None;
    }

    let mut candidates: Vec<&String> = alive
        .iter()
        .filter(|dn| !alive_replicas.contains(*dn))
        .collect();
    candidates.sort();

    let target = if let Some(first) = candidates.first() {
        (*first).clone()
    } else if let Some(existing) = alive_replicas.first() {
        existing.clone()
    } else {
        return None;
    };

    let mut sorted_replicas = alive_replicas.clone();
    sorted_replicas.sort();
    let source = sorted_replicas.into_iter().next()?;

    Some((source, target))
}
