//! datanoded — storage node daemon.
//!
//! Serves chunk bytes over HTTP, heartbeats the coordinator on a fixed
//! cadence, and runs a background recovery loop that pulls chunks it's
//! missing from another live holder. See `NodeConfig` for how `dn_id`,
//! `listen_port`, `coordinator_url`, and `data_dir` are resolved.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use dfs_core::config::NodeConfig;
use dfs_services::node::{heartbeat, recovery, NodeService};
use tokio::sync::broadcast;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let config = NodeConfig::load().context("loading node config")?;
    if config.dn_id.is_empty() {
        anyhow::bail!("DFS_NODE_ID must be set to a non-empty datanode id");
    }
    tracing::info!(dn_id = %config.dn_id, port = config.listen_port, data_dir = ?config.data_dir, "datanoded starting");

    let node = Arc::new(NodeService::new(config.clone()).context("initializing chunk store")?);

    let (shutdown_tx, _) = broadcast::channel(1);

    let heartbeat_task = tokio::spawn(heartbeat::run(node.clone(), shutdown_tx.subscribe()));
    let recovery_task = tokio::spawn(recovery::run(node.clone(), shutdown_tx.subscribe()));

    let addr = SocketAddr::from(([0, 0, 0, 0], config.listen_port));
    let server_task = tokio::spawn(dfs_api::serve_node(node, addr));

    tokio::select! {
        r = heartbeat_task => tracing::error!(?r, "heartbeat loop exited"),
        r = recovery_task => tracing::error!(?r, "recovery loop exited"),
        r = server_task => tracing::error!(?r, "http server exited"),
    }

    Ok(())
}
