//! coordinatord — the distributed store's coordinator daemon.
//!
//! Holds the authoritative chunk placement map, tracks datanode liveness,
//! and drives replication when a datanode goes dark. See `CoordinatorConfig`
//! for how its listen port, metadata path, and replication parameters are
//! resolved.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use dfs_core::config::CoordinatorConfig;
use dfs_services::coordinator::{CoordinatorService, CoordinatorState, ReplicationController};
use tokio::sync::broadcast;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let config = CoordinatorConfig::load().context("loading coordinator config")?;
    tracing::info!(port = config.listen_port, replica_factor = config.replica_factor, "coordinatord starting");

    let state = Arc::new(
        CoordinatorState::load(&config.metadata_path)
            .with_context(|| format!("loading metadata from {:?}", config.metadata_path))?,
    );

    let service = Arc::new(CoordinatorService::new(
        state.clone(),
        config.replica_factor,
        dfs_core::timing::TIMEOUT_DELETE,
        dfs_core::timing::TIMEOUT_VERIFY,
        dfs_core::timing::TIMEOUT_REPLICATE,
    ));

    let controller = Arc::new(ReplicationController::new(
        state.clone(),
        config.replica_factor,
        config.heartbeat_timeout(),
        config.monitor_interval(),
        dfs_core::timing::TIMEOUT_REPLICATE,
    ));

    let (shutdown_tx, _) = broadcast::channel(1);

    let controller_task = tokio::spawn(controller.run(shutdown_tx.subscribe()));

    let addr = SocketAddr::from(([0, 0, 0, 0], config.listen_port));
    let server_task = tokio::spawn(dfs_api::serve_coordinator(service, addr));

    tokio::select! {
        r = controller_task => tracing::error!(?r, "replication controller exited"),
        r = server_task => tracing::error!(?r, "http server exited"),
    }

    Ok(())
}
