//! Storage node heartbeat loop (§4.5): posts `{dn_id, host}` to the
//! coordinator on a fixed cadence, independent of request handling.

use std::sync::Arc;

use tokio::sync::broadcast;
use tracing::info;

use crate::node::service::NodeService;

pub async fn run(node: Arc<NodeService>, mut shutdown: broadcast::Receiver<()>) {
    let mut ticker = tokio::time::interval(node.config.heartbeat_interval());
    loop {
        tokio::select! {
            _ = ticker.tick() => node.send_heartbeat().await,
            _ = shutdown.recv() => {
                info!("heartbeat loop shutting down");
                break;
            }
        }
    }
}
