//! In-process test harness: spins up a coordinator and storage nodes as
//! real axum servers bound to ephemeral loopback ports, with no external
//! processes involved — every test in this crate talks real HTTP over
//! real sockets, just all inside one test binary.

use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use dfs_core::config::NodeConfig;
use dfs_services::coordinator::{CoordinatorService, CoordinatorState, ReplicationController};
use dfs_services::node::NodeService;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

pub struct CoordinatorHandle {
    pub base_url: String,
    pub service: Arc<CoordinatorService>,
    _shutdown: broadcast::Sender<()>,
    _controller_task: JoinHandle<()>,
    _server_task: JoinHandle<()>,
}

pub struct NodeHandle {
    pub dn_id: String,
    pub base_url: String,
    pub service: Arc<NodeService>,
    heartbeat_task: JoinHandle<()>,
    _shutdown: broadcast::Sender<()>,
    _recovery_task: JoinHandle<()>,
    _server_task: JoinHandle<()>,
}

/// Starts a coordinator with a short liveness cadence suited to tests
/// (production defaults are 3s/12s; tests use milliseconds).
pub async fn spawn_coordinator(
    metadata_path: &Path,
    replica_factor: usize,
    heartbeat_timeout: Duration,
    monitor_interval: Duration,
) -> CoordinatorHandle {
    let state = Arc::new(CoordinatorState::load(metadata_path).expect("load coordinator state"));
    let service = Arc::new(CoordinatorService::new(
        state.clone(),
        replica_factor,
        Duration::from_secs(5),
        Duration::from_secs(5),
        Duration::from_secs(5),
    ));
    let controller = Arc::new(ReplicationController::new(
        state.clone(),
        replica_factor,
        heartbeat_timeout,
        monitor_interval,
        Duration::from_secs(5),
    ));

    let (shutdown_tx, _) = broadcast::channel(1);
    let controller_task = tokio::spawn(controller.run(shutdown_tx.subscribe()));

    let router = dfs_api::coordinator::router(service.clone());
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.expect("bind coordinator");
    let addr: SocketAddr = listener.local_addr().expect("coordinator local addr");
    let server_task = tokio::spawn(async move {
        axum::serve(listener, router.into_make_service_with_connect_info::<SocketAddr>())
            .await
            .expect("coordinator server");
    });

    // give the listener a moment to accept connections
    tokio::time::sleep(Duration::from_millis(20)).await;

    CoordinatorHandle {
        base_url: format!("http://{addr}"),
        service,
        _shutdown: shutdown_tx,
        _controller_task: controller_task,
        _server_task: server_task,
    }
}

/// Starts a storage node with its own ephemeral data directory, heartbeat
/// loop, and recovery loop, all pointed at `coordinator_url`.
pub async fn spawn_node(
    dn_id: &str,
    data_dir: &Path,
    coordinator_url: &str,
    heartbeat_interval: Duration,
    recovery_interval: Duration,
) -> NodeHandle {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.expect("bind node");
    let addr: SocketAddr = listener.local_addr().expect("node local addr");
    let base_url = format!("http://{addr}");

    let config = NodeConfig {
        dn_id: dn_id.to_string(),
        listen_port: addr.port(),
        coordinator_url: coordinator_url.to_string(),
        data_dir: data_dir.to_path_buf(),
        heartbeat_interval_secs: heartbeat_interval.as_secs().max(1),
        recovery_interval_secs: recovery_interval.as_secs().max(1),
        heartbeat_retries: 1,
        advertise_host: base_url.clone(),
    };
    let service = Arc::new(NodeService::new(config).expect("init node store"));

    let (shutdown_tx, _) = broadcast::channel(1);
    let heartbeat_task =
        tokio::spawn(dfs_services::node::heartbeat::run(service.clone(), shutdown_tx.subscribe()));
    let recovery_task =
        tokio::spawn(dfs_services::node::recovery::run(service.clone(), shutdown_tx.subscribe()));

    let router = dfs_api::node::router(service.clone());
    let server_task = tokio::spawn(async move {
        axum::serve(listener, router).await.expect("node server");
    });

    tokio::time::sleep(Duration::from_millis(20)).await;

    NodeHandle {
        dn_id: dn_id.to_string(),
        base_url,
        service,
        heartbeat_task,
        _shutdown: shutdown_tx,
        _recovery_task: recovery_task,
        _server_task: server_task,
    }
}

impl NodeHandle {
    /// Sends one heartbeat immediately instead of waiting for the loop's
    /// next tick — lets tests control timing precisely.
    pub async fn heartbeat_now(&self) {
        self.service.send_heartbeat().await;
    }

    /// Simulates the node going dark: kills its heartbeat loop so the
    /// coordinator's liveness monitor times it out. The node's HTTP server
    /// (and store) keep running — it's still reachable as a replication
    /// source, exactly like a node whose process is alive but whose
    /// heartbeat thread wedged.
    pub fn stop_heartbeating(&self) {
        self.heartbeat_task.abort();
    }
}
