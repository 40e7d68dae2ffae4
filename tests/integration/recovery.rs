//! Scenario 3 — a datanode stops heartbeating; the coordinator's
//! replication controller detects it, picks a healthy holder as source,
//! and replicates the under-replicated chunk onto a third, previously
//! uninvolved node to restore the replication factor.

use std::time::Duration;

use libdfs::DfsClient;

use crate::infra::{spawn_coordinator, spawn_node};

#[tokio::test]
async fn dead_node_chunk_is_replicated_to_a_healthy_replacement() {
    let workdir = tempfile::tempdir().unwrap();
    let metadata_path = workdir.path().join("metadata.json");

    // a generous heartbeat_timeout keeps dn1/dn3 alive between their own
    // once-a-second background heartbeats, while a tight monitor_interval
    // keeps the sweep responsive once dn2 actually goes quiet.
    let coordinator = spawn_coordinator(
        &metadata_path,
        2,
        Duration::from_millis(1500),
        Duration::from_millis(100),
    )
    .await;

    let dn1_dir = workdir.path().join("dn1");
    let dn2_dir = workdir.path().join("dn2");
    std::fs::create_dir_all(&dn1_dir).unwrap();
    std::fs::create_dir_all(&dn2_dir).unwrap();
    let dn1 = spawn_node("dn1", &dn1_dir, &coordinator.base_url, Duration::from_secs(1), Duration::from_secs(30)).await;
    let dn2 = spawn_node("dn2", &dn2_dir, &coordinator.base_url, Duration::from_secs(1), Duration::from_secs(30)).await;
    dn1.heartbeat_now().await;
    dn2.heartbeat_now().await;

    let in_path = workdir.path().join("doc.txt");
    std::fs::write(&in_path, b"replicate me please").unwrap();

    let client = DfsClient::new(coordinator.base_url.as_str());
    let summary = client.upload(&in_path).await.expect("upload");
    assert!(summary.failed_pushes.is_empty());

    // dn3 joins after the upload: it alive-heartbeats, but holds no chunks yet.
    let dn3_dir = workdir.path().join("dn3");
    std::fs::create_dir_all(&dn3_dir).unwrap();
    let dn3 = spawn_node("dn3", &dn3_dir, &coordinator.base_url, Duration::from_secs(1), Duration::from_secs(30)).await;
    dn3.heartbeat_now().await;

    assert!(!dn3.service.store.exists("doc.txt.chunk.0"));

    // dn2 goes dark; its HTTP server and store keep running so it can still
    // serve as a replication source for anything *else* that needs it, but
    // the coordinator will no longer see heartbeats from it.
    dn2.stop_heartbeating();

    let chunk_id = "doc.txt.chunk.0";
    let replicated = wait_until(Duration::from_secs(5), || {
        let map = coordinator.service.get_chunk_map("doc.txt", None).expect("chunk map");
        map.chunks
            .iter()
            .find(|c| c.chunk_id == chunk_id)
            .map(|c| c.dn_hosts.iter().any(|h| h == &dn3.base_url))
            .unwrap_or(false)
    })
    .await;
    assert!(replicated, "coordinator never replicated {chunk_id} onto dn3");

    // and the bytes actually landed on dn3's disk, not just the holder map.
    assert!(dn3.service.store.exists(chunk_id));
    let (data, _) = dn3.service.store.get(chunk_id).expect("dn3 should hold a valid copy");
    assert_eq!(&data[..], b"replicate me please");
}

async fn wait_until(timeout: Duration, mut predicate: impl FnMut() -> bool) -> bool {
    let deadline = tokio::time::Instant::now() + timeout;
    loop {
        if predicate() {
            return true;
        }
        if tokio::time::Instant::now() >= deadline {
            return false;
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
}
