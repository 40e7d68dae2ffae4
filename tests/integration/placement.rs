//! P5 — placement is deterministic for a fixed alive set: two files
//! uploaded back to back land on the same round-robin pattern of holders.

use std::collections::HashMap;
use std::time::Duration;

use crate::infra::{spawn_coordinator, spawn_node};

#[tokio::test]
async fn same_alive_set_yields_same_round_robin_pattern() {
    let workdir = tempfile::tempdir().unwrap();
    let metadata_path = workdir.path().join("metadata.json");

    let coordinator =
        spawn_coordinator(&metadata_path, 2, Duration::from_secs(10), Duration::from_millis(100)).await;

    let mut dns = Vec::new();
    for id in ["dn1", "dn2", "dn3"] {
        let dir = workdir.path().join(id);
        std::fs::create_dir_all(&dir).unwrap();
        let node =
            spawn_node(id, &dir, &coordinator.base_url, Duration::from_secs(1), Duration::from_secs(10)).await;
        node.heartbeat_now().await;
        dns.push(node);
    }

    let plan_a = coordinator
        .service
        .upload_plan("a.bin", 6, &HashMap::new(), None)
        .await
        .expect("plan a");
    let plan_b = coordinator
        .service
        .upload_plan("b.bin", 6, &HashMap::new(), None)
        .await
        .expect("plan b");

    // same number of chunks over the same alive set: holder-id pattern per
    // chunk index must match exactly (chunk_id text differs only by filename).
    let pattern_a: Vec<Vec<String>> = plan_a.chunks.iter().map(|c| c.datanodes.clone()).collect();
    let pattern_b: Vec<Vec<String>> = plan_b.chunks.iter().map(|c| c.datanodes.clone()).collect();
    assert_eq!(pattern_a, pattern_b, "placement must be a pure function of the alive set and chunk index");

    // and every chunk should have exactly `replica_factor` distinct holders.
    for entry in &plan_a.chunks {
        assert_eq!(entry.datanodes.len(), 2, "chunk {} should have 2 holders", entry.chunk_id);
    }
}
