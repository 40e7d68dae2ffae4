//! P3 — a file survives a full upload/download round trip byte-for-byte,
//! split and reassembled across multiple chunks and datanodes.

use std::time::Duration;

use libdfs::DfsClient;

use crate::infra::{spawn_coordinator, spawn_node};

#[tokio::test]
async fn upload_then_download_reproduces_original_bytes() {
    let workdir = tempfile::tempdir().unwrap();
    let metadata_path = workdir.path().join("metadata.json");

    let coordinator =
        spawn_coordinator(&metadata_path, 2, Duration::from_secs(10), Duration::from_millis(100)).await;

    let dn1_dir = workdir.path().join("dn1");
    let dn2_dir = workdir.path().join("dn2");
    std::fs::create_dir_all(&dn1_dir).unwrap();
    std::fs::create_dir_all(&dn2_dir).unwrap();

    let dn1 = spawn_node("dn1", &dn1_dir, &coordinator.base_url, Duration::from_secs(1), Duration::from_secs(10)).await;
    let dn2 = spawn_node("dn2", &dn2_dir, &coordinator.base_url, Duration::from_secs(1), Duration::from_secs(10)).await;
    dn1.heartbeat_now().await;
    dn2.heartbeat_now().await;

    // three and a half chunks, so reassembly exercises chunk boundaries.
    let payload: Vec<u8> = (0..dfs_core::chunk_id::DEFAULT_CHUNK_SIZE * 3 + 1200)
        .map(|i| (i % 251) as u8)
        .collect();
    let in_path = workdir.path().join("original.bin");
    std::fs::write(&in_path, &payload).unwrap();

    let client = DfsClient::new(coordinator.base_url.as_str());
    let summary = client.upload(&in_path).await.expect("upload");
    assert_eq!(summary.filename, "original.bin");
    assert!(summary.failed_pushes.is_empty(), "no chunk push should fail: {:?}", summary.failed_pushes);
    assert_eq!(summary.chunks_uploaded, 4);

    let out_path = workdir.path().join("reconstructed.bin");
    client.download("original.bin", &out_path).await.expect("download");

    let reconstructed = std::fs::read(&out_path).unwrap();
    assert_eq!(reconstructed, payload);
}

#[tokio::test]
async fn verify_reports_every_replica_healthy_after_upload() {
    let workdir = tempfile::tempdir().unwrap();
    let metadata_path = workdir.path().join("metadata.json");

    let coordinator =
        spawn_coordinator(&metadata_path, 2, Duration::from_secs(10), Duration::from_millis(100)).await;

    let dn1_dir = workdir.path().join("dn1");
    let dn2_dir = workdir.path().join("dn2");
    std::fs::create_dir_all(&dn1_dir).unwrap();
    std::fs::create_dir_all(&dn2_dir).unwrap();
    let dn1 = spawn_node("dn1", &dn1_dir, &coordinator.base_url, Duration::from_secs(1), Duration::from_secs(10)).await;
    let dn2 = spawn_node("dn2", &dn2_dir, &coordinator.base_url, Duration::from_secs(1), Duration::from_secs(10)).await;
    dn1.heartbeat_now().await;
    dn2.heartbeat_now().await;

    let in_path = workdir.path().join("small.txt");
    std::fs::write(&in_path, b"a short file").unwrap();

    let client = DfsClient::new(coordinator.base_url.as_str());
    client.upload(&in_path).await.expect("upload");

    let report = client.verify("small.txt").await.expect("verify");
    assert_eq!(report.filename, "small.txt");
    for (chunk_id, flags) in &report.status {
        assert!(flags.iter().all(|ok| *ok), "chunk {chunk_id} has an unhealthy replica: {flags:?}");
        assert_eq!(flags.len(), 2, "expected both replicas reported for {chunk_id}");
    }
}
