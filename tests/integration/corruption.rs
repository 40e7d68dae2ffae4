//! P4 — a bit-flipped chunk is detected as corrupted, both by the node's
//! own `/verify_chunk` and by a `/get_chunk` read.

use std::time::Duration;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use dfs_core::wire::{StoreChunkRequest, StoreChunkResponse, VerifyChunkResponse};

use crate::infra::{spawn_coordinator, spawn_node};

#[tokio::test]
async fn bit_flip_on_disk_is_detected_as_corrupted() {
    let workdir = tempfile::tempdir().unwrap();
    let metadata_path = workdir.path().join("metadata.json");
    let coordinator =
        spawn_coordinator(&metadata_path, 1, Duration::from_secs(10), Duration::from_millis(100)).await;

    let dn_dir = workdir.path().join("dn1");
    std::fs::create_dir_all(&dn_dir).unwrap();
    let dn = spawn_node("dn1", &dn_dir, &coordinator.base_url, Duration::from_secs(1), Duration::from_secs(10)).await;
    dn.heartbeat_now().await;

    let http = reqwest::Client::new();
    let chunk_id = "report.pdf.chunk.0";
    let store_resp: StoreChunkResponse = http
        .post(format!("{}/store_chunk", dn.base_url))
        .json(&StoreChunkRequest {
            chunk_id: chunk_id.to_string(),
            filename: None,
            data: BASE64.encode(b"hello chunk"),
        })
        .send()
        .await
        .expect("store_chunk request")
        .json()
        .await
        .expect("store_chunk response");
    assert_eq!(store_resp.status, "stored");

    // flip one bit directly in the on-disk chunk file, bypassing the API.
    let chunk_path = dn_dir.join(chunk_id);
    let mut bytes = std::fs::read(&chunk_path).unwrap();
    bytes[0] ^= 0x01;
    std::fs::write(&chunk_path, &bytes).unwrap();

    let verify_raw = http
        .get(format!("{}/verify_chunk?chunk_id={chunk_id}", dn.base_url))
        .send()
        .await
        .expect("verify_chunk request");
    assert_eq!(verify_raw.status(), reqwest::StatusCode::INTERNAL_SERVER_ERROR);
    let verify_resp: VerifyChunkResponse = verify_raw.json().await.expect("verify_chunk response");
    assert_eq!(verify_resp.status, "corrupted");

    let get_status = http
        .get(format!("{}/get_chunk?chunk_id={chunk_id}", dn.base_url))
        .send()
        .await
        .expect("get_chunk request")
        .status();
    assert_eq!(get_status, reqwest::StatusCode::INTERNAL_SERVER_ERROR);

    // sanity: an unrelated, never-stored chunk id is reported as missing (404),
    // distinct from the corrupted (500) case above.
    let missing_status = http
        .get(format!("{}/verify_chunk?chunk_id=nope.chunk.0", dn.base_url))
        .send()
        .await
        .expect("verify_chunk request for missing id")
        .status();
    assert_eq!(missing_status, reqwest::StatusCode::NOT_FOUND);
}
