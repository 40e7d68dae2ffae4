//! Thin outbound JSON helpers shared by the coordinator's replication
//! controller and the storage node's heartbeat/recovery loops — the same
//! get/post-json shape the CLI uses against its own daemon, generalized to
//! any peer base URL.

use std::time::Duration;

use dfs_core::wire::ErrorResponse;
use serde::{de::DeserializeOwned, Serialize};

#[derive(Debug, thiserror::Error)]
pub enum CallError {
    #[error("request to {0} timed out or failed: {1}")]
    Transport(String, reqwest::Error),
    #[error("{0} responded with {1}: {2}")]
    Status(String, reqwest::StatusCode, String),
    #[error("failed to parse response from {0}: {1}")]
    Decode(String, reqwest::Error),
}

pub async fn get_json<R: DeserializeOwned>(
    client: &reqwest::Client,
    url: &str,
    timeout: Duration,
) -> Result<R, CallError> {
    let resp = client
        .get(url)
        .timeout(timeout)
        .send()
        .await
        .map_err(|e| CallError::Transport(url.to_string(), e))?;
    parse_response(url, resp).await
}

pub async fn post_json<B: Serialize, R: DeserializeOwned>(
    client: &reqwest::Client,
    url: &str,
    body: &B,
    timeout: Duration,
) -> Result<R, CallError> {
    let resp = client
        .post(url)
        .timeout(timeout)
        .json(body)
        .send()
        .await
        .map_err(|e| CallError::Transport(url.to_string(), e))?;
    parse_response(url, resp).await
}

async fn parse_response<R: DeserializeOwned>(
    url: &str,
    resp: reqwest::Response,
) -> Result<R, CallError> {
    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        let detail = serde_json::from_str::<ErrorResponse>(&body)
            .map(|e| e.error)
            .unwrap_or(body);
        return Err(CallError::Status(url.to_string(), status, detail));
    }
    resp.json::<R>()
        .await
        .map_err(|e| CallError::Decode(url.to_string(), e))
}
