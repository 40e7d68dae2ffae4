//! `DfsClient` — thin wrapper used by `dfsctl` and the integration tests to
//! drive a coordinator end to end: upload (split + plan + push), download
//! (chunk map + pull + reassemble), delete, verify, list.

use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;
use std::time::Duration;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use dfs_core::chunk_id::DEFAULT_CHUNK_SIZE;
use dfs_core::wire::{
    ChunkPlanEntry, DeleteFileRequest, DeleteFileResponse, GetChunkMapResponse, GetChunkResponse,
    ListFilesResponse, StoreChunkRequest, StoreChunkResponse, UploadMetadataRequest,
    UploadMetadataResponse, VerifyFileResponse,
};

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

pub struct DfsClient {
    coordinator_url: String,
    client: reqwest::Client,
}

#[derive(Debug, Clone)]
pub struct UploadSummary {
    pub filename: String,
    pub chunks_uploaded: usize,
    pub failed_pushes: Vec<String>,
}

impl DfsClient {
    pub fn new(coordinator_url: impl Into<String>) -> Self {
        Self {
            coordinator_url: coordinator_url.into().trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }

    /// Splits `path` into fixed-size chunks, requests a placement plan, and
    /// pushes each chunk to every host it was assigned to.
    pub async fn upload(&self, path: &Path) -> anyhow::Result<UploadSummary> {
        let filename = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| anyhow::anyhow!("path has no file name: {}", path.display()))?
            .to_string();

        let checksums = crate::checksum::compute_checksums(path)?;
        let filesize = std::fs::metadata(path)?.len();
        let num_chunks = crate::checksum::num_chunks(filesize);

        let plan: UploadMetadataResponse = self
            .post_json(
                "/upload_metadata",
                &UploadMetadataRequest { filename: filename.clone(), num_chunks, checksums },
            )
            .await?;

        let mut file = File::open(path)?;
        let mut buf = vec![0u8; DEFAULT_CHUNK_SIZE];
        let mut failed_pushes = Vec::new();
        let mut chunks_uploaded = 0;

        for entry in &plan.chunks {
            let n = read_full(&mut file, &mut buf)?;
            if n == 0 {
                break;
            }
            self.push_chunk(&filename, entry, &buf[..n], &mut failed_pushes).await;
            chunks_uploaded += 1;
        }

        Ok(UploadSummary { filename, chunks_uploaded, failed_pushes })
    }

    async fn push_chunk(
        &self,
        filename: &str,
        entry: &ChunkPlanEntry,
        data: &[u8],
        failed_pushes: &mut Vec<String>,
    ) {
        let body = StoreChunkRequest {
            chunk_id: entry.chunk_id.clone(),
            filename: Some(filename.to_string()),
            data: BASE64.encode(data),
        };
        for host in &entry.dn_hosts {
            let url = format!("{}/store_chunk", host.trim_end_matches('/'));
            match self.post_json::<_, StoreChunkResponse>(&url, &body).await {
                Ok(_) => tracing::info!(chunk_id = %entry.chunk_id, host, "pushed chunk"),
                Err(e) => {
                    tracing::warn!(chunk_id = %entry.chunk_id, host, error = %e, "chunk push failed");
                    failed_pushes.push(format!("{} -> {host}", entry.chunk_id));
                }
            }
        }
    }

    /// Fetches the current chunk map for `filename` and reassembles it into
    /// `out_path` in chunk-index order, trying each assigned host in turn
    /// until one serves the chunk successfully.
    pub async fn download(&self, filename: &str, out_path: &Path) -> anyhow::Result<()> {
        let url = format!("{}/get_chunk_map?filename={filename}", self.coordinator_url);
        let map: GetChunkMapResponse = self.get_json(&url).await?;

        let mut chunks = map.chunks;
        chunks.sort_by_key(|c| dfs_core::chunk_id::order_key(&c.chunk_id));

        let mut out = File::create(out_path)?;
        for entry in chunks {
            let data = self.fetch_chunk_from_any_host(&entry.chunk_id, &entry.dn_hosts).await?;
            out.write_all(&data)?;
        }
        Ok(())
    }

    async fn fetch_chunk_from_any_host(&self, chunk_id: &str, hosts: &[String]) -> anyhow::Result<Vec<u8>> {
        for host in hosts {
            let url = format!("{}/get_chunk?chunk_id={chunk_id}", host.trim_end_matches('/'));
            match self.get_json::<GetChunkResponse>(&url).await {
                Ok(resp) => match BASE64.decode(&resp.data) {
                    Ok(data) => return Ok(data),
                    Err(e) => tracing::warn!(chunk_id, host, error = %e, "bad base64 from host"),
                },
                Err(e) => tracing::warn!(chunk_id, host, error = %e, "get_chunk failed"),
            }
        }
        anyhow::bail!("failed to retrieve chunk {chunk_id} from any of {} hosts", hosts.len())
    }

    pub async fn delete(&self, filename: &str) -> anyhow::Result<DeleteFileResponse> {
        let resp = self
            .post_json("/delete_file", &DeleteFileRequest { filename: filename.to_string() })
            .await?;
        Ok(resp)
    }

    pub async fn verify(&self, filename: &str) -> anyhow::Result<VerifyFileResponse> {
        let url = format!("{}/verify_file?filename={filename}", self.coordinator_url);
        self.get_json(&url).await
    }

    pub async fn list(&self) -> anyhow::Result<ListFilesResponse> {
        let url = format!("{}/list_files", self.coordinator_url);
        self.get_json(&url).await
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, url: &str) -> anyhow::Result<T> {
        let resp = self.client.get(url).timeout(DEFAULT_TIMEOUT).send().await?;
        let resp = ensure_ok(resp).await?;
        Ok(resp.json().await?)
    }

    async fn post_json<B: serde::Serialize, T: serde::de::DeserializeOwned>(
        &self,
        path_or_url: &str,
        body: &B,
    ) -> anyhow::Result<T> {
        let url = if path_or_url.starts_with("http") {
            path_or_url.to_string()
        } else {
            format!("{}{path_or_url}", self.coordinator_url)
        };
        let resp = self.client.post(&url).timeout(DEFAULT_TIMEOUT).json(body).send().await?;
        let resp = ensure_ok(resp).await?;
        Ok(resp.json().await?)
    }
}

async fn ensure_ok(resp: reqwest::Response) -> anyhow::Result<reqwest::Response> {
    if resp.status().is_success() {
        Ok(resp)
    } else {
        let status = resp.status();
        let body = resp.text().await.unwrap_or_default();
        anyhow::bail!("request failed: {status} {body}")
    }
}

fn read_full(r: &mut impl Read, buf: &mut [u8]) -> std::io::Result<usize> {
    let mut total = 0;
    while total < buf.len() {
        let n = r.read(&mut buf[total..])?;
        if n == 0 {
            break;
        }
        total += n;
    }
    Ok(total)
}
