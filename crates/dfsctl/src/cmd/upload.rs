//! `dfsctl upload <file>` — split, request a placement plan, push chunks.

use std::path::Path;

use anyhow::Result;
use libdfs::DfsClient;

pub async fn run(client: &DfsClient, path: &Path) -> Result<()> {
    let summary = client.upload(path).await?;
    println!("uploaded {} ({} chunks)", summary.filename, summary.chunks_uploaded);
    if !summary.failed_pushes.is_empty() {
        println!("warning: {} chunk push(es) failed:", summary.failed_pushes.len());
        for failure in &summary.failed_pushes {
            println!("  {failure}");
        }
    }
    Ok(())
}
