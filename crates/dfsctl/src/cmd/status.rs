//! `dfsctl status` — a one-line-per-file summary (file count, chunk count,
//! holder count). There is no dedicated coordinator status endpoint, so
//! this is derived from `/list_files` the same way the original `client.py`
//! derived its output from the same call.

use anyhow::Result;
use libdfs::DfsClient;

pub async fn run(client: &DfsClient) -> Result<()> {
    let files = client.list().await?;
    let total_chunks: usize = files.values().map(|c| c.len()).sum();
    println!("files: {}", files.len());
    println!("chunks: {total_chunks}");
    for (name, chunks) in &files {
        let holders: usize = chunks.values().map(|h| h.len()).sum();
        println!("  {name}: {} chunks, {holders} chunk-holder pairs", chunks.len());
    }
    Ok(())
}
