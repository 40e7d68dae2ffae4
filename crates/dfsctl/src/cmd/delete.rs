//! `dfsctl delete <filename>` — best-effort delete across every holder.

use anyhow::Result;
use libdfs::DfsClient;

pub async fn run(client: &DfsClient, filename: &str) -> Result<()> {
    let resp = client.delete(filename).await?;
    println!("{}: {}", resp.filename, resp.status);
    Ok(())
}
