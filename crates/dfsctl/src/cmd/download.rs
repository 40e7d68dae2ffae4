//! `dfsctl download <filename> <out-path>` — fetch the chunk map and
//! reassemble the file in chunk-index order.

use std::path::Path;

use anyhow::Result;
use libdfs::DfsClient;

pub async fn run(client: &DfsClient, filename: &str, out_path: &Path) -> Result<()> {
    client.download(filename, out_path).await?;
    println!("reconstructed {filename} -> {}", out_path.display());
    Ok(())
}
