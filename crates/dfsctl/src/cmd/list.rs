//! `dfsctl list` — every known file and its chunk-to-holder map.

use anyhow::Result;
use libdfs::DfsClient;

pub async fn run(client: &DfsClient) -> Result<()> {
    let files = client.list().await?;
    if files.is_empty() {
        println!("no files registered with the coordinator");
        return Ok(());
    }

    let mut names: Vec<&String> = files.keys().collect();
    names.sort();
    for name in names {
        println!("{name}:");
        let chunks = &files[name];
        let mut chunk_ids: Vec<&String> = chunks.keys().collect();
        chunk_ids.sort_by_key(|c| dfs_core::chunk_id::order_key(c));
        for chunk_id in chunk_ids {
            println!("  {chunk_id} -> {:?}", chunks[chunk_id]);
        }
    }
    Ok(())
}
