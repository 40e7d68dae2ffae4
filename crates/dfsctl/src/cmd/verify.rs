//! `dfsctl verify <filename>` — per-chunk holder health, OK/MISSING per
//! replica, matching the original `client.py`'s `verify_file` output.

use anyhow::Result;
use libdfs::DfsClient;

pub async fn run(client: &DfsClient, filename: &str) -> Result<()> {
    let resp = client.verify(filename).await?;
    println!("verification for {}:", resp.filename);

    let mut chunk_ids: Vec<&String> = resp.status.keys().collect();
    chunk_ids.sort_by_key(|c| dfs_core::chunk_id::order_key(c));
    for chunk_id in chunk_ids {
        let flags: Vec<&str> =
            resp.status[chunk_id].iter().map(|ok| if *ok { "OK" } else { "MISSING" }).collect();
        println!("  {chunk_id}: {flags:?}");
    }
    Ok(())
}
