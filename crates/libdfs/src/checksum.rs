//! Client-side checksum computation — splits a file the same way
//! [`crate::client::DfsClient::upload`] does, but only to compute per-chunk
//! digests ahead of the upload plan request (mirrors `client.py`'s
//! `compute_checksums`).

use std::collections::HashMap;
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

use dfs_core::chunk_id::{chunk_id, DEFAULT_CHUNK_SIZE};
use dfs_core::digest::sha256_hex;

/// Returns `chunk_id -> sha256` for every chunk `filepath` would split into.
pub fn compute_checksums(filepath: &Path) -> io::Result<HashMap<String, String>> {
    let filename = filepath
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "path has no file name"))?;

    let mut file = File::open(filepath)?;
    let mut checksums = HashMap::new();
    let mut buf = vec![0u8; DEFAULT_CHUNK_SIZE];
    let mut index = 0;

    loop {
        let n = read_full(&mut file, &mut buf)?;
        if n == 0 {
            break;
        }
        let id = chunk_id(filename, index);
        checksums.insert(id, sha256_hex(&buf[..n]));
        index += 1;
        if n < buf.len() {
            break;
        }
    }

    Ok(checksums)
}

/// Number of fixed-size chunks `filesize` bytes splits into.
pub fn num_chunks(filesize: u64) -> usize {
    filesize.div_ceil(DEFAULT_CHUNK_SIZE as u64) as usize
}

fn read_full(r: &mut impl Read, buf: &mut [u8]) -> io::Result<usize> {
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
