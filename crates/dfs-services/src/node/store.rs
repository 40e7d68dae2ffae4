//! Content-addressed chunk store — one file per chunk under `data_dir`,
//! plus a `.sha256` side-car carrying the hex digest of what was written.
//! Per spec §4.4: bytes are written (atomically, temp-then-rename) before
//! the side-car, so a crash mid-write can never produce a side-car that
//! doesn't match the chunk it accompanies.

use std::path::{Path, PathBuf};

use bytes::Bytes;
use dfs_core::digest::sha256_hex;
use dfs_core::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerifyStatus {
    /// Side-car present and matches the current bytes.
    Valid,
    /// No side-car on disk; nothing to compare against.
    Unknown,
    /// Side-car present but does not match the current bytes.
    Corrupted,
    /// No chunk file at all.
    Missing,
}

impl VerifyStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            VerifyStatus::Valid => "valid",
            VerifyStatus::Unknown => "unknown",
            VerifyStatus::Corrupted => "corrupted",
            VerifyStatus::Missing => "missing",
        }
    }
}

pub struct ChunkStore {
    data_dir: PathBuf,
}

impl ChunkStore {
    pub fn new(data_dir: impl Into<PathBuf>) -> std::io::Result<Self> {
        let data_dir = data_dir.into();
        std::fs::create_dir_all(&data_dir)?;
        Ok(Self { data_dir })
    }

    fn chunk_path(&self, chunk_id: &str) -> PathBuf {
        self.data_dir.join(chunk_id)
    }

    fn sidecar_path(&self, chunk_id: &str) -> PathBuf {
        self.data_dir.join(format!("{chunk_id}.sha256"))
    }

    /// Writes `data` under `chunk_id`, overwriting any previous contents
    /// (last writer wins — no in-process chunk lock, per §5). Returns the
    /// hex SHA-256 that was also written to the side-car.
    pub fn store(&self, chunk_id: &str, data: &[u8]) -> Result<String> {
        let path = self.chunk_path(chunk_id);
        write_atomic(&path, data)?;

        let digest = sha256_hex(data);
        std::fs::write(self.sidecar_path(chunk_id), &digest)?;
        Ok(digest)
    }

    /// Reads `chunk_id` back, recomputing and checking its digest against
    /// the side-car. `Error::MissingChunk` if absent, `Error::CorruptedChunk`
    /// on a mismatch. Returns a cheaply-cloneable `Bytes` since the caller
    /// typically base64-encodes it for the wire or forwards it unmodified
    /// to a replication target.
    pub fn get(&self, chunk_id: &str) -> Result<(Bytes, String)> {
        let path = self.chunk_path(chunk_id);
        if !path.exists() {
            return Err(Error::MissingChunk(chunk_id.to_string()));
        }
        let data = std::fs::read(&path)?;
        let digest = sha256_hex(&data);

        if let Some(stored) = self.read_sidecar(chunk_id) {
            if stored != digest {
                return Err(Error::CorruptedChunk(chunk_id.to_string()));
            }
        }
        Ok((Bytes::from(data), digest))
    }

    /// Removes the chunk and its side-car. Returns `true` if the chunk
    /// existed (idempotent: a repeat call returns `false`, not an error).
    pub fn delete(&self, chunk_id: &str) -> Result<bool> {
        let path = self.chunk_path(chunk_id);
        if !path.exists() {
            return Ok(false);
        }
        std::fs::remove_file(&path)?;
        let sidecar = self.sidecar_path(chunk_id);
        if sidecar.exists() {
            std::fs::remove_file(&sidecar)?;
        }
        Ok(true)
    }

    /// Recomputes the digest and compares to the side-car without
    /// returning the bytes. Never errors: every outcome is a `VerifyStatus`.
    pub fn verify(&self, chunk_id: &str) -> std::io::Result<VerifyStatus> {
        let path = self.chunk_path(chunk_id);
        if !path.exists() {
            return Ok(VerifyStatus::Missing);
        }
        let data = std::fs::read(&path)?;
        let digest = sha256_hex(&data);
        Ok(match self.read_sidecar(chunk_id) {
            None => VerifyStatus::Unknown,
            Some(stored) if stored == digest => VerifyStatus::Valid,
            Some(_) => VerifyStatus::Corrupted,
        })
    }

    pub fn exists(&self, chunk_id: &str) -> bool {
        self.chunk_path(chunk_id).exists()
    }

    fn read_sidecar(&self, chunk_id: &str) -> Option<String> {
        std::fs::read_to_string(self.sidecar_path(chunk_id))
            .ok()
            .map(|s| s.trim().to_string())
    }
}

fn write_atomic(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let file_name = path.file_name().and_then(|n| n.to_str()).unwrap_or("chunk");
    let tmp = path.with_file_name(format!("{file_name}.tmp-{}", std::process::id()));
    std::fs::write(&tmp, bytes)?;
    std::fs::rename(&tmp, path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_then_get_roundtrips() {
        let dir = tempfile::tempdir().unwrap();
        let store = ChunkStore::new(dir.path()).unwrap();

        let digest = store.store("f.chunk.0", b"hello world").unwrap();
        assert_eq!(digest, sha256_hex(b"hello world"));

        let (data, got_digest) = store.get("f.chunk.0").unwrap();
        assert_eq!(&data[..], b"hello world");
        assert_eq!(got_digest, digest);
    }

    #[test]
    fn get_missing_chunk_errors() {
        let dir = tempfile::tempdir().unwrap();
        let store = ChunkStore::new(dir.path()).unwrap();
        assert!(matches!(store.get("nope.chunk.0"), Err(Error::MissingChunk(_))));
    }

    #[test]
    fn overwrite_recomputes_digest() {
        let dir = tempfile::tempdir().unwrap();
        let store = ChunkStore::new(dir.path()).unwrap();
        store.store("f.chunk.0", b"v1").unwrap();
        let digest2 = store.store("f.chunk.0", b"v2-longer").unwrap();
        let (data, digest) = store.get("f.chunk.0").unwrap();
        assert_eq!(&data[..], b"v2-longer");
        assert_eq!(digest, digest2);
    }

    #[test]
    fn bit_flip_is_detected_as_corrupted() {
        let dir = tempfile::tempdir().unwrap();
        let store = ChunkStore::new(dir.path()).unwrap();
        store.store("f.chunk.0", b"0123456789").unwrap();

        let path = dir.path().join("f.chunk.0");
        let mut bytes = std::fs::read(&path).unwrap();
        bytes[0] ^= 0xFF;
        std::fs::write(&path, bytes).unwrap();

        assert_eq!(store.verify("f.chunk.0").unwrap(), VerifyStatus::Corrupted);
        assert!(matches!(store.get("f.chunk.0"), Err(Error::CorruptedChunk(_))));
    }

    #[test]
    fn missing_sidecar_verifies_unknown() {
        let dir = tempfile::tempdir().unwrap();
        let store = ChunkStore::new(dir.path()).unwrap();
        std::fs::write(dir.path().join("f.chunk.0"), b"raw").unwrap();
        assert_eq!(store.verify("f.chunk.0").unwrap(), VerifyStatus::Unknown);
    }

    #[test]
    fn delete_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let store = ChunkStore::new(dir.path()).unwrap();
        store.store("f.chunk.0", b"data").unwrap();
        assert!(store.delete("f.chunk.0").unwrap());
        assert!(!store.delete("f.chunk.0").unwrap());
        assert_eq!(store.verify("f.chunk.0").unwrap(), VerifyStatus::Missing);
    }
}
