//! Authoritative coordinator metadata: the SN registry and file records.
//!
//! Held in-process as two `DashMap`s guarded collectively by a persistence
//! mutex — mutating operations take the lock, update the maps, and persist
//! the whole document before releasing it, matching the single coarse-lock
//! model the original coordinator uses.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeRecord {
    pub host: String,
    pub last_seen: f64,
    pub alive: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FileRecord {
    pub chunks: Vec<String>,
    pub chunks_info: HashMap<String, Vec<String>>,
}

/// On-disk shape of `metadata.json`, matching the original coordinator's
/// persisted document (`{"files": ..., "datanodes": ...}`).
#[derive(Debug, Default, Serialize, Deserialize)]
struct PersistedDoc {
    #[serde(default)]
    files: HashMap<String, FileRecord>,
    #[serde(default)]
    datanodes: HashMap<String, NodeRecord>,
}

pub fn now_secs() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system clock before unix epoch")
        .as_secs_f64()
}

pub struct CoordinatorState {
    pub nodes: DashMap<String, NodeRecord>,
    pub files: DashMap<String, FileRecord>,
    /// Client-supplied expected digests from `upload_metadata`. Recorded but
    /// never enforced on a read path — kept in memory only, never persisted,
    /// matching the original coordinator's `CHECKSUMS` global.
    pub checksums: DashMap<String, String>,
    metadata_path: PathBuf,
    persist_lock: Mutex<()>,
}

impl CoordinatorState {
    /// Loads `metadata_path` if present, else starts empty.
    pub fn load(metadata_path: impl Into<PathBuf>) -> std::io::Result<Self> {
        let metadata_path = metadata_path.into();
        let doc = if metadata_path.exists() {
            let text = std::fs::read_to_string(&metadata_path)?;
            serde_json::from_str(&text).unwrap_or_default()
        } else {
            PersistedDoc::default()
        };

        let nodes = DashMap::new();
        for (id, rec) in doc.datanodes {
            nodes.insert(id, rec);
        }
        let files = DashMap::new();
        for (name, rec) in doc.files {
            files.insert(name, rec);
        }

        Ok(Self {
            nodes,
            files,
            checksums: DashMap::new(),
            metadata_path,
            persist_lock: Mutex::new(()),
        })
    }

    /// Atomically writes the current document: temp file in the same
    /// directory, then rename, so a crash mid-write never corrupts the
    /// previous `metadata.json`.
    pub async fn save(&self) -> std::io::Result<()> {
        let _guard = self.persist_lock.lock().await;

        let doc = PersistedDoc {
            files: self
                .files
                .iter()
                .map(|e| (e.key().clone(), e.value().clone()))
                .collect(),
            datanodes: self
                .nodes
                .iter()
                .map(|e| (e.key().clone(), e.value().clone()))
                .collect(),
        };

        let text = serde_json::to_string_pretty(&doc)?;
        write_atomic(&self.metadata_path, text.as_bytes())
    }

    pub fn alive_dns(&self) -> Vec<String> {
        self.nodes
            .iter()
            .filter(|e| e.value().alive)
            .map(|e| e.key().clone())
            .collect()
    }

    pub fn is_alive(&self, dn_id: &str) -> bool {
        self.nodes.get(dn_id).map(|r| r.alive).unwrap_or(false)
    }

    pub fn host_of(&self, dn_id: &str) -> Option<String> {
        self.nodes.get(dn_id).map(|r| r.host.clone())
    }
}

fn write_atomic(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let tmp = path.with_extension("json.tmp");
    std::fs::write(&tmp, bytes)?;
    std::fs::rename(&tmp, path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn save_and_reload_roundtrips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("metadata.json");

        {
            let state = CoordinatorState::load(&path).unwrap();
            state.nodes.insert(
                "dn1".to_string(),
                NodeRecord { host: "http://10.0.0.1:9000".to_string(), last_seen: now_secs(), alive: true },
            );
            let mut rec = FileRecord::default();
            rec.chunks.push("f.chunk.0".to_string());
            rec.chunks_info.insert("f.chunk.0".to_string(), vec!["dn1".to_string()]);
            state.files.insert("f".to_string(), rec);
            state.save().await.unwrap();
        }

        let reloaded = CoordinatorState::load(&path).unwrap();
        assert!(reloaded.is_alive("dn1"));
        assert_eq!(reloaded.host_of("dn1").as_deref(), Some("http://10.0.0.1:9000"));
        assert_eq!(
            reloaded.files.get("f").unwrap().chunks_info.get("f.chunk.0").unwrap(),
            &vec!["dn1".to_string()]
        );
    }

    #[test]
    fn missing_file_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("does-not-exist.json");
        let state = CoordinatorState::load(&path).unwrap();
        assert!(state.nodes.is_empty());
        assert!(state.files.is_empty());
    }
}
