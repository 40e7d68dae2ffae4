//! Configuration for both roles.
//!
//! Resolution order: environment variables → config file → defaults.
//!
//! Config file location:
//!   1. `$DFS_CONFIG` (explicit override)
//!   2. `$XDG_CONFIG_HOME/dfs/config.toml`
//!   3. `~/.config/dfs/config.toml`

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::timing;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CoordinatorConfig {
    pub listen_port: u16,
    pub metadata_path: PathBuf,
    pub replica_factor: usize,
    pub heartbeat_timeout_secs: u64,
    pub monitor_interval_secs: u64,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            listen_port: 5000,
            metadata_path: PathBuf::from("metadata.json"),
            replica_factor: timing::DEFAULT_REPLICA_FACTOR,
            heartbeat_timeout_secs: timing::HEARTBEAT_TIMEOUT.as_secs(),
            monitor_interval_secs: timing::MONITOR_INTERVAL.as_secs(),
        }
    }
}

impl CoordinatorConfig {
    pub fn heartbeat_timeout(&self) -> Duration {
        Duration::from_secs(self.heartbeat_timeout_secs)
    }

    pub fn monitor_interval(&self) -> Duration {
        Duration::from_secs(self.monitor_interval_secs)
    }

    /// Load config: env vars → file → defaults.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = load_from_file::<Self>()?;
        if let Ok(v) = std::env::var("DFS_COORDINATOR_PORT") {
            if let Ok(p) = v.parse() {
                config.listen_port = p;
            }
        }
        if let Ok(v) = std::env::var("DFS_METADATA_PATH") {
            config.metadata_path = PathBuf::from(v);
        }
        if let Ok(v) = std::env::var("DFS_REPLICA_FACTOR") {
            if let Ok(r) = v.parse() {
                config.replica_factor = r;
            }
        }
        if let Ok(v) = std::env::var("DFS_HEARTBEAT_TIMEOUT_SECS") {
            if let Ok(s) = v.parse() {
                config.heartbeat_timeout_secs = s;
            }
        }
        Ok(config)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeConfig {
    /// Datanode ID, e.g. "dn1". Required in practice; empty is invalid.
    pub dn_id: String,
    pub listen_port: u16,
    pub coordinator_url: String,
    pub data_dir: PathBuf,
    pub heartbeat_interval_secs: u64,
    pub recovery_interval_secs: u64,
    pub heartbeat_retries: u32,
    /// Base URL this node advertises to the coordinator for itself.
    /// Empty = derive from `127.0.0.1:listen_port`.
    pub advertise_host: String,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            dn_id: String::new(),
            listen_port: 0,
            coordinator_url: "http://127.0.0.1:5000".to_string(),
            data_dir: PathBuf::from("./data"),
            heartbeat_interval_secs: timing::HEARTBEAT_INTERVAL.as_secs(),
            recovery_interval_secs: timing::RECOVERY_INTERVAL.as_secs(),
            heartbeat_retries: timing::HEARTBEAT_RETRIES,
            advertise_host: String::new(),
        }
    }
}

impl NodeConfig {
    pub fn heartbeat_interval(&self) -> Duration {
        Duration::from_secs(self.heartbeat_interval_secs)
    }

    pub fn recovery_interval(&self) -> Duration {
        Duration::from_secs(self.recovery_interval_secs)
    }

    pub fn host(&self) -> String {
        if self.advertise_host.is_empty() {
            format!("http://127.0.0.1:{}", self.listen_port)
        } else {
            self.advertise_host.clone()
        }
    }

    /// Load config: env vars → file → defaults.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = load_from_file::<Self>()?;
        if let Ok(v) = std::env::var("DFS_NODE_ID") {
            config.dn_id = v;
        }
        if let Ok(v) = std::env::var("DFS_NODE_PORT") {
            if let Ok(p) = v.parse() {
                config.listen_port = p;
            }
        }
        if let Ok(v) = std::env::var("DFS_COORDINATOR_URL") {
            config.coordinator_url = v;
        }
        if let Ok(v) = std::env::var("DFS_DATA_DIR") {
            config.data_dir = PathBuf::from(v);
        }
        Ok(config)
    }
}

// ── Shared file loading ──────────────────────────────────────────────────────

fn load_from_file<T: Default + for<'de> Deserialize<'de>>() -> Result<T, ConfigError> {
    let path = config_file_path();
    if path.exists() {
        let text =
            std::fs::read_to_string(&path).map_err(|e| ConfigError::ReadFailed(path.clone(), e))?;
        toml::from_str(&text).map_err(|e| ConfigError::ParseFailed(path.clone(), e))
    } else {
        Ok(T::default())
    }
}

fn config_file_path() -> PathBuf {
    std::env::var("DFS_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| config_dir().join("config.toml"))
}

fn config_dir() -> PathBuf {
    std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| dirs_or_home().join(".config"))
        .join("dfs")
}

fn dirs_or_home() -> PathBuf {
    std::env::var("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("/tmp"))
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {0}: {1}")]
    ReadFailed(PathBuf, std::io::Error),
    #[error("failed to parse {0}: {1}")]
    ParseFailed(PathBuf, toml::de::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coordinator_defaults_match_spec() {
        let c = CoordinatorConfig::default();
        assert_eq!(c.listen_port, 5000);
        assert_eq!(c.replica_factor, 2);
        assert_eq!(c.heartbeat_timeout(), Duration::from_secs(12));
        assert_eq!(c.monitor_interval(), Duration::from_secs(3));
    }

    #[test]
    fn node_defaults_match_spec() {
        let n = NodeConfig::default();
        assert_eq!(n.heartbeat_interval(), Duration::from_secs(10));
        assert_eq!(n.recovery_interval(), Duration::from_secs(30));
        assert_eq!(n.heartbeat_retries, 3);
    }

    #[test]
    fn node_host_derives_from_port_when_unset() {
        let mut n = NodeConfig::default();
        n.listen_port = 9100;
        assert_eq!(n.host(), "http://127.0.0.1:9100");
    }

    #[test]
    fn node_host_uses_explicit_advertise() {
        let mut n = NodeConfig::default();
        n.advertise_host = "http://10.0.0.5:9100".to_string();
        assert_eq!(n.host(), "http://10.0.0.5:9100");
    }
}
