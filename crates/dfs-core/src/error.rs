//! Error kinds shared by the coordinator and storage-node services.
//!
//! A single enum names every failure mode in the system so that `dfs-api`
//! can map each one to the HTTP status spec'd for it, and so the
//! coordinator's background loops can match on kind instead of strings.

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("file not found: {0}")]
    FileNotFound(String),

    #[error("chunk not found: {0}")]
    MissingChunk(String),

    #[error("no datanodes available")]
    NoDatanodesAvailable,

    #[error("chunk corrupted: {0}")]
    CorruptedChunk(String),

    #[error("replication target failed: {0}")]
    TargetFailed(String),

    #[error("checksum mismatch replicating {0}")]
    ChecksumMismatch(String),

    #[error("no healthy source for chunk: {0}")]
    NoSource(String),

    #[error("network error talking to {0}: {1}")]
    TransientNetwork(String, String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("internal error: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, Error>;
