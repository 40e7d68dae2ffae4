//! Protocol timing constants — heartbeat/recovery cadences and per-call
//! timeouts. Defaults match spec; all are overridable via config.

use std::time::Duration;

/// Coordinator: how long without a heartbeat before a node is marked dead.
pub const HEARTBEAT_TIMEOUT: Duration = Duration::from_secs(12);

/// Coordinator: default replication factor.
pub const DEFAULT_REPLICA_FACTOR: usize = 2;

/// Coordinator: liveness-monitor / replication-sweep cadence.
pub const MONITOR_INTERVAL: Duration = Duration::from_secs(3);

/// Storage node: heartbeat post cadence.
pub const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(10);

/// Storage node: recovery-pull check cadence.
pub const RECOVERY_INTERVAL: Duration = Duration::from_secs(30);

/// Storage node: heartbeat retry budget per tick on transport errors.
pub const HEARTBEAT_RETRIES: u32 = 3;

// ── Outbound call timeouts ──────────────────────────────────────────────────

/// Coordinator → storage node: delete_chunk.
pub const TIMEOUT_DELETE: Duration = Duration::from_secs(5);
/// Coordinator → storage node: verify_chunk.
pub const TIMEOUT_VERIFY: Duration = Duration::from_secs(5);
/// Coordinator → storage node: replicate_chunk.
pub const TIMEOUT_REPLICATE: Duration = Duration::from_secs(8);
/// Storage node → coordinator: heartbeat.
pub const TIMEOUT_HEARTBEAT: Duration = Duration::from_secs(2);
/// Storage node → storage node: replication push (store_chunk on target).
pub const TIMEOUT_REPLICATION_PUSH: Duration = Duration::from_secs(10);
/// Storage node → storage node: recovery pull (get_chunk on source).
pub const TIMEOUT_RECOVERY_PULL: Duration = Duration::from_secs(5);
/// Storage node → coordinator: register_chunk / get_chunks_for_dn.
pub const TIMEOUT_COORDINATOR_CALL: Duration = Duration::from_secs(5);
