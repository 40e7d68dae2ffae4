//! Storage node role: the content-addressed chunk store plus the
//! heartbeat/recovery background loops and replication-push logic that
//! call out to the coordinator and to peer nodes.

pub mod heartbeat;
pub mod recovery;
pub mod service;
pub mod store;

pub use service::NodeService;
pub use store::ChunkStore;
