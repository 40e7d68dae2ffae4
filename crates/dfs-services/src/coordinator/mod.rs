//! Coordinator role: authoritative metadata, placement, and the background
//! liveness/replication controller.

pub mod controller;
pub mod placement;
pub mod service;
pub mod state;

pub use controller::ReplicationController;
pub use service::CoordinatorService;
pub use state::{CoordinatorState, FileRecord, NodeRecord};
