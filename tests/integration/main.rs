//! Integration harness: every test here drives a coordinator and storage
//! nodes as real in-process axum servers over real loopback sockets — no
//! external process spawning, no root, no network namespaces required.

mod infra;

mod corruption;
mod placement;
mod recovery;
mod roundtrip;
