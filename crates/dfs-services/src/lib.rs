//! dfs-services — business logic for both roles, plus the outbound HTTP
//! calls each makes to its peers. `dfs-api` binds this to the wire contract;
//! `coordinatord`/`datanoded` wire it to background tasks and an HTTP server.

pub mod coordinator;
pub mod http_client;
pub mod node;
