//! HTTP bindings for both roles (§6). `coordinatord` mounts
//! [`coordinator::router`]; `datanoded` mounts [`node::router`]. Kept in one
//! crate since both sides share the same error-to-status mapping and wire
//! types.

pub mod coordinator;
pub mod error;
pub mod node;

pub use error::ApiError;

use std::net::SocketAddr;

use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Binds and serves the coordinator's router on `addr`, with permissive CORS
/// (the dashboard/CLI can run from anywhere) and per-request tracing spans.
pub async fn serve_coordinator(state: coordinator::CoordinatorState, addr: SocketAddr) -> anyhow::Result<()> {
    let cors = CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any);
    let app = coordinator::router(state).layer(cors).layer(TraceLayer::new_for_http());

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "coordinator API listening");
    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>()).await?;
    Ok(())
}

/// Binds and serves a storage node's router on `addr`.
pub async fn serve_node(state: node::NodeState, addr: SocketAddr) -> anyhow::Result<()> {
    let cors = CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any);
    let app = node::router(state).layer(cors).layer(TraceLayer::new_for_http());

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "storage node API listening");
    axum::serve(listener, app).await?;
    Ok(())
}
