//! voxrelay broker binary.
//!
//! - WebSocket endpoint: /v1/ws
//! - One relay instance per process
//! - Ops endpoints: /healthz, /metrics

use std::net::SocketAddr;
use tracing_subscriber::{fmt, EnvFilter};

use voxrelay_broker::{app_state, config, router};

#[tokio::main]
async fn main() {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    let cfg = config::load_from_file("voxrelay.yaml").expect("config load failed");
    let listen: SocketAddr = cfg
        .relay
        .listen
        .parse()
        .expect("relay.listen must be a valid SocketAddr");

    let state = app_state::AppState::new(cfg).expect("state init failed");
    let app = router::build_router(state);

    tracing::info!(%listen, "voxrelay-broker starting");
    let listener = tokio::net::TcpListener::bind(listen).await.expect("failed to bind");

    axum::serve(listener, app).await.expect("server failed");
}
