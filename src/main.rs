//! Rock/Paper/Scissors match server binary

use std::net::SocketAddr;
use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use rps_rs::{config, AppState};

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "rps_rs=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let state = Arc::new(AppState::new());
    let app = rps_rs::router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config::SERVER_PORT));
    tracing::info!("✊ RPS server running on http://localhost:{}", addr.port());
    tracing::info!(
        "   WebSocket endpoint: ws://localhost:{}/ws/rps",
        addr.port()
    );

    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}
