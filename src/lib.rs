//! Real-time Rock/Paper/Scissors match server.
//!
//! Two-party rooms keyed by short codes, simultaneous choices revealed
//! atomically, and best-effort stats reporting for identified players.

pub mod config;
pub mod error;
pub mod game;
pub mod protocol;
pub mod stats;
pub mod ws;

use std::sync::Arc;

use axum::{extract::State, response::IntoResponse, routing::get, Json, Router};
use tokio::sync::RwLock;
use tower_http::services::ServeDir;

use config::FirstChoicePolicy;
use game::RoomRegistry;
use stats::{InMemoryStats, StatsStore};

/// Application state shared across all connections
pub struct AppState {
    /// All live rooms. Every room mutation runs under the write guard held
    /// for the whole handler reaction, so each message is processed to
    /// completion before the next one touches any room.
    pub registry: RwLock<RoomRegistry>,
    pub stats: Arc<dyn StatsStore>,
    pub policy: FirstChoicePolicy,
}

impl AppState {
    pub fn new() -> Self {
        Self::with_parts(
            Arc::new(InMemoryStats::new()),
            config::DEFAULT_FIRST_CHOICE_POLICY,
        )
    }

    /// Custom store and policy (tests, alternate deployments)
    pub fn with_parts(stats: Arc<dyn StatsStore>, policy: FirstChoicePolicy) -> Self {
        Self {
            registry: RwLock::new(RoomRegistry::new()),
            stats,
            policy,
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

/// Build the application router
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/ws/rps", get(ws::ws_handler))
        .route("/leaderboard", get(leaderboard_handler))
        .route("/health", get(health_handler))
        .nest_service("/", ServeDir::new("static"))
        .with_state(state)
}

/// Per-player totals as JSON, best first
async fn leaderboard_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(state.stats.snapshot().await)
}

/// Health check endpoint
async fn health_handler() -> &'static str {
    "OK"
}
