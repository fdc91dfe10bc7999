//! HTTP route definitions

use axum::{
    extract::State,
    middleware,
    response::Json,
    routing::get,
    Router,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tower::ServiceBuilder;
use tower_http::{compression::CompressionLayer, trace::TraceLayer};

use crate::app::AppState;
use crate::http::middleware::{cors_layer, require_allowed_origin};
use crate::util::time::uptime_secs;
use crate::ws::handler::ws_handler;
use crate::ws::hub::Transport;

/// WebSocket endpoint path the web client connects to
pub const SOCKET_PATH: &str = "/api/socket";

/// Build the application router
pub fn build_router(state: AppState) -> Router {
    let cors = cors_layer(&state.config);

    let socket_routes = Router::new()
        .route(SOCKET_PATH, get(ws_handler))
        .layer(middleware::from_fn_with_state(state.clone(), require_allowed_origin));

    Router::new()
        .route("/health", get(health_handler))
        .merge(socket_routes)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CompressionLayer::new())
                .layer(cors),
        )
        .with_state(state)
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    uptime_secs: u64,
    server_time: DateTime<Utc>,
    connections: usize,
    players: usize,
}

async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        uptime_secs: uptime_secs(),
        server_time: Utc::now(),
        connections: state.hub.connection_count(),
        players: state.arena.player_count(),
    })
}
