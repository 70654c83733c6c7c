mod portmap;
mod relay;

use crate::state::AppState;
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Health check
        .route("/health", get(|| async { "OK" }))
        // Session negotiation results
        .route("/api/portmap", post(portmap::add_port_map))
        // Forwarding table inspection
        .route("/api/relay/table", get(relay::get_table))
        .route("/api/relay/rtcp", get(relay::get_rtcp_status))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
