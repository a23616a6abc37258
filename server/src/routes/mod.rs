//! Router assembly.
//!
//! SYSTEM CONTEXT
//! ==============
//! Binds the websocket transport and the REST catch-up surface under one
//! Axum router with permissive CORS and request tracing.

pub mod auth;
pub mod strokes;
pub mod ws;

use axum::Router;
use axum::http::StatusCode;
use axum::routing::get;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::state::AppState;

pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/ws", get(ws::handle_ws))
        .route("/stroke/{room_id}", get(strokes::list_strokes))
        .route(
            "/stroke/{room_id}/{index}",
            axum::routing::put(strokes::update_stroke).delete(strokes::delete_stroke),
        )
        .route("/healthz", get(healthz))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

async fn healthz() -> StatusCode {
    StatusCode::OK
}
