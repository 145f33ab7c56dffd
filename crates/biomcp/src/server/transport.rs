//! HTTP transport for the MCP server.
//!
//! - `GET /` and `GET /health`: liveness with version and tool count
//! - `POST /mcp`: one JSON-RPC request per call; notifications get `202 Accepted`

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use super::rpc::{Dispatcher, JsonRpcRequest};

/// Create the HTTP router for MCP.
pub fn create_router(dispatcher: Arc<Dispatcher>) -> Router {
    Router::new()
        .route("/", get(health_check))
        .route("/health", get(health_check))
        .route("/mcp", post(handle_mcp_post))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(dispatcher)
}

async fn health_check(State(dispatcher): State<Arc<Dispatcher>>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "service": "biomcp",
        "version": env!("CARGO_PKG_VERSION"),
        "tools": dispatcher.tools().len()
    }))
}

/// Handle POST requests to /mcp.
async fn handle_mcp_post(
    State(dispatcher): State<Arc<Dispatcher>>,
    Json(req): Json<JsonRpcRequest>,
) -> Response {
    tracing::debug!(method = %req.method, "Handling MCP POST request");

    match dispatcher.handle(&req).await {
        Some(response) => Json(response).into_response(),
        None => StatusCode::ACCEPTED.into_response(),
    }
}
