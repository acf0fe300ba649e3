//! HTTP JSON API
//!
//! Endpoints, all under `/api/codegen`:
//! - POST /                        - Generate code for `{prompt, language}`
//! - GET  /history                 - Every recorded attempt
//! - GET  /history/recent?limit=N  - Most recent attempts (1-100, default 10)
//! - GET  /history/language/{lang} - Attempts for one language
//! - GET  /history/search?keyword= - Attempts whose prompt contains a keyword
//! - GET  /history/{id}            - One attempt
//! - GET  /stats                   - Summary statistics
//! - GET  /stats/detailed          - Summary plus the last 24 hours
//! - GET  /health                  - Service and database status
//! - GET  /languages               - Advertised languages and usage
//! - GET  /version                 - Build information
//!
//! All responses use Content-Type: application/json.

mod handlers;
mod state;

use crate::cli::commands::Services;
use anyhow::{Context, Result};
use axum::http::{Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, info};

use self::handlers::{
    handle_all_history, handle_detailed_stats, handle_generate, handle_health,
    handle_history_by_id, handle_history_by_language, handle_languages, handle_not_found,
    handle_recent_history, handle_search_history, handle_stats, handle_version,
};
use self::state::AppState;

/// Construct a JSON error response with the given status code and message.
fn json_error(status: StatusCode, message: &str) -> Response {
    (status, Json(serde_json::json!({"error": message}))).into_response()
}

/// Build the API router around `services`
pub fn router(services: Services) -> Router {
    let state = Arc::new(AppState::new(services));

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any);

    Router::new()
        .route("/api/codegen", post(handle_generate))
        .route("/api/codegen/history", get(handle_all_history))
        .route("/api/codegen/history/recent", get(handle_recent_history))
        .route("/api/codegen/history/search", get(handle_search_history))
        .route("/api/codegen/history/language/{language}", get(handle_history_by_language))
        .route("/api/codegen/history/{id}", get(handle_history_by_id))
        .route("/api/codegen/stats", get(handle_stats))
        .route("/api/codegen/stats/detailed", get(handle_detailed_stats))
        .route("/api/codegen/health", get(handle_health))
        .route("/api/codegen/languages", get(handle_languages))
        .route("/api/codegen/version", get(handle_version))
        .fallback(handle_not_found)
        .layer(cors)
        .with_state(state)
}

/// Serve the API on `host:port` until Ctrl+C
pub async fn start_server(services: Services, host: &str, port: u16) -> Result<()> {
    let addr = format!("{host}:{port}");
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!("Code generation API listening on http://{}", addr);

    axum::serve(listener, router(services))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server failed")?;

    info!("Server shut down");
    Ok(())
}

/// Wait for a shutdown signal (Ctrl+C).
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for Ctrl+C: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Received shutdown signal...");
}
