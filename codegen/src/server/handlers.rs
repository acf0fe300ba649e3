//! Route handlers: generation, history, statistics and service info.

use std::sync::Arc;

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use chrono::Utc;
use codegen_core::generation::{GenerationInput, SUPPORTED_LANGUAGES};
use codegen_core::stats::DEFAULT_RECENT_LIMIT;
use serde::Deserialize;
use tracing::{debug, warn};

use super::json_error;
use super::state::AppState;

const SERVICE_NAME: &str = "AI Code Generator";
const API_VERSION: &str = "v1";

/// Fallback handler for unmatched routes.
pub(crate) async fn handle_not_found() -> Response {
    json_error(StatusCode::NOT_FOUND, "not found")
}

/// POST /api/codegen
pub(crate) async fn handle_generate(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<GenerationInput>, JsonRejection>,
) -> Response {
    let Json(input) = match payload {
        Ok(payload) => payload,
        Err(rejection) => {
            warn!("Rejected generation body: {}", rejection.body_text());
            return json_error(rejection.status(), &rejection.body_text());
        }
    };

    match state.orchestrator.handle_request(&input.prompt, &input.language).await {
        Err(e) => {
            warn!("Validation failed: {}", e);
            let body = serde_json::json!({"error": "Validation failed", "fields": e.fields});
            (StatusCode::BAD_REQUEST, Json(body)).into_response()
        }
        Ok(outcome) if outcome.is_success() => (StatusCode::OK, Json(outcome)).into_response(),
        Ok(outcome) => (StatusCode::INTERNAL_SERVER_ERROR, Json(outcome)).into_response(),
    }
}

/// GET /api/codegen/history
pub(crate) async fn handle_all_history(State(state): State<Arc<AppState>>) -> Response {
    Json(state.stats.all_history().await).into_response()
}

#[derive(Debug, Deserialize)]
pub(crate) struct RecentParams {
    limit: Option<String>,
}

/// GET /api/codegen/history/recent?limit=N
pub(crate) async fn handle_recent_history(
    State(state): State<Arc<AppState>>,
    Query(params): Query<RecentParams>,
) -> Response {
    let limit = match params.limit.as_deref().map(str::trim) {
        None | Some("") => DEFAULT_RECENT_LIMIT as i64,
        Some(raw) => match raw.parse::<i64>() {
            Ok(limit) => limit,
            Err(_) => {
                return json_error(
                    StatusCode::BAD_REQUEST,
                    &format!("limit must be an integer, got '{raw}'"),
                );
            }
        },
    };

    Json(state.stats.recent_history(limit).await).into_response()
}

/// GET /api/codegen/history/language/{language}
pub(crate) async fn handle_history_by_language(
    State(state): State<Arc<AppState>>,
    Path(language): Path<String>,
) -> Response {
    if language.trim().is_empty() {
        return json_error(StatusCode::BAD_REQUEST, "language must not be empty");
    }
    Json(state.stats.history_by_language(&language).await).into_response()
}

#[derive(Debug, Deserialize)]
pub(crate) struct SearchParams {
    keyword: Option<String>,
}

/// GET /api/codegen/history/search?keyword=K
pub(crate) async fn handle_search_history(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SearchParams>,
) -> Response {
    let Some(keyword) = params.keyword.filter(|k| !k.trim().is_empty()) else {
        return json_error(StatusCode::BAD_REQUEST, "keyword must not be empty");
    };

    Json(state.stats.search_history(&keyword).await).into_response()
}

/// GET /api/codegen/history/{id}
pub(crate) async fn handle_history_by_id(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Response {
    let Ok(id) = id.parse::<i64>() else {
        return json_error(StatusCode::BAD_REQUEST, &format!("invalid record id '{id}'"));
    };

    match state.stats.history_record(id).await {
        Some(record) => Json(record).into_response(),
        None => json_error(StatusCode::NOT_FOUND, &format!("history record {id} not found")),
    }
}

/// GET /api/codegen/stats
pub(crate) async fn handle_stats(State(state): State<Arc<AppState>>) -> Response {
    Json(state.stats.summary().await).into_response()
}

/// GET /api/codegen/stats/detailed
pub(crate) async fn handle_detailed_stats(State(state): State<Arc<AppState>>) -> Response {
    Json(state.stats.detailed().await).into_response()
}

/// GET /api/codegen/health
///
/// Always 200; a failing database read is reported as DEGRADED.
pub(crate) async fn handle_health(State(state): State<Arc<AppState>>) -> Response {
    let mut health = serde_json::json!({
        "status": "UP",
        "service": SERVICE_NAME,
        "timestamp": Utc::now(),
        "version": env!("CARGO_PKG_VERSION"),
        "generatorConfigured": state.orchestrator.client().is_configured(),
    });

    match state.stats.probe().await {
        Ok(total) => {
            health["database"] = "Connected".into();
            health["totalGenerations"] = total.into();
        }
        Err(e) => {
            warn!("Health check database probe failed: {}", e);
            health["status"] = "DEGRADED".into();
            health["database"] = format!("Error: {e}").into();
        }
    }
    debug!("Health: {}", health["status"]);

    (StatusCode::OK, Json(health)).into_response()
}

/// GET /api/codegen/languages
pub(crate) async fn handle_languages(State(state): State<Arc<AppState>>) -> Response {
    let response = serde_json::json!({
        "supportedLanguages": SUPPORTED_LANGUAGES,
        "count": SUPPORTED_LANGUAGES.len(),
        "usageStatistics": state.stats.language_usage().await,
    });
    Json(response).into_response()
}

/// GET /api/codegen/version
pub(crate) async fn handle_version(State(state): State<Arc<AppState>>) -> Response {
    let response = serde_json::json!({
        "application": SERVICE_NAME,
        "version": env!("CARGO_PKG_VERSION"),
        "buildTime": state.started_at,
        "apiVersion": API_VERSION,
    });
    Json(response).into_response()
}
