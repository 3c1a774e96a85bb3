//! JSON API endpoints

use axum::{
    extract::State,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use cpmi_services::{CacheStats, DashboardSettings, DashboardSnapshot, SettingsUpdate};
use tracing::info;

use super::scheduler_error_response;
use crate::AppState;

/// Create JSON API routes (mounted under `/api`)
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/dashboard", get(get_dashboard))
        .route("/refresh", post(refresh))
        .route("/settings", get(get_settings).post(update_settings))
        .route("/cache/stats", get(cache_stats))
}

/// Latest published snapshot
async fn get_dashboard(State(state): State<AppState>) -> Json<DashboardSnapshot> {
    Json(state.scheduler.snapshot())
}

/// Manual refresh: invalidates the cache and returns the new snapshot
async fn refresh(State(state): State<AppState>) -> Response {
    info!("Manual refresh requested");

    match state.scheduler.refresh().await {
        Ok(snapshot) => Json(snapshot).into_response(),
        Err(e) => scheduler_error_response(e),
    }
}

async fn get_settings(State(state): State<AppState>) -> Json<DashboardSettings> {
    Json(state.scheduler.settings())
}

async fn update_settings(
    State(state): State<AppState>,
    Json(update): Json<SettingsUpdate>,
) -> Response {
    match state.scheduler.update_settings(update).await {
        Ok(snapshot) => Json(snapshot).into_response(),
        Err(e) => scheduler_error_response(e),
    }
}

async fn cache_stats(State(state): State<AppState>) -> Json<CacheStats> {
    Json(state.scheduler.scheduler().cache().stats().await)
}
