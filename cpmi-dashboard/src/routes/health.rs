//! Health check endpoints

use axum::{extract::State, http::StatusCode, response::Json, routing::get, Router};
use cpmi_services::SchedulerState;
use serde::Serialize;

use crate::AppState;

/// Health check response
#[derive(Debug, Serialize)]
struct HealthResponse {
    status: String,
    upstream: UpstreamHealth,
    scheduler: SchedulerState,
    cycle: u64,
}

#[derive(Debug, Serialize)]
struct UpstreamHealth {
    base_url: String,
    reachable: bool,
}

/// Health check handler. The upstream check goes through the cache, so it
/// is issued at most once per health TTL.
async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let base_url = state.scheduler.settings().base_url;
    let reachable = state.scheduler.scheduler().cache().health(&base_url).await;
    let snapshot = state.scheduler.snapshot();

    let (status, code) = if reachable {
        ("healthy", StatusCode::OK)
    } else {
        ("degraded", StatusCode::SERVICE_UNAVAILABLE)
    };

    let response = HealthResponse {
        status: status.to_string(),
        upstream: UpstreamHealth {
            base_url,
            reachable,
        },
        scheduler: snapshot.state,
        cycle: snapshot.cycle,
    };

    (code, Json(response))
}

/// Simple liveness check (always returns OK if server is running)
async fn liveness() -> &'static str {
    "OK"
}

/// Create health routes
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health_check))
        .route("/health/live", get(liveness))
}
