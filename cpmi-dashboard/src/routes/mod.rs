//! Route definitions

mod api;
mod dashboard;
mod health;

use axum::{
    http::{header, Method, StatusCode},
    response::{IntoResponse, Response},
    Json, Router,
};
use cpmi_core::CpmiError;
use cpmi_services::SchedulerError;
use serde::Serialize;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::AppState;

/// Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Build the application router with CORS and request tracing
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE]);

    Router::new()
        .merge(dashboard::routes())
        .merge(health::routes())
        .nest("/api", api::routes())
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Status code for a failed scheduler command
fn scheduler_error_status(error: &SchedulerError) -> StatusCode {
    match error {
        SchedulerError::Settings(CpmiError::Config(_)) => StatusCode::BAD_REQUEST,
        SchedulerError::Settings(_) => StatusCode::INTERNAL_SERVER_ERROR,
        SchedulerError::Stopped | SchedulerError::Busy => StatusCode::SERVICE_UNAVAILABLE,
    }
}

fn scheduler_error_response(error: SchedulerError) -> Response {
    (
        scheduler_error_status(&error),
        Json(ErrorResponse {
            error: error.to_string(),
        }),
    )
        .into_response()
}
