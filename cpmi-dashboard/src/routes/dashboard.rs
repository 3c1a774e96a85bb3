//! HTML page and its form endpoints

use axum::{
    extract::{Form, State},
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
    Router,
};
use cpmi_services::{SchedulerError, SettingsUpdate};
use serde::Deserialize;
use tracing::{info, warn};

use super::scheduler_error_status;
use crate::page::render_page;
use crate::AppState;

/// Settings form as posted by the sidebar. An unchecked checkbox is
/// simply absent from the body.
#[derive(Debug, Deserialize)]
struct SettingsForm {
    base_url: Option<String>,
    auto_refresh: Option<String>,
}

impl From<SettingsForm> for SettingsUpdate {
    fn from(form: SettingsForm) -> Self {
        SettingsUpdate {
            base_url: form.base_url,
            auto_refresh: Some(form.auto_refresh.is_some()),
        }
    }
}

/// Create page routes
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(index))
        .route("/refresh", post(refresh))
        .route("/settings", post(update_settings))
}

async fn index(State(state): State<AppState>) -> Html<String> {
    Html(render_page(&state.scheduler.snapshot(), None))
}

async fn refresh(State(state): State<AppState>) -> Response {
    info!("Manual refresh requested from page");

    match state.scheduler.refresh().await {
        Ok(_) => Redirect::to("/").into_response(),
        Err(e) => error_page(&state, e),
    }
}

async fn update_settings(State(state): State<AppState>, Form(form): Form<SettingsForm>) -> Response {
    match state.scheduler.update_settings(form.into()).await {
        Ok(_) => Redirect::to("/").into_response(),
        Err(e) => error_page(&state, e),
    }
}

/// Re-render the page with the error above the current content
fn error_page(state: &AppState, error: SchedulerError) -> Response {
    warn!("Dashboard form request failed: {}", error);
    let html = render_page(&state.scheduler.snapshot(), Some(&error.to_string()));
    (scheduler_error_status(&error), Html(html)).into_response()
}
