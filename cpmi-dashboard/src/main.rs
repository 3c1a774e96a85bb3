//! CPMI Dashboard Server
//!
//! Web dashboard for the Crypto Prediction Market Index. Polls the CPMI API
//! through a TTL cache and serves the rendered page plus a JSON API.

mod config;
mod page;
mod routes;

use cpmi_client::CpmiClient;
use cpmi_services::{FreshnessCache, RefreshScheduler, SchedulerHandle};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::config::DashboardConfig;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub scheduler: SchedulerHandle,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env.local file
    if let Err(e) = dotenvy::from_filename(".env.local") {
        // Not an error if the file doesn't exist
        if !matches!(e, dotenvy::Error::Io(_)) {
            eprintln!("Warning: Failed to load .env.local: {}", e);
        }
    }

    // Initialize logging
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,cpmi_dashboard=debug")),
        )
        .init();

    info!("Starting CPMI Dashboard");

    let config = DashboardConfig::from_env()?;
    info!(
        "CPMI API at {} (auto-refresh {}, every {}s)",
        config.settings.base_url,
        if config.settings.auto_refresh { "on" } else { "off" },
        config.refresh_interval.as_secs()
    );

    let client = CpmiClient::new()?;
    let cache = Arc::new(FreshnessCache::new(Arc::new(client), config.ttls));

    // Runs the startup cycle, then the auto-refresh timer, in the background
    let scheduler = Arc::new(RefreshScheduler::new(
        cache,
        config.settings.clone(),
        config.scheduler_config(),
    ));
    let state = AppState {
        scheduler: scheduler.start(),
    };

    let app = routes::router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    info!("Dashboard listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
