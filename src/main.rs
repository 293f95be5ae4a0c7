// Main entry point - Dependency injection and server setup
mod domain;
mod application;
mod infrastructure;
mod presentation;

use std::{net::SocketAddr, sync::Arc, time::Duration};
use anyhow::Context;
use axum::{
    Router,
    routing::{get, post, put},
};
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use crate::application::config_store::ConfigStore;
use crate::application::controller::DashboardController;
use crate::infrastructure::config::load_monitor_config;
use crate::infrastructure::json_config_store::JsonConfigStore;
use crate::infrastructure::rest_source::RestReadingSource;
use crate::presentation::app_state::AppState;
use crate::presentation::handlers::{
    get_chart, get_config, get_dashboard, health_check, post_chart_event, post_chart_reset,
    post_refresh, put_config, put_span, stream_dashboard,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Load configuration
    let monitor_config = load_monitor_config()?;

    // Saved connection settings (infrastructure layer)
    let store = Arc::new(JsonConfigStore::new(monitor_config.storage.path.clone()));
    tracing::info!("Using configuration store {}", store.path().display());
    let connection = match store.load().await {
        Ok(Some(config)) => config,
        Ok(None) => {
            tracing::info!("No saved connection configuration, starting in simulation mode");
            Default::default()
        }
        Err(e) => {
            tracing::warn!("Could not read saved configuration: {:#}", e);
            Default::default()
        }
    };

    let source = Arc::new(RestReadingSource::new(Duration::from_secs(
        monitor_config.source.timeout_secs,
    ))?);

    // Start the acquisition controller (application layer)
    let controller = DashboardController::spawn(
        source,
        store,
        connection,
        monitor_config.chart.default_span,
    );

    // Create application state
    let state = Arc::new(AppState::new(controller, monitor_config.chart.color.clone()));

    // Build router (presentation layer)
    // Compression is applied per response, so no CompressionLayer here.
    let router = Router::new()
        .route("/healthz", get(health_check))
        .route("/dashboard", get(get_dashboard))
        .route("/dashboard/stream", get(stream_dashboard))
        .route("/config", get(get_config).put(put_config))
        .route("/span", put(put_span))
        .route("/refresh", post(post_refresh))
        .route("/chart.svg", get(get_chart))
        .route("/chart/events", post(post_chart_event))
        .route("/chart/reset", post(post_chart_reset))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    // Start server
    let addr: SocketAddr = monitor_config
        .server
        .bind
        .parse()
        .with_context(|| format!("Invalid bind address {}", monitor_config.server.bind))?;
    tracing::info!("Starting gas-sensor-monitor on {}", addr);

    axum::serve(tokio::net::TcpListener::bind(addr).await?, router).await?;

    Ok(())
}
