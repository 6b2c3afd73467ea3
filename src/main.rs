// Main entry point - Dependency injection and server setup
mod application;
mod domain;
mod infrastructure;
mod presentation;

use std::{net::SocketAddr, sync::Arc};
use anyhow::Context;
use axum::{
    routing::{get, post, put},
    Router,
};
use tokio::sync::watch;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use crate::application::pipeline::PipelineState;
use crate::application::scheduler::RefreshScheduler;
use crate::application::sinks::{ChartSink, MapSink, TableSink};
use crate::infrastructure::config::load_app_config;
use crate::infrastructure::headless_widgets::{HeadlessChart, HeadlessMap, HeadlessTable};
use crate::infrastructure::status_board::StatusBoard;
use crate::infrastructure::usgs_client::UsgsFeedClient;
use crate::presentation::app_state::AppState;
use crate::presentation::handlers::{
    get_status, get_views, health_check, stream_status, toggle_auto_refresh, trigger_refresh,
    update_query,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("quake_watch=info,tower_http=info")),
        )
        .init();

    // Load configuration
    let app_config = load_app_config()?;

    // Feed client (infrastructure layer)
    let feed = Arc::new(UsgsFeedClient::new(
        app_config.feed.url_template.clone(),
        app_config.feed.timeout(),
    )?);

    // Views and the pipeline that owns them
    let map = HeadlessMap::new();
    let chart = HeadlessChart::new();
    let table = HeadlessTable::new();
    let pipeline = PipelineState::new(
        MapSink::new(Box::new(map.clone())),
        ChartSink::new(Box::new(chart.clone())),
        TableSink::new(Box::new(table.clone())),
    );

    // Scheduler (application layer)
    let status = Arc::new(StatusBoard::new());
    let (controls, query_rx) = watch::channel(app_config.refresh.initial_query());
    let (refresh, scheduler_task) = RefreshScheduler::spawn(
        feed,
        status.clone(),
        query_rx,
        app_config.refresh.interval(),
        pipeline,
    );

    if app_config.refresh.fetch_on_startup {
        refresh.refresh().await?;
    }

    let state = Arc::new(AppState {
        refresh: refresh.clone(),
        controls,
        status,
        map,
        chart,
        table,
    });

    // Build router (presentation layer)
    let router = Router::new()
        .route("/healthz", get(health_check))
        .route("/views", get(get_views))
        .route("/status", get(get_status))
        .route("/status/stream", get(stream_status))
        .route("/refresh", post(trigger_refresh))
        .route("/auto-refresh", post(toggle_auto_refresh))
        .route("/query", put(update_query))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    // Start server
    let addr: SocketAddr = app_config
        .server
        .bind
        .parse()
        .with_context(|| format!("Invalid bind address {}", app_config.server.bind))?;
    tracing::info!("Starting quake-watch on {}", addr);

    axum::serve(tokio::net::TcpListener::bind(addr).await?, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // Stop scheduling and release every rendered view
    if refresh.shutdown().await.is_err() {
        tracing::warn!("Refresh scheduler had already stopped");
    }
    let pipeline = scheduler_task.await?;
    pipeline.teardown();

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
}
