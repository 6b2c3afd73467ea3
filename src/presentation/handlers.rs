// HTTP request handlers
use crate::application::scheduler::SchedulerSnapshot;
use crate::domain::query::{RefreshQuery, TimeWindow};
use crate::infrastructure::headless_widgets::{ChartView, MapView, TableView};
use crate::presentation::app_state::AppState;
use crate::presentation::error::ApiError;
use axum::{
    extract::State,
    http::StatusCode,
    response::sse::{Event, KeepAlive, Sse},
    Json,
};
use futures::stream::Stream;
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;

#[derive(Serialize)]
pub struct ViewsResponse {
    pub map: MapView,
    pub chart: ChartView,
    pub table: TableView,
}

#[derive(Serialize)]
pub struct StatusResponse {
    pub message: String,
    pub pulsing: bool,
    pub scheduler: SchedulerSnapshot,
    pub query: RefreshQuery,
}

#[derive(Serialize)]
pub struct AutoRefreshResponse {
    pub enabled: bool,
}

#[derive(Deserialize)]
pub struct QueryUpdate {
    pub time_window: String,
    pub min_magnitude: String,
}

/// Health check endpoint
pub async fn health_check() -> &'static str {
    "ok"
}

/// Everything currently drawn on the map, chart and table
pub async fn get_views(State(state): State<Arc<AppState>>) -> Json<ViewsResponse> {
    Json(ViewsResponse {
        map: state.map.snapshot(),
        chart: state.chart.snapshot(),
        table: state.table.snapshot(),
    })
}

pub async fn get_status(State(state): State<Arc<AppState>>) -> Json<StatusResponse> {
    Json(StatusResponse {
        message: state.status.message(),
        pulsing: state.status.is_pulsing(),
        scheduler: state.refresh.snapshot(),
        query: state.controls.borrow().clone(),
    })
}

/// Status messages as Server-Sent Events
pub async fn stream_status(
    State(state): State<Arc<AppState>>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let mut rx = state.status.subscribe();

    let stream = async_stream::stream! {
        loop {
            match rx.recv().await {
                Ok(message) => yield Ok(Event::default().data(message)),
                Err(RecvError::Lagged(skipped)) => {
                    tracing::debug!("Status stream lagged, skipped {} messages", skipped);
                }
                Err(RecvError::Closed) => break,
            }
        }
    };

    Sse::new(stream).keep_alive(KeepAlive::default())
}

/// Manual refresh trigger
pub async fn trigger_refresh(State(state): State<Arc<AppState>>) -> Result<StatusCode, ApiError> {
    state.refresh.refresh().await?;
    Ok(StatusCode::ACCEPTED)
}

pub async fn toggle_auto_refresh(
    State(state): State<Arc<AppState>>,
) -> Result<Json<AutoRefreshResponse>, ApiError> {
    let enabled = state.refresh.toggle_auto_refresh().await?;
    Ok(Json(AutoRefreshResponse { enabled }))
}

/// Selector change: store the new controls and refresh with them
pub async fn update_query(
    State(state): State<Arc<AppState>>,
    Json(update): Json<QueryUpdate>,
) -> Result<(StatusCode, Json<RefreshQuery>), ApiError> {
    if update.min_magnitude.trim().is_empty() {
        return Err(ApiError::InvalidQuery("min_magnitude must not be empty".to_string()));
    }

    let query = RefreshQuery::new(TimeWindow::parse(&update.time_window), update.min_magnitude);
    state.controls.send_replace(query.clone());
    state.refresh.refresh().await?;

    Ok((StatusCode::ACCEPTED, Json(query)))
}
