// HTTP request handlers
use crate::domain::connection::ConnectionConfig;
use crate::domain::reading::Span;
use crate::infrastructure::http_response::{
    CONTENT_TYPE_SVG, accepts_brotli, encoded_response, json_response,
};
use crate::infrastructure::snapshot_stream::stream_from_watch;
use crate::presentation::app_state::AppState;
use crate::presentation::chart::interaction::GestureEvent;
use crate::presentation::chart::session::{ChartSession, ChartView};
use crate::presentation::chart::svg::scene_to_svg;
use axum::{
    Json,
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
};
use serde::Deserialize;
use std::sync::{Arc, MutexGuard};

#[derive(Deserialize)]
pub struct ChartQuery {
    pub width: Option<f64>,
}

#[derive(Deserialize)]
pub struct SpanRequest {
    pub span: Span,
}

/// Health check endpoint
pub async fn health_check() -> &'static str {
    "ok"
}

/// Current dashboard snapshot
pub async fn get_dashboard(
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    let compress = accepts_brotli(&headers);
    let snapshot = state.controller.snapshot();

    match json_response(&*snapshot, compress).await {
        Ok(response) => response,
        Err(status) => status.into_response(),
    }
}

/// Stream every snapshot as it is published
pub async fn stream_dashboard(
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    let compress = accepts_brotli(&headers);
    stream_from_watch(state.controller.subscribe(), compress)
}

pub async fn get_config(State(state): State<Arc<AppState>>) -> Json<ConnectionConfig> {
    Json(state.controller.config())
}

pub async fn put_config(
    State(state): State<Arc<AppState>>,
    Json(config): Json<ConnectionConfig>,
) -> Result<Json<ConnectionConfig>, (StatusCode, String)> {
    match state.controller.save_config(config).await {
        Ok(saved) => Ok(Json(saved)),
        Err(e) => {
            tracing::error!("Error saving configuration: {:#}", e);
            Err((StatusCode::INTERNAL_SERVER_ERROR, format!("{:#}", e)))
        }
    }
}

pub async fn put_span(
    State(state): State<Arc<AppState>>,
    Json(request): Json<SpanRequest>,
) -> StatusCode {
    match state.controller.select_span(request.span).await {
        Ok(()) => StatusCode::ACCEPTED,
        Err(e) => {
            tracing::error!("Error selecting span: {:#}", e);
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}

/// Manual retry after a failed load
pub async fn post_refresh(State(state): State<Arc<AppState>>) -> StatusCode {
    match state.controller.retry().await {
        Ok(()) => StatusCode::ACCEPTED,
        Err(e) => {
            tracing::error!("Error requesting refresh: {:#}", e);
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}

/// Render the chart for the current snapshot as SVG
pub async fn get_chart(
    Query(query): Query<ChartQuery>,
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    let compress = accepts_brotli(&headers);
    let snapshot = state.controller.snapshot();

    let svg = {
        let mut chart = lock_chart(&state);
        if let Some(width) = query.width {
            chart.resize(width);
        }
        let scene = chart.render(snapshot.readings.readings(), &state.chart_color);
        scene_to_svg(&scene)
    };

    match encoded_response(svg.into_bytes(), CONTENT_TYPE_SVG, compress).await {
        Ok(response) => response,
        Err(status) => status.into_response(),
    }
}

/// Apply one pointer, touch or wheel event to the chart
pub async fn post_chart_event(
    State(state): State<Arc<AppState>>,
    Json(event): Json<GestureEvent>,
) -> Json<ChartView> {
    let count = state.controller.snapshot().readings.len();
    let view = lock_chart(&state).apply(&event, count);
    Json(view)
}

pub async fn post_chart_reset(State(state): State<Arc<AppState>>) -> Json<ChartView> {
    let count = state.controller.snapshot().readings.len();
    let mut chart = lock_chart(&state);
    chart.reset();
    Json(chart.view(count))
}

fn lock_chart(state: &AppState) -> MutexGuard<'_, ChartSession> {
    // Chart state stays usable even if a previous holder panicked.
    state
        .chart
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}
