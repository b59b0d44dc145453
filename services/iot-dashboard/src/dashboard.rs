//! Web dashboard with HTML page and JSON API endpoints

use std::time::Duration;

use axum::extract::State;
use axum::response::{Html, IntoResponse};
use axum::routing::get;
use axum::Router;

use crate::state::StateHandle;
use crate::view::{DashboardView, TemperatureChart};

/// Dashboard application state
#[derive(Clone)]
pub struct AppState {
    pub state: StateHandle,
    pub retain_on_error: bool,
    pub refresh: Duration,
}

/// Build the dashboard axum router
pub fn build_router(state: StateHandle, retain_on_error: bool, refresh: Duration) -> Router {
    let app_state = AppState {
        state,
        retain_on_error,
        refresh,
    };

    Router::new()
        .route("/", get(index_handler))
        .route("/api/view", get(view_handler))
        .route("/api/devices", get(devices_handler))
        .route("/api/temperature", get(temperature_handler))
        .route("/api/status", get(status_handler))
        .route("/health", get(health_handler))
        .with_state(app_state)
}

async fn current_view(dashboard: &AppState) -> DashboardView {
    let state = dashboard.state.read().await;
    DashboardView::from_state(&state, dashboard.retain_on_error)
}

async fn index_handler(State(dashboard): State<AppState>) -> impl IntoResponse {
    let view = current_view(&dashboard).await;
    Html(crate::render::render_page(&view, dashboard.refresh))
}

async fn view_handler(State(dashboard): State<AppState>) -> impl IntoResponse {
    axum::Json(current_view(&dashboard).await)
}

async fn devices_handler(State(dashboard): State<AppState>) -> impl IntoResponse {
    let state = dashboard.state.read().await;
    axum::Json(state.readings.clone())
}

async fn temperature_handler(State(dashboard): State<AppState>) -> impl IntoResponse {
    let state = dashboard.state.read().await;
    axum::Json(TemperatureChart::from_readings(&state.readings))
}

async fn status_handler(State(dashboard): State<AppState>) -> impl IntoResponse {
    let state = dashboard.state.read().await;

    axum::Json(serde_json::json!({
        "phase": state.phase(),
        "error": state.error,
        "device_count": state.readings.len(),
        "last_success_epoch_ms": state.last_success_epoch_ms,
        "last_attempt_epoch_ms": state.last_attempt_epoch_ms,
        "consecutive_failures": state.consecutive_failures,
    }))
}

async fn health_handler() -> impl IntoResponse {
    "OK"
}
