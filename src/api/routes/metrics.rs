//! Metric window endpoints

use std::time::Duration;

use axum::{
    Json,
    extract::{Path, State},
};
use serde_json::{Value, json};

use crate::MetricSample;
use crate::api::{
    error::{ApiError, ApiResult},
    state::ApiState,
};

/// GET /metrics/cpu
pub async fn cpu_usage(State(state): State<ApiState>) -> Json<Value> {
    let sample = state.metrics.latest().await;
    Json(json!({ "cpu_usage": sample.cpu_percent }))
}

/// GET /metrics/ram
pub async fn ram_usage(State(state): State<ApiState>) -> Json<Value> {
    let sample = state.metrics.latest().await;
    Json(json!({ "ram_usage": sample.ram_percent }))
}

/// GET /metrics/disk
pub async fn disk_usage(State(state): State<ApiState>) -> Json<Value> {
    let sample = state.metrics.latest().await;
    Json(json!({ "disk_usage": sample.disk_percent }))
}

/// GET /metrics/temperature
pub async fn temperature(State(state): State<ApiState>) -> Json<Value> {
    let sample = state.metrics.latest().await;
    Json(json!({ "temperature": sample.temperature_celsius }))
}

/// GET /metrics/current
pub async fn current(State(state): State<ApiState>) -> Json<MetricSample> {
    Json(state.metrics.latest().await)
}

/// Window length from a (possibly fractional) number of minutes
fn parse_minutes(raw: &str) -> ApiResult<Duration> {
    raw.parse::<f64>()
        .ok()
        .filter(|minutes| minutes.is_finite() && *minutes >= 0.0)
        .and_then(|minutes| Duration::try_from_secs_f64(minutes * 60.0).ok())
        .ok_or_else(|| ApiError::InvalidRequest(format!("invalid minutes parameter: {raw}")))
}

/// GET /metrics/average/:minutes
pub async fn average(
    State(state): State<ApiState>,
    Path(minutes): Path<String>,
) -> ApiResult<Json<MetricSample>> {
    let window = parse_minutes(&minutes)?;
    Ok(Json(state.metrics.average_over(window).await))
}
