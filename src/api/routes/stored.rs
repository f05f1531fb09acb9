//! Pinned subset endpoints

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};

use super::{parse_id, parse_type};
use crate::LogEvent;
use crate::api::{error::ApiResult, state::ApiState, types::CountResponse};

/// GET /stored
pub async fn list_stored(State(state): State<ApiState>) -> Json<Vec<LogEvent>> {
    Json(state.events.list_pinned().await)
}

/// GET /stored/id/:id
pub async fn get_stored(
    State(state): State<ApiState>,
    Path(id): Path<String>,
) -> ApiResult<Json<LogEvent>> {
    let id = parse_id(&id)?;
    Ok(Json(state.events.get_pinned_by_id(id).await?))
}

/// GET /stored/type/:type
pub async fn get_stored_by_type(
    State(state): State<ApiState>,
    Path(log_type): Path<String>,
) -> ApiResult<Json<Vec<LogEvent>>> {
    let severity = parse_type(&log_type)?;
    Ok(Json(state.events.get_pinned_by_severity(severity).await))
}

/// POST /stored/id/:id
pub async fn pin_log(
    State(state): State<ApiState>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    let id = parse_id(&id)?;
    state.events.pin(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /stored/type/:type
pub async fn pin_by_type(
    State(state): State<ApiState>,
    Path(log_type): Path<String>,
) -> ApiResult<Json<CountResponse>> {
    let severity = parse_type(&log_type)?;
    Ok(Json(CountResponse::Pinned(
        state.events.pin_by_severity(severity).await,
    )))
}

/// DELETE /stored/id/:id
pub async fn unpin_log(
    State(state): State<ApiState>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    let id = parse_id(&id)?;
    state.events.unpin(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /stored/type/:type
pub async fn unpin_by_type(
    State(state): State<ApiState>,
    Path(log_type): Path<String>,
) -> ApiResult<Json<CountResponse>> {
    let severity = parse_type(&log_type)?;
    Ok(Json(CountResponse::Removed(
        state.events.unpin_by_severity(severity).await,
    )))
}
