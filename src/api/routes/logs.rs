//! Event history endpoints

use axum::{
    Json,
    extract::{Path, State},
};

use super::{parse_id, parse_type};
use crate::LogEvent;
use crate::api::{error::ApiResult, state::ApiState};

/// GET /logs
pub async fn list_logs(State(state): State<ApiState>) -> Json<Vec<LogEvent>> {
    Json(state.events.list_all().await)
}

/// GET /logs/id/:id
pub async fn get_log(
    State(state): State<ApiState>,
    Path(id): Path<String>,
) -> ApiResult<Json<LogEvent>> {
    let id = parse_id(&id)?;
    Ok(Json(state.events.get_by_id(id).await?))
}

/// GET /logs/type/:type
///
/// Matching is case-insensitive; an unknown type is a 400, no match is `[]`.
pub async fn get_logs_by_type(
    State(state): State<ApiState>,
    Path(log_type): Path<String>,
) -> ApiResult<Json<Vec<LogEvent>>> {
    let severity = parse_type(&log_type)?;
    Ok(Json(state.events.get_by_severity(severity).await))
}
