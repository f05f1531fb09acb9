//! Route handlers grouped by resource

pub mod health;
pub mod logs;
pub mod metrics;
pub mod stored;

use crate::Severity;
use crate::api::error::{ApiError, ApiResult};

fn parse_id(raw: &str) -> ApiResult<u64> {
    raw.parse()
        .map_err(|_| ApiError::InvalidRequest(format!("invalid id: {raw}")))
}

fn parse_type(raw: &str) -> ApiResult<Severity> {
    Ok(raw.parse::<Severity>()?)
}
