//! Check history endpoint

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::api::{error::ApiError, routes::ApiState};
use crate::domain::LogEntry;

/// Number of entries shown on the dashboard.
pub const RECENT_LOG_LIMIT: u32 = 10;

#[derive(Debug, Serialize, Deserialize)]
pub struct LogsResponse {
    pub logs: Vec<LogEntry>,
}

/// Return the most recent check outcomes, newest first.
#[instrument(skip(state), name = "list_check_logs")]
pub async fn list_logs_handler(
    State(state): State<ApiState>,
) -> Result<Json<LogsResponse>, ApiError> {
    let logs = state.logs.recent(RECENT_LOG_LIMIT).await?;
    Ok(Json(LogsResponse { logs }))
}
