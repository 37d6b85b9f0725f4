//! Connectivity check endpoints
//!
//! Each endpoint starts from the stored settings, applies any overrides found
//! in the request body, and runs the check. External failures come back as a
//! 200 with `ok: false`; only storage failures produce an error response.

use axum::{body::Bytes, extract::State, Json};
use tracing::instrument;

use crate::api::{error::ApiError, routes::ApiState};
use crate::domain::{
    AdminSettings, CombinedCheckResult, DatabaseCheckResult, SearchCheckResult, SettingsPatch,
};
use crate::services::Recording;

async fn effective_settings(state: &ApiState, body: &[u8]) -> Result<AdminSettings, ApiError> {
    let overrides = SettingsPatch::from_body(body);
    Ok(state.settings.get().await?.with_overrides(&overrides))
}

/// Run the database check. Accepts `databaseName` and `databaseTables` overrides.
#[instrument(skip(state, body), name = "test_database")]
pub async fn test_database_handler(
    State(state): State<ApiState>,
    body: Bytes,
) -> Result<Json<DatabaseCheckResult>, ApiError> {
    let settings = effective_settings(&state, &body).await?;
    let result = state
        .connectivity
        .run_database_check(
            &settings.database_name,
            &settings.database_tables,
            Recording::Record,
        )
        .await?;
    Ok(Json(result))
}

/// Run the search check. Accepts a `searchIndexName` override.
#[instrument(skip(state, body), name = "test_search")]
pub async fn test_search_handler(
    State(state): State<ApiState>,
    body: Bytes,
) -> Result<Json<SearchCheckResult>, ApiError> {
    let settings = effective_settings(&state, &body).await?;
    let result =
        state.connectivity.run_search_check(&settings.search_index_name, Recording::Record).await?;
    Ok(Json(result))
}

/// Run both checks and record one combined entry.
#[instrument(skip(state, body), name = "test_all")]
pub async fn test_all_handler(
    State(state): State<ApiState>,
    body: Bytes,
) -> Result<Json<CombinedCheckResult>, ApiError> {
    let settings = effective_settings(&state, &body).await?;
    let result = state.connectivity.run_all(&settings).await?;
    Ok(Json(result))
}
