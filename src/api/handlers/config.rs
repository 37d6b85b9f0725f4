//! Admin settings endpoints

use axum::{body::Bytes, extract::State, Json};
use tracing::{info, instrument};

use crate::api::{error::ApiError, routes::ApiState};
use crate::domain::{AdminSettings, SettingsPatch};

/// Return the stored settings, with defaults for anything never saved.
#[instrument(skip(state), name = "get_admin_config")]
pub async fn get_config_handler(
    State(state): State<ApiState>,
) -> Result<Json<AdminSettings>, ApiError> {
    let settings = state.settings.get().await?;
    Ok(Json(settings))
}

/// Merge a partial settings body and return the full settings.
///
/// Only string-valued `databaseName`, `databaseTables` and `searchIndexName`
/// are taken; an unreadable body updates nothing.
#[instrument(skip(state, body), name = "update_admin_config")]
pub async fn update_config_handler(
    State(state): State<ApiState>,
    body: Bytes,
) -> Result<Json<AdminSettings>, ApiError> {
    let patch = SettingsPatch::from_body(&body);

    let settings = if patch.is_empty() {
        state.settings.get().await?
    } else {
        let settings = state.settings.merge(&patch).await?;
        info!(fields = patch.entries().len(), "Admin settings updated");
        settings
    };

    Ok(Json(settings))
}
