//! HTTP handlers for farm settings

use axum::{extract::State, Json};
use serde::Serialize;
use serde_json::{Map, Value};
use shared::FarmSettings;

use crate::error::AppResult;
use crate::AppState;

/// Settings as returned by the API, with the settings document id
#[derive(Debug, Serialize)]
pub struct FarmSettingsResponse {
    pub id: String,
    #[serde(flatten)]
    pub settings: FarmSettings,
}

/// Get the current farm settings
pub async fn get_settings(State(state): State<AppState>) -> Json<FarmSettingsResponse> {
    let settings = state.settings.get_settings().await;
    Json(FarmSettingsResponse {
        id: state.settings.document_id().to_string(),
        settings,
    })
}

/// Replace the farm settings. Omitted fields take their configured defaults.
pub async fn update_settings(
    State(state): State<AppState>,
    Json(fields): Json<Map<String, Value>>,
) -> AppResult<Json<FarmSettingsResponse>> {
    let settings = FarmSettings::from_request(state.settings.defaults(), fields)?;

    let saved = state.settings.update_settings(settings).await?;
    Ok(Json(FarmSettingsResponse {
        id: state.settings.document_id().to_string(),
        settings: saved,
    }))
}
