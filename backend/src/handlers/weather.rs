//! HTTP handlers for weather data

use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;
use shared::{CombinedResult, PageRequest, WeatherHistory};

use crate::error::{AppError, AppResult};
use crate::AppState;

/// Query parameters for weather history, parsed by the handler so that a
/// bad value is reported against its own name
#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    pub limit: Option<String>,
    pub offset: Option<String>,
}

fn page_param(field: &str, raw: Option<&str>, default: u32) -> AppResult<u32> {
    match raw {
        None => Ok(default),
        Some(value) => value.trim().parse().map_err(|_| AppError::Validation {
            field: field.to_string(),
            message: format!("{} must be a non-negative whole number", field),
        }),
    }
}

/// Latest weather with recommendations. When nothing is stored yet, an
/// update cycle runs on demand.
pub async fn get_current_weather(State(state): State<AppState>) -> AppResult<Json<CombinedResult>> {
    match state.pipeline.get_latest().await {
        Ok(result) => Ok(Json(result)),
        Err(AppError::NotFound(_)) => {
            tracing::info!("No stored weather data, running an update");
            match state.pipeline.run_update_cycle().await {
                Ok(result) => Ok(Json(result)),
                Err(e) => {
                    tracing::warn!("On-demand weather update failed: {}", e);
                    Err(AppError::NotFound("Weather data".to_string()))
                }
            }
        }
        Err(e) => Err(e),
    }
}

/// Stored weather records, most recent first
pub async fn get_weather_history(
    State(state): State<AppState>,
    Query(query): Query<HistoryQuery>,
) -> AppResult<Json<WeatherHistory>> {
    let page = PageRequest {
        limit: page_param("limit", query.limit.as_deref(), PageRequest::DEFAULT_LIMIT)?,
        offset: page_param("offset", query.offset.as_deref(), 0)?,
    };
    let history = state.pipeline.get_history(page).await?;
    Ok(Json(history))
}
