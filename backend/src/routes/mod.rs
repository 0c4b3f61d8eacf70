//! Route definitions for the Farm Weather API

use axum::{routing::get, Router};

use crate::{handlers, AppState};

/// Create API routes
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/settings",
            get(handlers::get_settings).post(handlers::update_settings),
        )
        .nest("/weather", weather_routes())
}

fn weather_routes() -> Router<AppState> {
    Router::new()
        .route("/current", get(handlers::get_current_weather))
        .route("/history", get(handlers::get_weather_history))
}
