//! Farm Weather service
//!
//! Periodically fetches current conditions for a configured farm location,
//! stores normalized observations and serves them with farming
//! recommendations over HTTP.

use std::sync::Arc;

use axum::{routing::get, Router};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

pub mod config;
pub mod error;
pub mod external;
pub mod handlers;
pub mod routes;
pub mod scheduler;
pub mod services;
pub mod store;

pub use config::Config;

use crate::external::WeatherProvider;
use crate::services::{FarmSettingsService, RecommendationService, WeatherPipeline};
use crate::store::DocumentStore;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<WeatherPipeline>,
    pub settings: FarmSettingsService,
    pub store: Arc<dyn DocumentStore>,
    pub config: Arc<Config>,
}

impl AppState {
    /// Wire the services over a store and a weather provider
    pub fn new(
        config: Config,
        store: Arc<dyn DocumentStore>,
        provider: Arc<dyn WeatherProvider>,
    ) -> Self {
        let settings = FarmSettingsService::new(
            Arc::clone(&store),
            config.store.settings_collection.clone(),
            config.store.settings_document_id.clone(),
            config.farm.to_settings(),
        );
        let recommendations = RecommendationService::new(
            Arc::clone(&store),
            config.store.recommendations_collection.clone(),
        );
        let pipeline = WeatherPipeline::new(
            Arc::clone(&store),
            provider,
            settings.clone(),
            recommendations,
            config.store.weather_collection.clone(),
        )
        .with_single_flight(config.weather.single_flight);

        Self {
            pipeline: Arc::new(pipeline),
            settings,
            store,
            config: Arc::new(config),
        }
    }
}

/// Create the application router with all routes and middleware
pub fn create_app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(root))
        .route("/health", get(handlers::health_check))
        .nest("/api", routes::api_routes())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Root endpoint
async fn root() -> &'static str {
    "Welcome to the Farm Weather API!"
}
