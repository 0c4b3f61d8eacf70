//! Business logic services for the Farm Weather service

pub mod recommendation;
pub mod settings;
pub mod transform;
pub mod weather;

pub use recommendation::RecommendationService;
pub use settings::FarmSettingsService;
pub use transform::{transform_observation, ConditionInputs, TransformError};
pub use weather::WeatherPipeline;
