//! HTTP handlers

pub mod health;
pub mod settings;
pub mod weather;

pub use health::health_check;
pub use settings::{get_settings, update_settings};
pub use weather::{get_current_weather, get_weather_history};
