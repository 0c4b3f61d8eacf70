//! Weather record models

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::ConditionCategory;

/// Where an observation was taken
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Location {
    pub lat: Decimal,
    pub lon: Decimal,
    pub name: String,
}

/// Sunrise and sunset for the observation day
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SunTimes {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sunrise: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sunset: Option<DateTime<Utc>>,
}

/// Canonical weather observation, as written to the store.
///
/// Measurements the provider did not report are `None` and are left out of
/// the stored document entirely.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WeatherObservation {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub humidity: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wind_speed: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wind_gust: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wind_direction: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pressure: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visibility: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feels_like: Option<Decimal>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub icon: String,
    pub location: Location,
    #[serde(default)]
    pub sun: SunTimes,
    /// When the observation was normalized
    pub timestamp: DateTime<Utc>,
    /// Category assigned when the observation was written
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<ConditionCategory>,
}

impl WeatherObservation {
    /// Classify this observation from its own measurements
    pub fn classify(&self) -> ConditionCategory {
        ConditionCategory::classify(self.temperature, self.humidity, self.wind_speed)
    }
}

/// A persisted observation with store-assigned metadata
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WeatherRecord {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(flatten)]
    pub observation: WeatherObservation,
}

/// A record paired with the recommendations computed for it
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CombinedResult {
    pub weather: WeatherRecord,
    pub recommendations: Vec<String>,
}

/// One page of stored records, most recent first
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WeatherHistory {
    pub total: u64,
    pub documents: Vec<WeatherRecord>,
}
