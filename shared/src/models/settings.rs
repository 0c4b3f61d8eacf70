//! Farm settings model

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::types::{GpsCoordinates, Units};
use crate::validation::FieldError;

type FieldCheck = fn(&Value) -> bool;

/// Accepted JSON shape of each settings field
const FIELD_SHAPES: [(&str, &str, FieldCheck); 6] = [
    ("units", "Units must be one of metric, imperial or standard", |v| {
        Units::deserialize(v).is_ok()
    }),
    ("update_frequency", "Update frequency must be a whole number of minutes", |v| {
        u32::deserialize(v).is_ok()
    }),
    ("farm_latitude", "Latitude must be a number", |v| {
        rust_decimal::serde::float::deserialize(v).is_ok()
    }),
    ("farm_longitude", "Longitude must be a number", |v| {
        rust_decimal::serde::float::deserialize(v).is_ok()
    }),
    ("extreme_weather_alerts", "Extreme weather alerts must be true or false", |v| {
        bool::deserialize(v).is_ok()
    }),
    ("daily_report", "Daily report must be true or false", |v| {
        bool::deserialize(v).is_ok()
    }),
];

/// Farm configuration, one instance per deployment
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FarmSettings {
    /// Unit system for observations
    pub units: Units,
    /// Minutes between scheduled weather updates
    pub update_frequency: u32,
    #[serde(with = "rust_decimal::serde::float")]
    pub farm_latitude: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub farm_longitude: Decimal,
    pub extreme_weather_alerts: bool,
    pub daily_report: bool,
}

impl Default for FarmSettings {
    fn default() -> Self {
        Self {
            units: Units::Metric,
            update_frequency: 30,
            // Porto, Portugal
            farm_latitude: Decimal::new(411579, 4),
            farm_longitude: Decimal::new(-86291, 4),
            extreme_weather_alerts: false,
            daily_report: false,
        }
    }
}

impl FarmSettings {
    pub fn coordinates(&self) -> GpsCoordinates {
        GpsCoordinates::new(self.farm_latitude, self.farm_longitude)
    }

    /// Build settings from a possibly partial set of fields, taking every
    /// missing field from `defaults`.
    pub fn from_partial(
        defaults: &FarmSettings,
        fields: Map<String, Value>,
    ) -> Result<FarmSettings, serde_json::Error> {
        let mut merged = match serde_json::to_value(defaults)? {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        for (key, value) in fields {
            if merged.contains_key(&key) {
                merged.insert(key, value);
            }
        }
        serde_json::from_value(Value::Object(merged))
    }

    /// Build settings from a request body, naming the first field whose
    /// value has the wrong shape. Unknown keys are ignored.
    pub fn from_request(
        defaults: &FarmSettings,
        fields: Map<String, Value>,
    ) -> Result<FarmSettings, FieldError> {
        for (field, message, accepts) in FIELD_SHAPES {
            if let Some(value) = fields.get(field) {
                if !accepts(value) {
                    return Err(FieldError::new(field, message));
                }
            }
        }

        Self::from_partial(defaults, fields)
            .map_err(|_| FieldError::new("body", "Settings body could not be read"))
    }

    /// Field map as written to the document store
    pub fn to_fields(&self) -> Result<Map<String, Value>, serde_json::Error> {
        match serde_json::to_value(self)? {
            Value::Object(map) => Ok(map),
            _ => Ok(Map::new()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::str::FromStr;

    #[test]
    fn test_default_settings() {
        let settings = FarmSettings::default();
        assert_eq!(settings.farm_latitude, Decimal::from_str("41.1579").unwrap());
        assert_eq!(settings.farm_longitude, Decimal::from_str("-8.6291").unwrap());
        assert_eq!(settings.units, Units::Metric);
        assert_eq!(settings.update_frequency, 30);
        assert!(!settings.extreme_weather_alerts);
        assert!(!settings.daily_report);
    }

    #[test]
    fn test_coordinates_serialize_as_numbers() {
        let value = serde_json::to_value(FarmSettings::default()).unwrap();
        assert!(value["farm_latitude"].is_number());
        assert_eq!(value["units"], json!("metric"));
    }

    #[test]
    fn test_from_partial_fills_missing_fields() {
        let fields = json!({ "farm_latitude": 13.75, "daily_report": true, "$id": "ignored" });
        let Value::Object(fields) = fields else { unreachable!() };

        let settings = FarmSettings::from_partial(&FarmSettings::default(), fields).unwrap();

        assert_eq!(settings.farm_latitude, Decimal::from_str("13.75").unwrap());
        assert!(settings.daily_report);
        assert_eq!(settings.farm_longitude, FarmSettings::default().farm_longitude);
    }

    #[test]
    fn test_from_partial_rejects_wrong_types() {
        let Value::Object(fields) = json!({ "update_frequency": "often" }) else { unreachable!() };
        assert!(FarmSettings::from_partial(&FarmSettings::default(), fields).is_err());
    }

    #[test]
    fn test_from_request_names_the_bad_field() {
        let cases = [
            (json!({ "update_frequency": -5 }), "update_frequency"),
            (json!({ "update_frequency": "hourly" }), "update_frequency"),
            (json!({ "farm_latitude": "abc" }), "farm_latitude"),
            (json!({ "farm_longitude": null }), "farm_longitude"),
            (json!({ "units": "kelvin" }), "units"),
            (json!({ "daily_report": "yes" }), "daily_report"),
        ];

        for (body, field) in cases {
            let Value::Object(fields) = body else { unreachable!() };
            let err = FarmSettings::from_request(&FarmSettings::default(), fields).unwrap_err();
            assert_eq!(err.field, field);
        }
    }

    #[test]
    fn test_from_request_accepts_partial_body() {
        let Value::Object(fields) = json!({ "units": "imperial", "other": 1 }) else { unreachable!() };
        let settings = FarmSettings::from_request(&FarmSettings::default(), fields).unwrap();
        assert_eq!(settings.units, Units::Imperial);
        assert_eq!(settings.update_frequency, 30);
    }
}
