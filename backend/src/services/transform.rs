//! Normalization of raw provider payloads into weather observations

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::Value;
use shared::{ConditionCategory, GpsCoordinates, Location, SunTimes, WeatherObservation};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TransformError {
    #[error("payload is not a JSON object")]
    NotAnObject,

    #[error("payload is empty")]
    EmptyPayload,

    #[error("payload is malformed: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// OpenWeatherMap current weather payload; every section is optional
#[derive(Debug, Default, Deserialize)]
struct OwmCurrent {
    #[serde(default)]
    main: Option<OwmMain>,
    #[serde(default)]
    wind: Option<OwmWind>,
    #[serde(default)]
    weather: Option<Vec<OwmWeather>>,
    #[serde(default)]
    sys: Option<OwmSys>,
    #[serde(default)]
    visibility: Option<Decimal>,
    #[serde(default)]
    name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct OwmMain {
    #[serde(default)]
    temp: Option<Decimal>,
    #[serde(default)]
    feels_like: Option<Decimal>,
    #[serde(default)]
    pressure: Option<Decimal>,
    #[serde(default)]
    humidity: Option<Decimal>,
}

#[derive(Debug, Default, Deserialize)]
struct OwmWind {
    #[serde(default)]
    speed: Option<Decimal>,
    #[serde(default)]
    gust: Option<Decimal>,
    #[serde(default)]
    deg: Option<Decimal>,
}

#[derive(Debug, Default, Deserialize)]
struct OwmWeather {
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    icon: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct OwmSys {
    #[serde(default)]
    sunrise: Option<i64>,
    #[serde(default)]
    sunset: Option<i64>,
}

/// Transform a raw payload, stamping it with the current time
pub fn transform_observation(
    raw: &Value,
    coordinates: GpsCoordinates,
) -> Result<WeatherObservation, TransformError> {
    transform_observation_at(raw, coordinates, Utc::now())
}

/// Transform a raw payload into the canonical observation.
///
/// Location comes from the requested coordinates, not the payload, and the
/// timestamp is `now`, not the provider's measurement time.
pub fn transform_observation_at(
    raw: &Value,
    coordinates: GpsCoordinates,
    now: DateTime<Utc>,
) -> Result<WeatherObservation, TransformError> {
    let object = raw.as_object().ok_or(TransformError::NotAnObject)?;
    if object.is_empty() {
        return Err(TransformError::EmptyPayload);
    }

    let payload = OwmCurrent::deserialize(raw)?;
    let main = payload.main.unwrap_or_default();
    let wind = payload.wind.unwrap_or_default();
    let sys = payload.sys.unwrap_or_default();
    let weather = payload
        .weather
        .and_then(|entries| entries.into_iter().next())
        .unwrap_or_default();

    let mut observation = WeatherObservation {
        temperature: main.temp,
        humidity: main.humidity,
        wind_speed: wind.speed,
        wind_gust: wind.gust,
        wind_direction: wind.deg,
        pressure: main.pressure,
        visibility: payload.visibility,
        feels_like: main.feels_like,
        description: weather.description.unwrap_or_default(),
        icon: weather.icon.unwrap_or_default(),
        location: Location {
            lat: coordinates.latitude,
            lon: coordinates.longitude,
            name: payload.name.unwrap_or_else(|| "Unknown".to_string()),
        },
        sun: SunTimes {
            sunrise: sys.sunrise.and_then(|ts| DateTime::from_timestamp(ts, 0)),
            sunset: sys.sunset.and_then(|ts| DateTime::from_timestamp(ts, 0)),
        },
        timestamp: now,
        condition: None,
    };
    observation.condition = Some(observation.classify());

    Ok(observation)
}

/// Measurements the condition classifier works from
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ConditionInputs {
    pub temperature: Option<Decimal>,
    pub humidity: Option<Decimal>,
    pub wind_speed: Option<Decimal>,
}

impl ConditionInputs {
    /// Read `main.temp`, `main.humidity` and `wind.speed` straight from a raw
    /// payload. Values that are missing or not numeric are left out.
    pub fn from_payload(raw: &Value) -> Self {
        Self {
            temperature: decimal_at(raw, &["main", "temp"]),
            humidity: decimal_at(raw, &["main", "humidity"]),
            wind_speed: decimal_at(raw, &["wind", "speed"]),
        }
    }

    pub fn classify(&self) -> ConditionCategory {
        ConditionCategory::classify(self.temperature, self.humidity, self.wind_speed)
    }
}

fn decimal_at(raw: &Value, path: &[&str]) -> Option<Decimal> {
    let value = path.iter().try_fold(raw, |node, key| node.get(key))?;
    <Decimal as Deserialize>::deserialize(value).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn porto() -> GpsCoordinates {
        GpsCoordinates::new(dec("41.1579"), dec("-8.6291"))
    }

    fn sample_payload() -> Value {
        json!({
            "coord": { "lon": -8.61, "lat": 41.15 },
            "weather": [{ "id": 800, "main": "Clear", "description": "clear sky", "icon": "01d" }],
            "main": { "temp": 21.5, "feels_like": 21.1, "pressure": 1018, "humidity": 60 },
            "visibility": 10000,
            "wind": { "speed": 4.1, "deg": 320 },
            "dt": 1700000000,
            "sys": { "sunrise": 1699945000, "sunset": 1699981000 },
            "name": "Porto"
        })
    }

    #[test]
    fn test_transform_maps_all_fields() {
        let now = Utc::now();
        let observation = transform_observation_at(&sample_payload(), porto(), now).unwrap();

        assert_eq!(observation.temperature, Some(dec("21.5")));
        assert_eq!(observation.humidity, Some(dec("60")));
        assert_eq!(observation.wind_speed, Some(dec("4.1")));
        assert_eq!(observation.wind_direction, Some(dec("320")));
        assert_eq!(observation.pressure, Some(dec("1018")));
        assert_eq!(observation.visibility, Some(dec("10000")));
        assert_eq!(observation.feels_like, Some(dec("21.1")));
        assert_eq!(observation.description, "clear sky");
        assert_eq!(observation.icon, "01d");
        assert_eq!(observation.location.name, "Porto");
        assert_eq!(observation.location.lat, dec("41.1579"));
        assert_eq!(observation.sun.sunrise, DateTime::from_timestamp(1699945000, 0));
        assert_eq!(observation.timestamp, now);
        assert_eq!(observation.condition, Some(ConditionCategory::Normal));
    }

    #[test]
    fn test_missing_gust_is_omitted() {
        let observation = transform_observation(&sample_payload(), porto()).unwrap();
        assert_eq!(observation.wind_gust, None);

        let fields = serde_json::to_value(&observation).unwrap();
        assert!(fields.get("wind_gust").is_none());
    }

    #[test]
    fn test_present_gust_is_kept_as_text() {
        let mut payload = sample_payload();
        payload["wind"]["gust"] = json!(5.2);

        let observation = transform_observation(&payload, porto()).unwrap();
        assert_eq!(observation.wind_gust, Some(dec("5.2")));

        let fields = serde_json::to_value(&observation).unwrap();
        assert_eq!(fields["wind_gust"], json!("5.2"));
    }

    #[test]
    fn test_missing_weather_array_gives_empty_description() {
        let mut payload = sample_payload();
        payload.as_object_mut().unwrap().remove("weather");

        let observation = transform_observation(&payload, porto()).unwrap();
        assert_eq!(observation.description, "");
        assert_eq!(observation.icon, "");
    }

    #[test]
    fn test_empty_weather_array_gives_empty_description() {
        let mut payload = sample_payload();
        payload["weather"] = json!([]);

        let observation = transform_observation(&payload, porto()).unwrap();
        assert_eq!(observation.description, "");
    }

    #[test]
    fn test_missing_sections_stay_absent() {
        let payload = json!({ "name": "Nowhere" });
        let observation = transform_observation(&payload, porto()).unwrap();

        assert_eq!(observation.temperature, None);
        assert_eq!(observation.wind_speed, None);
        assert_eq!(observation.sun, SunTimes::default());
        assert_eq!(observation.condition, Some(ConditionCategory::Normal));
    }

    #[test]
    fn test_missing_name_defaults_to_unknown() {
        let mut payload = sample_payload();
        payload.as_object_mut().unwrap().remove("name");

        let observation = transform_observation(&payload, porto()).unwrap();
        assert_eq!(observation.location.name, "Unknown");
    }

    #[test]
    fn test_rejects_non_object_and_empty_payloads() {
        assert!(matches!(
            transform_observation(&json!([1, 2]), porto()),
            Err(TransformError::NotAnObject)
        ));
        assert!(matches!(
            transform_observation(&json!({}), porto()),
            Err(TransformError::EmptyPayload)
        ));
    }

    #[test]
    fn test_rejects_malformed_sections() {
        let mut payload = sample_payload();
        payload["main"] = json!("hot");
        assert!(matches!(
            transform_observation(&payload, porto()),
            Err(TransformError::Malformed(_))
        ));

        let mut payload = sample_payload();
        payload["main"]["temp"] = json!({ "value": 3 });
        assert!(transform_observation(&payload, porto()).is_err());
    }

    #[test]
    fn test_condition_inputs_from_payload() {
        let payload = json!({ "main": { "temp": 5, "humidity": 20 }, "wind": { "speed": 2.5 } });
        let inputs = ConditionInputs::from_payload(&payload);

        assert_eq!(inputs.temperature, Some(dec("5")));
        assert_eq!(inputs.humidity, Some(dec("20")));
        assert_eq!(inputs.wind_speed, Some(dec("2.5")));
        assert_eq!(inputs.classify(), ConditionCategory::Cold);
    }

    #[test]
    fn test_condition_inputs_skip_non_numeric_values() {
        let payload = json!({ "main": { "temp": "warm", "humidity": 85 }, "wind": { "speed": null } });
        let inputs = ConditionInputs::from_payload(&payload);

        assert_eq!(inputs.temperature, None);
        assert_eq!(inputs.humidity, Some(dec("85")));
        assert_eq!(inputs.wind_speed, None);
        assert_eq!(inputs.classify(), ConditionCategory::Humid);
    }

    #[test]
    fn test_condition_inputs_ignore_missing_values() {
        let inputs = ConditionInputs::from_payload(&json!({ "wind": { "speed": 14 } }));
        assert_eq!(inputs.temperature, None);
        assert_eq!(inputs.classify(), ConditionCategory::Windy);
    }

    proptest! {
        #[test]
        fn prop_stored_condition_matches_payload_inputs(
            temp in -400i64..600,
            humidity in 0i64..=100,
            wind in 0i64..400,
        ) {
            let payload = json!({
                "main": { "temp": temp as f64 / 10.0, "humidity": humidity },
                "wind": { "speed": wind as f64 / 10.0 }
            });

            let observation = transform_observation(&payload, porto()).unwrap();
            let inputs = ConditionInputs::from_payload(&payload);

            prop_assert_eq!(observation.condition, Some(inputs.classify()));
            prop_assert_eq!(observation.classify(), inputs.classify());
        }
    }
}
