//! Validation utilities for farm settings and history queries

use rust_decimal::Decimal;
use thiserror::Error;

use crate::models::FarmSettings;
use crate::types::PageRequest;

/// A single invalid field and the constraint it broke
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{field}: {message}")]
pub struct FieldError {
    pub field: &'static str,
    pub message: &'static str,
}

impl FieldError {
    pub(crate) fn new(field: &'static str, message: &'static str) -> Self {
        Self { field, message }
    }
}

/// Validate latitude is within [-90, 90]
pub fn validate_latitude(latitude: Decimal) -> Result<(), &'static str> {
    if latitude < Decimal::from(-90) || latitude > Decimal::from(90) {
        return Err("Latitude must be between -90 and 90");
    }
    Ok(())
}

/// Validate longitude is within [-180, 180]
pub fn validate_longitude(longitude: Decimal) -> Result<(), &'static str> {
    if longitude < Decimal::from(-180) || longitude > Decimal::from(180) {
        return Err("Longitude must be between -180 and 180");
    }
    Ok(())
}

pub fn validate_update_frequency(minutes: u32) -> Result<(), &'static str> {
    if minutes == 0 {
        return Err("Update frequency must be at least 1 minute");
    }
    Ok(())
}

/// Validate a full settings payload, reporting the first invalid field
pub fn validate_farm_settings(settings: &FarmSettings) -> Result<(), FieldError> {
    validate_latitude(settings.farm_latitude)
        .map_err(|msg| FieldError::new("farm_latitude", msg))?;
    validate_longitude(settings.farm_longitude)
        .map_err(|msg| FieldError::new("farm_longitude", msg))?;
    validate_update_frequency(settings.update_frequency)
        .map_err(|msg| FieldError::new("update_frequency", msg))?;
    Ok(())
}

/// Validate history paging: limit in [1, 100]
pub fn validate_page_request(page: &PageRequest) -> Result<(), FieldError> {
    if page.limit == 0 || page.limit > PageRequest::MAX_LIMIT {
        return Err(FieldError::new("limit", "Limit must be between 1 and 100"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_validate_latitude_bounds() {
        assert!(validate_latitude(dec("-90")).is_ok());
        assert!(validate_latitude(dec("90")).is_ok());
        assert!(validate_latitude(dec("41.1579")).is_ok());
        assert!(validate_latitude(dec("90.0001")).is_err());
        assert!(validate_latitude(dec("-95")).is_err());
    }

    #[test]
    fn test_validate_longitude_bounds() {
        assert!(validate_longitude(dec("-180")).is_ok());
        assert!(validate_longitude(dec("180")).is_ok());
        assert!(validate_longitude(dec("180.5")).is_err());
    }

    #[test]
    fn test_validate_settings_names_latitude() {
        let settings = FarmSettings {
            farm_latitude: dec("95"),
            ..FarmSettings::default()
        };
        let err = validate_farm_settings(&settings).unwrap_err();
        assert_eq!(err.field, "farm_latitude");
    }

    #[test]
    fn test_validate_settings_names_longitude() {
        let settings = FarmSettings {
            farm_longitude: dec("-200"),
            ..FarmSettings::default()
        };
        let err = validate_farm_settings(&settings).unwrap_err();
        assert_eq!(err.field, "farm_longitude");
    }

    #[test]
    fn test_validate_settings_zero_frequency() {
        let settings = FarmSettings {
            update_frequency: 0,
            ..FarmSettings::default()
        };
        assert_eq!(
            validate_farm_settings(&settings).unwrap_err().field,
            "update_frequency"
        );
    }

    #[test]
    fn test_validate_page_request() {
        assert!(validate_page_request(&PageRequest { limit: 1, offset: 0 }).is_ok());
        assert!(validate_page_request(&PageRequest { limit: 100, offset: 500 }).is_ok());
        assert!(validate_page_request(&PageRequest { limit: 0, offset: 0 }).is_err());
        assert!(validate_page_request(&PageRequest { limit: 101, offset: 0 }).is_err());
    }
}
