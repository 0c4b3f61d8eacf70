//! Weather condition classification

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Agricultural condition category derived from an observation
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ConditionCategory {
    /// Temperature below 10°
    Cold,
    /// Temperature above 30°
    Hot,
    /// Relative humidity below 30%
    Dry,
    /// Relative humidity above 80%
    Humid,
    /// Wind speed above 10
    Windy,
    Normal,
}

impl ConditionCategory {
    pub const ALL: [ConditionCategory; 6] = [
        ConditionCategory::Cold,
        ConditionCategory::Hot,
        ConditionCategory::Dry,
        ConditionCategory::Humid,
        ConditionCategory::Windy,
        ConditionCategory::Normal,
    ];

    /// Classify an observation.
    ///
    /// Rules are evaluated in order and the first match wins, so a reading
    /// that is both cold and dry is `Cold`. A rule whose input is missing
    /// never fires: absent data is not a zero reading.
    pub fn classify(
        temperature: Option<Decimal>,
        humidity: Option<Decimal>,
        wind_speed: Option<Decimal>,
    ) -> ConditionCategory {
        if let Some(temp) = temperature {
            if temp < Decimal::from(10) {
                return ConditionCategory::Cold;
            }
            if temp > Decimal::from(30) {
                return ConditionCategory::Hot;
            }
        }

        if let Some(humidity) = humidity {
            if humidity < Decimal::from(30) {
                return ConditionCategory::Dry;
            }
            if humidity > Decimal::from(80) {
                return ConditionCategory::Humid;
            }
        }

        match wind_speed {
            Some(speed) if speed > Decimal::from(10) => ConditionCategory::Windy,
            _ => ConditionCategory::Normal,
        }
    }

    /// Value stored in the `condition_value` field of curated content
    pub fn as_str(&self) -> &'static str {
        match self {
            ConditionCategory::Cold => "cold",
            ConditionCategory::Hot => "hot",
            ConditionCategory::Dry => "dry",
            ConditionCategory::Humid => "humid",
            ConditionCategory::Windy => "windy",
            ConditionCategory::Normal => "normal",
        }
    }
}

impl std::fmt::Display for ConditionCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
