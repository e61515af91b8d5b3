//! Field environment readings.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};

/// Temperature assumed when a reading omits it, in degrees Celsius.
pub const DEFAULT_TEMPERATURE_C: f64 = 22.0;

/// Pollution level assumed when a reading omits it.
pub const DEFAULT_POLLUTION_LEVEL: f64 = 0.0;

/// Environmental conditions around the subject.
///
/// All readings are optional. Values are kept as the JSON numbers that were
/// supplied so that an assessment can echo the reading back verbatim; the
/// accessor methods apply the defaults.
///
/// Example:
/// ```json
/// { "temperature": 22, "humidity": 60, "pollution_level": 80, "altitude": 500 }
/// ```
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct EnvironmentData {
    /// Degrees Celsius.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<Number>,

    /// Relative humidity, percent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub humidity: Option<Number>,

    /// Air quality index or a comparable scale.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pollution_level: Option<Number>,

    /// Meters above sea level.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub altitude: Option<Number>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl EnvironmentData {
    pub fn with_temperature(mut self, celsius: f64) -> Self {
        self.temperature = Number::from_f64(celsius);
        self
    }

    pub fn with_pollution_level(mut self, level: f64) -> Self {
        self.pollution_level = Number::from_f64(level);
        self
    }

    pub fn temperature(&self) -> f64 {
        self.temperature
            .as_ref()
            .and_then(Number::as_f64)
            .unwrap_or(DEFAULT_TEMPERATURE_C)
    }

    pub fn pollution_level(&self) -> f64 {
        self.pollution_level
            .as_ref()
            .and_then(Number::as_f64)
            .unwrap_or(DEFAULT_POLLUTION_LEVEL)
    }
}
