//! Patient profile types.
//!
//! A `PatientProfile` is the normalized record of a SAR subject's medical
//! background. Every known field has a default so that sparse field reports
//! still produce a complete profile. Keys the caller supplies beyond the known
//! fields are kept in `extra` and survive serialization unchanged.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Number, Value};

use crate::error::{HealthError, HealthResult};

/// Placeholder used for a missing profile id and a missing age.
pub const UNKNOWN: &str = "unknown";

/// A subject's age as reported in the field.
///
/// Numeric ages keep their original JSON number so a profile serializes back
/// to exactly what was supplied. Anything that is not a number reads as
/// `Unknown`, which serializes as the string `"unknown"`.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Age {
    Years(Number),
    #[default]
    Unknown,
}

impl Age {
    /// Build a numeric age. Non-finite values read as `Unknown`.
    pub fn years(value: f64) -> Self {
        Number::from_f64(value).map(Age::Years).unwrap_or(Age::Unknown)
    }

    /// The age in years, or `None` when it is not numeric.
    pub fn as_years(&self) -> Option<f64> {
        match self {
            Age::Years(n) => n.as_f64(),
            Age::Unknown => None,
        }
    }
}

impl From<u32> for Age {
    fn from(value: u32) -> Self {
        Age::Years(Number::from(value))
    }
}

impl Serialize for Age {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Age::Years(n) => n.serialize(serializer),
            Age::Unknown => serializer.serialize_str(UNKNOWN),
        }
    }
}

impl<'de> Deserialize<'de> for Age {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match Value::deserialize(deserializer)? {
            Value::Number(n) => Ok(Age::Years(n)),
            _ => Ok(Age::Unknown),
        }
    }
}

/// A prescribed medication.
///
/// Read leniently: a number or boolean field becomes its text, a null or
/// missing field becomes empty, and a bare string is taken as the name.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Medication {
    pub name: String,
    pub dosage: String,
    pub frequency: String,
}

fn field_text(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

impl<'de> Deserialize<'de> for Medication {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match Value::deserialize(deserializer)? {
            Value::Object(map) => Medication {
                name: field_text(map.get("name")),
                dosage: field_text(map.get("dosage")),
                frequency: field_text(map.get("frequency")),
            },
            Value::String(name) => Medication {
                name,
                ..Medication::default()
            },
            _ => Medication::default(),
        })
    }
}

impl Medication {
    pub fn new(
        name: impl Into<String>,
        dosage: impl Into<String>,
        frequency: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            dosage: dosage.into(),
            frequency: frequency.into(),
        }
    }
}

fn unknown_id() -> String {
    UNKNOWN.to_string()
}

/// The health profile of a missing person.
///
/// Example input:
/// ```json
/// {
///     "id": "patient123",
///     "age": 45,
///     "medical_history": ["hypertension", "diabetes"],
///     "allergies": ["penicillin"],
///     "current_conditions": ["asthma"],
///     "medications": [{"name": "DrugA", "dosage": "50mg", "frequency": "daily"}]
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatientProfile {
    /// Store key for this profile. Defaults to `"unknown"`.
    #[serde(default = "unknown_id")]
    pub id: String,

    #[serde(default)]
    pub age: Age,

    #[serde(default)]
    pub medical_history: Vec<String>,

    #[serde(default)]
    pub allergies: Vec<String>,

    #[serde(default)]
    pub current_conditions: Vec<String>,

    #[serde(default)]
    pub medications: Vec<Medication>,

    /// Caller-supplied keys outside the known fields.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Default for PatientProfile {
    fn default() -> Self {
        Self::new(UNKNOWN)
    }
}

impl PatientProfile {
    /// An otherwise empty profile with the given id.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            age: Age::Unknown,
            medical_history: Vec::new(),
            allergies: Vec::new(),
            current_conditions: Vec::new(),
            medications: Vec::new(),
            extra: Map::new(),
        }
    }

    pub fn with_age(mut self, years: u32) -> Self {
        self.age = Age::from(years);
        self
    }

    pub fn with_condition(mut self, condition: impl Into<String>) -> Self {
        self.current_conditions.push(condition.into());
        self
    }

    /// Return true if `condition` is among the current conditions (exact match).
    pub fn has_condition(&self, condition: &str) -> bool {
        self.current_conditions.iter().any(|c| c == condition)
    }

    /// Shallow-merge `new_data` into a copy of this profile.
    ///
    /// Keys in `new_data` overwrite existing ones, known or not. The merged
    /// document must still read as a profile, otherwise
    /// `HealthError::InvalidRequest` is returned and `self` is untouched.
    pub fn merged_with(&self, new_data: &Map<String, Value>) -> HealthResult<Self> {
        let mut document = match serde_json::to_value(self) {
            Ok(Value::Object(map)) => map,
            Ok(other) => {
                return Err(HealthError::Serialization {
                    reason: format!("profile serialized to a non-object value: {other}"),
                })
            }
            Err(e) => {
                return Err(HealthError::Serialization {
                    reason: e.to_string(),
                })
            }
        };

        for (key, value) in new_data {
            document.insert(key.clone(), value.clone());
        }

        serde_json::from_value(Value::Object(document)).map_err(|e| HealthError::InvalidRequest {
            reason: format!("extended profile is malformed: {e}"),
        })
    }
}
