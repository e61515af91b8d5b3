//! Health assessment results.
//!
//! These are the records the health calculators produce and the dispatcher
//! serializes. Field names are part of the wire contract.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

use crate::{environment::EnvironmentData, profile::PatientProfile};

/// Survival window assumed when no estimate is supplied, in hours.
pub const DEFAULT_SURVIVAL_HOURS: f64 = 48.0;

/// Coarse health status derived from current conditions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HealthStatus {
    #[default]
    Stable,
    Critical,
}

impl HealthStatus {
    pub fn is_critical(self) -> bool {
        self == HealthStatus::Critical
    }

    pub fn as_str(self) -> &'static str {
        match self {
            HealthStatus::Stable => "stable",
            HealthStatus::Critical => "critical",
        }
    }
}

impl fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// Anything other than "critical" reads as stable, matching how callers pass
// free-form status strings back in.
impl<'de> Deserialize<'de> for HealthStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = serde_json::Value::deserialize(deserializer)?;
        Ok(match raw.as_str() {
            Some("critical") => HealthStatus::Critical,
            _ => HealthStatus::Stable,
        })
    }
}

/// Output of status extrapolation.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct StatusReport {
    #[serde(default)]
    pub current_status: HealthStatus,
    /// `max(0, 100 - 0.5 * age)`.
    #[serde(default)]
    pub health_score: f64,
}

/// How strongly the environment affects the subject.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnvironmentalImpact {
    Minimal,
    Moderate,
    High,
}

impl fmt::Display for EnvironmentalImpact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            EnvironmentalImpact::Minimal => "minimal",
            EnvironmentalImpact::Moderate => "moderate",
            EnvironmentalImpact::High => "high",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnvironmentAssessment {
    pub environmental_impact: EnvironmentalImpact,
    /// The reading the assessment was made from, echoed unchanged.
    pub details: EnvironmentData,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SurvivalEstimate {
    #[serde(default = "default_survival_hours")]
    pub estimated_survival_hours: f64,
}

fn default_survival_hours() -> f64 {
    DEFAULT_SURVIVAL_HOURS
}

impl Default for SurvivalEstimate {
    fn default() -> Self {
        Self {
            estimated_survival_hours: DEFAULT_SURVIVAL_HOURS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MedicationAnalysis {
    pub medication_analysis: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourcePlan {
    pub recommended_resources: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthRisks {
    pub health_risks: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MedicalAdvice {
    pub medical_advice: String,
}

/// Reply to `assemble_profile`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileAssembled {
    pub profile: PatientProfile,
    pub message: String,
}

/// Reply to `extend_profile`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileExtended {
    pub status: String,
    pub new_profile: PatientProfile,
}

/// Reply to `consult_profile`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsultationReply {
    pub response: String,
}
