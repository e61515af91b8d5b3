//! Rule-based health calculators.
//!
//! Every function here is pure: the same inputs always produce the same
//! record, and nothing is cached. The agent layers status caching on top and
//! decides where a status is recomputed from the profile.
//!
//! The rules are deliberately coarse field heuristics, not clinical models.

use sar_contracts::{
    assessment::{
        EnvironmentAssessment, EnvironmentalImpact, HealthRisks, HealthStatus, MedicalAdvice,
        MedicationAnalysis, ResourcePlan, StatusReport, SurvivalEstimate,
    },
    environment::EnvironmentData,
    profile::{Medication, PatientProfile},
};

/// Conditions that make a subject critical.
pub const CRITICAL_CONDITIONS: [&str; 3] = ["severe_injury", "cardiac_arrest", "respiratory_failure"];

/// Age assumed for scoring when the profile has no numeric age.
pub const DEFAULT_SCORING_AGE: f64 = 50.0;

pub const INTERACTIONS_DETECTED: &str =
    "Potential drug interactions detected among prescribed medications.";
pub const NO_INTERACTIONS: &str = "No significant drug interactions detected.";

pub const ADVANCED_LIFE_SUPPORT: &str = "advanced life support equipment";
pub const BASIC_FIRST_AID: &str = "basic first aid kit";
pub const GERIATRIC_SUPPLIES: &str = "geriatric care supplies";

pub const CRITICAL_STATUS_RISK: &str = "High risk due to critical health status.";
pub const POLLUTION_RISK: &str = "High risk due to extreme environmental pollution.";

pub const BASE_ADVICE: &str =
    "Monitor the patient's condition continuously and prepare for rapid intervention.";
pub const EVACUATION_ADVICE: &str = "Immediate evacuation is strongly recommended.";

const STABLE_SURVIVAL_HOURS: f64 = 48.0;
const CRITICAL_SURVIVAL_HOURS: f64 = 24.0;
const EXTREME_TEMPERATURE_FACTOR: f64 = 0.75;
const EVACUATION_THRESHOLD_HOURS: f64 = 24.0;
const GERIATRIC_AGE: f64 = 60.0;

/// Derive the status and a health score from a profile.
///
/// The status is critical when any current condition is one of
/// `CRITICAL_CONDITIONS`. The score is `max(0, 100 - 0.5 * age)`, scoring a
/// missing or non-numeric age as 50.
pub fn extrapolate_current_status(profile: &PatientProfile) -> StatusReport {
    let critical = CRITICAL_CONDITIONS
        .iter()
        .any(|condition| profile.has_condition(condition));
    let current_status = if critical {
        HealthStatus::Critical
    } else {
        HealthStatus::Stable
    };

    let age = profile.age.as_years().unwrap_or(DEFAULT_SCORING_AGE);
    let health_score = (100.0 - age * 0.5).max(0.0);

    StatusReport {
        current_status,
        health_score,
    }
}

/// Flag potential interactions whenever more than one medication is prescribed.
///
/// No pairwise lookup is performed; the interaction scraper covers that.
pub fn analyze_medication(medications: &[Medication]) -> MedicationAnalysis {
    let advisory = if medications.len() > 1 {
        INTERACTIONS_DETECTED
    } else {
        NO_INTERACTIONS
    };
    MedicationAnalysis {
        medication_analysis: vec![advisory.to_string()],
    }
}

/// Rate the environment's impact on the subject.
///
/// Checked in order, first match wins:
/// 1. pollution above 100 and the patient has asthma → high
/// 2. temperature above 35 °C or below 5 °C → moderate
/// 3. otherwise → minimal
pub fn evaluate_environment(
    environment: &EnvironmentData,
    patient: &PatientProfile,
) -> EnvironmentAssessment {
    let temperature = environment.temperature();
    let environmental_impact =
        if environment.pollution_level() > 100.0 && patient.has_condition("asthma") {
            EnvironmentalImpact::High
        } else if temperature > 35.0 || temperature < 5.0 {
            EnvironmentalImpact::Moderate
        } else {
            EnvironmentalImpact::Minimal
        };

    EnvironmentAssessment {
        environmental_impact,
        details: environment.clone(),
    }
}

/// Estimate survival hours: 48 when stable, 24 when critical, scaled by 0.75
/// above 40 °C or below 0 °C. The result is not rounded.
pub fn estimate_survival_time(status: HealthStatus, environment: &EnvironmentData) -> SurvivalEstimate {
    let mut hours = if status.is_critical() {
        CRITICAL_SURVIVAL_HOURS
    } else {
        STABLE_SURVIVAL_HOURS
    };

    let temperature = environment.temperature();
    if temperature > 40.0 || temperature < 0.0 {
        hours *= EXTREME_TEMPERATURE_FACTOR;
    }

    SurvivalEstimate {
        estimated_survival_hours: hours,
    }
}

/// Recommend the equipment a rescue team should carry.
pub fn plan_medical_resources(profile: &PatientProfile, current: &StatusReport) -> ResourcePlan {
    let mut recommended_resources = vec![if current.current_status.is_critical() {
        ADVANCED_LIFE_SUPPORT.to_string()
    } else {
        BASIC_FIRST_AID.to_string()
    }];

    if profile.age.as_years().is_some_and(|age| age > GERIATRIC_AGE) {
        recommended_resources.push(GERIATRIC_SUPPLIES.to_string());
    }

    ResourcePlan {
        recommended_resources,
    }
}

/// List the risks a critical status or heavy pollution (above 150) poses.
pub fn assess_health_risk(status: HealthStatus, environment: &EnvironmentData) -> HealthRisks {
    let mut health_risks = Vec::new();
    if status.is_critical() {
        health_risks.push(CRITICAL_STATUS_RISK.to_string());
    }
    if environment.pollution_level() > 150.0 {
        health_risks.push(POLLUTION_RISK.to_string());
    }
    HealthRisks { health_risks }
}

/// Compose field advice from identified risks and the survival window.
pub fn generate_medical_advice(risks: &HealthRisks, survival: &SurvivalEstimate) -> MedicalAdvice {
    let mut advice = BASE_ADVICE.to_string();

    if !risks.health_risks.is_empty() {
        advice.push_str(" Identified risks include: ");
        advice.push_str(&risks.health_risks.join(", "));
    }

    if survival.estimated_survival_hours < EVACUATION_THRESHOLD_HOURS {
        advice.push(' ');
        advice.push_str(EVACUATION_ADVICE);
    }

    MedicalAdvice {
        medical_advice: advice,
    }
}
