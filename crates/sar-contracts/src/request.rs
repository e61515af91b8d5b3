//! The tagged request accepted by the health agent's dispatcher.
//!
//! On the wire a request is a JSON object carrying one tag key (whose value is
//! ignored) plus the payload keys for that operation:
//!
//! ```json
//! { "estimate_survival": true, "profile": { ... }, "environment_data": { ... } }
//! ```
//!
//! `HealthRequest::from_message` turns that into a typed variant. Tags are
//! checked in `RequestKind::ALL` order and the first one present wins.

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::{
    assessment::{StatusReport, SurvivalEstimate},
    environment::EnvironmentData,
    error::{HealthError, HealthResult},
    profile::{Medication, PatientProfile},
};

/// Text substituted when a consultation carries no extra information.
pub const NO_OTHER_INFO: &str = "None";

/// The discriminant of a `HealthRequest`, one per wire tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequestKind {
    AssembleProfile,
    ExtrapolateStatus,
    AnalyzeMedication,
    EvaluateEnvironment,
    EstimateSurvival,
    PlanResources,
    AssessHealthRisk,
    GenerateMedicalAdvice,
    GetDrugInteractions,
    GetFoodInteractions,
    GetDiseaseInteractions,
    GetAllInteractions,
    UpdateStatus,
    GetStatus,
    ExtendProfile,
    ConsultProfile,
}

impl RequestKind {
    /// Every kind, in tag-matching priority order.
    pub const ALL: [RequestKind; 16] = [
        RequestKind::AssembleProfile,
        RequestKind::ExtrapolateStatus,
        RequestKind::AnalyzeMedication,
        RequestKind::EvaluateEnvironment,
        RequestKind::EstimateSurvival,
        RequestKind::PlanResources,
        RequestKind::AssessHealthRisk,
        RequestKind::GenerateMedicalAdvice,
        RequestKind::GetDrugInteractions,
        RequestKind::GetFoodInteractions,
        RequestKind::GetDiseaseInteractions,
        RequestKind::GetAllInteractions,
        RequestKind::UpdateStatus,
        RequestKind::GetStatus,
        RequestKind::ExtendProfile,
        RequestKind::ConsultProfile,
    ];

    /// The wire tag for this kind.
    pub fn tag(self) -> &'static str {
        match self {
            RequestKind::AssembleProfile => "assemble_profile",
            RequestKind::ExtrapolateStatus => "extrapolate_status",
            RequestKind::AnalyzeMedication => "analyze_medication",
            RequestKind::EvaluateEnvironment => "evaluate_environment",
            RequestKind::EstimateSurvival => "estimate_survival",
            RequestKind::PlanResources => "plan_resources",
            RequestKind::AssessHealthRisk => "assess_health_risk",
            RequestKind::GenerateMedicalAdvice => "generate_medical_advice",
            RequestKind::GetDrugInteractions => "get_drug_interactions",
            RequestKind::GetFoodInteractions => "get_food_interactions",
            RequestKind::GetDiseaseInteractions => "get_disease_interactions",
            RequestKind::GetAllInteractions => "get_all_interactions",
            RequestKind::UpdateStatus => "update_status",
            RequestKind::GetStatus => "get_status",
            RequestKind::ExtendProfile => "extend_profile",
            RequestKind::ConsultProfile => "consult_profile",
        }
    }
}

/// A request to the health agent with its typed payload.
#[derive(Debug, Clone, PartialEq)]
pub enum HealthRequest {
    AssembleProfile {
        patient_data: PatientProfile,
    },
    ExtrapolateStatus {
        profile: PatientProfile,
    },
    AnalyzeMedication {
        medication_data: Vec<Medication>,
    },
    EvaluateEnvironment {
        environment_data: EnvironmentData,
        /// Defaults to an empty profile when omitted.
        patient_data: PatientProfile,
    },
    EstimateSurvival {
        profile: PatientProfile,
        environment_data: EnvironmentData,
    },
    PlanResources {
        profile: PatientProfile,
        current_status: StatusReport,
    },
    AssessHealthRisk {
        profile: PatientProfile,
        environment_data: EnvironmentData,
    },
    GenerateMedicalAdvice {
        profile: PatientProfile,
        environment_data: EnvironmentData,
        /// Defaults to 48 hours when omitted.
        survival_estimation: SurvivalEstimate,
    },
    GetDrugInteractions {
        drug_name: String,
    },
    GetFoodInteractions {
        drug_name: String,
    },
    GetDiseaseInteractions {
        drug_name: String,
    },
    GetAllInteractions {
        drug_name: String,
    },
    UpdateStatus {
        status: String,
    },
    GetStatus,
    ExtendProfile {
        profile_id: String,
        new_data: Map<String, Value>,
    },
    ConsultProfile {
        profile_id: String,
        other_info: String,
    },
}

impl HealthRequest {
    /// Parse a tagged JSON message.
    ///
    /// Returns `HealthError::UnknownRequest` when `message` is not an object
    /// or carries none of the recognized tags, and
    /// `HealthError::InvalidRequest` when a required payload key is missing or
    /// does not have the expected shape.
    pub fn from_message(message: &Value) -> HealthResult<Self> {
        let map = message.as_object().ok_or(HealthError::UnknownRequest)?;
        let kind = RequestKind::ALL
            .into_iter()
            .find(|kind| map.contains_key(kind.tag()))
            .ok_or(HealthError::UnknownRequest)?;
        let payload = Payload { kind, map };

        let request = match kind {
            RequestKind::AssembleProfile => HealthRequest::AssembleProfile {
                patient_data: payload.required("patient_data")?,
            },
            RequestKind::ExtrapolateStatus => HealthRequest::ExtrapolateStatus {
                profile: payload.required("profile")?,
            },
            RequestKind::AnalyzeMedication => HealthRequest::AnalyzeMedication {
                medication_data: payload.required("medication_data")?,
            },
            RequestKind::EvaluateEnvironment => HealthRequest::EvaluateEnvironment {
                environment_data: payload.required("environment_data")?,
                patient_data: payload.optional("patient_data", PatientProfile::default)?,
            },
            RequestKind::EstimateSurvival => HealthRequest::EstimateSurvival {
                profile: payload.required("profile")?,
                environment_data: payload.required("environment_data")?,
            },
            RequestKind::PlanResources => HealthRequest::PlanResources {
                profile: payload.required("profile")?,
                current_status: payload.required("current_status")?,
            },
            RequestKind::AssessHealthRisk => HealthRequest::AssessHealthRisk {
                profile: payload.required("profile")?,
                environment_data: payload.required("environment_data")?,
            },
            RequestKind::GenerateMedicalAdvice => HealthRequest::GenerateMedicalAdvice {
                profile: payload.required("profile")?,
                environment_data: payload.required("environment_data")?,
                survival_estimation: payload
                    .optional("survival_estimation", SurvivalEstimate::default)?,
            },
            RequestKind::GetDrugInteractions => HealthRequest::GetDrugInteractions {
                drug_name: payload.required("drug_name")?,
            },
            RequestKind::GetFoodInteractions => HealthRequest::GetFoodInteractions {
                drug_name: payload.required("drug_name")?,
            },
            RequestKind::GetDiseaseInteractions => HealthRequest::GetDiseaseInteractions {
                drug_name: payload.required("drug_name")?,
            },
            RequestKind::GetAllInteractions => HealthRequest::GetAllInteractions {
                drug_name: payload.required("drug_name")?,
            },
            RequestKind::UpdateStatus => HealthRequest::UpdateStatus {
                status: payload.required("status")?,
            },
            RequestKind::GetStatus => HealthRequest::GetStatus,
            RequestKind::ExtendProfile => HealthRequest::ExtendProfile {
                profile_id: payload.required("profile_id")?,
                new_data: payload.required("new_data")?,
            },
            RequestKind::ConsultProfile => HealthRequest::ConsultProfile {
                profile_id: payload.required("profile_id")?,
                other_info: payload.optional("other_info", || NO_OTHER_INFO.to_string())?,
            },
        };

        Ok(request)
    }

    pub fn kind(&self) -> RequestKind {
        match self {
            HealthRequest::AssembleProfile { .. } => RequestKind::AssembleProfile,
            HealthRequest::ExtrapolateStatus { .. } => RequestKind::ExtrapolateStatus,
            HealthRequest::AnalyzeMedication { .. } => RequestKind::AnalyzeMedication,
            HealthRequest::EvaluateEnvironment { .. } => RequestKind::EvaluateEnvironment,
            HealthRequest::EstimateSurvival { .. } => RequestKind::EstimateSurvival,
            HealthRequest::PlanResources { .. } => RequestKind::PlanResources,
            HealthRequest::AssessHealthRisk { .. } => RequestKind::AssessHealthRisk,
            HealthRequest::GenerateMedicalAdvice { .. } => RequestKind::GenerateMedicalAdvice,
            HealthRequest::GetDrugInteractions { .. } => RequestKind::GetDrugInteractions,
            HealthRequest::GetFoodInteractions { .. } => RequestKind::GetFoodInteractions,
            HealthRequest::GetDiseaseInteractions { .. } => RequestKind::GetDiseaseInteractions,
            HealthRequest::GetAllInteractions { .. } => RequestKind::GetAllInteractions,
            HealthRequest::UpdateStatus { .. } => RequestKind::UpdateStatus,
            HealthRequest::GetStatus => RequestKind::GetStatus,
            HealthRequest::ExtendProfile { .. } => RequestKind::ExtendProfile,
            HealthRequest::ConsultProfile { .. } => RequestKind::ConsultProfile,
        }
    }
}

// ── Payload extraction ────────────────────────────────────────────────────────

struct Payload<'m> {
    kind: RequestKind,
    map: &'m Map<String, Value>,
}

impl Payload<'_> {
    fn required<T: DeserializeOwned>(&self, key: &str) -> HealthResult<T> {
        let value = self.map.get(key).ok_or_else(|| HealthError::InvalidRequest {
            reason: format!("'{}' requires '{}'", self.kind.tag(), key),
        })?;
        self.decode(key, value)
    }

    /// An absent or null key falls back to `default`.
    fn optional<T: DeserializeOwned>(
        &self,
        key: &str,
        default: impl FnOnce() -> T,
    ) -> HealthResult<T> {
        match self.map.get(key) {
            None | Some(Value::Null) => Ok(default()),
            Some(value) => self.decode(key, value),
        }
    }

    fn decode<T: DeserializeOwned>(&self, key: &str, value: &Value) -> HealthResult<T> {
        T::deserialize(value).map_err(|e| HealthError::InvalidRequest {
            reason: format!("'{}' has a malformed '{}': {}", self.kind.tag(), key, e),
        })
    }
}
