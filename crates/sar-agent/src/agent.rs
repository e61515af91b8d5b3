//! The health specialist agent.
//!
//! `HealthAgent` owns all per-agent state (stored profiles, cached status
//! reports, the mission status), one interaction scraper with its page
//! session, and an optional language model. Requests arrive either as typed
//! `HealthRequest`s through `handle` or as raw JSON through `process_request`.

use serde::Serialize;
use serde_json::{json, Map, Value};
use tracing::{debug, info, warn};

use sar_contracts::{
    assessment::{
        ConsultationReply, EnvironmentAssessment, HealthRisks, MedicalAdvice, MedicationAnalysis,
        ProfileAssembled, ProfileExtended, ResourcePlan, StatusReport, SurvivalEstimate,
    },
    environment::EnvironmentData,
    error::{HealthError, HealthResult},
    interaction::{DiseaseInteractions, DrugInteractions, FoodInteractions, InteractionRecord},
    mission::{StatusSnapshot, StatusUpdated},
    profile::{Medication, PatientProfile},
    request::HealthRequest,
};
use sar_core::{
    health,
    traits::{LlmClient, PageSession},
    MissionStatus, ProfileStore, StatusCache,
};
use sar_interactions::{HttpSession, InteractionScraper, ScraperConfig};

use crate::{
    config::{AgentConfig, DEFAULT_AGENT_NAME},
    llm::OpenAiChatClient,
};

pub const AGENT_ROLE: &str = "Health Specialist";

pub const SYSTEM_MESSAGE: &str = "You are a health specialist for SAR operations. \
Your responsibilities include:
1. Assembling a general health profile of the missing person using available records.
2. Extrapolating current health status based on the assembled profile.
3. Analyzing medication data to assess potential drug interactions and effects.
4. Evaluating environmental impacts on the subject's health.
5. Estimating survival time under current conditions.
6. Planning appropriate medical resources for rescue operations.
7. Assessing health risks that may arise during SAR operations.
8. Generating medical advice for SAR teams in the field.
9. Providing information on drug, food, and disease interactions.
10. Updating and retrieving the current mission status.";

pub const PROFILE_ASSEMBLED: &str = "Health profile assembled successfully.";

/// The user prompt sent for a profile consultation.
pub fn consultation_prompt(profile: &PatientProfile, other_info: &str) -> HealthResult<String> {
    let known_facts = serde_json::to_string_pretty(profile).map_err(|e| HealthError::Serialization {
        reason: e.to_string(),
    })?;
    Ok(format!(
        "You are a health specialist for SAR operations.\n\
         Known facts about the health profile:\n{known_facts}\n\
         Other information supplied:\n{other_info}\n\
         Please provide an analysis or suggest next steps."
    ))
}

fn to_value<T: Serialize>(value: &T) -> HealthResult<Value> {
    serde_json::to_value(value).map_err(|e| HealthError::Serialization {
        reason: e.to_string(),
    })
}

pub struct HealthAgent {
    name: String,
    profiles: ProfileStore,
    statuses: StatusCache,
    mission: MissionStatus,
    scraper: InteractionScraper,
    llm: Option<Box<dyn LlmClient>>,
}

impl HealthAgent {
    /// Create an agent around an already-open page session.
    pub fn new(session: Box<dyn PageSession>, scraper_config: &ScraperConfig) -> Self {
        Self {
            name: DEFAULT_AGENT_NAME.to_string(),
            profiles: ProfileStore::new(),
            statuses: StatusCache::default(),
            mission: MissionStatus::new(),
            scraper: InteractionScraper::new(session, scraper_config),
            llm: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_llm(mut self, llm: Box<dyn LlmClient>) -> Self {
        self.llm = Some(llm);
        self
    }

    /// Open an HTTP page session and, when an API key is available, a chat
    /// client, both as configured.
    pub fn from_config(config: &AgentConfig) -> HealthResult<Self> {
        let session = HttpSession::open(&config.scraper)?;
        let mut agent =
            Self::new(Box::new(session), &config.scraper).with_name(config.agent.name.as_str());

        match OpenAiChatClient::from_env(&config.llm)? {
            Some(client) => {
                info!(model = %config.llm.model, "language model configured");
                agent = agent.with_llm(Box::new(client));
            }
            None => debug!(
                api_key_env = %config.llm.api_key_env,
                "no API key set; consultations disabled"
            ),
        }
        Ok(agent)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn role(&self) -> &str {
        AGENT_ROLE
    }

    pub fn system_message(&self) -> &str {
        SYSTEM_MESSAGE
    }

    pub fn profiles(&self) -> &ProfileStore {
        &self.profiles
    }

    pub fn status_cache(&self) -> &StatusCache {
        &self.statuses
    }

    // ── Profiles ─────────────────────────────────────────────────────────────

    /// Store a defaulted profile under its id, replacing any previous one.
    ///
    /// Only the known profile fields are kept; `extend_profile` is the way to
    /// attach anything else.
    pub fn assemble_health_profile(&mut self, mut patient_data: PatientProfile) -> ProfileAssembled {
        patient_data.extra.clear();
        let profile = self.profiles.insert(patient_data).clone();
        ProfileAssembled {
            profile,
            message: PROFILE_ASSEMBLED.to_string(),
        }
    }

    pub fn extend_profile(
        &mut self,
        profile_id: &str,
        new_data: &Map<String, Value>,
    ) -> HealthResult<ProfileExtended> {
        let new_profile = self.profiles.extend(profile_id, new_data)?.clone();
        Ok(ProfileExtended {
            status: "updated".to_string(),
            new_profile,
        })
    }

    // ── Assessments ──────────────────────────────────────────────────────────

    /// Compute the status report and cache it under the profile's id.
    pub fn extrapolate_current_status(&mut self, profile: &PatientProfile) -> StatusReport {
        let report = health::extrapolate_current_status(profile);
        debug!(
            profile_id = %profile.id,
            status = %report.current_status,
            score = report.health_score,
            "status extrapolated"
        );
        self.statuses.record(profile.id.as_str(), report.clone());
        report
    }

    pub fn analyze_medication(&self, medications: &[Medication]) -> MedicationAnalysis {
        health::analyze_medication(medications)
    }

    pub fn evaluate_environment(
        &self,
        environment: &EnvironmentData,
        patient: &PatientProfile,
    ) -> EnvironmentAssessment {
        health::evaluate_environment(environment, patient)
    }

    /// Survival window for `profile`; the status is always recomputed.
    pub fn estimate_survival_time(
        &mut self,
        profile: &PatientProfile,
        environment: &EnvironmentData,
    ) -> SurvivalEstimate {
        let status = self.extrapolate_current_status(profile).current_status;
        health::estimate_survival_time(status, environment)
    }

    pub fn plan_medical_resources(
        &self,
        profile: &PatientProfile,
        current: &StatusReport,
    ) -> ResourcePlan {
        health::plan_medical_resources(profile, current)
    }

    /// Risks for `profile`; the status is always recomputed.
    pub fn assess_health_risk(
        &mut self,
        profile: &PatientProfile,
        environment: &EnvironmentData,
    ) -> HealthRisks {
        let status = self.extrapolate_current_status(profile).current_status;
        health::assess_health_risk(status, environment)
    }

    pub fn generate_medical_advice(
        &mut self,
        profile: &PatientProfile,
        environment: &EnvironmentData,
        survival: &SurvivalEstimate,
    ) -> MedicalAdvice {
        let risks = self.assess_health_risk(profile, environment);
        health::generate_medical_advice(&risks, survival)
    }

    // ── Consultation ─────────────────────────────────────────────────────────

    /// Ask the language model about a stored profile.
    ///
    /// # Errors
    ///
    /// - `ProfileNotFound` if no profile is stored under `profile_id`
    /// - `Upstream` if no model is configured or the call fails
    pub fn consult_profile(
        &self,
        profile_id: &str,
        other_info: &str,
    ) -> HealthResult<ConsultationReply> {
        let profile = self
            .profiles
            .get(profile_id)
            .ok_or_else(|| HealthError::ProfileNotFound {
                profile_id: profile_id.to_string(),
            })?;
        let llm = self.llm.as_deref().ok_or_else(|| HealthError::Upstream {
            reason: "no language model configured".to_string(),
        })?;

        let prompt = consultation_prompt(profile, other_info)?;
        debug!(profile_id, model = llm.model(), "consulting language model");
        let response = llm.complete(SYSTEM_MESSAGE, &prompt)?;
        Ok(ConsultationReply { response })
    }

    // ── Mission status ───────────────────────────────────────────────────────

    pub fn update_status(&mut self, status: impl Into<String>) -> StatusUpdated {
        self.mission.update(status)
    }

    pub fn get_status(&self) -> StatusSnapshot {
        StatusSnapshot {
            status: self.mission.current().to_string(),
        }
    }

    // ── Interactions ─────────────────────────────────────────────────────────

    pub fn get_drug_interactions(&mut self, drug_name: &str) -> HealthResult<DrugInteractions> {
        let slug = self.scraper.resolve_slug(drug_name)?;
        self.scraper.drug_interactions(&slug)
    }

    pub fn get_food_interactions(&mut self, drug_name: &str) -> HealthResult<FoodInteractions> {
        let slug = self.scraper.resolve_slug(drug_name)?;
        Ok(FoodInteractions {
            food_interactions: self.scraper.food_interactions(&slug)?,
        })
    }

    pub fn get_disease_interactions(
        &mut self,
        drug_name: &str,
    ) -> HealthResult<DiseaseInteractions> {
        let slug = self.scraper.resolve_slug(drug_name)?;
        Ok(DiseaseInteractions {
            disease_interactions: self.scraper.disease_interactions(&slug)?,
        })
    }

    pub fn get_all_interactions(&mut self, drug_name: &str) -> HealthResult<InteractionRecord> {
        self.scraper.all_interactions(drug_name)
    }

    // ── Dispatch ─────────────────────────────────────────────────────────────

    /// Execute a typed request and encode its result as JSON.
    pub fn handle(&mut self, request: HealthRequest) -> HealthResult<Value> {
        match request {
            HealthRequest::AssembleProfile { patient_data } => {
                to_value(&self.assemble_health_profile(patient_data))
            }
            HealthRequest::ExtrapolateStatus { profile } => {
                to_value(&self.extrapolate_current_status(&profile))
            }
            HealthRequest::AnalyzeMedication { medication_data } => {
                to_value(&self.analyze_medication(&medication_data))
            }
            HealthRequest::EvaluateEnvironment {
                environment_data,
                patient_data,
            } => to_value(&self.evaluate_environment(&environment_data, &patient_data)),
            HealthRequest::EstimateSurvival {
                profile,
                environment_data,
            } => to_value(&self.estimate_survival_time(&profile, &environment_data)),
            HealthRequest::PlanResources {
                profile,
                current_status,
            } => to_value(&self.plan_medical_resources(&profile, &current_status)),
            HealthRequest::AssessHealthRisk {
                profile,
                environment_data,
            } => to_value(&self.assess_health_risk(&profile, &environment_data)),
            HealthRequest::GenerateMedicalAdvice {
                profile,
                environment_data,
                survival_estimation,
            } => to_value(&self.generate_medical_advice(
                &profile,
                &environment_data,
                &survival_estimation,
            )),
            HealthRequest::GetDrugInteractions { drug_name } => {
                to_value(&self.get_drug_interactions(&drug_name)?)
            }
            HealthRequest::GetFoodInteractions { drug_name } => {
                to_value(&self.get_food_interactions(&drug_name)?)
            }
            HealthRequest::GetDiseaseInteractions { drug_name } => {
                to_value(&self.get_disease_interactions(&drug_name)?)
            }
            HealthRequest::GetAllInteractions { drug_name } => {
                to_value(&self.get_all_interactions(&drug_name)?)
            }
            HealthRequest::UpdateStatus { status } => to_value(&self.update_status(status)),
            HealthRequest::GetStatus => to_value(&self.get_status()),
            HealthRequest::ExtendProfile {
                profile_id,
                new_data,
            } => to_value(&self.extend_profile(&profile_id, &new_data)?),
            HealthRequest::ConsultProfile {
                profile_id,
                other_info,
            } => to_value(&self.consult_profile(&profile_id, &other_info)?),
        }
    }

    /// Dispatch a raw JSON message.
    ///
    /// Never fails: an unrecognized message, a malformed payload, or a failed
    /// handler all come back as `{"error": <message>}`.
    pub fn process_request(&mut self, message: &Value) -> Value {
        let outcome = HealthRequest::from_message(message).and_then(|request| {
            debug!(agent = %self.name, request = request.kind().tag(), "dispatching request");
            self.handle(request)
        });

        outcome.unwrap_or_else(|e| {
            warn!(agent = %self.name, error = %e, "request failed");
            json!({ "error": e.to_string() })
        })
    }

    /// Release the page session. Dropping the agent releases it as well.
    pub fn close(mut self) -> HealthResult<()> {
        info!(agent = %self.name, "closing health agent");
        self.scraper.close()
    }
}
