//! # sar-agent
//!
//! The SAR health specialist agent: typed and JSON request dispatch over the
//! health calculators, profile store, mission status, interaction scraper,
//! and language-model consultation.
//!
//! ## Usage
//!
//! ```rust,ignore
//! let config = AgentConfig::from_file(path)?;
//! let mut agent = HealthAgent::from_config(&config)?;
//! let reply = agent.process_request(&json!({"get_status": true}));
//! agent.close()?;
//! ```

pub mod agent;
pub mod config;
pub mod llm;

pub use agent::HealthAgent;
pub use config::AgentConfig;

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use serde_json::{json, Value};

    use sar_contracts::{
        error::{HealthError, HealthResult},
        interaction::{InteractionLevel, InteractionSlug},
        profile::PatientProfile,
    };
    use sar_core::traits::LlmClient;
    use sar_interactions::{FixtureSession, ScraperConfig, SiteUrls};

    use super::*;
    use agent::{consultation_prompt, AGENT_ROLE, PROFILE_ASSEMBLED, SYSTEM_MESSAGE};
    use llm::OpenAiChatClient;

    // ── Mock collaborators ───────────────────────────────────────────────────

    type Calls = Arc<Mutex<Vec<(String, String)>>>;

    /// Records every prompt pair and answers with a fixed reply.
    struct RecordingLlm {
        calls: Calls,
        reply: String,
    }

    impl LlmClient for RecordingLlm {
        fn complete(&self, system: &str, user: &str) -> HealthResult<String> {
            self.calls
                .lock()
                .unwrap()
                .push((system.to_string(), user.to_string()));
            Ok(self.reply.clone())
        }

        fn model(&self) -> &str {
            "mock-model"
        }
    }

    struct FailingLlm;

    impl LlmClient for FailingLlm {
        fn complete(&self, _system: &str, _user: &str) -> HealthResult<String> {
            Err(HealthError::Upstream {
                reason: "rate limited".to_string(),
            })
        }

        fn model(&self) -> &str {
            "failing-model"
        }
    }

    // ── Fixtures ─────────────────────────────────────────────────────────────

    const SEARCH_PAGE: &str = r#"<html><body>
        <a href="/drug-interactions/omaveloxolone,skyclarys.html">Interactions</a>
    </body></html>"#;

    const MAJOR_PAGE: &str = r#"<ul class="interactions ddc-list-column-2">
        <li><a href="/k.html">Ketoconazole</a></li>
        <li><a href="/i.html">Itraconazole</a></li>
    </ul>"#;

    const MODERATE_PAGE: &str = r#"<ul class="interactions ddc-list-column-2"></ul>"#;

    const FOOD_PAGE: &str =
        r#"<div class="interactions-reference"><p>Avoid grapefruit.</p></div>"#;

    const DISEASE_PAGE: &str =
        r#"<div class="interactions-reference"><p>Hepatic impairment</p></div>"#;

    fn skyclarys_site() -> FixtureSession {
        let urls = SiteUrls::new("https://www.drugs.com");
        let slug = InteractionSlug::new("omaveloxolone,skyclarys").unwrap();
        FixtureSession::new()
            .with_page(urls.search("skyclarys").unwrap(), SEARCH_PAGE)
            .with_page(urls.interaction_index(&slug, InteractionLevel::Major), MAJOR_PAGE)
            .with_page(urls.interaction_index(&slug, InteractionLevel::Moderate), MODERATE_PAGE)
            .with_page(urls.food_interactions(&slug), FOOD_PAGE)
            .with_page(urls.disease_interactions(&slug), DISEASE_PAGE)
    }

    fn agent_with(session: FixtureSession) -> HealthAgent {
        HealthAgent::new(Box::new(session), &ScraperConfig::default())
    }

    fn agent() -> HealthAgent {
        agent_with(FixtureSession::new())
    }

    fn profile(value: Value) -> PatientProfile {
        serde_json::from_value(value).unwrap()
    }

    // ── Identity ─────────────────────────────────────────────────────────────

    #[test]
    fn agent_identity() {
        let agent = agent();
        assert_eq!(agent.name(), "health_specialist");
        assert_eq!(agent.role(), AGENT_ROLE);
        assert!(agent.system_message().contains("10. Updating and retrieving"));
        assert_eq!(agent.with_name("medic_2").name(), "medic_2");
    }

    // ── Profiles ─────────────────────────────────────────────────────────────

    #[test]
    fn assemble_profile_keeps_supplied_fields() {
        let mut agent = agent();
        let result = agent.process_request(&json!({
            "assemble_profile": true,
            "patient_data": {
                "id": "patient123",
                "age": 45,
                "medical_history": ["hypertension", "diabetes"],
                "allergies": ["penicillin"],
                "current_conditions": ["asthma"],
                "medications": [{"name": "DrugA", "dosage": "50mg", "frequency": "daily"}]
            }
        }));

        assert_eq!(result["profile"]["id"], "patient123");
        assert_eq!(result["profile"]["age"], 45);
        assert_eq!(result["profile"]["medical_history"], json!(["hypertension", "diabetes"]));
        assert_eq!(result["message"], PROFILE_ASSEMBLED);
    }

    #[test]
    fn assemble_profile_defaults_missing_fields() {
        let mut agent = agent();
        let result = agent.process_request(&json!({
            "assemble_profile": true,
            "patient_data": {"id": "patient456"}
        }));

        let profile = &result["profile"];
        assert_eq!(profile["id"], "patient456");
        assert_eq!(profile["age"], "unknown");
        for field in ["medical_history", "allergies", "current_conditions", "medications"] {
            assert_eq!(profile[field], json!([]), "{field}");
        }
    }

    #[test]
    fn assembled_profile_is_stored_by_id() {
        let mut agent = agent();
        let assembled = agent.assemble_health_profile(profile(json!({"id": "p1"})));

        let stored = agent.profiles().get("p1").unwrap();
        assert_eq!(stored, &assembled.profile);
        assert_eq!(stored, &PatientProfile::new("p1"));
    }

    #[test]
    fn assembly_drops_unknown_fields_and_replaces() {
        let mut agent = agent();
        agent.assemble_health_profile(profile(json!({"id": "p1", "blood_type": "O+"})));
        assert!(agent.profiles().get("p1").unwrap().extra.is_empty());

        agent.assemble_health_profile(profile(json!({"id": "p1", "age": 30})));
        assert_eq!(agent.profiles().len(), 1);
        assert_eq!(agent.profiles().get("p1").unwrap().age.as_years(), Some(30.0));
    }

    #[test]
    fn extend_profile_merges_new_keys() {
        let mut agent = agent();
        agent.assemble_health_profile(profile(json!({"id": "p1", "age": 40})));

        let result = agent.process_request(&json!({
            "extend_profile": true,
            "profile_id": "p1",
            "new_data": {"allergies": ["latex"], "blood_type": "O+"}
        }));

        assert_eq!(result["status"], "updated");
        assert_eq!(result["new_profile"]["allergies"], json!(["latex"]));
        assert_eq!(result["new_profile"]["blood_type"], "O+");
        assert_eq!(result["new_profile"]["age"], 40);
        assert_eq!(agent.profiles().get("p1").unwrap().extra["blood_type"], "O+");
    }

    #[test]
    fn extend_unknown_profile_is_error() {
        let mut agent = agent();
        let result = agent.process_request(&json!({
            "extend_profile": true,
            "profile_id": "ghost",
            "new_data": {"age": 20}
        }));
        assert_eq!(result, json!({"error": "profile 'ghost' not found"}));
    }

    #[test]
    fn extend_cannot_change_id() {
        let mut agent = agent();
        agent.assemble_health_profile(PatientProfile::new("p1"));

        let err = agent
            .extend_profile("p1", json!({"id": "p2"}).as_object().unwrap())
            .unwrap_err();
        assert!(matches!(err, HealthError::ProfileIdConflict { .. }));
        assert!(agent.profiles().get("p1").is_some());
        assert!(agent.profiles().get("p2").is_none());
    }

    // ── Status and assessments ───────────────────────────────────────────────

    #[test]
    fn extrapolate_status_scores_and_caches() {
        let mut agent = agent();

        let stable = agent.process_request(&json!({
            "extrapolate_status": true,
            "profile": {"id": "p1", "age": 45, "current_conditions": ["asthma"]}
        }));
        assert_eq!(stable["current_status"], "stable");
        assert_eq!(stable["health_score"], 77.5);

        let critical = agent.process_request(&json!({
            "extrapolate_status": true,
            "profile": {"id": "p2", "current_conditions": ["cardiac_arrest"]}
        }));
        assert_eq!(critical["current_status"], "critical");
        assert_eq!(critical["health_score"], 75.0);

        assert_eq!(agent.status_cache().len(), 2);
        assert!(agent.status_cache().get("p2").unwrap().current_status.is_critical());
    }

    #[test]
    fn analyze_medication_counts_prescriptions() {
        let mut agent = agent();
        let single = agent.process_request(&json!({
            "analyze_medication": true,
            "medication_data": [{"name": "DrugA", "dosage": "10mg", "frequency": "daily"}]
        }));
        assert_eq!(
            single["medication_analysis"],
            json!(["No significant drug interactions detected."])
        );

        let multiple = agent.process_request(&json!({
            "analyze_medication": true,
            "medication_data": [{"name": "DrugA"}, {"name": "DrugB"}]
        }));
        assert_eq!(
            multiple["medication_analysis"][0],
            "Potential drug interactions detected among prescribed medications."
        );

        let empty = agent.process_request(&json!({"analyze_medication": true, "medication_data": []}));
        assert_eq!(
            empty["medication_analysis"][0],
            "No significant drug interactions detected."
        );
    }

    #[test]
    fn ad_hoc_medication_fields_are_accepted() {
        let mut agent = agent();
        let analysis = agent.process_request(&json!({
            "analyze_medication": true,
            "medication_data": [
                {"name": "DrugA", "dosage": 50, "frequency": "daily"},
                {"name": "DrugB"}
            ]
        }));
        assert_eq!(
            analysis["medication_analysis"][0],
            "Potential drug interactions detected among prescribed medications."
        );

        let assembled = agent.process_request(&json!({
            "assemble_profile": true,
            "patient_data": {"id": "p1", "medications": [{"name": "DrugA", "dosage": 50}]}
        }));
        assert_eq!(assembled["profile"]["medications"][0]["dosage"], "50");
    }

    #[test]
    fn evaluate_environment_levels() {
        let mut agent = agent();
        let cases = [
            (json!({"pollution_level": 120, "temperature": 22}), json!({"current_conditions": ["asthma"]}), "high"),
            (json!({"pollution_level": 50, "temperature": 40}), json!({}), "moderate"),
            (json!({"pollution_level": 50, "temperature": 22}), json!({}), "minimal"),
            (json!({"pollution_level": 120, "temperature": 40}), json!({"current_conditions": ["asthma"]}), "high"),
        ];
        for (environment, patient, expected) in cases {
            let result = agent.process_request(&json!({
                "evaluate_environment": true,
                "environment_data": environment.clone(),
                "patient_data": patient
            }));
            assert_eq!(result["environmental_impact"], expected, "{environment}");
            assert_eq!(result["details"], environment);
        }
    }

    #[test]
    fn evaluate_environment_without_patient() {
        let mut agent = agent();
        let result = agent.process_request(&json!({
            "evaluate_environment": true,
            "environment_data": {"pollution_level": 500}
        }));
        assert_eq!(result["environmental_impact"], "minimal");
    }

    #[test]
    fn survival_recomputes_status_from_profile() {
        let mut agent = agent();
        let cases = [
            (json!({"id": "a"}), json!({"temperature": 20}), 48.0),
            (json!({"id": "b", "current_conditions": ["severe_injury"]}), json!({"temperature": 20}), 24.0),
            (json!({"id": "c"}), json!({"temperature": 45}), 36.0),
            (json!({"id": "d", "current_conditions": ["respiratory_failure"]}), json!({"temperature": -5}), 18.0),
        ];
        for (profile, environment, expected) in cases {
            let result = agent.process_request(&json!({
                "estimate_survival": true,
                "profile": profile,
                "environment_data": environment
            }));
            assert_eq!(result["estimated_survival_hours"], expected);
        }
        assert_eq!(agent.status_cache().len(), 4);
    }

    #[test]
    fn plan_resources_by_status_and_age() {
        let mut agent = agent();
        let elderly = agent.process_request(&json!({
            "plan_resources": true,
            "profile": {"id": "p", "age": 70},
            "current_status": {"current_status": "stable", "health_score": 65}
        }));
        assert_eq!(
            elderly["recommended_resources"],
            json!(["basic first aid kit", "geriatric care supplies"])
        );

        let critical = agent.process_request(&json!({
            "plan_resources": true,
            "profile": {"id": "p", "age": 30},
            "current_status": {"current_status": "critical"}
        }));
        assert_eq!(
            critical["recommended_resources"],
            json!(["advanced life support equipment"])
        );
    }

    #[test]
    fn assess_health_risk_lists_each_cause() {
        let mut agent = agent();
        let calm = agent.process_request(&json!({
            "assess_health_risk": true,
            "profile": {"id": "p"},
            "environment_data": {"pollution_level": 50}
        }));
        assert_eq!(calm["health_risks"], json!([]));

        let both = agent.process_request(&json!({
            "assess_health_risk": true,
            "profile": {"id": "p", "current_conditions": ["cardiac_arrest"]},
            "environment_data": {"pollution_level": 200}
        }));
        assert_eq!(
            both["health_risks"],
            json!([
                "High risk due to critical health status.",
                "High risk due to extreme environmental pollution."
            ])
        );
    }

    #[test]
    fn medical_advice_variants() {
        let mut agent = agent();

        let stable = agent.process_request(&json!({
            "generate_medical_advice": true,
            "profile": {"id": "p"},
            "environment_data": {"temperature": 20, "pollution_level": 10}
        }));
        let advice = stable["medical_advice"].as_str().unwrap();
        assert!(advice.starts_with("Monitor the patient's condition continuously"));
        assert!(!advice.contains("Immediate evacuation"));

        let critical = agent.process_request(&json!({
            "generate_medical_advice": true,
            "profile": {"id": "p", "current_conditions": ["severe_injury"]},
            "environment_data": {"temperature": 20},
            "survival_estimation": {"estimated_survival_hours": 12}
        }));
        let advice = critical["medical_advice"].as_str().unwrap();
        assert!(advice.contains(
            "Identified risks include: High risk due to critical health status."
        ));
        assert!(advice.ends_with("Immediate evacuation is strongly recommended."));
    }

    // ── Dispatcher ───────────────────────────────────────────────────────────

    #[test]
    fn unknown_request_is_reported_exactly() {
        let mut agent = agent();
        for message in [json!({"unknown_key": "value"}), json!({}), json!("get_status"), json!(null)] {
            assert_eq!(
                agent.process_request(&message),
                json!({"error": "Unknown request type"})
            );
        }
    }

    #[test]
    fn missing_payload_is_reported_not_raised() {
        let mut agent = agent();
        let result = agent.process_request(&json!({"estimate_survival": true, "profile": {}}));
        let error = result["error"].as_str().unwrap();
        assert!(error.contains("environment_data"), "{error}");
    }

    #[test]
    fn first_tag_in_priority_order_wins() {
        let mut agent = agent();
        let result = agent.process_request(&json!({
            "get_status": true,
            "update_status": true,
            "status": "searching"
        }));
        assert_eq!(result["status"], "updated");
        assert_eq!(result["new_status"], "searching");
    }

    #[test]
    fn mission_status_lifecycle() {
        let mut agent = agent();
        assert_eq!(agent.process_request(&json!({"get_status": null})), json!({"status": "standby"}));

        agent.process_request(&json!({"update_status": true, "status": "phase_1"}));
        let updated = agent.process_request(&json!({"update_status": true, "status": "phase_2"}));
        assert!(updated["updated_at"].is_string());

        assert_eq!(agent.get_status().status, "phase_2");
    }

    #[test]
    fn typed_handle_matches_json_dispatch() {
        let mut agent = agent();
        let typed = agent
            .handle(sar_contracts::request::HealthRequest::GetStatus)
            .unwrap();
        assert_eq!(typed, agent.process_request(&json!({"get_status": true})));
    }

    // ── Interactions ─────────────────────────────────────────────────────────

    #[test]
    fn drug_interactions_through_dispatcher() {
        let mut agent = agent_with(skyclarys_site());
        let result = agent.process_request(&json!({
            "get_drug_interactions": true,
            "drug_name": "skyclarys"
        }));
        assert_eq!(
            result,
            json!({"major": ["Itraconazole", "Ketoconazole"], "moderate": []})
        );
    }

    #[test]
    fn food_and_disease_interactions_through_dispatcher() {
        let mut agent = agent_with(skyclarys_site());
        let food = agent.process_request(&json!({"get_food_interactions": true, "drug_name": "skyclarys"}));
        assert_eq!(food, json!({"food_interactions": "Avoid grapefruit."}));

        let disease =
            agent.process_request(&json!({"get_disease_interactions": true, "drug_name": "skyclarys"}));
        assert_eq!(disease, json!({"disease_interactions": "Hepatic impairment"}));
    }

    #[test]
    fn all_interactions_record() {
        let mut agent = agent_with(skyclarys_site());
        let result = agent.process_request(&json!({"get_all_interactions": true, "drug_name": "skyclarys"}));

        assert_eq!(result["drug_name"], "skyclarys");
        assert_eq!(result["slug"], "omaveloxolone,skyclarys");
        assert_eq!(result["drug_interactions"]["major"].as_array().unwrap().len(), 2);
        assert_eq!(result["food_interactions"], "Avoid grapefruit.");
    }

    #[test]
    fn scrape_failure_becomes_error_record() {
        let mut agent = agent();
        let result = agent.process_request(&json!({"get_all_interactions": true, "drug_name": "skyclarys"}));
        assert_eq!(
            result,
            json!({"error": "Failed to retrieve search results for 'skyclarys'."})
        );
    }

    #[test]
    fn close_releases_page_session() {
        let session = skyclarys_site();
        let log = session.log();
        agent_with(session).close().unwrap();
        assert!(log.lock().unwrap().closed);
    }

    // ── Consultation ─────────────────────────────────────────────────────────

    #[test]
    fn consult_sends_profile_facts() {
        let calls: Calls = Arc::default();
        let mut agent = agent().with_llm(Box::new(RecordingLlm {
            calls: Arc::clone(&calls),
            reply: "Check hydration.".to_string(),
        }));
        agent.assemble_health_profile(profile(json!({"id": "p1", "age": 52})));

        let result = agent.process_request(&json!({"consult_profile": true, "profile_id": "p1"}));
        assert_eq!(result, json!({"response": "Check hydration."}));

        let calls = calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        let (system, user) = &calls[0];
        assert_eq!(system, SYSTEM_MESSAGE);
        assert!(user.contains("\"id\": \"p1\""));
        assert!(user.contains("Other information supplied:\nNone\n"));
        assert!(user.ends_with("Please provide an analysis or suggest next steps."));
    }

    #[test]
    fn consult_passes_other_info() {
        let prompt = consultation_prompt(&PatientProfile::new("p1"), "found near river").unwrap();
        assert!(prompt.starts_with("You are a health specialist for SAR operations.\n"));
        assert!(prompt.contains("Other information supplied:\nfound near river\n"));
    }

    #[test]
    fn consult_failures() {
        let mut agent = agent();
        let missing = agent.process_request(&json!({"consult_profile": true, "profile_id": "p1"}));
        assert_eq!(missing, json!({"error": "profile 'p1' not found"}));

        agent.assemble_health_profile(PatientProfile::new("p1"));
        let unconfigured = agent.consult_profile("p1", "None").unwrap_err();
        assert_eq!(
            unconfigured.to_string(),
            "language model call failed: no language model configured"
        );

        let agent = agent.with_llm(Box::new(FailingLlm));
        let err = agent.consult_profile("p1", "None").unwrap_err();
        assert!(matches!(err, HealthError::Upstream { .. }));
    }

    // ── Config and LLM client ────────────────────────────────────────────────

    #[test]
    fn config_defaults() {
        let config = AgentConfig::from_toml_str("").unwrap();
        assert_eq!(config.agent.name, "health_specialist");
        assert_eq!(config.scraper, ScraperConfig::default());
        assert_eq!(config.llm.model, "gpt-3.5-turbo");
        assert_eq!(config.llm.max_tokens, 2500);
        assert_eq!(config.llm.api_key_env, "OPENAI_API_KEY");
    }

    #[test]
    fn config_sections_override() {
        let config = AgentConfig::from_toml_str(
            r#"
            [agent]
            name = "medic"

            [scraper]
            wait_timeout_secs = 5

            [llm]
            model = "gpt-4o-mini"
            api_key_env = "SAR_TEST_UNSET_KEY"
            "#,
        )
        .unwrap();
        assert_eq!(config.agent.name, "medic");
        assert_eq!(config.scraper.wait_timeout_secs, 5);
        assert_eq!(config.llm.model, "gpt-4o-mini");
        assert!(config.llm.api_key().is_none());
        assert!(OpenAiChatClient::from_env(&config.llm).unwrap().is_none());
    }

    #[test]
    fn config_errors() {
        for toml in ["[agent", "[scraper]\nwait_timeout_secs = 0", "[llm]\nmax_tokens = 0"] {
            assert!(matches!(
                AgentConfig::from_toml_str(toml),
                Err(HealthError::ConfigError { .. })
            ));
        }
    }

    #[test]
    fn chat_request_body_and_reply() {
        let client = OpenAiChatClient::new("sk-test", &config::LlmConfig::default()).unwrap();
        assert_eq!(client.model(), "gpt-3.5-turbo");

        let body = client.request_body("system text", "user text");
        assert_eq!(body["model"], "gpt-3.5-turbo");
        assert_eq!(body["max_tokens"], 2500);
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][1]["content"], "user text");

        let raw = json!({"choices": [{"message": {"content": "  Evacuate.\n"}}]});
        assert_eq!(OpenAiChatClient::parse_response(&raw).unwrap(), "Evacuate.");
        assert!(matches!(
            OpenAiChatClient::parse_response(&json!({"choices": []})),
            Err(HealthError::Upstream { .. })
        ));
    }
}
