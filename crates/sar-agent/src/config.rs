//! Agent configuration.
//!
//! Loaded from TOML. Every table and field is optional:
//!
//! ```toml
//! [agent]
//! name = "health_specialist"
//!
//! [scraper]
//! base_url = "https://www.drugs.com"
//! wait_timeout_secs = 10
//!
//! [llm]
//! base_url = "https://api.openai.com/v1"
//! model = "gpt-3.5-turbo"
//! max_tokens = 2500
//! api_key_env = "OPENAI_API_KEY"
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use sar_contracts::error::{HealthError, HealthResult};
use sar_interactions::ScraperConfig;

pub const DEFAULT_AGENT_NAME: &str = "health_specialist";

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    pub agent: AgentSection,
    pub scraper: ScraperConfig,
    pub llm: LlmConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentSection {
    pub name: String,
}

impl Default for AgentSection {
    fn default() -> Self {
        Self {
            name: DEFAULT_AGENT_NAME.to_string(),
        }
    }
}

/// Chat-completion endpoint settings.
///
/// The API key is never stored in the file; `api_key_env` names the
/// environment variable that holds it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    pub base_url: String,
    pub model: String,
    pub max_tokens: u32,
    pub api_key_env: String,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com/v1".to_string(),
            model: "gpt-3.5-turbo".to_string(),
            max_tokens: 2500,
            api_key_env: "OPENAI_API_KEY".to_string(),
        }
    }
}

impl LlmConfig {
    /// The key from the configured environment variable, if set and non-empty.
    pub fn api_key(&self) -> Option<String> {
        std::env::var(&self.api_key_env)
            .ok()
            .filter(|key| !key.trim().is_empty())
    }
}

impl AgentConfig {
    /// Parse `s` as TOML.
    ///
    /// Returns `HealthError::ConfigError` if the document is malformed or the
    /// scraper section fails validation.
    pub fn from_toml_str(s: &str) -> HealthResult<Self> {
        let mut config: AgentConfig = toml::from_str(s).map_err(|e| HealthError::ConfigError {
            reason: format!("failed to parse agent TOML: {}", e),
        })?;
        config.scraper = config.scraper.validated()?;
        if config.llm.max_tokens == 0 {
            return Err(HealthError::ConfigError {
                reason: "llm max_tokens must be greater than zero".to_string(),
            });
        }
        Ok(config)
    }

    pub fn from_file(path: &Path) -> HealthResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| HealthError::ConfigError {
            reason: format!("failed to read agent config '{}': {}", path.display(), e),
        })?;
        Self::from_toml_str(&contents)
    }
}
