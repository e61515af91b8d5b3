//! Scraper configuration.
//!
//! `ScraperConfig` is usually embedded as the `[scraper]` table of the agent
//! configuration, but can be loaded on its own with `from_toml_str` or
//! `from_file`. Every field has a default, so an empty document is valid.
//!
//! ```toml
//! base_url = "https://www.drugs.com"
//! wait_timeout_secs = 10
//! user_agent = "Mozilla/5.0 ..."
//! viewport = { width = 1920, height = 1080 }
//! ```

use std::{path::Path, time::Duration};

use reqwest::Url;
use serde::{Deserialize, Serialize};

use sar_contracts::error::{HealthError, HealthResult};

pub const DEFAULT_BASE_URL: &str = "https://www.drugs.com";
pub const DEFAULT_WAIT_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// The fixed viewport the page session presents to the site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 1920,
            height: 1080,
        }
    }
}

/// Settings for the interaction scraper and its page session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScraperConfig {
    /// Origin of the drug-information site, without a trailing slash.
    pub base_url: String,

    /// Upper bound on each page wait. There is no retry after it expires.
    pub wait_timeout_secs: u64,

    pub user_agent: String,

    pub viewport: Viewport,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            wait_timeout_secs: DEFAULT_WAIT_TIMEOUT_SECS,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            viewport: Viewport::default(),
        }
    }
}

impl ScraperConfig {
    /// Parse `s` as TOML and validate the result.
    ///
    /// Returns `HealthError::ConfigError` if the TOML is malformed or a value
    /// fails validation.
    pub fn from_toml_str(s: &str) -> HealthResult<Self> {
        let config: ScraperConfig = toml::from_str(s).map_err(|e| HealthError::ConfigError {
            reason: format!("failed to parse scraper TOML: {}", e),
        })?;
        config.validated()
    }

    /// Read the file at `path` and parse it as scraper configuration.
    pub fn from_file(path: &Path) -> HealthResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| HealthError::ConfigError {
            reason: format!("failed to read scraper config '{}': {}", path.display(), e),
        })?;
        Self::from_toml_str(&contents)
    }

    /// Check that the base URL parses and the wait bound is non-zero, and
    /// normalize away any trailing slash on the base URL.
    pub fn validated(mut self) -> HealthResult<Self> {
        Url::parse(&self.base_url).map_err(|e| HealthError::ConfigError {
            reason: format!("invalid scraper base_url '{}': {}", self.base_url, e),
        })?;
        if self.wait_timeout_secs == 0 {
            return Err(HealthError::ConfigError {
                reason: "scraper wait_timeout_secs must be greater than zero".to_string(),
            });
        }
        let trimmed = self.base_url.trim_end_matches('/').len();
        self.base_url.truncate(trimmed);
        Ok(self)
    }

    pub fn wait_timeout(&self) -> Duration {
        Duration::from_secs(self.wait_timeout_secs)
    }
}
