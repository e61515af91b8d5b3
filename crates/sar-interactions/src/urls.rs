//! Page URLs on the drug-information site.
//!
//! The URL scheme is fixed by the site:
//!
//! | Page                 | Path                                                   |
//! |----------------------|--------------------------------------------------------|
//! | Search               | `/search.php?searchterm={name}`                        |
//! | Interaction index    | `/drug-interactions/{slug}-index.html?filter={2\|3}`   |
//! | Food interactions    | `/food-interactions/{slug}.html?professional=1`        |
//! | Disease interactions | `/disease-interactions/{slug}.html?professional=1`     |

use reqwest::Url;

use sar_contracts::{
    error::{HealthError, HealthResult},
    interaction::{InteractionLevel, InteractionSlug},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteUrls {
    base: String,
}

impl SiteUrls {
    /// `base` is the site origin; a trailing slash is ignored.
    pub fn new(base: impl Into<String>) -> Self {
        let mut base = base.into();
        let trimmed = base.trim_end_matches('/').len();
        base.truncate(trimmed);
        Self { base }
    }

    /// The search page for `drug_name`, form-encoded.
    pub fn search(&self, drug_name: &str) -> HealthResult<String> {
        let mut url = Url::parse(&format!("{}/search.php", self.base)).map_err(|e| {
            HealthError::ConfigError {
                reason: format!("invalid site base '{}': {}", self.base, e),
            }
        })?;
        url.query_pairs_mut().append_pair("searchterm", drug_name);
        Ok(url.into())
    }

    pub fn interaction_index(&self, slug: &InteractionSlug, level: InteractionLevel) -> String {
        format!(
            "{}/drug-interactions/{}-index.html?filter={}",
            self.base,
            slug,
            level.filter()
        )
    }

    pub fn food_interactions(&self, slug: &InteractionSlug) -> String {
        format!("{}/food-interactions/{}.html?professional=1", self.base, slug)
    }

    pub fn disease_interactions(&self, slug: &InteractionSlug) -> String {
        format!("{}/disease-interactions/{}.html?professional=1", self.base, slug)
    }
}
