//! Interaction lookups against the drug-information site.
//!
//! `InteractionScraper` drives one `PageSession` through the site's page
//! sequence: search → slug → per-severity index pages, plus the food and
//! disease reference pages. Every page wait is bounded by the configured
//! timeout and is never retried.

use std::{collections::BTreeSet, time::Duration};

use tracing::{debug, info, warn};

use sar_contracts::{
    error::{HealthError, HealthResult},
    interaction::{DrugInteractions, InteractionLevel, InteractionRecord, InteractionSlug},
};
use sar_core::traits::PageSession;

use crate::{
    config::ScraperConfig,
    extract::{
        extract_interacting_drugs, extract_reference_text, extract_slug, INTERACTION_LINK,
        INTERACTION_LIST, REFERENCE_SECTION,
    },
    urls::SiteUrls,
};

/// Scrapes drug, food, and disease interactions for named drugs.
///
/// Owns its page session exclusively. Operations take `&mut self` because a
/// session serves one navigation at a time.
pub struct InteractionScraper {
    session: Box<dyn PageSession>,
    urls: SiteUrls,
    wait: Duration,
}

impl InteractionScraper {
    pub fn new(session: Box<dyn PageSession>, config: &ScraperConfig) -> Self {
        Self {
            session,
            urls: SiteUrls::new(config.base_url.as_str()),
            wait: config.wait_timeout(),
        }
    }

    /// Load `url` and wait for `ready`; a timed-out wait is reported with
    /// `on_timeout`'s message.
    fn load(
        &mut self,
        url: &str,
        ready: &str,
        on_timeout: impl FnOnce() -> String,
    ) -> HealthResult<String> {
        debug!(url, ready, "loading page");
        self.session
            .load(url, ready, self.wait)
            .map_err(|e| match e {
                HealthError::ScrapeTimeout { reason } => {
                    warn!(url, %reason, "page wait expired");
                    HealthError::ScrapeTimeout {
                        reason: on_timeout(),
                    }
                }
                other => other,
            })
    }

    /// Search for `drug_name` and take the slug from the first interaction
    /// link in the results.
    ///
    /// # Errors
    ///
    /// - `ScrapeTimeout` if no interaction link appears on the results page
    /// - `ParseFailure` if the link is missing or does not carry a slug
    pub fn resolve_slug(&mut self, drug_name: &str) -> HealthResult<InteractionSlug> {
        let url = self.urls.search(drug_name)?;
        let html = self.load(&url, INTERACTION_LINK, || {
            format!("Failed to retrieve search results for '{drug_name}'.")
        })?;

        let slug = extract_slug(&html, drug_name)?;
        debug!(drug_name, slug = %slug, "resolved interaction slug");
        Ok(slug)
    }

    /// Names of drugs listed on the index page for one severity level.
    pub fn interacting_drugs(
        &mut self,
        slug: &InteractionSlug,
        level: InteractionLevel,
    ) -> HealthResult<BTreeSet<String>> {
        let url = self.urls.interaction_index(slug, level);
        let html = self.load(&url, INTERACTION_LIST, || {
            format!(
                "Failed to retrieve interactions page for slug '{slug}' with filter {}.",
                level.filter()
            )
        })?;
        Ok(extract_interacting_drugs(&html))
    }

    /// Major and moderate interacting drugs for `slug`.
    ///
    /// The two levels are fetched one after the other; a failure on either
    /// fails the whole lookup.
    pub fn drug_interactions(&mut self, slug: &InteractionSlug) -> HealthResult<DrugInteractions> {
        let major = self.interacting_drugs(slug, InteractionLevel::Major)?;
        let moderate = self.interacting_drugs(slug, InteractionLevel::Moderate)?;
        info!(
            slug = %slug,
            major = major.len(),
            moderate = moderate.len(),
            "drug interactions retrieved"
        );
        Ok(DrugInteractions { major, moderate })
    }

    /// The professional food-interaction reference text for `slug`.
    pub fn food_interactions(&mut self, slug: &InteractionSlug) -> HealthResult<String> {
        let url = self.urls.food_interactions(slug);
        let html = self.load(&url, REFERENCE_SECTION, || {
            format!("Failed to retrieve food interactions page for slug '{slug}'.")
        })?;
        extract_reference_text(&html).ok_or_else(|| HealthError::ParseFailure {
            reason: "Could not locate the food interactions reference section on the page."
                .to_string(),
        })
    }

    /// The professional disease-interaction reference text for `slug`.
    pub fn disease_interactions(&mut self, slug: &InteractionSlug) -> HealthResult<String> {
        let url = self.urls.disease_interactions(slug);
        let html = self.load(&url, REFERENCE_SECTION, || {
            format!("Failed to retrieve disease interactions page for slug '{slug}'.")
        })?;
        extract_reference_text(&html).ok_or_else(|| HealthError::ParseFailure {
            reason: "Could not locate the disease interactions reference section on the page."
                .to_string(),
        })
    }

    /// Resolve the slug once and gather every interaction category.
    ///
    /// Any failing step fails the whole aggregate; no partial record is
    /// returned.
    pub fn all_interactions(&mut self, drug_name: &str) -> HealthResult<InteractionRecord> {
        let slug = self.resolve_slug(drug_name)?;
        let drug_interactions = self.drug_interactions(&slug)?;
        let food_interactions = self.food_interactions(&slug)?;
        let disease_interactions = self.disease_interactions(&slug)?;

        Ok(InteractionRecord {
            drug_name: drug_name.to_string(),
            slug,
            drug_interactions,
            food_interactions,
            disease_interactions,
        })
    }

    /// Release the page session.
    pub fn close(&mut self) -> HealthResult<()> {
        self.session.close()
    }
}
