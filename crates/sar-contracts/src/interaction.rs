//! Drug interaction types.
//!
//! An `InteractionSlug` is the token the drug-information site uses in its
//! URL scheme for a drug or drug combination, e.g. `omaveloxolone,skyclarys`
//! from `/drug-interactions/omaveloxolone,skyclarys.html`.

use std::{collections::BTreeSet, fmt};

use serde::{Deserialize, Serialize};

use crate::error::{HealthError, HealthResult};

/// A non-empty URL path segment identifying a drug on the interaction site.
///
/// Construction is validated: a slug is never empty and never contains a
/// path separator, so it can be spliced into the templated page URLs as-is.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct InteractionSlug(String);

impl InteractionSlug {
    pub fn new(token: impl Into<String>) -> HealthResult<Self> {
        let token = token.into();
        if token.is_empty() || token.contains('/') {
            return Err(HealthError::ParseFailure {
                reason: format!("'{token}' is not a valid interaction slug"),
            });
        }
        Ok(Self(token))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for InteractionSlug {
    type Error = HealthError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<InteractionSlug> for String {
    fn from(slug: InteractionSlug) -> Self {
        slug.0
    }
}

impl fmt::Display for InteractionSlug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Severity filter on the interaction index page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InteractionLevel {
    Major,
    Moderate,
}

impl InteractionLevel {
    /// The `filter` query value the site uses for this level.
    pub fn filter(self) -> u8 {
        match self {
            InteractionLevel::Major => 3,
            InteractionLevel::Moderate => 2,
        }
    }
}

impl fmt::Display for InteractionLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InteractionLevel::Major => f.write_str("major"),
            InteractionLevel::Moderate => f.write_str("moderate"),
        }
    }
}

/// Interacting drug names by severity.
///
/// Both collections are sets; their serialized order carries no meaning.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DrugInteractions {
    pub major: BTreeSet<String>,
    pub moderate: BTreeSet<String>,
}

/// Reply to `get_food_interactions`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FoodInteractions {
    pub food_interactions: String,
}

/// Reply to `get_disease_interactions`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiseaseInteractions {
    pub disease_interactions: String,
}

/// Everything known about one drug's interactions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InteractionRecord {
    /// The name as the caller supplied it.
    pub drug_name: String,
    pub slug: InteractionSlug,
    pub drug_interactions: DrugInteractions,
    pub food_interactions: String,
    pub disease_interactions: String,
}
