//! Agent-scoped state: stored profiles, cached status reports, and the
//! mission status register.
//!
//! Nothing here is process-global. Each agent owns one of each, created with
//! the agent and dropped with it.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use tracing::{debug, info};

use sar_contracts::{
    assessment::StatusReport,
    error::{HealthError, HealthResult},
    mission::{StatusUpdated, INITIAL_MISSION_STATUS},
    profile::PatientProfile,
};

// ── Profile store ─────────────────────────────────────────────────────────────

/// Profiles keyed by their own `id`.
///
/// The key of every entry always equals the stored profile's `id` field:
/// `insert` keys by the profile's id and `extend` refuses merges that would
/// change it.
#[derive(Debug, Default)]
pub struct ProfileStore {
    profiles: HashMap<String, PatientProfile>,
}

impl ProfileStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `profile` under its id, replacing any profile with the same id.
    pub fn insert(&mut self, profile: PatientProfile) -> &PatientProfile {
        let id = profile.id.clone();
        debug!(profile_id = %id, "storing health profile");
        self.profiles.insert(id.clone(), profile);
        &self.profiles[&id]
    }

    pub fn get(&self, profile_id: &str) -> Option<&PatientProfile> {
        self.profiles.get(profile_id)
    }

    /// Shallow-merge `new_data` into the profile stored under `profile_id`.
    ///
    /// # Errors
    ///
    /// - `ProfileNotFound` if nothing is stored under `profile_id`
    /// - `ProfileIdConflict` if `new_data` would change the profile's id
    /// - `InvalidRequest` if the merged document is no longer a valid profile
    ///
    /// On error the stored profile is left unchanged.
    pub fn extend(
        &mut self,
        profile_id: &str,
        new_data: &Map<String, Value>,
    ) -> HealthResult<&PatientProfile> {
        let stored = self
            .profiles
            .get_mut(profile_id)
            .ok_or_else(|| HealthError::ProfileNotFound {
                profile_id: profile_id.to_string(),
            })?;

        let merged = stored.merged_with(new_data)?;
        if merged.id != profile_id {
            return Err(HealthError::ProfileIdConflict {
                profile_id: profile_id.to_string(),
                attempted: merged.id,
            });
        }

        debug!(profile_id = %profile_id, keys = new_data.len(), "extended health profile");
        *stored = merged;
        Ok(&*stored)
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }

    pub fn clear(&mut self) {
        self.profiles.clear();
    }
}

// ── Status cache ──────────────────────────────────────────────────────────────

/// The most recent status report computed for each profile id.
///
/// Separate from the mission status: this tracks subjects, the mission status
/// tracks the operation.
#[derive(Debug, Default)]
pub struct StatusCache {
    reports: HashMap<String, StatusReport>,
}

impl StatusCache {
    pub fn record(&mut self, profile_id: impl Into<String>, report: StatusReport) {
        self.reports.insert(profile_id.into(), report);
    }

    pub fn get(&self, profile_id: &str) -> Option<&StatusReport> {
        self.reports.get(profile_id)
    }

    pub fn len(&self) -> usize {
        self.reports.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reports.is_empty()
    }

    pub fn clear(&mut self) {
        self.reports.clear();
    }
}

// ── Mission status ────────────────────────────────────────────────────────────

/// The single free-text operational state of the mission.
///
/// Starts as `"standby"`; every update overwrites the previous value.
#[derive(Debug, Clone)]
pub struct MissionStatus {
    value: String,
    updated_at: Option<DateTime<Utc>>,
}

impl Default for MissionStatus {
    fn default() -> Self {
        Self {
            value: INITIAL_MISSION_STATUS.to_string(),
            updated_at: None,
        }
    }
}

impl MissionStatus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Overwrite the status and return the confirmation record.
    pub fn update(&mut self, status: impl Into<String>) -> StatusUpdated {
        let status = status.into();
        let now = Utc::now();
        info!(previous = %self.value, new_status = %status, "mission status updated");

        self.value = status.clone();
        self.updated_at = Some(now);

        StatusUpdated {
            status: "updated".to_string(),
            new_status: status,
            updated_at: now,
        }
    }

    pub fn current(&self) -> &str {
        &self.value
    }

    /// When the status was last overwritten; `None` while still initial.
    pub fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.updated_at
    }
}
