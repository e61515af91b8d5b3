//! Mission status records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Mission status every agent starts in.
pub const INITIAL_MISSION_STATUS: &str = "standby";

/// Reply to `update_status`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusUpdated {
    /// Always `"updated"`.
    pub status: String,
    pub new_status: String,
    pub updated_at: DateTime<Utc>,
}

/// Reply to `get_status`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusSnapshot {
    pub status: String,
}
