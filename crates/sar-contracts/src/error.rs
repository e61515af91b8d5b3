//! Error types for the SAR health specialist.
//!
//! Every fallible operation returns `HealthResult<T>`. Only the request
//! dispatcher flattens these into `{"error": <message>}` records; direct
//! callers of the scraper and the profile store receive them as-is.

use thiserror::Error;

/// The unified error type for the health specialist crates.
#[derive(Debug, Error)]
pub enum HealthError {
    /// The dispatcher found no recognized request tag in the message.
    ///
    /// The display text is part of the wire contract and must not change.
    #[error("Unknown request type")]
    UnknownRequest,

    /// A recognized request was missing a payload key or carried a malformed one.
    #[error("invalid request: {reason}")]
    InvalidRequest { reason: String },

    /// No profile is stored under the requested id.
    #[error("profile '{profile_id}' not found")]
    ProfileNotFound { profile_id: String },

    /// A profile extension tried to change the id the profile is stored under.
    #[error("profile '{profile_id}' cannot be re-keyed to '{attempted}'")]
    ProfileIdConflict { profile_id: String, attempted: String },

    /// The expected page element did not appear within the wait bound.
    #[error("{reason}")]
    ScrapeTimeout { reason: String },

    /// The fetched markup did not contain the expected link, pattern, or section.
    #[error("{reason}")]
    ParseFailure { reason: String },

    /// The page could not be fetched for a reason other than the wait bound.
    #[error("request to '{url}' failed: {reason}")]
    Transport { url: String, reason: String },

    /// The page session was used after it had been released.
    #[error("page session is closed")]
    SessionClosed,

    /// The language model collaborator returned an error or an unusable reply.
    #[error("language model call failed: {reason}")]
    Upstream { reason: String },

    /// A configuration value is missing or invalid.
    #[error("configuration error: {reason}")]
    ConfigError { reason: String },

    /// A handler result could not be encoded as JSON.
    #[error("serialization error: {reason}")]
    Serialization { reason: String },
}

/// Convenience alias used throughout the health specialist crates.
pub type HealthResult<T> = Result<T, HealthError>;
