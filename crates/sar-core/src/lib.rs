//! # sar-core
//!
//! The deterministic core of the SAR health specialist.
//!
//! This crate provides:
//! - The collaborator traits (`PageSession`, `LlmClient`)
//! - The pure health calculators in [`health`]
//! - Agent-scoped state: [`state::ProfileStore`], [`state::StatusCache`],
//!   [`state::MissionStatus`]
//!
//! ## Usage
//!
//! ```rust,ignore
//! use sar_core::health::{extrapolate_current_status, estimate_survival_time};
//!
//! let report = extrapolate_current_status(&profile);
//! let survival = estimate_survival_time(report.current_status, &environment);
//! ```

pub mod health;
pub mod state;
pub mod traits;

pub use state::{MissionStatus, ProfileStore, StatusCache};

// ── Tests ────────────────────────────────────────────────────────────────────
