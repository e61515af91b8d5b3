//! # sar-contracts
//!
//! Shared types, requests, and errors for the SAR health specialist agent.
//!
//! All crates in the workspace import from here. No business logic lives in
//! this crate, only data definitions, request parsing, and error types.

pub mod assessment;
pub mod environment;
pub mod error;
pub mod interaction;
pub mod mission;
pub mod profile;
pub mod request;
