//! Collaborator traits for the health specialist.
//!
//! - `PageSession` is the page-rendering session the interaction scraper
//!   drives (a headless browser or a plain HTTP client).
//! - `LlmClient` is the chat-completion model used for profile consultations.
//!
//! Both are external, stateful resources. The agent holds exactly one of each
//! and never shares them between concurrent callers.

use std::time::Duration;

use sar_contracts::error::HealthResult;

/// A session that loads pages and waits for them to become usable.
///
/// One session is acquired when the agent is built and reused for every
/// scraping call. It is not safe to drive a session from more than one
/// logical caller at a time; callers that need concurrency must acquire one
/// session each.
pub trait PageSession: Send {
    /// Navigate to `url` and return the page source once an element matching
    /// the CSS selector `ready` is present.
    ///
    /// Returns `HealthError::ScrapeTimeout` when no matching element appears
    /// within `timeout`. There is no retry; a blocked wait runs to `timeout`.
    fn load(&mut self, url: &str, ready: &str, timeout: Duration) -> HealthResult<String>;

    /// Release the session. Later calls to `load` fail with
    /// `HealthError::SessionClosed`. Closing twice is a no-op.
    fn close(&mut self) -> HealthResult<()>;
}

/// A chat-completion language model.
pub trait LlmClient: Send + Sync {
    /// Send one system prompt and one user prompt; return the reply text.
    ///
    /// Any transport, status, or decoding failure is reported as
    /// `HealthError::Upstream`.
    fn complete(&self, system: &str, user: &str) -> HealthResult<String>;

    /// The model identifier, for logging.
    fn model(&self) -> &str;
}
