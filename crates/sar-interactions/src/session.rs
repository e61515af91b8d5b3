//! `PageSession` implementations.
//!
//! `HttpSession` fetches pages with a blocking HTTP client configured like a
//! desktop browser. `FixtureSession` serves canned markup from memory and
//! records every URL it is asked for; tests and offline demos use it.

use std::{
    collections::HashMap,
    fmt,
    sync::{Arc, Mutex},
    time::{Duration, Instant},
};

use reqwest::{
    blocking::Client,
    header::{HeaderMap, HeaderValue},
    StatusCode,
};
use tracing::{debug, info, warn};
use uuid::Uuid;

use sar_contracts::error::{HealthError, HealthResult};
use sar_core::traits::PageSession;

use crate::{
    config::ScraperConfig,
    extract::{contains_element, parse_selector},
};

/// Identifies one page session in log output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionId(Uuid);

impl SessionId {
    fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

fn not_ready(url: &str, ready: &str, timeout: Duration) -> HealthError {
    HealthError::ScrapeTimeout {
        reason: format!(
            "no element matching '{ready}' appeared on {url} within {}s",
            timeout.as_secs()
        ),
    }
}

// ── HttpSession ───────────────────────────────────────────────────────────────

/// A page session backed by `reqwest::blocking`.
///
/// The page is fetched once; the request timeout is the wait bound. A page
/// that arrives without the ready element counts as a timed-out wait, since
/// nothing will render it later.
pub struct HttpSession {
    id: SessionId,
    client: Option<Client>,
}

impl HttpSession {
    /// Build the client with the configured user agent and viewport hint.
    pub fn open(config: &ScraperConfig) -> HealthResult<Self> {
        let mut headers = HeaderMap::new();
        headers.insert("viewport-width", HeaderValue::from(config.viewport.width));

        let client = Client::builder()
            .user_agent(config.user_agent.as_str())
            .default_headers(headers)
            .timeout(config.wait_timeout())
            .build()
            .map_err(|e| HealthError::ConfigError {
                reason: format!("failed to build HTTP client: {e}"),
            })?;

        let id = SessionId::new();
        info!(
            session_id = %id,
            width = config.viewport.width,
            height = config.viewport.height,
            "page session opened"
        );
        Ok(Self {
            id,
            client: Some(client),
        })
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn is_open(&self) -> bool {
        self.client.is_some()
    }

    /// Fetch `url` and return its status and body.
    ///
    /// An error status is not a failure here: the body is still checked for
    /// the ready element, so a missing page reads as a wait that never
    /// completed.
    fn fetch(client: &Client, url: &str, timeout: Duration) -> HealthResult<(StatusCode, String)> {
        let classify = |e: reqwest::Error| {
            if e.is_timeout() {
                HealthError::ScrapeTimeout {
                    reason: format!("timed out after {}s waiting for {url}", timeout.as_secs()),
                }
            } else {
                HealthError::Transport {
                    url: url.to_string(),
                    reason: e.to_string(),
                }
            }
        };

        let response = client.get(url).timeout(timeout).send().map_err(classify)?;
        let status = response.status();
        let body = response.text().map_err(classify)?;
        Ok((status, body))
    }
}

impl PageSession for HttpSession {
    fn load(&mut self, url: &str, ready: &str, timeout: Duration) -> HealthResult<String> {
        let client = self.client.as_ref().ok_or(HealthError::SessionClosed)?;
        let selector = parse_selector(ready)?;

        let started = Instant::now();
        let (status, body) = Self::fetch(client, url, timeout)?;
        debug!(
            session_id = %self.id,
            url,
            status = status.as_u16(),
            bytes = body.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "page fetched"
        );

        if !contains_element(&body, &selector) {
            if !status.is_success() {
                warn!(session_id = %self.id, url, status = status.as_u16(), "page returned error status");
            }
            return Err(not_ready(url, ready, timeout));
        }
        Ok(body)
    }

    fn close(&mut self) -> HealthResult<()> {
        if self.client.take().is_some() {
            info!(session_id = %self.id, "page session closed");
        }
        Ok(())
    }
}

impl Drop for HttpSession {
    fn drop(&mut self) {
        if self.client.take().is_some() {
            warn!(session_id = %self.id, "page session dropped without close; releasing");
        }
    }
}

// ── FixtureSession ────────────────────────────────────────────────────────────

/// What a `FixtureSession` has been asked to do.
#[derive(Debug, Default)]
pub struct FixtureLog {
    /// Every URL passed to `load`, in call order, including failed loads.
    pub visited: Vec<String>,
    pub closed: bool,
}

/// Serves fixed markup per URL.
///
/// A URL with no page, or whose page lacks the ready element, fails the
/// same way a real wait would: with `ScrapeTimeout`. The log is shared so it
/// can be inspected after the session has been moved into a scraper.
#[derive(Debug, Default)]
pub struct FixtureSession {
    pages: HashMap<String, String>,
    log: Arc<Mutex<FixtureLog>>,
}

impl FixtureSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page(mut self, url: impl Into<String>, html: impl Into<String>) -> Self {
        self.pages.insert(url.into(), html.into());
        self
    }

    pub fn log(&self) -> Arc<Mutex<FixtureLog>> {
        Arc::clone(&self.log)
    }
}

impl PageSession for FixtureSession {
    fn load(&mut self, url: &str, ready: &str, timeout: Duration) -> HealthResult<String> {
        let mut log = self.log.lock().expect("fixture log lock poisoned");
        if log.closed {
            return Err(HealthError::SessionClosed);
        }
        log.visited.push(url.to_string());
        drop(log);

        let selector = parse_selector(ready)?;
        match self.pages.get(url) {
            Some(html) if contains_element(html, &selector) => Ok(html.clone()),
            _ => Err(not_ready(url, ready, timeout)),
        }
    }

    fn close(&mut self) -> HealthResult<()> {
        self.log.lock().expect("fixture log lock poisoned").closed = true;
        Ok(())
    }
}
