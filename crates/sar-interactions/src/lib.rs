//! # sar-interactions
//!
//! Drug, food, and disease interaction lookups for the SAR health specialist.
//!
//! ## Flow
//!
//! ```text
//! drug name
//!   └─ search page ──► first /drug-interactions/ link ──► slug
//!        ├─ index page, filter=3 ──► major interacting drugs
//!        ├─ index page, filter=2 ──► moderate interacting drugs
//!        ├─ food page ──► reference text
//!        └─ disease page ──► reference text
//! ```
//!
//! Pages are loaded through a `PageSession`. `HttpSession` talks to the live
//! site; `FixtureSession` serves canned markup.

pub mod config;
pub mod extract;
pub mod lookup;
pub mod session;
pub mod urls;

pub use config::ScraperConfig;
pub use lookup::InteractionScraper;
pub use session::{FixtureSession, HttpSession};
pub use urls::SiteUrls;
