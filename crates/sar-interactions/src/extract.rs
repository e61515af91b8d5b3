//! HTML extraction for the drug-information site.
//!
//! Pure functions over page source. Nothing here performs I/O; the scraper
//! loads pages through a `PageSession` and hands the markup to these.

use std::collections::BTreeSet;

use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};

use sar_contracts::{
    error::{HealthError, HealthResult},
    interaction::InteractionSlug,
};

/// Present on a search results page once interaction links have rendered.
pub const INTERACTION_LINK: &str = "a[href*='/drug-interactions/']";

/// The interacting-drug list on an interaction index page.
pub const INTERACTION_LIST: &str = "ul.interactions.ddc-list-column-2";

/// The professional reference section on food and disease pages.
pub const REFERENCE_SECTION: &str = "div.interactions-reference";

static LINK_SELECTOR: Lazy<Selector> = Lazy::new(|| compile(INTERACTION_LINK));
static LIST_SELECTOR: Lazy<Selector> = Lazy::new(|| compile(INTERACTION_LIST));
static REFERENCE_SELECTOR: Lazy<Selector> = Lazy::new(|| compile(REFERENCE_SECTION));
static ITEM_SELECTOR: Lazy<Selector> = Lazy::new(|| compile("li"));
static ANCHOR_SELECTOR: Lazy<Selector> = Lazy::new(|| compile("a"));

static SLUG_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"/drug-interactions/([^/]+)\.html").expect("slug pattern is valid")
});

fn compile(css: &str) -> Selector {
    Selector::parse(css).expect("built-in selector is valid")
}

/// Parse a caller-supplied CSS selector.
pub fn parse_selector(css: &str) -> HealthResult<Selector> {
    Selector::parse(css).map_err(|e| HealthError::ConfigError {
        reason: format!("invalid CSS selector '{css}': {e:?}"),
    })
}

/// True when `html` contains at least one element matching `selector`.
pub fn contains_element(html: &str, selector: &Selector) -> bool {
    Html::parse_document(html).select(selector).next().is_some()
}

/// The `href` of the first interaction link on a search results page.
pub fn first_interaction_link(html: &str) -> Option<String> {
    let document = Html::parse_document(html);
    let href = document
        .select(&LINK_SELECTOR)
        .find_map(|a| a.value().attr("href"))?;
    Some(href.to_string())
}

/// Pull the slug out of an interaction link such as
/// `/drug-interactions/omaveloxolone,skyclarys.html`.
pub fn slug_from_href(href: &str) -> HealthResult<InteractionSlug> {
    SLUG_PATTERN
        .captures(href)
        .and_then(|captures| captures.get(1))
        .ok_or_else(|| HealthError::ParseFailure {
            reason: format!("Could not parse interaction slug from link: {href}"),
        })
        .and_then(|token| InteractionSlug::new(token.as_str()))
}

/// Resolve the slug for `drug_name` from its search results page.
///
/// Fails with `ParseFailure` if the page has no interaction link or the first
/// link does not follow the site's interaction URL pattern.
pub fn extract_slug(html: &str, drug_name: &str) -> HealthResult<InteractionSlug> {
    let href = first_interaction_link(html).ok_or_else(|| HealthError::ParseFailure {
        reason: format!("No drug interactions link found for '{drug_name}'."),
    })?;
    slug_from_href(&href)
}

/// Collect the interacting drug names listed on an interaction index page.
///
/// Long lists are split across several list elements; every one is read.
/// Each list item contributes the trimmed text of its first link. Items with
/// no link, or whose link text is blank, are skipped. A page with no list
/// yields an empty set.
pub fn extract_interacting_drugs(html: &str) -> BTreeSet<String> {
    let document = Html::parse_document(html);
    document
        .select(&LIST_SELECTOR)
        .flat_map(|list| list.select(&ITEM_SELECTOR))
        .filter_map(|item| item.select(&ANCHOR_SELECTOR).next())
        .map(|anchor| anchor.text().collect::<String>().trim().to_string())
        .filter(|name| !name.is_empty())
        .collect()
}

/// The text of the professional reference section, or `None` when the page
/// has no such section.
///
/// Text nodes are trimmed, blank ones dropped, and the rest joined with
/// newlines.
pub fn extract_reference_text(html: &str) -> Option<String> {
    let document = Html::parse_document(html);
    let section = document.select(&REFERENCE_SELECTOR).next()?;
    Some(joined_text(section))
}

fn joined_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .map(str::trim)
        .filter(|chunk| !chunk.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}
