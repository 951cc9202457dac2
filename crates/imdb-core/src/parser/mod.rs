//! HTML parsers for IMDb pages
//!
//! Parsers turn page HTML into raw fields (`serde_json` values) that the
//! normalizer shapes into records:
//! - `search`: identifier extraction, find results, keyword matches
//! - `title`: movie and tv-series pages (main, credits, plot, tech, ...)
//! - `person`: person and company pages
//! - `chart`: charts, user lists, keyword and genre listings
//! - `showtimes`: cinema showtimes listings

pub mod chart;
pub mod person;
pub mod search;
pub mod showtimes;
pub mod title;

use std::sync::LazyLock;

use regex_lite::Regex;
use scraper::{ElementRef, Html, Selector};
use serde_json::Value as JsonValue;

use crate::category::InfoCategory;
use crate::error::{ImdbError, Result};
use crate::normalize::RawFields;
use crate::record::Kind;

// Re-export main parsing functions
pub use chart::parse_chart;
pub use search::{extract_imdb_id, parse_find_results, parse_keyword_matches};
pub use showtimes::parse_showtimes;
pub use title::parse_title_type;

/// Parse the raw fields of one info category from its page.
pub fn parse_category(kind: Kind, category: InfoCategory, html: &str) -> Result<RawFields> {
    match (kind, category) {
        (Kind::Person, InfoCategory::Main) => person::parse_person_main(html),
        (Kind::Person, InfoCategory::Biography) => person::parse_biography(html),
        (Kind::Person, InfoCategory::Filmography) => person::parse_filmography(html),
        (Kind::Company, _) => person::parse_company_main(html),
        (_, InfoCategory::Main) => title::parse_title_main(html),
        (_, InfoCategory::FullCredits) => title::parse_full_credits(html),
        (_, InfoCategory::Plot) => title::parse_plot_summary(html),
        (_, InfoCategory::Technical) => title::parse_technical(html),
        (_, InfoCategory::ReleaseInfo) => title::parse_release_info(html),
        (_, InfoCategory::ParentsGuide) => title::parse_parents_guide(html),
        (_, InfoCategory::Keywords) => title::parse_keywords(html),
        (_, InfoCategory::Awards) => title::parse_awards(html),
        (_, InfoCategory::CompanyCredits) => title::parse_company_credits(html),
        (_, InfoCategory::Taglines)
        | (_, InfoCategory::Trivia)
        | (_, InfoCategory::Goofs)
        | (_, InfoCategory::Quotes) => title::parse_content_list(html, category.name()),
        (_, InfoCategory::Biography) | (_, InfoCategory::Filmography) => Ok(RawFields::new()),
    }
}

/// Compile a CSS selector, reporting bad syntax as a parse error.
pub(crate) fn selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| ImdbError::ParseError(format!("Invalid selector: {:?}", e)))
}

/// All JSON-LD blocks embedded in a page.
pub(crate) fn json_ld(document: &Html) -> Vec<JsonValue> {
    let Ok(selector) = Selector::parse("script[type='application/ld+json']") else {
        return Vec::new();
    };
    document
        .select(&selector)
        .filter_map(|script| {
            let body = script.text().collect::<String>();
            serde_json::from_str(body.trim()).ok()
        })
        .collect()
}

/// Whitespace-collapsed text of an element.
pub(crate) fn element_text(element: &ElementRef) -> String {
    element
        .text()
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Text of an element with its text nodes kept apart, so adjacent inline
/// elements (`Title<li>1999</li>`) don't run together.
pub(crate) fn spaced_text(element: &ElementRef) -> String {
    element
        .text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

static YEAR_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b((?:18|19|20)\d{2})\b").unwrap());

/// First plausible year in a piece of text.
pub(crate) fn year_in(text: &str) -> Option<String> {
    Some(YEAR_PATTERN.captures(text)?.get(1)?.as_str().to_string())
}

/// Text of the first element matching one of `selectors`, in order.
pub(crate) fn first_text(scope: &ElementRef, selectors: &[&str]) -> Option<String> {
    for selector_str in selectors {
        if let Ok(selector) = Selector::parse(selector_str) {
            if let Some(el) = scope.select(&selector).next() {
                let text = element_text(&el);
                if !text.is_empty() {
                    return Some(text);
                }
            }
        }
    }
    None
}

/// Texts of all elements matching the first selector that matches anything.
pub(crate) fn all_texts(scope: &ElementRef, selectors: &[&str]) -> Vec<String> {
    for selector_str in selectors {
        if let Ok(selector) = Selector::parse(selector_str) {
            let texts: Vec<String> = scope
                .select(&selector)
                .map(|el| element_text(&el))
                .filter(|text| !text.is_empty())
                .collect();
            if !texts.is_empty() {
                return texts;
            }
        }
    }
    Vec::new()
}
