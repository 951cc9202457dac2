//! Search results parser for IMDb
//!
//! Parses the `/find/` page for titles, people and companies, and the
//! keyword variant of it that lists matching keyword names.

use scraper::{Html, Selector};
use serde_json::{json, Value as JsonValue};

use crate::error::{ImdbError, Result};
use crate::record::{Kind, RecordId};

use super::{element_text, spaced_text, year_in};

/// Extract an IMDb id with the given prefix from a URL path.
///
/// Parses URLs in formats:
/// - `/title/tt0133093/` -> Some("0133093")
/// - `/name/nm0000206/?ref_=tt_cl_t_1` -> Some("0000206")
/// - `https://www.imdb.com/company/co0002663/` -> Some("0002663")
///
/// # Examples
/// ```
/// use imdb_core::parser::extract_imdb_id;
///
/// assert_eq!(extract_imdb_id("/title/tt0133093/", "tt").unwrap().as_str(), "0133093");
/// assert_eq!(extract_imdb_id("/name/nm0000206/bio", "nm").unwrap().as_str(), "0000206");
/// assert!(extract_imdb_id("/title/tt0133093/", "nm").is_none());
/// ```
pub fn extract_imdb_id(url: &str, prefix: &str) -> Option<RecordId> {
    let path = url.split(['?', '#']).next()?;

    path.split('/').find_map(|segment| {
        let digits = segment.strip_prefix(prefix)?;
        if !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit()) {
            RecordId::parse(digits).ok()
        } else {
            None
        }
    })
}

/// Parse title/person/company results from an IMDb find page.
///
/// Each result is a raw entry with a `url` and a `title` (titles) or
/// `name` (people, companies), plus `year` and `kind` for titles.
pub fn parse_find_results(html: &str, kind: Kind) -> Result<Vec<JsonValue>> {
    let document = Html::parse_document(html);

    // Current layout lists results as summary items; older pages used a table
    let item_selector = Selector::parse(
        "li.find-result-item, li.ipc-metadata-list-summary-item, table.findList tr.findResult",
    )
    .map_err(|e| ImdbError::ParseError(format!("Invalid selector: {:?}", e)))?;
    let link_selector = Selector::parse(
        "a.ipc-metadata-list-summary-item__t, td.result_text a, a[href]",
    )
    .map_err(|e| ImdbError::ParseError(format!("Invalid selector: {:?}", e)))?;

    let prefix = kind.id_prefix();
    let mut results: Vec<JsonValue> = Vec::new();

    for item in document.select(&item_selector) {
        let Some(link) = item
            .select(&link_selector)
            .find(|a| a.value().attr("href").is_some_and(|h| extract_imdb_id(h, prefix).is_some()))
        else {
            continue;
        };
        let Some(href) = link.value().attr("href") else {
            continue;
        };
        let label = element_text(&link);
        if label.is_empty() {
            continue;
        }

        let entry = if kind.is_title() {
            let details = spaced_text(&item);
            let mut entry = json!({ "url": href, "title": label });
            if let Some(year) = year_in(&details) {
                entry["year"] = json!(year);
            }
            if is_series_label(&details) {
                entry["kind"] = json!("tv series");
            }
            entry
        } else {
            json!({ "url": href, "name": label })
        };

        let duplicate = results.iter().any(|r| r["url"] == entry["url"]);
        if !duplicate {
            results.push(entry);
        }
    }

    Ok(results)
}

/// Parse keyword names from the keyword find page.
///
/// Keywords are taken from the `keywords=` query of each link, falling back
/// to the link text, and deduplicated in page order.
pub fn parse_keyword_matches(html: &str) -> Result<Vec<String>> {
    let document = Html::parse_document(html);
    let selector = Selector::parse("a[href*='keywords='], a[href*='/keyword/']")
        .map_err(|e| ImdbError::ParseError(format!("Invalid selector: {:?}", e)))?;

    let mut keywords: Vec<String> = Vec::new();
    for link in document.select(&selector) {
        let from_href = link.value().attr("href").and_then(keyword_from_href);
        let keyword = from_href.unwrap_or_else(|| element_text(&link).to_lowercase());
        if !keyword.is_empty() && !keywords.contains(&keyword) {
            keywords.push(keyword);
        }
    }
    Ok(keywords)
}

fn keyword_from_href(href: &str) -> Option<String> {
    let raw = if let Some(idx) = href.find("keywords=") {
        href[idx + "keywords=".len()..].split('&').next()?
    } else {
        let idx = href.find("/keyword/")?;
        href[idx + "/keyword/".len()..].split(['/', '?']).next()?
    };
    let decoded = urlencoding::decode(&raw.replace('+', " ")).ok()?.into_owned();
    let keyword = decoded.trim().to_string();
    (!keyword.is_empty()).then_some(keyword)
}

fn is_series_label(text: &str) -> bool {
    let lower = text.to_lowercase();
    lower.contains("tv series") || lower.contains("tv mini series")
}
