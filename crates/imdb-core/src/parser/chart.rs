//! Chart and listing parser for IMDb
//!
//! Charts (top 250, most popular, box office), user lists, genre searches
//! and keyword searches all list titles; this parser reads them into raw
//! title references in page order.

use std::collections::HashMap;

use scraper::{ElementRef, Html};
use serde_json::{json, Value as JsonValue};

use crate::error::Result;

use super::search::extract_imdb_id;
use super::{element_text, first_text, json_ld, selector};

/// Parse a listing page into raw title entries, in listed order.
///
/// The embedded JSON-LD item list is preferred since it covers the whole
/// chart; years missing from it are filled in from the rendered items.
/// Without JSON-LD the rendered items are used directly. Each title appears
/// once.
pub fn parse_chart(html: &str) -> Result<Vec<JsonValue>> {
    let document = Html::parse_document(html);

    let rendered = parse_rendered_items(&document)?;
    let from_ld = parse_item_list(&document);

    let entries = if from_ld.is_empty() {
        rendered
    } else {
        let years: HashMap<String, JsonValue> = rendered
            .iter()
            .filter_map(|entry| Some((title_key(entry)?, entry.get("year")?.clone())))
            .collect();
        from_ld
            .into_iter()
            .map(|mut entry| {
                if entry.get("year").is_none() {
                    if let Some(year) = title_key(&entry).and_then(|key| years.get(&key)) {
                        entry["year"] = year.clone();
                    }
                }
                entry
            })
            .collect()
    };

    let mut seen = Vec::new();
    Ok(entries
        .into_iter()
        .filter(|entry| match title_key(entry) {
            Some(key) if !seen.contains(&key) => {
                seen.push(key);
                true
            }
            _ => false,
        })
        .collect())
}

fn title_key(entry: &JsonValue) -> Option<String> {
    let url = entry.get("url")?.as_str()?;
    extract_imdb_id(url, "tt").map(|id| id.to_string())
}

/// Entries of a JSON-LD `ItemList`.
fn parse_item_list(document: &Html) -> Vec<JsonValue> {
    let Some(list) = json_ld(document)
        .into_iter()
        .find(|block| block.get("@type").and_then(JsonValue::as_str) == Some("ItemList"))
    else {
        return Vec::new();
    };
    let Some(JsonValue::Array(elements)) = list.get("itemListElement") else {
        return Vec::new();
    };

    elements
        .iter()
        .filter_map(|element| {
            let item = element.get("item").unwrap_or(element);
            let url = item.get("url")?.as_str()?;
            let mut entry = json!({ "url": url });
            if let Some(name) = item.get("name").and_then(JsonValue::as_str) {
                entry["title"] = json!(name);
            }
            if let Some(kind) = item.get("@type").and_then(JsonValue::as_str) {
                entry["kind"] = json!(kind);
            }
            if let Some(rating) = item.get("aggregateRating") {
                if let Some(value) = rating.get("ratingValue") {
                    entry["rating"] = value.clone();
                }
                if let Some(count) = rating.get("ratingCount") {
                    entry["votes"] = count.clone();
                }
            }
            Some(entry)
        })
        .collect()
}

/// Entries of the rendered list, current layout first then legacy tables.
fn parse_rendered_items(document: &Html) -> Result<Vec<JsonValue>> {
    let item_selector = selector("li.ipc-metadata-list-summary-item, div.lister-item")?;
    let link_selector = selector("a.ipc-title-link-wrapper, h3.lister-item-header a, a[href*='/title/tt']")?;

    let mut entries: Vec<JsonValue> = document
        .select(&item_selector)
        .filter_map(|item| {
            let link = item.select(&link_selector).next()?;
            let url = link.value().attr("href")?;
            let title = first_text(&item, &["h3.ipc-title__text"]).unwrap_or_else(|| element_text(&link));
            let mut entry = json!({ "url": url, "title": strip_position(&title) });
            set_if_some(
                &mut entry,
                "year",
                first_text(
                    &item,
                    &[
                        "span.cli-title-metadata-item",
                        "span.dli-title-metadata-item",
                        "span.lister-item-year",
                    ],
                ),
            );
            set_if_some(
                &mut entry,
                "rating",
                first_text(
                    &item,
                    &[".ipc-rating-star--rating", ".ratings-imdb-rating strong"],
                ),
            );
            set_if_some(
                &mut entry,
                "votes",
                first_text(
                    &item,
                    &[".ipc-rating-star--voteCount", "p.sort-num_votes-visible span[name='nv']"],
                ),
            );
            Some(entry)
        })
        .collect();

    if entries.is_empty() {
        let row_selector = selector("tbody.lister-list tr, table.chart tbody tr")?;
        entries = document
            .select(&row_selector)
            .filter_map(|row| legacy_row(&row))
            .collect();
    }

    Ok(entries)
}

fn legacy_row(row: &ElementRef) -> Option<JsonValue> {
    let link_selector = selector("td.titleColumn a").ok()?;
    let link = row.select(&link_selector).next()?;
    let mut entry = json!({
        "url": link.value().attr("href")?,
        "title": element_text(&link),
    });
    set_if_some(&mut entry, "year", first_text(row, &["td.titleColumn span.secondaryInfo"]));
    set_if_some(&mut entry, "rating", first_text(row, &["td.ratingColumn strong", "td.imdbRating strong"]));

    // Vote counts only appear in the rating's tooltip ("9.2 based on 2,500,000 user ratings")
    let strong_selector = selector("td.ratingColumn strong, td.imdbRating strong").ok()?;
    if let Some(tooltip) = row
        .select(&strong_selector)
        .next()
        .and_then(|el| el.value().attr("title"))
    {
        if let Some((_, votes)) = tooltip.split_once("based on") {
            entry["votes"] = json!(votes.trim());
        }
    }
    Some(entry)
}

fn set_if_some(entry: &mut JsonValue, key: &str, value: Option<String>) {
    if let Some(value) = value {
        entry[key] = json!(value);
    }
}

/// Drop a leading list position (`"1. The Shawshank Redemption"`).
fn strip_position(title: &str) -> String {
    match title.split_once(". ") {
        Some((position, rest)) if !position.is_empty() && position.chars().all(|c| c.is_ascii_digit()) => {
            rest.trim().to_string()
        }
        _ => title.trim().to_string(),
    }
}
