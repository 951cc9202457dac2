//! Person and company page parsers for IMDb
//!
//! Parses a person's main page, biography and filmography, and the main
//! page of a company with the titles it worked on.

use scraper::{ElementRef, Html};
use serde_json::{json, Map, Value as JsonValue};

use crate::error::{ImdbError, Result};
use crate::normalize::RawFields;
use crate::record::FILMOGRAPHY_KEY;

use super::{all_texts, element_text, first_text, json_ld, selector, spaced_text, year_in};

/// Parse a person's main page.
///
/// # Returns
/// * `Ok(RawFields)` with name, dates, headshot and job titles
/// * `Err(ImdbError::ElementNotFound)` if no name can be found
pub fn parse_person_main(html: &str) -> Result<RawFields> {
    let document = Html::parse_document(html);
    let root = document.root_element();
    let ld = json_ld(&document)
        .into_iter()
        .find(|block| block.get("@type").and_then(JsonValue::as_str) == Some("Person"))
        .unwrap_or(JsonValue::Null);

    let name = ld
        .get("name")
        .and_then(JsonValue::as_str)
        .map(str::to_string)
        .or_else(|| {
            first_text(
                &root,
                &[
                    "h1[data-testid='hero__pageTitle'] span.hero__primary-text",
                    "h1.header span.itemprop",
                    "h1",
                ],
            )
        })
        .ok_or_else(|| ImdbError::ElementNotFound("person name".to_string()))?;

    let mut fields = RawFields::new();
    fields.insert("name".into(), json!(name));
    for (key, ld_key) in [
        ("birth date", "birthDate"),
        ("death date", "deathDate"),
        ("headshot", "image"),
    ] {
        if let Some(value) = ld.get(ld_key).and_then(JsonValue::as_str) {
            fields.insert(key.into(), json!(value));
        }
    }

    let job_titles = match ld.get("jobTitle") {
        Some(JsonValue::String(title)) => vec![title.clone()],
        Some(JsonValue::Array(titles)) => titles
            .iter()
            .filter_map(JsonValue::as_str)
            .map(str::to_string)
            .collect(),
        _ => all_texts(
            &root,
            &["[data-testid='hero__pageTitle'] ~ ul li", "#name-job-categories a span"],
        ),
    };
    fields.insert("job titles".into(), json!(job_titles));

    Ok(fields)
}

/// Parse a person's biography page.
pub fn parse_biography(html: &str) -> Result<RawFields> {
    let document = Html::parse_document(html);
    let root = document.root_element();
    let mut fields = RawFields::new();

    // Overview rows: label and value, current layout then legacy table
    let mut overview: Vec<(String, String)> = Vec::new();
    let item_selector = selector("[data-testid='sub-section-overview'] li")?;
    for item in document.select(&item_selector) {
        let label = first_text(&item, &[".ipc-metadata-list-item__label"]);
        let value = first_text(&item, &[".ipc-metadata-list-item__content-container"]);
        if let (Some(label), Some(value)) = (label, value) {
            overview.push((label, value));
        }
    }
    if overview.is_empty() {
        let row_selector = selector("table#overviewTable tr")?;
        let cell_selector = selector("td")?;
        for row in document.select(&row_selector) {
            let cells: Vec<ElementRef> = row.select(&cell_selector).collect();
            if let [label, value, ..] = cells.as_slice() {
                overview.push((element_text(label), element_text(value)));
            }
        }
    }

    let mut nick_names = Vec::new();
    for (label, value) in overview {
        match label.to_lowercase().trim_end_matches(':') {
            "born" => {
                if let Some((_, place)) = value.split_once(" in ") {
                    fields.insert("birth place".into(), json!(place.trim()));
                }
            }
            "birth name" => {
                fields.insert("birth name".into(), json!(value));
            }
            "height" => {
                fields.insert("height".into(), json!(value));
            }
            "nickname" | "nicknames" => nick_names.push(value),
            _ => {}
        }
    }
    fields.insert("nick names".into(), json!(nick_names));

    if let Some(bio) = first_text(
        &root,
        &[
            "[data-testid='sub-section-mini_bio'] .ipc-html-content-inner-div",
            "#bio_content div.soda p",
        ],
    ) {
        fields.insert("mini biography".into(), json!(bio));
    }

    let trade_marks = all_texts(
        &root,
        &[
            "[data-testid='sub-section-trademark'] .ipc-html-content-inner-div",
            "#bio_content a[name='trademark'] ~ div.soda",
        ],
    );
    fields.insert("trade mark".into(), json!(trade_marks));

    Ok(fields)
}

/// Parse a person's filmography, grouped by role (actor, director, ...).
pub fn parse_filmography(html: &str) -> Result<RawFields> {
    let document = Html::parse_document(html);
    let mut roles: Map<String, JsonValue> = Map::new();

    // Legacy layout: one `div.filmo-row` per credit, id `<role>-tt<digits>`
    let row_selector = selector("div.filmo-row")?;
    let title_selector = selector("b a[href*='/title/tt'], a[href*='/title/tt']")?;
    for row in document.select(&row_selector) {
        let Some(role) = row
            .value()
            .attr("id")
            .and_then(|id| id.split_once("-tt"))
            .map(|(role, _)| role.replace('_', " "))
        else {
            continue;
        };
        let Some(entry) = title_entry(&row, &title_selector, &["span.year_column"]) else {
            continue;
        };
        push_role(&mut roles, &role, entry);
    }

    // Current layout: one accordion per role, id `<role>-previous-projects`
    if roles.is_empty() {
        let section_selector = selector("[id$='-previous-projects']")?;
        let item_selector = selector("li.ipc-metadata-list-summary-item")?;
        let link_selector = selector("a.ipc-metadata-list-summary-item__t")?;
        for section in document.select(&section_selector) {
            let Some(role) = section
                .value()
                .attr("id")
                .and_then(|id| id.strip_suffix("-previous-projects"))
                .map(|role| role.replace('_', " "))
            else {
                continue;
            };
            for item in section.select(&item_selector) {
                if let Some(entry) = title_entry(&item, &link_selector, &[".ipc-metadata-list-summary-item__cc"]) {
                    push_role(&mut roles, &role, entry);
                }
            }
        }
    }

    let mut fields = RawFields::new();
    fields.insert(FILMOGRAPHY_KEY.into(), JsonValue::Object(roles));
    Ok(fields)
}

/// Raw title reference from a filmography row or listing item.
fn title_entry(
    item: &ElementRef,
    link_selector: &scraper::Selector,
    year_selectors: &[&str],
) -> Option<JsonValue> {
    let link = item.select(link_selector).find(|a| !element_text(a).is_empty())?;
    let mut entry = json!({
        "url": link.value().attr("href")?,
        "title": element_text(&link),
    });
    let text = spaced_text(item);
    let year = first_text(item, year_selectors).or_else(|| year_in(&text));
    if let Some(year) = year {
        entry["year"] = json!(year);
    }
    let lower = text.to_lowercase();
    if lower.contains("tv series") || lower.contains("tv mini series") {
        entry["kind"] = json!("tv series");
    }
    Some(entry)
}

fn push_role(roles: &mut Map<String, JsonValue>, role: &str, entry: JsonValue) {
    let entries = roles
        .entry(role.to_string())
        .or_insert_with(|| JsonValue::Array(Vec::new()));
    if let JsonValue::Array(items) = entries {
        if !items.iter().any(|e| e["url"] == entry["url"]) {
            items.push(entry);
        }
    }
}

/// Parse a company's main page.
///
/// The heading carries the name and, in brackets, the country code
/// (`Warner Bros. [US]`). Titles are grouped under the section they are
/// listed in; an ungrouped listing counts as produced.
pub fn parse_company_main(html: &str) -> Result<RawFields> {
    let document = Html::parse_document(html);
    let root = document.root_element();

    let heading = first_text(
        &root,
        &["h1[data-testid='hero__pageTitle']", "h1.header", "h1"],
    )
    .ok_or_else(|| ImdbError::ElementNotFound("company name".to_string()))?;

    let mut fields = RawFields::new();
    match heading.rsplit_once(" [") {
        Some((name, country)) if country.ends_with(']') => {
            fields.insert("name".into(), json!(name.trim()));
            fields.insert("country".into(), json!(country.trim_end_matches(']')));
        }
        _ => {
            fields.insert("name".into(), json!(heading));
        }
    }

    let title_selector = selector("a[href*='/title/tt']")?;
    let item_selector = selector("li")?;
    let mut grouped = false;
    let heading_selector = selector("h2, h3, h4")?;
    for section_heading in document.select(&heading_selector) {
        let Some(key) = company_section(&element_text(&section_heading)) else {
            continue;
        };
        let Some(list) = section_heading
            .next_siblings()
            .filter_map(ElementRef::wrap)
            .find(|el| matches!(el.value().name(), "ul" | "ol"))
        else {
            continue;
        };
        grouped = true;
        let titles: Vec<JsonValue> = list
            .select(&item_selector)
            .filter_map(|item| title_entry(&item, &title_selector, &[]))
            .collect();
        fields.insert(key.into(), JsonValue::Array(titles));
    }

    if !grouped {
        let list_selector = selector("li.ipc-metadata-list-summary-item, .lister-item")?;
        let link_selector = selector("a.ipc-title-link-wrapper, h3.lister-item-header a, a[href*='/title/tt']")?;
        let titles: Vec<JsonValue> = document
            .select(&list_selector)
            .filter_map(|item| title_entry(&item, &link_selector, &[".lister-item-year"]))
            .collect();
        fields.insert("produced".into(), JsonValue::Array(titles));
    }

    Ok(fields)
}

fn company_section(heading: &str) -> Option<&'static str> {
    let heading = heading.to_lowercase();
    if heading.starts_with("produc") {
        Some("produced")
    } else if heading.starts_with("distribut") {
        Some("distributed")
    } else if heading.starts_with("special effects") {
        Some("special effects")
    } else if heading.starts_with("misc") {
        Some("miscellaneous")
    } else {
        None
    }
}
