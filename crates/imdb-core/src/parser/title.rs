//! Title page parsers for IMDb
//!
//! Parses the main page of a movie or tv-series and its sub-pages
//! (full credits, plot summary, technical specs, release info, parents
//! guide, keywords, awards, company credits and the plain content lists).
//! Each parser accepts the current page layout and falls back to the
//! legacy one.

use std::sync::LazyLock;

use regex_lite::Regex;
use scraper::{ElementRef, Html};
use serde_json::{json, Map, Value as JsonValue};

use crate::error::{ImdbError, Result};
use crate::normalize::RawFields;

use super::{all_texts, element_text, first_text, json_ld, selector};

/// JSON-LD `@type` values that describe a title.
const TITLE_TYPES: &[&str] = &[
    "Movie",
    "TVSeries",
    "TVMiniSeries",
    "TVEpisode",
    "TVMovie",
    "TVSpecial",
    "Video",
    "VideoGame",
    "ShortFilm",
];

const NO_PLOT_MARKER: &str = "It looks like we don't have";

/// ISO 8601 duration such as `PT2H16M`.
static DURATION_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^PT(?:(\d+)H)?(?:(\d+)M)?").unwrap());

/// JSON-LD block describing the title, or `Null` when there is none.
fn title_ld(document: &Html) -> JsonValue {
    json_ld(document)
        .into_iter()
        .find(|block| {
            block
                .get("@type")
                .and_then(JsonValue::as_str)
                .is_some_and(|t| TITLE_TYPES.contains(&t))
        })
        .unwrap_or(JsonValue::Null)
}

/// Title type (`Movie`, `TVSeries`, ...) declared by a title's main page.
pub fn parse_title_type(html: &str) -> Option<String> {
    let document = Html::parse_document(html);
    title_ld(&document)
        .get("@type")
        .and_then(JsonValue::as_str)
        .map(str::to_string)
}

/// Parse the main page of a movie or tv-series.
///
/// Structured data comes from the embedded JSON-LD block; countries,
/// languages and the billed cast with roles come from the page itself.
///
/// # Returns
/// * `Ok(RawFields)` with the fields that were found
/// * `Err(ImdbError::ElementNotFound)` if the page has no title at all
pub fn parse_title_main(html: &str) -> Result<RawFields> {
    let document = Html::parse_document(html);
    let root = document.root_element();
    let ld = title_ld(&document);

    let mut fields = RawFields::new();

    let title = ld
        .get("name")
        .and_then(JsonValue::as_str)
        .map(str::to_string)
        .or_else(|| {
            first_text(
                &root,
                &[
                    "h1[data-testid='hero__pageTitle'] span.hero__primary-text",
                    "h1[data-testid='hero__pageTitle']",
                    ".title_wrapper h1",
                    "h1",
                ],
            )
        })
        .ok_or_else(|| ImdbError::ElementNotFound("title".to_string()))?;
    fields.insert("title".into(), json!(title));

    if let Some(kind) = ld.get("@type").and_then(JsonValue::as_str) {
        fields.insert("kind".into(), json!(kind));
    }

    if let Some(original) = first_text(
        &root,
        &["[data-testid='hero-title-block__original-title']", ".originalTitle"],
    ) {
        let original = original
            .trim_start_matches("Original title:")
            .trim_end_matches("(original title)")
            .trim()
            .to_string();
        fields.insert("original title".into(), json!(original));
    }

    if let Some(date) = ld.get("datePublished") {
        fields.insert("year".into(), date.clone());
    }
    if let Some(rating) = ld.get("aggregateRating") {
        if let Some(value) = rating.get("ratingValue") {
            fields.insert("rating".into(), value.clone());
        }
        if let Some(count) = rating.get("ratingCount") {
            fields.insert("votes".into(), count.clone());
        }
    }

    fields.insert("genres".into(), json!(ld_strings(ld.get("genre"))));
    fields.insert(
        "countries".into(),
        json!(all_texts(
            &root,
            &["li[data-testid='title-details-origin'] a", "a[href*='country_of_origin=']"]
        )),
    );
    fields.insert(
        "languages".into(),
        json!(all_texts(
            &root,
            &["li[data-testid='title-details-languages'] a", "a[href*='primary_language=']"]
        )),
    );
    if let Some(minutes) = ld
        .get("duration")
        .and_then(JsonValue::as_str)
        .and_then(duration_minutes)
    {
        fields.insert("runtimes".into(), json!([minutes.to_string()]));
    }

    for (key, ld_key) in [
        ("cover url", "image"),
        ("plot outline", "description"),
        ("content rating", "contentRating"),
    ] {
        if let Some(value) = ld.get(ld_key).and_then(JsonValue::as_str) {
            fields.insert(key.into(), json!(value));
        }
    }
    if !fields.contains_key("plot outline") {
        if let Some(outline) = first_text(&root, &["[data-testid='plot'] [data-testid='plot-xl']", ".summary_text"]) {
            fields.insert("plot outline".into(), json!(outline));
        }
    }

    let cast = parse_billed_cast(&document)?;
    let cast = if cast.is_empty() { ld_people(ld.get("actor")) } else { cast };
    fields.insert("cast".into(), JsonValue::Array(cast));
    fields.insert("director".into(), JsonValue::Array(ld_people(ld.get("director"))));

    let creators = ld_people(ld.get("creator"));
    let is_series = ld
        .get("@type")
        .and_then(JsonValue::as_str)
        .is_some_and(|t| t.starts_with("TV") && t != "TVMovie" && t != "TVEpisode");
    let creator_key = if is_series { "creator" } else { "writer" };
    fields.insert(creator_key.into(), JsonValue::Array(creators));

    Ok(fields)
}

/// Top-billed cast from the main page, with character names.
fn parse_billed_cast(document: &Html) -> Result<Vec<JsonValue>> {
    let item_selector = selector("[data-testid='title-cast-item'], table.cast_list tr")?;
    let actor_selector = selector("a[data-testid='title-cast-item__actor'], a[href*='/name/nm']")?;
    let role_selector = selector(
        "[data-testid='cast-item-characters-link'] span, [data-testid='cast-item-characters-list'], td.character",
    )?;

    let mut cast = Vec::new();
    for item in document.select(&item_selector) {
        let Some(actor) = item.select(&actor_selector).find(|a| !element_text(a).is_empty()) else {
            continue;
        };
        let Some(href) = actor.value().attr("href") else {
            continue;
        };
        let mut entry = json!({ "url": href, "name": element_text(&actor) });
        if let Some(role) = item.select(&role_selector).next().map(|el| element_text(&el)) {
            if !role.is_empty() {
                entry["role"] = json!(role);
            }
        }
        cast.push(entry);
    }
    Ok(cast)
}

/// Strings from a JSON-LD value that may be a string or a list of strings.
fn ld_strings(value: Option<&JsonValue>) -> Vec<String> {
    match value {
        Some(JsonValue::String(s)) => vec![s.clone()],
        Some(JsonValue::Array(items)) => items
            .iter()
            .filter_map(JsonValue::as_str)
            .map(str::to_string)
            .collect(),
        _ => Vec::new(),
    }
}

/// People (never organizations) from a JSON-LD value, as raw references.
fn ld_people(value: Option<&JsonValue>) -> Vec<JsonValue> {
    let items: Vec<&JsonValue> = match value {
        Some(JsonValue::Array(items)) => items.iter().collect(),
        Some(item @ JsonValue::Object(_)) => vec![item],
        _ => Vec::new(),
    };
    items
        .into_iter()
        .filter(|item| item.get("@type").and_then(JsonValue::as_str) == Some("Person"))
        .filter_map(|item| {
            let url = item.get("url")?.as_str()?;
            let mut entry = json!({ "url": url });
            if let Some(name) = item.get("name").and_then(JsonValue::as_str) {
                entry["name"] = json!(name);
            }
            Some(entry)
        })
        .collect()
}

/// Minutes of an ISO 8601 duration such as `PT2H16M`.
fn duration_minutes(duration: &str) -> Option<u32> {
    let caps = DURATION_PATTERN.captures(duration)?;
    let hours: u32 = caps.get(1).map_or(Ok(0), |m| m.as_str().parse()).ok()?;
    let minutes: u32 = caps.get(2).map_or(Ok(0), |m| m.as_str().parse()).ok()?;
    let total = hours * 60 + minutes;
    (total > 0).then_some(total)
}

/// Map a credits section heading to its credit list key.
fn credit_key(heading: &str) -> &'static str {
    let heading = heading.to_lowercase();
    let heading = heading.trim();
    if heading.starts_with("casting") {
        "casting director"
    } else if heading.starts_with("cast") {
        "cast"
    } else if heading.contains("created by") || heading.starts_with("creator") {
        "creator"
    } else if heading.starts_with("direct") {
        "director"
    } else if heading.starts_with("writ") {
        "writer"
    } else if heading.starts_with("produc") && !heading.contains("design") {
        "producer"
    } else if heading.starts_with("music") || heading.starts_with("composer") {
        "composer"
    } else if heading.starts_with("cinematograph") {
        "cinematographer"
    } else if heading.contains("editing") || heading.starts_with("editor") {
        "editor"
    } else if heading.starts_with("production design") {
        "production designer"
    } else if heading.starts_with("costume design") {
        "costume designer"
    } else {
        "miscellaneous crew"
    }
}

/// Parse the full credits page into credit lists.
///
/// Sections the page groups under other headings (art direction, sound,
/// stunts, ...) are collected as miscellaneous crew.
pub fn parse_full_credits(html: &str) -> Result<RawFields> {
    let document = Html::parse_document(html);
    let mut credits: Map<String, JsonValue> = Map::new();

    // Current layout: one section per credit group
    let section_selector = selector("section.ipc-page-section[data-testid^='sub-section-']")?;
    let item_selector = selector("li")?;
    let person_selector = selector("a[href*='/name/nm']")?;
    let role_selector = selector("a[href*='/characters/'], .ipc-metadata-list-summary-item__li, span.character")?;
    for section in document.select(&section_selector) {
        let heading = first_text(&section, &["h3", ".ipc-title__text"]).unwrap_or_default();
        let key = credit_key(&heading);
        let mut entries = Vec::new();
        for item in section.select(&item_selector) {
            let Some(person) = item.select(&person_selector).find(|a| !element_text(a).is_empty()) else {
                continue;
            };
            let mut entry = json!({
                "url": person.value().attr("href").unwrap_or_default(),
                "name": element_text(&person),
            });
            if let Some(role) = item.select(&role_selector).map(|el| element_text(&el)).find(|t| !t.is_empty()) {
                entry[if key == "cast" { "role" } else { "notes" }] = json!(role);
            }
            push_unique(&mut entries, entry);
        }
        append(&mut credits, key, entries);
    }

    // Legacy layout: heading followed by a table
    if credits.is_empty() {
        let header_selector = selector("h4.dataHeaderWithBorder, h4.dataHeader")?;
        let row_selector = selector("tr")?;
        let character_selector = selector("td.character")?;
        let credit_selector = selector("td.credit")?;
        for header in document.select(&header_selector) {
            let key = credit_key(&element_text(&header));
            let Some(table) = next_element(&header, "table") else {
                continue;
            };
            let mut entries = Vec::new();
            for row in table.select(&row_selector) {
                let Some(person) = row.select(&person_selector).find(|a| !element_text(a).is_empty()) else {
                    continue;
                };
                let mut entry = json!({
                    "url": person.value().attr("href").unwrap_or_default(),
                    "name": element_text(&person),
                });
                if let Some(role) = row.select(&character_selector).next().map(|el| element_text(&el)) {
                    if !role.is_empty() {
                        entry["role"] = json!(role);
                    }
                }
                if let Some(notes) = row.select(&credit_selector).next().map(|el| element_text(&el)) {
                    if !notes.is_empty() {
                        entry["notes"] = json!(notes);
                    }
                }
                push_unique(&mut entries, entry);
            }
            append(&mut credits, key, entries);
        }
    }

    Ok(credits)
}

/// Next sibling element with the given tag name.
fn next_element<'a>(element: &ElementRef<'a>, tag: &str) -> Option<ElementRef<'a>> {
    element
        .next_siblings()
        .filter_map(ElementRef::wrap)
        .find(|el| el.value().name() == tag)
}

fn push_unique(entries: &mut Vec<JsonValue>, entry: JsonValue) {
    if !entries.iter().any(|e| e["url"] == entry["url"] && e["notes"] == entry["notes"]) {
        entries.push(entry);
    }
}

fn append(fields: &mut RawFields, key: &str, mut entries: Vec<JsonValue>) {
    if entries.is_empty() {
        return;
    }
    match fields.get_mut(key) {
        Some(JsonValue::Array(existing)) => existing.append(&mut entries),
        _ => {
            fields.insert(key.to_string(), JsonValue::Array(entries));
        }
    }
}

/// Parse the plot summary page into `plot` and `synopsis`.
///
/// IMDb's placeholder text for missing plots is not treated as a plot.
pub fn parse_plot_summary(html: &str) -> Result<RawFields> {
    let document = Html::parse_document(html);
    let root = document.root_element();

    let summaries = all_texts(
        &root,
        &[
            "[data-testid='sub-section-summaries'] .ipc-html-content-inner-div",
            "#plot-summaries-content li p",
            "ul.ipl-zebra-list li.ipl-zebra-list__item p",
        ],
    );
    let synopsis = all_texts(
        &root,
        &[
            "[data-testid='sub-section-synopsis'] .ipc-html-content-inner-div",
            "#plot-synopsis-content li",
        ],
    );

    let mut fields = RawFields::new();
    fields.insert("plot".into(), json!(clean_plots(summaries)));
    fields.insert("synopsis".into(), json!(clean_plots(synopsis)));
    Ok(fields)
}

fn clean_plots(texts: Vec<String>) -> Vec<String> {
    texts
        .into_iter()
        .filter(|text| !text.contains(NO_PLOT_MARKER))
        .map(|text| strip_author(&text))
        .filter(|text| !text.is_empty())
        .collect()
}

/// Drop a trailing `—Author` signature.
///
/// The tail counts as a signature when it is a single handle, or when the
/// body before it is a finished sentence.
fn strip_author(text: &str) -> String {
    let Some((body, author)) = text.rsplit_once('—') else {
        return text.trim().to_string();
    };
    let body = body.trim();
    let author = author.trim();
    let handle = !author.is_empty() && !author.contains(char::is_whitespace);
    let finished = body.ends_with(['.', '!', '?', '"', '\'', ')']);
    let plausible = !author.is_empty() && author.len() <= 60 && !author.contains('.');
    if !body.is_empty() && plausible && (handle || finished) {
        body.to_string()
    } else {
        text.trim().to_string()
    }
}

/// Parse the technical specifications page.
///
/// Produces a `tech` object of label to values; labels are kept as listed
/// and folded onto the technical taxonomy by the normalizer.
pub fn parse_technical(html: &str) -> Result<RawFields> {
    let document = Html::parse_document(html);
    let mut tech: Map<String, JsonValue> = Map::new();

    let item_selector = selector("li[data-testid^='title-techspec_']")?;
    let label_selector = selector(".ipc-metadata-list-item__label")?;
    let value_selector = selector(".ipc-metadata-list-item__list-content-item, .ipc-inline-list__item")?;
    for item in document.select(&item_selector) {
        let Some(label) = item.select(&label_selector).next().map(|el| element_text(&el)) else {
            continue;
        };
        let values: Vec<String> = item
            .select(&value_selector)
            .map(|el| element_text(&el))
            .filter(|t| !t.is_empty())
            .collect();
        if !label.is_empty() && !values.is_empty() {
            tech.insert(label, json!(values));
        }
    }

    if tech.is_empty() {
        let row_selector = selector("#technical_content tr, table.dataTable tr")?;
        let cell_selector = selector("td")?;
        for row in document.select(&row_selector) {
            let cells: Vec<ElementRef> = row.select(&cell_selector).collect();
            let [label, content, ..] = cells.as_slice() else {
                continue;
            };
            let values: Vec<String> = content
                .text()
                .map(|t| t.split_whitespace().collect::<Vec<_>>().join(" "))
                .filter(|t| !t.is_empty() && t != "|")
                .collect();
            let label = element_text(label);
            if !label.is_empty() && !values.is_empty() {
                tech.insert(label, json!(values));
            }
        }
    }

    let mut fields = RawFields::new();
    fields.insert("tech".into(), JsonValue::Object(tech));
    Ok(fields)
}

/// Parse the release info page into release dates and alternate titles.
pub fn parse_release_info(html: &str) -> Result<RawFields> {
    let document = Html::parse_document(html);

    let label_selector = selector(".ipc-metadata-list-item__label")?;
    let content_selector = selector(".ipc-metadata-list-item__list-content-item:not(.ipc-metadata-list-item__list-content-item--subText)")?;
    let sub_selector = selector(".ipc-metadata-list-item__list-content-item--subText")?;

    let mut dates = Vec::new();
    for item in document.select(&selector("li[data-testid='releasedates-item']")?) {
        let country = item.select(&label_selector).next().map(|el| element_text(&el));
        let date = item.select(&content_selector).next().map(|el| element_text(&el));
        let notes = item.select(&sub_selector).next().map(|el| element_text(&el));
        dates.push(json!({ "country": country, "date": date, "notes": notes }));
    }
    if dates.is_empty() {
        let row_selector = selector("table.release-dates-table-test-only tr, #releases tr")?;
        for row in document.select(&row_selector) {
            dates.push(json!({
                "country": first_text(&row, &["td.release-date-item__country-name", "td:nth-child(1)"]),
                "date": first_text(&row, &["td.release-date-item__date", "td:nth-child(2)"]),
                "notes": first_text(&row, &["td.release-date-item__attributes", "td:nth-child(3)"]),
            }));
        }
    }

    let mut akas = Vec::new();
    for item in document.select(&selector("[data-testid='sub-section-akas'] li[data-testid='list-item']")?) {
        let country = item.select(&label_selector).next().map(|el| element_text(&el));
        let title = item.select(&content_selector).next().map(|el| element_text(&el));
        let notes = item.select(&sub_selector).next().map(|el| element_text(&el));
        akas.push(json!({ "title": title, "country": country, "notes": notes }));
    }
    if akas.is_empty() {
        let row_selector = selector("table.akas-table-test-only tr, #akas tr")?;
        for row in document.select(&row_selector) {
            akas.push(json!({
                "country": first_text(&row, &["td.aka-item__name", "td:nth-child(1)"]),
                "title": first_text(&row, &["td.aka-item__title", "td:nth-child(2)"]),
            }));
        }
    }

    let mut fields = RawFields::new();
    fields.insert("release dates".into(), JsonValue::Array(dates));
    fields.insert("akas".into(), JsonValue::Array(akas));
    Ok(fields)
}

/// Parse the parents guide page.
///
/// Produces `advisories` keyed by section (nudity, violence, ...) with the
/// community vote `status` and the listed `items`, plus `certificates`.
pub fn parse_parents_guide(html: &str) -> Result<RawFields> {
    let document = Html::parse_document(html);
    let mut advisories: Map<String, JsonValue> = Map::new();

    let section_selector = selector("section[id^='advisory-'], section[data-testid^='sub-section-']")?;
    for section in document.select(&section_selector) {
        let id = section
            .value()
            .attr("id")
            .or_else(|| section.value().attr("data-testid"))
            .unwrap_or_default();
        let Some(name) = advisory_section(id) else {
            continue;
        };
        let status = first_text(&section, &[".ipl-status-pill", ".ipc-signpost__text"]);
        let items: Vec<String> = all_texts(
            &section,
            &["li.ipl-zebra-list__item", "[data-testid='item-html']"],
        )
        .into_iter()
        .map(|item| item.trim_end_matches("Edit").trim().to_string())
        .collect();
        advisories.insert(name.to_string(), json!({ "status": status, "items": items }));
    }

    let certificates = all_texts(
        &document.root_element(),
        &[
            "#certificates li.ipl-inline-list__item",
            "[data-testid='certificates'] li.ipc-metadata-list__item",
            "[data-testid='certificates-item']",
        ],
    );

    let mut fields = RawFields::new();
    fields.insert("advisories".into(), JsonValue::Object(advisories));
    fields.insert("certificates".into(), json!(certificates));
    Ok(fields)
}

fn advisory_section(id: &str) -> Option<&'static str> {
    let id = id.to_lowercase();
    let sections = [
        ("nudity", "nudity"),
        ("violence", "violence"),
        ("profanity", "profanity"),
        ("alcohol", "alcohol"),
        ("frightening", "frightening"),
    ];
    sections
        .into_iter()
        .find(|(marker, _)| id.contains(marker))
        .map(|(_, name)| name)
}

/// Parse the keywords page.
pub fn parse_keywords(html: &str) -> Result<RawFields> {
    let document = Html::parse_document(html);
    let mut keywords: Vec<String> = Vec::new();
    for text in all_texts(
        &document.root_element(),
        &[
            "[data-testid='sub-section'] a.ipc-metadata-list-summary-item__t",
            "td.soda .sodatext a",
            "a[href*='/search/keyword/?keywords=']",
        ],
    ) {
        let keyword = text.to_lowercase();
        if !keywords.contains(&keyword) {
            keywords.push(keyword);
        }
    }

    let mut fields = RawFields::new();
    fields.insert("keywords".into(), json!(keywords));
    Ok(fields)
}

/// Parse a page that is a plain list of text items (taglines, trivia,
/// goofs, quotes), storing the items under `key`.
pub fn parse_content_list(html: &str, key: &str) -> Result<RawFields> {
    let document = Html::parse_document(html);
    let items: Vec<String> = all_texts(
        &document.root_element(),
        &[
            "[data-testid='sub-section'] .ipc-html-content-inner-div",
            ".ipc-html-content-inner-div",
            "div.soda .sodatext",
            "div.soda",
        ],
    )
    .into_iter()
    .filter(|text| !text.contains(NO_PLOT_MARKER))
    .collect();

    let mut fields = RawFields::new();
    fields.insert(key.to_string(), json!(items));
    Ok(fields)
}

/// Parse the awards page of a title or person.
///
/// Each entry carries the award event, year, result and category.
pub fn parse_awards(html: &str) -> Result<RawFields> {
    let document = Html::parse_document(html);
    let mut awards = Vec::new();

    let section_selector = selector("section.ipc-page-section")?;
    let item_selector = selector("li.ipc-metadata-list-summary-item")?;
    for section in document.select(&section_selector) {
        let Some(event) = first_text(&section, &["h3", ".ipc-title__text"]) else {
            continue;
        };
        for item in section.select(&item_selector) {
            let Some(summary) = first_text(&item, &["a.ipc-metadata-list-summary-item__t"]) else {
                continue;
            };
            let (year, result, name) = split_award_summary(&summary);
            let category = first_text(
                &item,
                &[".awardCategoryName", ".ipc-metadata-list-summary-item__li"],
            );
            awards.push(json!({
                "award": format!("{}: {}", event, name).trim_end_matches(": ").to_string(),
                "year": year,
                "result": result,
                "category": category,
            }));
        }
    }

    if awards.is_empty() {
        let header_selector = selector("h3")?;
        let row_selector = selector("tr")?;
        for header in document.select(&header_selector) {
            let Some(table) = next_element(&header, "table") else {
                continue;
            };
            let heading = element_text(&header);
            let (year, _, event) = split_award_summary(&heading);
            let mut outcome: Option<String> = None;
            for row in table.select(&row_selector) {
                if let Some(result) = first_text(&row, &["td.title_award_outcome b", "td.award_outcome b"]) {
                    outcome = Some(result);
                }
                let Some(category) = first_text(&row, &["td.award_description"]) else {
                    continue;
                };
                let award_name = first_text(&row, &["span.award_category"]);
                let award = match award_name {
                    Some(name) => format!("{}: {}", event, name),
                    None => event.clone(),
                };
                awards.push(json!({
                    "award": award,
                    "year": year,
                    "result": outcome,
                    "category": category,
                }));
            }
        }
    }

    let mut fields = RawFields::new();
    fields.insert("awards".into(), JsonValue::Array(awards));
    Ok(fields)
}

/// Split `2000 Winner Oscar` into (year, result, remainder).
fn split_award_summary(summary: &str) -> (Option<String>, Option<String>, String) {
    let mut rest = summary.trim();
    let mut year = None;
    if let Some((first, tail)) = rest.split_once(' ') {
        if first.len() == 4 && first.chars().all(|c| c.is_ascii_digit()) {
            year = Some(first.to_string());
            rest = tail.trim();
        }
    }
    let mut result = None;
    for outcome in ["Winner", "Nominee"] {
        if let Some(tail) = rest.strip_prefix(outcome) {
            result = Some(outcome.to_string());
            rest = tail.trim();
            break;
        }
    }
    (year, result, rest.to_string())
}

/// Parse the company credits page into company lists.
pub fn parse_company_credits(html: &str) -> Result<RawFields> {
    let document = Html::parse_document(html);
    let mut credits: Map<String, JsonValue> = Map::new();
    let company_selector = selector("a[href*='/company/co']")?;
    let item_selector = selector("li")?;

    for (section_id, key) in [
        ("production", "production companies"),
        ("distribution", "distributors"),
        ("distributors", "distributors"),
        ("specialEffects", "special effects"),
        ("miscellaneous", "miscellaneous companies"),
    ] {
        let css = format!(
            "section[data-testid='sub-section-{id}'], ul[data-testid='sub-section-{id}']",
            id = section_id
        );
        let mut entries = Vec::new();
        for section in document.select(&selector(&css)?) {
            for item in section.select(&item_selector) {
                if let Some(entry) = company_entry(&item, &company_selector) {
                    push_unique(&mut entries, entry);
                }
            }
        }

        // Legacy layout: anchored heading followed by a list
        if entries.is_empty() {
            let heading_css = format!("h4#{}", section_id);
            for heading in document.select(&selector(&heading_css)?) {
                let Some(list) = next_element(&heading, "ul") else {
                    continue;
                };
                for item in list.select(&item_selector) {
                    if let Some(entry) = company_entry(&item, &company_selector) {
                        push_unique(&mut entries, entry);
                    }
                }
            }
        }
        append(&mut credits, key, entries);
    }

    Ok(credits)
}

fn company_entry(item: &ElementRef, company_selector: &scraper::Selector) -> Option<JsonValue> {
    let link = item.select(company_selector).find(|a| !element_text(a).is_empty())?;
    let name = element_text(&link);
    let mut entry = json!({
        "url": link.value().attr("href")?,
        "name": name,
    });
    let full = element_text(item);
    let notes = full.trim_start_matches(name.as_str()).trim();
    if !notes.is_empty() {
        entry["notes"] = json!(notes);
    }
    Some(entry)
}

#[cfg(test)]
mod tests {
    use super::*;

    const MATRIX_MAIN: &str = r#"
        <html><head>
        <script type="application/ld+json">
        {
          "@context": "https://schema.org",
          "@type": "Movie",
          "url": "https://www.imdb.com/title/tt0133093/",
          "name": "The Matrix",
          "image": "https://m.media-amazon.com/images/M/matrix.jpg",
          "description": "When a beautiful stranger leads computer hacker Neo to a forbidding underworld...",
          "contentRating": "R",
          "genre": ["Action", "Sci-Fi"],
          "datePublished": "1999-03-31",
          "aggregateRating": {"@type": "AggregateRating", "ratingCount": 2100000, "ratingValue": 8.7},
          "actor": [{"@type": "Person", "url": "https://www.imdb.com/name/nm0000206/", "name": "Keanu Reeves"}],
          "director": [
            {"@type": "Person", "url": "https://www.imdb.com/name/nm0905154/", "name": "Lana Wachowski"},
            {"@type": "Person", "url": "https://www.imdb.com/name/nm0905152/", "name": "Lilly Wachowski"}
          ],
          "creator": [
            {"@type": "Organization", "url": "https://www.imdb.com/company/co0002663/"},
            {"@type": "Person", "url": "https://www.imdb.com/name/nm0905152/", "name": "Lilly Wachowski"}
          ],
          "duration": "PT2H16M"
        }
        </script></head>
        <body>
          <h1 data-testid="hero__pageTitle"><span class="hero__primary-text">The Matrix</span></h1>
          <ul>
            <li data-testid="title-details-origin"><a href="/search/title/?country_of_origin=US">United States</a><a href="/search/title/?country_of_origin=AU">Australia</a></li>
            <li data-testid="title-details-languages"><a href="/search/title/?primary_language=en">English</a></li>
          </ul>
          <div data-testid="title-cast-item">
            <a data-testid="title-cast-item__actor" href="/name/nm0000206/?ref_=tt_cl_t_1">Keanu Reeves</a>
            <a data-testid="cast-item-characters-link" href="/title/tt0133093/characters/nm0000206"><span>Neo</span></a>
          </div>
          <div data-testid="title-cast-item">
            <a data-testid="title-cast-item__actor" href="/name/nm0000401/">Laurence Fishburne</a>
            <a data-testid="cast-item-characters-link" href="/title/tt0133093/characters/nm0000401"><span>Morpheus</span></a>
          </div>
        </body></html>
    "#;

    #[test]
    fn test_parse_title_main_from_json_ld() {
        let fields = parse_title_main(MATRIX_MAIN).unwrap();

        assert_eq!(fields["kind"], "Movie");
        assert_eq!(fields["title"], "The Matrix");
        assert_eq!(fields["year"], "1999-03-31");
        assert_eq!(fields["rating"], 8.7);
        assert_eq!(fields["votes"], 2100000);
        assert_eq!(fields["genres"], json!(["Action", "Sci-Fi"]));
        assert_eq!(fields["countries"], json!(["United States", "Australia"]));
        assert_eq!(fields["languages"], json!(["English"]));
        assert_eq!(fields["runtimes"], json!(["136"]));
        assert_eq!(fields["content rating"], "R");
        assert_eq!(fields["director"].as_array().unwrap().len(), 2);
        assert_eq!(fields["writer"].as_array().unwrap().len(), 1);
        assert!(fields.get("creator").is_none());
    }

    #[test]
    fn test_parse_title_main_prefers_billed_cast() {
        let fields = parse_title_main(MATRIX_MAIN).unwrap();
        let cast = fields["cast"].as_array().unwrap();
        assert_eq!(cast.len(), 2);
        assert_eq!(cast[0]["name"], "Keanu Reeves");
        assert_eq!(cast[0]["role"], "Neo");
        assert_eq!(cast[1]["role"], "Morpheus");
    }

    #[test]
    fn test_parse_title_main_series_creators() {
        let html = r#"
            <html><head><script type="application/ld+json">
            {"@type": "TVSeries", "name": "Breaking Bad",
             "creator": [{"@type": "Person", "url": "/name/nm0319213/", "name": "Vince Gilligan"}]}
            </script></head><body></body></html>
        "#;
        let fields = parse_title_main(html).unwrap();
        assert_eq!(fields["kind"], "TVSeries");
        assert_eq!(fields["creator"][0]["name"], "Vince Gilligan");
        assert!(fields.get("writer").is_none());
    }

    #[test]
    fn test_parse_title_type() {
        assert_eq!(parse_title_type(MATRIX_MAIN).as_deref(), Some("Movie"));
        let series = r#"<html><head><script type="application/ld+json">
            {"@type": "TVSeries", "name": "Breaking Bad"}
            </script></head></html>"#;
        assert_eq!(parse_title_type(series).as_deref(), Some("TVSeries"));
        assert_eq!(parse_title_type("<html><body><h1>Untyped</h1></body></html>"), None);
    }

    #[test]
    fn test_parse_title_main_h1_fallback_and_missing() {
        let fields = parse_title_main("<html><body><h1>Some Title</h1></body></html>").unwrap();
        assert_eq!(fields["title"], "Some Title");

        let result = parse_title_main("<html><body><p>nothing</p></body></html>");
        assert!(matches!(result, Err(ImdbError::ElementNotFound(_))));
    }

    #[test]
    fn test_duration_minutes() {
        assert_eq!(duration_minutes("PT2H16M"), Some(136));
        assert_eq!(duration_minutes("PT45M"), Some(45));
        assert_eq!(duration_minutes("PT1H"), Some(60));
        assert_eq!(duration_minutes("P1D"), None);
    }

    #[test]
    fn test_parse_full_credits_legacy_tables() {
        let html = r#"
            <html><body><div id="fullcredits_content">
              <h4 class="dataHeaderWithBorder">Directed by</h4>
              <table class="simpleTable simpleCreditsTable">
                <tr><td class="name"><a href="/name/nm0905154/"> Lana Wachowski</a></td><td>...</td><td class="credit">(as The Wachowski Brothers)</td></tr>
              </table>
              <h4 class="dataHeaderWithBorder" id="cast">Cast (in credits order)</h4>
              <table class="cast_list">
                <tr><td colspan="4">Cast overview:</td></tr>
                <tr class="odd">
                  <td class="primary_photo"><a href="/name/nm0000206/"><img alt="Keanu Reeves"></a></td>
                  <td><a href="/name/nm0000206/">Keanu Reeves</a></td>
                  <td class="ellipsis">...</td>
                  <td class="character"><a href="/title/tt0133093/characters/nm0000206">Neo</a></td>
                </tr>
              </table>
              <h4 class="dataHeaderWithBorder">Casting By</h4>
              <table class="simpleTable simpleCreditsTable">
                <tr><td class="name"><a href="/name/nm0278168/">Mali Finn</a></td><td>...</td><td class="credit">(casting)</td></tr>
              </table>
              <h4 class="dataHeaderWithBorder">Stunts</h4>
              <table class="simpleTable simpleCreditsTable">
                <tr><td class="name"><a href="/name/nm0000001/">Some Stunt</a></td><td class="credit">stunt double</td></tr>
              </table>
            </div></body></html>
        "#;
        let credits = parse_full_credits(html).unwrap();

        assert_eq!(credits["director"][0]["name"], "Lana Wachowski");
        assert_eq!(credits["director"][0]["notes"], "(as The Wachowski Brothers)");
        assert_eq!(credits["cast"].as_array().unwrap().len(), 1);
        assert_eq!(credits["cast"][0]["role"], "Neo");
        assert_eq!(credits["casting director"][0]["name"], "Mali Finn");
        assert_eq!(credits["miscellaneous crew"][0]["notes"], "stunt double");
    }

    #[test]
    fn test_credit_key_headings() {
        assert_eq!(credit_key("Writing Credits"), "writer");
        assert_eq!(credit_key("Produced by"), "producer");
        assert_eq!(credit_key("Production Design by"), "production designer");
        assert_eq!(credit_key("Film Editing by"), "editor");
        assert_eq!(credit_key("Series Created by"), "creator");
        assert_eq!(credit_key("Casting By"), "casting director");
        assert_eq!(credit_key("Casting Department"), "casting director");
        assert_eq!(credit_key("Cast"), "cast");
        assert_eq!(credit_key("Cast (in credits order)"), "cast");
        assert_eq!(credit_key("Makeup Department"), "miscellaneous crew");
    }

    #[test]
    fn test_strip_author_signatures() {
        assert_eq!(
            strip_author("A hacker learns the truth.—redcommander27"),
            "A hacker learns the truth."
        );
        assert_eq!(
            strip_author("Two lives collide. —Jane Doe"),
            "Two lives collide."
        );
        assert_eq!(strip_author("He fights—and wins"), "He fights—and wins");
        assert_eq!(strip_author("—anonymous"), "—anonymous");
    }

    #[test]
    fn test_parse_plot_summary() {
        let html = r#"
            <html><body>
              <div data-testid="sub-section-summaries"><ul>
                <li><div class="ipc-html-content-inner-div">Thomas A. Anderson is a man living two lives.—redcommander27</div></li>
                <li><div class="ipc-html-content-inner-div">A computer hacker learns about the true nature of reality.</div></li>
              </ul></div>
              <div data-testid="sub-section-synopsis">
                <div class="ipc-html-content-inner-div">The screen is filled with green, cascading code.</div>
              </div>
            </body></html>
        "#;
        let fields = parse_plot_summary(html).unwrap();
        assert_eq!(
            fields["plot"],
            json!([
                "Thomas A. Anderson is a man living two lives.",
                "A computer hacker learns about the true nature of reality."
            ])
        );
        assert_eq!(fields["synopsis"].as_array().unwrap().len(), 1);
    }

    #[test]
    fn test_parse_plot_summary_placeholder_is_empty() {
        let html = r#"
            <html><body>
              <div data-testid="sub-section-summaries"><ul><li><div class="ipc-html-content-inner-div">It looks like we don't have any plot summaries for this title yet.</div></li></ul></div>
              <div data-testid="sub-section-synopsis"><div class="ipc-html-content-inner-div">It looks like we don't have a Synopsis for this title yet.</div></div>
            </body></html>
        "#;
        let fields = parse_plot_summary(html).unwrap();
        assert_eq!(fields["plot"], json!([]));
        assert_eq!(fields["synopsis"], json!([]));
    }

    #[test]
    fn test_parse_technical() {
        let html = r#"
            <html><body><ul>
              <li data-testid="title-techspec_soundmix">
                <span class="ipc-metadata-list-item__label">Sound mix</span>
                <ul><li class="ipc-metadata-list-item__list-content-item">Dolby Digital</li><li class="ipc-metadata-list-item__list-content-item">SDDS</li></ul>
              </li>
              <li data-testid="title-techspec_aspectratio">
                <span class="ipc-metadata-list-item__label">Aspect ratio</span>
                <ul><li class="ipc-metadata-list-item__list-content-item">2.39 : 1</li></ul>
              </li>
            </ul></body></html>
        "#;
        let fields = parse_technical(html).unwrap();
        assert_eq!(fields["tech"]["Sound mix"], json!(["Dolby Digital", "SDDS"]));
        assert_eq!(fields["tech"]["Aspect ratio"], json!(["2.39 : 1"]));
    }

    #[test]
    fn test_parse_technical_legacy_table() {
        let html = r#"
            <html><body><div id="technical_content"><table class="dataTable labelValueTable"><tbody>
              <tr><td class="label">Camera</td><td>Panavision Panaflex<br>Arriflex 435</td></tr>
              <tr><td class="label">Runtime</td><td>2 hr 16 min</td></tr>
            </tbody></table></div></body></html>
        "#;
        let fields = parse_technical(html).unwrap();
        assert_eq!(fields["tech"]["Camera"], json!(["Panavision Panaflex", "Arriflex 435"]));
        assert_eq!(fields["tech"]["Runtime"], json!(["2 hr 16 min"]));
    }

    #[test]
    fn test_parse_release_info() {
        let html = r#"
            <html><body>
              <ul>
                <li data-testid="releasedates-item">
                  <a class="ipc-metadata-list-item__label">United States</a>
                  <ul>
                    <li class="ipc-metadata-list-item__list-content-item">March 31, 1999</li>
                    <li class="ipc-metadata-list-item__list-content-item ipc-metadata-list-item__list-content-item--subText">(Westwood, California)</li>
                  </ul>
                </li>
              </ul>
              <div data-testid="sub-section-akas"><ul>
                <li data-testid="list-item">
                  <span class="ipc-metadata-list-item__label">Japan</span>
                  <ul><li class="ipc-metadata-list-item__list-content-item">マトリックス</li></ul>
                </li>
              </ul></div>
            </body></html>
        "#;
        let fields = parse_release_info(html).unwrap();
        assert_eq!(fields["release dates"][0]["country"], "United States");
        assert_eq!(fields["release dates"][0]["date"], "March 31, 1999");
        assert_eq!(fields["release dates"][0]["notes"], "(Westwood, California)");
        assert_eq!(fields["akas"][0]["title"], "マトリックス");
        assert_eq!(fields["akas"][0]["country"], "Japan");
    }

    #[test]
    fn test_parse_parents_guide_legacy() {
        let html = r#"
            <html><body>
              <section id="certificates"><ul>
                <li class="ipl-inline-list__item"><a href="/search/title?certificates=US:R">United States:R</a></li>
              </ul></section>
              <section id="advisory-violence">
                <span class="ipl-status-pill ipl-status-pill--orange">Moderate</span>
                <ul><li class="ipl-zebra-list__item">Several gunfights. Edit</li></ul>
              </section>
              <section id="advisory-nudity">
                <span class="ipl-status-pill">None</span>
              </section>
              <section id="advisory-spoilers"><span class="ipl-status-pill">Mild</span></section>
            </body></html>
        "#;
        let fields = parse_parents_guide(html).unwrap();
        let advisories = fields["advisories"].as_object().unwrap();
        assert_eq!(advisories.len(), 2);
        assert_eq!(advisories["violence"]["status"], "Moderate");
        assert_eq!(advisories["violence"]["items"], json!(["Several gunfights."]));
        assert_eq!(advisories["nudity"]["items"], json!([]));
        assert_eq!(fields["certificates"], json!(["United States:R"]));
    }

    #[test]
    fn test_parse_keywords_and_content_list() {
        let html = r#"
            <html><body>
              <a href="/search/keyword/?keywords=artificial-reality">Artificial Reality</a>
              <a href="/search/keyword/?keywords=simulated-reality">simulated reality</a>
              <a href="/search/keyword/?keywords=artificial-reality">artificial reality</a>
            </body></html>
        "#;
        let fields = parse_keywords(html).unwrap();
        assert_eq!(fields["keywords"], json!(["artificial reality", "simulated reality"]));

        let html = r#"
            <html><body><div data-testid="sub-section">
              <div class="ipc-html-content-inner-div">Free your mind.</div>
              <div class="ipc-html-content-inner-div">The fight for the future begins.</div>
            </div></body></html>
        "#;
        let fields = parse_content_list(html, "taglines").unwrap();
        assert_eq!(fields["taglines"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn test_parse_awards() {
        let html = r#"
            <html><body>
              <section class="ipc-page-section">
                <h3>Academy Awards, USA</h3>
                <ul>
                  <li class="ipc-metadata-list-summary-item">
                    <a class="ipc-metadata-list-summary-item__t">2000 Winner Oscar</a>
                    <span class="awardCategoryName">Best Film Editing</span>
                  </li>
                </ul>
              </section>
            </body></html>
        "#;
        let fields = parse_awards(html).unwrap();
        let award = &fields["awards"][0];
        assert_eq!(award["award"], "Academy Awards, USA: Oscar");
        assert_eq!(award["year"], "2000");
        assert_eq!(award["result"], "Winner");
        assert_eq!(award["category"], "Best Film Editing");
    }

    #[test]
    fn test_split_award_summary() {
        assert_eq!(
            split_award_summary("1999 Nominee Saturn Award"),
            (Some("1999".into()), Some("Nominee".into()), "Saturn Award".into())
        );
        assert_eq!(split_award_summary("Oscar"), (None, None, "Oscar".into()));
    }

    #[test]
    fn test_parse_company_credits() {
        let html = r#"
            <html><body>
              <section data-testid="sub-section-production"><ul>
                <li><a href="/company/co0002663/">Warner Bros.</a> (presents)</li>
                <li><a href="/company/co0108881/">Village Roadshow Pictures</a></li>
              </ul></section>
              <section data-testid="sub-section-distribution"><ul>
                <li><a href="/company/co0002663/">Warner Bros.</a> (1999) (United States) (theatrical)</li>
              </ul></section>
            </body></html>
        "#;
        let fields = parse_company_credits(html).unwrap();
        let production = fields["production companies"].as_array().unwrap();
        assert_eq!(production.len(), 2);
        assert_eq!(production[0]["notes"], "(presents)");
        assert!(production[1].get("notes").is_none());
        assert_eq!(fields["distributors"][0]["name"], "Warner Bros.");
        assert!(fields.get("special effects").is_none());
    }
}
