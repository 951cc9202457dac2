//! Field normalizer
//!
//! Turns raw per-category fields (as produced by a [`Source`](crate::Source))
//! into typed record attributes. Every category writes only its own keys,
//! values without information are dropped instead of stored empty, and
//! entries of the wrong shape are skipped rather than failing the lookup.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex_lite::Regex;
use serde_json::Value as JsonValue;
use tracing::debug;

use crate::category::{InfoCategory, ADVISORY_SECTIONS};
use crate::parser::extract_imdb_id;
use crate::record::{
    Kind, Record, RecordId, Value, COMPANY_CREDIT_KEYS, COMPANY_FILMOGRAPHY_KEYS, FILMOGRAPHY_KEY,
    PERSON_CREDIT_KEYS,
};

static YEAR_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(1[89]\d{2}|20\d{2})\b").unwrap());
static RATING_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d{1,2}(?:[.,]\d+)?)").unwrap());
static VOTES_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(\d[\d,]*(?:\.\d+)?)\s*([KM])?").unwrap());

/// Raw fields of one category, keyed by source field name.
pub type RawFields = serde_json::Map<String, JsonValue>;

/// Raw fields for every category a source returned.
#[derive(Debug, Clone, Default)]
pub struct RawData {
    categories: BTreeMap<InfoCategory, RawFields>,
    title_type: Option<String>,
}

impl RawData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, category: InfoCategory, fields: RawFields) {
        self.categories.insert(category, fields);
    }

    pub fn with(mut self, category: InfoCategory, fields: RawFields) -> Self {
        self.insert(category, fields);
        self
    }

    pub fn get(&self, category: InfoCategory) -> Option<&RawFields> {
        self.categories.get(&category)
    }

    pub fn categories(&self) -> impl Iterator<Item = InfoCategory> + '_ {
        self.categories.keys().copied()
    }

    /// Record the title type the source saw, whatever categories it fetched.
    pub fn set_title_type(&mut self, title_type: impl Into<String>) {
        self.title_type = Some(title_type.into());
    }

    pub fn with_title_type(mut self, title_type: impl Into<String>) -> Self {
        self.set_title_type(title_type);
        self
    }

    pub fn title_type(&self) -> Option<&str> {
        self.title_type.as_deref()
    }
}

/// Build a record from raw category data.
///
/// Only the `requested` categories are read, in category order, so full
/// credits replace the top-billed cast from the main page when both are
/// present. A title whose type (see [`RawData::title_type`], else the
/// main data) is a series becomes [`Kind::TvSeries`].
pub fn normalize(kind: Kind, id: RecordId, raw: &RawData, requested: &[InfoCategory]) -> Record {
    let kind = refine_kind(kind, raw);
    let mut record = Record::new(kind, id);

    let mut requested = requested.to_vec();
    requested.sort();
    requested.dedup();

    for category in requested {
        if !category.applies_to(kind) {
            debug!(%category, %kind, "category does not apply, skipping");
            continue;
        }
        let Some(fields) = raw.get(category) else {
            continue;
        };
        let mut writer = CategoryWriter::new(category, &mut record);
        normalize_category(category, kind, fields, &mut writer);
    }

    record
}

fn refine_kind(kind: Kind, raw: &RawData) -> Kind {
    if !kind.is_title() {
        return kind;
    }
    raw.title_type()
        .or_else(|| {
            raw.get(InfoCategory::Main)
                .and_then(|fields| fields.get("kind"))
                .and_then(JsonValue::as_str)
        })
        .map(Kind::from_title_type)
        .unwrap_or(kind)
}

/// Record writer restricted to one category's keys.
struct CategoryWriter<'a> {
    category: InfoCategory,
    allowed: &'static [&'static str],
    record: &'a mut Record,
}

impl<'a> CategoryWriter<'a> {
    fn new(category: InfoCategory, record: &'a mut Record) -> Self {
        let allowed = category.keys(record.kind());
        Self {
            category,
            allowed,
            record,
        }
    }

    fn set(&mut self, key: &str, value: impl Into<Value>) {
        if !self.allowed.contains(&key) {
            debug!(category = %self.category, key, "key outside category, dropped");
            return;
        }
        if !self.record.set(key, value) {
            debug!(category = %self.category, key, "no usable data, key omitted");
        }
    }
}

fn normalize_category(
    category: InfoCategory,
    kind: Kind,
    fields: &RawFields,
    out: &mut CategoryWriter<'_>,
) {
    match category {
        InfoCategory::Main => match kind {
            Kind::Movie | Kind::TvSeries => title_main(fields, out),
            Kind::Person => person_main(fields, out),
            Kind::Company => company_main(fields, out),
        },
        InfoCategory::FullCredits => reference_lists(fields, Kind::Person, PERSON_CREDIT_KEYS, out),
        InfoCategory::CompanyCredits => {
            reference_lists(fields, Kind::Company, COMPANY_CREDIT_KEYS, out)
        }
        InfoCategory::Plot => {
            for key in ["plot", "synopsis"] {
                if let Some(value) = fields.get(key) {
                    out.set(key, text_list(value));
                }
            }
        }
        InfoCategory::Technical => {
            if let Some(JsonValue::Object(raw)) = fields.get("tech") {
                out.set("tech", tech_map(raw));
            }
        }
        InfoCategory::ReleaseInfo => release_info(fields, out),
        InfoCategory::ParentsGuide => parents_guide(fields, out),
        InfoCategory::Keywords
        | InfoCategory::Taglines
        | InfoCategory::Trivia
        | InfoCategory::Goofs
        | InfoCategory::Quotes => {
            let key = category.name();
            if let Some(value) = fields.get(key) {
                out.set(key, text_list(value));
            }
        }
        InfoCategory::Awards => {
            if let Some(JsonValue::Array(entries)) = fields.get("awards") {
                let awards: Vec<Value> = entries.iter().filter_map(award).collect();
                out.set("awards", awards);
            }
        }
        InfoCategory::Biography => {
            for key in ["mini biography", "birth name", "birth place", "height"] {
                if let Some(value) = fields.get(key).and_then(text) {
                    out.set(key, value);
                }
            }
            for key in ["nick names", "trade mark"] {
                if let Some(value) = fields.get(key) {
                    out.set(key, text_list(value));
                }
            }
        }
        InfoCategory::Filmography => {
            if let Some(JsonValue::Object(roles)) = fields.get(FILMOGRAPHY_KEY) {
                let mut filmography = BTreeMap::new();
                for (role, entries) in roles {
                    let titles = references(entries, Kind::Movie);
                    let role = role.trim().to_lowercase();
                    if !titles.is_empty() && !role.is_empty() {
                        filmography.insert(role, Value::from(titles));
                    }
                }
                out.set(FILMOGRAPHY_KEY, filmography);
            }
        }
    }
}

fn title_main(fields: &RawFields, out: &mut CategoryWriter<'_>) {
    for key in ["title", "original title", "cover url", "plot outline", "content rating"] {
        if let Some(value) = fields.get(key).and_then(text) {
            out.set(key, value);
        }
    }
    if let Some(year) = fields.get("year").and_then(parse_year) {
        out.set("year", year);
    }
    if let Some(rating) = fields.get("rating").and_then(parse_rating) {
        out.set("rating", rating);
    }
    if let Some(votes) = fields.get("votes").and_then(parse_votes) {
        out.set("votes", votes);
    }
    for key in ["genres", "countries", "languages", "runtimes"] {
        if let Some(value) = fields.get(key) {
            out.set(key, text_list(value));
        }
    }
    reference_lists(fields, Kind::Person, &["cast", "director", "writer", "creator"], out);
}

fn person_main(fields: &RawFields, out: &mut CategoryWriter<'_>) {
    for key in ["name", "birth date", "death date", "headshot"] {
        if let Some(value) = fields.get(key).and_then(text) {
            out.set(key, value);
        }
    }
    if let Some(value) = fields.get("job titles") {
        out.set("job titles", text_list(value));
    }
}

fn company_main(fields: &RawFields, out: &mut CategoryWriter<'_>) {
    for key in ["name", "country"] {
        if let Some(value) = fields.get(key).and_then(text) {
            out.set(key, value);
        }
    }
    reference_lists(fields, Kind::Movie, COMPANY_FILMOGRAPHY_KEYS, out);
}

fn reference_lists(fields: &RawFields, kind: Kind, keys: &[&str], out: &mut CategoryWriter<'_>) {
    for key in keys {
        if let Some(entries) = fields.get(*key) {
            out.set(key, references(entries, kind));
        }
    }
}

fn release_info(fields: &RawFields, out: &mut CategoryWriter<'_>) {
    if let Some(JsonValue::Array(entries)) = fields.get("release dates") {
        let dates: Vec<(String, String, Option<String>)> = entries
            .iter()
            .filter_map(|entry| {
                let country = entry.get("country").and_then(text)?;
                let date = entry.get("date").and_then(text)?;
                Some((country, date, entry.get("notes").and_then(text)))
            })
            .collect();

        let raw = dates
            .iter()
            .map(|(country, date, notes)| {
                raw_entry([("country", country), ("date", date)], notes.as_ref())
            })
            .collect::<Vec<_>>();
        let derived = dates
            .iter()
            .map(|(country, date, notes)| Value::from(joined(country, date, notes.as_deref())))
            .collect::<Vec<_>>();

        out.set("raw release dates", raw);
        out.set("release dates", derived);
    }

    if let Some(JsonValue::Array(entries)) = fields.get("akas") {
        let akas: Vec<(String, Option<String>, Option<String>)> = entries
            .iter()
            .filter_map(|entry| {
                let title = entry.get("title").and_then(text)?;
                Some((
                    title,
                    entry.get("country").and_then(text),
                    entry.get("notes").and_then(text),
                ))
            })
            .collect();

        let raw = akas
            .iter()
            .map(|(title, country, notes)| {
                let mut map = BTreeMap::new();
                map.insert("title".to_string(), Value::from(title.as_str()));
                if let Some(country) = country {
                    map.insert("country".to_string(), Value::from(country.as_str()));
                }
                if let Some(notes) = notes {
                    map.insert("notes".to_string(), Value::from(notes.as_str()));
                }
                Value::from(map)
            })
            .collect::<Vec<_>>();
        let derived = akas
            .iter()
            .map(|(title, country, notes)| {
                let country = country.as_deref().unwrap_or("");
                Value::from(joined(title, country, notes.as_deref()))
            })
            .collect::<Vec<_>>();

        out.set("raw akas", raw);
        out.set("akas from release info", derived);
    }
}

fn raw_entry<'a>(
    pairs: impl IntoIterator<Item = (&'a str, &'a String)>,
    notes: Option<&String>,
) -> Value {
    let mut map: BTreeMap<String, Value> = pairs
        .into_iter()
        .map(|(k, v)| (k.to_string(), Value::from(v.as_str())))
        .collect();
    if let Some(notes) = notes {
        map.insert("notes".to_string(), Value::from(notes.as_str()));
    }
    Value::from(map)
}

/// `left::right (notes)`, the flattened form used by derived lists.
fn joined(left: &str, right: &str, notes: Option<&str>) -> String {
    let mut out = if right.is_empty() {
        left.to_string()
    } else {
        format!("{}::{}", left, right)
    };
    if let Some(notes) = notes {
        let notes = notes.trim();
        if notes.starts_with('(') {
            out.push(' ');
            out.push_str(notes);
        } else {
            out.push_str(&format!(" ({})", notes));
        }
    }
    out
}

fn parents_guide(fields: &RawFields, out: &mut CategoryWriter<'_>) {
    if let Some(JsonValue::Object(sections)) = fields.get("advisories") {
        let mut votes = BTreeMap::new();
        for section in ADVISORY_SECTIONS {
            let Some(raw) = sections.get(section) else {
                continue;
            };
            if let Some(status) = raw.get("status").and_then(text) {
                votes.insert(section.to_string(), Value::from(status));
            }
            if let Some(items) = raw.get("items") {
                out.set(&format!("advisories {}", section), text_list(items));
            }
        }
        out.set("advisory votes", votes);
    }
    if let Some(value) = fields.get("certificates") {
        out.set("certificates", text_list(value));
    }
}

fn award(entry: &JsonValue) -> Option<Value> {
    let award = entry.get("award").and_then(text)?;
    let mut map = BTreeMap::new();
    map.insert("award".to_string(), Value::from(award));
    if let Some(year) = entry.get("year").and_then(parse_year) {
        map.insert("year".to_string(), Value::from(year));
    }
    for key in ["result", "category", "notes"] {
        if let Some(value) = entry.get(key).and_then(text) {
            map.insert(key.to_string(), Value::from(value));
        }
    }
    Some(Value::from(map))
}

/// Restrict raw technical labels to the fixed taxonomy.
///
/// Label variants (plural forms, British spelling, trailing colons) are
/// folded onto [`TECH_KEYS`](crate::category::TECH_KEYS); unknown labels are dropped.
pub fn tech_map(raw: &RawFields) -> BTreeMap<String, Value> {
    let mut tech = BTreeMap::new();
    for (label, values) in raw {
        let Some(key) = tech_key(label) else {
            debug!(label = label.as_str(), "unknown technical label, dropped");
            continue;
        };
        let values = text_list(values);
        if values.is_meaningful() {
            tech.insert(key.to_string(), values);
        }
    }
    tech
}

fn tech_key(label: &str) -> Option<&'static str> {
    let label = label
        .trim()
        .trim_end_matches(':')
        .trim()
        .to_lowercase()
        .replace("colour", "color");
    let key = match label.as_str() {
        "sound mix" | "sound mixes" => "sound mix",
        "color" | "colors" => "color",
        "aspect ratio" | "aspect ratios" => "aspect ratio",
        "camera" | "cameras" => "camera",
        "laboratory" | "laboratories" => "laboratory",
        "cinematographic process" | "cinematographic processes" => "cinematographic process",
        "printed film format" | "printed film formats" => "printed film format",
        "negative format" | "negative formats" => "negative format",
        "runtime" | "runtimes" | "run time" => "runtime",
        "film length" | "film lengths" => "film length",
        _ => return None,
    };
    Some(key)
}

/// Build references (nested records) from a raw entry list.
///
/// Entries carry either an `id` or a `url` to extract it from; everything
/// else on the entry becomes an attribute of the nested record. Entries
/// without a usable id are skipped.
pub fn references(entries: &JsonValue, kind: Kind) -> Vec<Record> {
    let entries: &[JsonValue] = match entries {
        JsonValue::Array(items) => items,
        JsonValue::Object(_) => std::slice::from_ref(entries),
        _ => return Vec::new(),
    };
    entries
        .iter()
        .filter_map(|entry| {
            let record = reference(entry, kind);
            if record.is_none() {
                debug!(%kind, entry = %entry, "reference without id, skipped");
            }
            record
        })
        .collect()
}

/// Build one nested record from a raw entry.
pub fn reference(entry: &JsonValue, kind: Kind) -> Option<Record> {
    let fields = entry.as_object()?;
    let id = entry_id(fields, kind)?;
    let kind = match fields.get("kind").and_then(JsonValue::as_str) {
        Some(label) if kind.is_title() => Kind::from_title_type(label),
        _ => kind,
    };

    let mut record = Record::new(kind, id);
    for (key, raw) in fields {
        match key.as_str() {
            "id" | "url" | "kind" => {}
            "year" => {
                if let Some(year) = parse_year(raw) {
                    record.set("year", year);
                }
            }
            "rating" => {
                if let Some(rating) = parse_rating(raw) {
                    record.set("rating", rating);
                }
            }
            "votes" => {
                if let Some(votes) = parse_votes(raw) {
                    record.set("votes", votes);
                }
            }
            "rank" => {
                if let Some(rank) = raw.as_i64() {
                    record.set("rank", rank);
                }
            }
            _ => {
                let value = match raw {
                    JsonValue::Array(_) => Some(text_list(raw)),
                    _ => text(raw).map(Value::from),
                };
                if let Some(value) = value {
                    record.set(key.as_str(), value);
                }
            }
        }
    }
    Some(record)
}

fn entry_id(fields: &RawFields, kind: Kind) -> Option<RecordId> {
    if let Some(id) = fields.get("id").and_then(text) {
        return RecordId::parse(&id).ok();
    }
    fields
        .get("url")
        .and_then(JsonValue::as_str)
        .and_then(|url| extract_imdb_id(url, kind.id_prefix()))
}

/// Overwrite `rank` with each record's 1-based position.
pub fn rank(mut records: Vec<Record>) -> Vec<Record> {
    for (position, record) in records.iter_mut().enumerate() {
        record.set("rank", position as i64 + 1);
    }
    records
}

/// Trimmed, non-empty text from a raw value.
pub fn text(value: &JsonValue) -> Option<String> {
    let text = match value {
        JsonValue::String(s) => collapse_whitespace(s),
        JsonValue::Number(n) => n.to_string(),
        _ => return None,
    };
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

/// Text list from a raw array (or a single string); blank items dropped.
pub fn text_list(value: &JsonValue) -> Value {
    let items = match value {
        JsonValue::Array(items) => items.iter().filter_map(text).map(Value::from).collect(),
        other => text(other).map(Value::from).into_iter().collect(),
    };
    Value::List(items)
}

fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Release year as an integer.
///
/// # Examples
/// ```
/// use imdb_core::normalize::parse_year;
/// use serde_json::json;
///
/// assert_eq!(parse_year(&json!("1999-03-31")), Some(1999));
/// assert_eq!(parse_year(&json!("(2008–2013)")), Some(2008));
/// assert_eq!(parse_year(&json!(1999)), Some(1999));
/// assert_eq!(parse_year(&json!("n/a")), None);
/// ```
pub fn parse_year(value: &JsonValue) -> Option<i64> {
    if let Some(year) = value.as_i64() {
        return (1870..=2100).contains(&year).then_some(year);
    }
    let caps = YEAR_PATTERN.captures(value.as_str()?)?;
    caps.get(1)?.as_str().parse().ok()
}

/// Rating on the 0-10 scale as a float.
///
/// # Examples
/// ```
/// use imdb_core::normalize::parse_rating;
/// use serde_json::json;
///
/// assert_eq!(parse_rating(&json!("8.7/10")), Some(8.7));
/// assert_eq!(parse_rating(&json!(9)), Some(9.0));
/// assert_eq!(parse_rating(&json!("11")), None);
/// ```
pub fn parse_rating(value: &JsonValue) -> Option<f64> {
    let rating = match value {
        JsonValue::Number(n) => n.as_f64()?,
        JsonValue::String(s) => {
            let caps = RATING_PATTERN.captures(s)?;
            caps.get(1)?.as_str().replace(',', ".").parse().ok()?
        }
        _ => return None,
    };
    (0.0..=10.0).contains(&rating).then_some(rating)
}

/// Vote count as an integer, accepting `1,234,567`, `250K` and `1.9M`.
///
/// # Examples
/// ```
/// use imdb_core::normalize::parse_votes;
/// use serde_json::json;
///
/// assert_eq!(parse_votes(&json!("1,234,567")), Some(1_234_567));
/// assert_eq!(parse_votes(&json!("(1.9M)")), Some(1_900_000));
/// assert_eq!(parse_votes(&json!(42)), Some(42));
/// ```
pub fn parse_votes(value: &JsonValue) -> Option<i64> {
    match value {
        JsonValue::Number(n) => n.as_i64().filter(|v| *v >= 0),
        JsonValue::String(s) => {
            let caps = VOTES_PATTERN.captures(s)?;
            let number: f64 = caps.get(1)?.as_str().replace(',', "").parse().ok()?;
            let multiplier = match caps.get(2).map(|m| m.as_str().to_ascii_uppercase()) {
                Some(suffix) if suffix == "K" => 1_000.0,
                Some(suffix) if suffix == "M" => 1_000_000.0,
                _ => 1.0,
            };
            Some((number * multiplier).round() as i64)
        }
        _ => None,
    }
}
