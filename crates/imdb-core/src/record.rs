//! Record model: the mapping-like entity returned by every lookup.
//!
//! A [`Record`] is identified by its [`Kind`] and [`RecordId`]; attributes are
//! kept in a sorted map of [`Value`]s. Two records describing the same entity
//! compare equal no matter how many attributes each one carries, which lets a
//! person fetched on their own match the same person nested in a cast list.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::sync::{Arc, PoisonError, RwLock};

use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};

use crate::error::{ImdbError, Result};

/// Person credit lists on a movie or tv-series.
pub const PERSON_CREDIT_KEYS: &[&str] = &[
    "cast",
    "director",
    "writer",
    "creator",
    "producer",
    "composer",
    "cinematographer",
    "editor",
    "casting director",
    "production designer",
    "costume designer",
    "miscellaneous crew",
];

/// Company credit lists on a movie or tv-series.
pub const COMPANY_CREDIT_KEYS: &[&str] = &[
    "production companies",
    "distributors",
    "special effects",
    "miscellaneous companies",
];

/// Title lists on a company.
pub const COMPANY_FILMOGRAPHY_KEYS: &[&str] =
    &["produced", "distributed", "special effects", "miscellaneous"];

/// Prefixes IMDb puts in front of numeric ids.
const ID_PREFIXES: &[&str] = &["tt", "nm", "co", "ls"];

/// Map of role name to title list on a person.
pub const FILMOGRAPHY_KEY: &str = "filmography";

/// Entity category of a record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Kind {
    Movie,
    Person,
    Company,
    TvSeries,
}

impl Kind {
    pub fn as_str(self) -> &'static str {
        match self {
            Kind::Movie => "movie",
            Kind::Person => "person",
            Kind::Company => "company",
            Kind::TvSeries => "tv-series",
        }
    }

    /// Movies and tv-series share the `tt` id space.
    pub fn is_title(self) -> bool {
        matches!(self, Kind::Movie | Kind::TvSeries)
    }

    /// Prefix IMDb puts in front of the numeric id in URLs.
    pub fn id_prefix(self) -> &'static str {
        match self {
            Kind::Movie | Kind::TvSeries => "tt",
            Kind::Person => "nm",
            Kind::Company => "co",
        }
    }

    /// Map a title type label ("TVSeries", "tv mini series", "Movie") to a kind.
    pub fn from_title_type(label: &str) -> Kind {
        let normalized: String = label
            .chars()
            .filter(|c| c.is_alphanumeric())
            .collect::<String>()
            .to_lowercase();
        if normalized.starts_with("tvseries")
            || normalized.starts_with("tvminiseries")
            || normalized == "series"
        {
            Kind::TvSeries
        } else {
            Kind::Movie
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Numeric IMDb identifier without its `tt`/`nm`/`co`/`ls` prefix
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RecordId(String);

impl RecordId {
    /// Parse an identifier, stripping a known IMDb prefix.
    ///
    /// # Examples
    /// ```
    /// use imdb_core::RecordId;
    ///
    /// assert_eq!(RecordId::parse("tt0133093").unwrap().as_str(), "0133093");
    /// assert_eq!(RecordId::parse("0000206").unwrap().as_str(), "0000206");
    /// assert!(RecordId::parse("matrix").is_err());
    /// ```
    pub fn parse(raw: &str) -> Result<Self> {
        let trimmed = raw.trim();
        let digits = ID_PREFIXES
            .iter()
            .find_map(|prefix| trimmed.strip_prefix(prefix))
            .unwrap_or(trimmed);
        Self::from_digits(digits, raw)
    }

    /// Parse an identifier that must belong to `kind`.
    ///
    /// Bare digits are accepted; a prefix of another kind is rejected.
    ///
    /// # Examples
    /// ```
    /// use imdb_core::{Kind, RecordId};
    ///
    /// assert_eq!(RecordId::parse_for(Kind::Movie, "tt0133093").unwrap().as_str(), "0133093");
    /// assert_eq!(RecordId::parse_for(Kind::Person, "0000206").unwrap().as_str(), "0000206");
    /// assert!(RecordId::parse_for(Kind::Movie, "nm0000206").is_err());
    /// ```
    pub fn parse_for(kind: Kind, raw: &str) -> Result<Self> {
        Self::parse_with_prefix(raw, kind.id_prefix())
    }

    /// Parse an identifier whose only accepted prefix is `prefix` (`ls` for lists).
    pub fn parse_with_prefix(raw: &str, prefix: &str) -> Result<Self> {
        let trimmed = raw.trim();
        let digits = match trimmed.strip_prefix(prefix) {
            Some(digits) => digits,
            None if ID_PREFIXES.iter().any(|other| trimmed.starts_with(other)) => {
                return Err(ImdbError::InvalidId(raw.to_string()));
            }
            None => trimmed,
        };
        Self::from_digits(digits, raw)
    }

    fn from_digits(digits: &str, raw: &str) -> Result<Self> {
        if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
            return Err(ImdbError::InvalidId(raw.to_string()));
        }
        Ok(Self(digits.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for RecordId {
    type Err = ImdbError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<String> for RecordId {
    type Error = ImdbError;

    fn try_from(raw: String) -> Result<Self> {
        Self::parse(&raw)
    }
}

impl From<RecordId> for String {
    fn from(id: RecordId) -> Self {
        id.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Attribute value stored on a record
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Text(String),
    Int(i64),
    Float(f64),
    List(Vec<Value>),
    Map(BTreeMap<String, Value>),
    Record(Box<Record>),
}

impl Value {
    /// False for values that carry no information: blank text, empty
    /// collections, NaN/infinite floats.
    pub fn is_meaningful(&self) -> bool {
        match self {
            Value::Text(s) => !s.trim().is_empty(),
            Value::Int(_) => true,
            Value::Float(f) => f.is_finite(),
            Value::List(items) => !items.is_empty(),
            Value::Map(map) => !map.is_empty(),
            Value::Record(_) => true,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&BTreeMap<String, Value>> {
        match self {
            Value::Map(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_record(&self) -> Option<&Record> {
        match self {
            Value::Record(record) => Some(record),
            _ => None,
        }
    }

    /// Records held directly in this value or in a list.
    fn records(&self) -> impl Iterator<Item = &Record> {
        let items: &[Value] = match self {
            Value::List(items) => items,
            _ => std::slice::from_ref(self),
        };
        items.iter().filter_map(Value::as_record)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<Record> for Value {
    fn from(record: Record) -> Self {
        Value::Record(Box::new(record))
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::List(items)
    }
}

impl From<Vec<Record>> for Value {
    fn from(records: Vec<Record>) -> Self {
        Value::List(records.into_iter().map(Value::from).collect())
    }
}

impl From<BTreeMap<String, Value>> for Value {
    fn from(map: BTreeMap<String, Value>) -> Self {
        Value::Map(map)
    }
}

/// A movie, person, company or tv-series with keyed attributes
///
/// The attribute map sits behind an `Arc`: cloning a record is cheap and
/// the first write after a clone copies the map.
#[derive(Debug, Clone)]
pub struct Record {
    kind: Kind,
    id: RecordId,
    attrs: Arc<BTreeMap<String, Value>>,
}

impl Record {
    pub fn new(kind: Kind, id: RecordId) -> Self {
        Self {
            kind,
            id,
            attrs: Arc::new(BTreeMap::new()),
        }
    }

    pub fn kind(&self) -> Kind {
        self.kind
    }

    pub fn id(&self) -> &RecordId {
        &self.id
    }

    /// Attribute value, or `None` when the key is absent.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.attrs.get(key)
    }

    /// Attribute value, or `default` when the key is absent.
    pub fn get_or<'a>(&'a self, key: &str, default: &'a Value) -> &'a Value {
        self.attrs.get(key).unwrap_or(default)
    }

    /// Text attribute shortcut.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Value::as_str)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.attrs.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.attrs.keys().map(String::as_str)
    }

    pub fn attributes(&self) -> &BTreeMap<String, Value> {
        &self.attrs
    }

    pub fn len(&self) -> usize {
        self.attrs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attrs.is_empty()
    }

    /// Store an attribute.
    ///
    /// Values without information are refused so that a present key always
    /// means real data. Returns whether the value was stored.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) -> bool {
        let value = value.into();
        if !value.is_meaningful() {
            return false;
        }
        Arc::make_mut(&mut self.attrs).insert(key.into(), value);
        true
    }

    /// Builder form of [`Record::set`].
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set(key, value);
        self
    }

    /// Merge another fetch of the same entity into this record.
    ///
    /// Keys from `other` overwrite existing ones; keys only present here
    /// are kept.
    ///
    /// # Errors
    /// `ImdbError::IdentityMismatch` if `other` describes a different entity.
    pub fn merge(&mut self, other: Record) -> Result<()> {
        if *self != other {
            return Err(ImdbError::IdentityMismatch {
                expected: format!("{} {}", self.kind, self.id),
                found: format!("{} {}", other.kind, other.id),
            });
        }
        if other.attrs.is_empty() {
            return Ok(());
        }
        let incoming = Arc::try_unwrap(other.attrs).unwrap_or_else(|shared| (*shared).clone());
        Arc::make_mut(&mut self.attrs).extend(incoming);
        Ok(())
    }

    /// Whether `other` is referenced by one of this record's reference lists.
    ///
    /// A movie contains the people in its credits and the companies in its
    /// company credits; a person contains the titles in their filmography; a
    /// company contains the titles it produced or distributed.
    pub fn contains_reference(&self, other: &Record) -> bool {
        match (self.kind, other.kind) {
            (k, Kind::Person) if k.is_title() => self.lists_reference(PERSON_CREDIT_KEYS, other),
            (k, Kind::Company) if k.is_title() => {
                self.lists_reference(COMPANY_CREDIT_KEYS, other)
            }
            (Kind::Person, k) if k.is_title() => self
                .get(FILMOGRAPHY_KEY)
                .and_then(Value::as_map)
                .is_some_and(|roles| {
                    roles
                        .values()
                        .flat_map(|value| value.records())
                        .any(|r| r.references(other))
                }),
            (Kind::Company, k) if k.is_title() => {
                self.lists_reference(COMPANY_FILMOGRAPHY_KEYS, other)
            }
            _ => false,
        }
    }

    fn lists_reference(&self, keys: &[&str], other: &Record) -> bool {
        keys.iter()
            .filter_map(|key| self.get(key))
            .flat_map(|value| value.records())
            .any(|r| r.references(other))
    }

    /// Identity match across the title id space: a filmography entry of kind
    /// movie still refers to a title fetched as a tv-series.
    fn references(&self, other: &Record) -> bool {
        let same_space = self.kind == other.kind || (self.kind.is_title() && other.kind.is_title());
        same_space && self.id == other.id
    }

    /// Render this record as an XML document.
    pub fn to_markup(&self) -> Result<String> {
        crate::markup::to_markup(self)
    }
}

impl PartialEq for Record {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind && self.id == other.id
    }
}

impl Eq for Record {}

impl std::hash::Hash for Record {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.kind.hash(state);
        self.id.hash(state);
    }
}

impl Serialize for Record {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut state = serializer.serialize_struct("Record", 3)?;
        state.serialize_field("kind", &self.kind)?;
        state.serialize_field("id", &self.id)?;
        state.serialize_field("attributes", &*self.attrs)?;
        state.end()
    }
}

/// A record shared between concurrent readers and a single writer
///
/// Readers take snapshots (cheap clones); [`SharedRecord::merge`] swaps in
/// the augmented attribute map without disturbing snapshots already handed
/// out.
#[derive(Debug, Clone)]
pub struct SharedRecord {
    inner: Arc<RwLock<Record>>,
}

impl SharedRecord {
    pub fn new(record: Record) -> Self {
        Self {
            inner: Arc::new(RwLock::new(record)),
        }
    }

    /// Current state of the record.
    pub fn snapshot(&self) -> Record {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Merge newly fetched data into the shared record.
    pub fn merge(&self, other: Record) -> Result<()> {
        self.inner
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .merge(other)
    }
}

impl From<Record> for SharedRecord {
    fn from(record: Record) -> Self {
        Self::new(record)
    }
}
