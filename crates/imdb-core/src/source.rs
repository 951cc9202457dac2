//! Fetch+parse collaborators.
//!
//! A [`Source`] turns an identifier, search term or chart into raw fields;
//! the facade normalizes whatever it returns. [`HttpSource`] is the IMDb
//! website implementation.

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde_json::Value as JsonValue;
use tracing::debug;

use crate::category::InfoCategory;
use crate::client::ImdbClient;
use crate::error::{ImdbError, Result};
use crate::normalize::RawData;
use crate::parser::{
    parse_category, parse_chart, parse_find_results, parse_keyword_matches, parse_showtimes,
    parse_title_type,
};
use crate::record::{Kind, RecordId};
use crate::types::{Chart, ShowtimesLocation};

/// Source of raw entity, chart, search and showtimes data
///
/// Implementations must return the same field shapes for a category on
/// every call. `ImdbError::NotFound` means the entity or listing does not
/// exist; any other error is a retrieval failure.
#[async_trait]
pub trait Source: Send + Sync {
    /// Raw fields for each requested category of one entity.
    async fn fetch_entity(
        &self,
        kind: Kind,
        id: &RecordId,
        categories: &[InfoCategory],
    ) -> Result<RawData>;

    /// Raw title entries of a chart or list, in listed order.
    async fn fetch_chart(&self, chart: &Chart) -> Result<Vec<JsonValue>>;

    /// Raw entries matching a search term for one kind of entity.
    async fn fetch_search(&self, kind: Kind, term: &str) -> Result<Vec<JsonValue>>;

    /// Keyword names matching a term, in source order.
    async fn fetch_keyword_matches(&self, term: &str) -> Result<Vec<String>>;

    /// Raw cinema entries for a location.
    async fn fetch_showtimes(&self, location: &ShowtimesLocation) -> Result<Vec<JsonValue>>;
}

/// [`Source`] backed by the IMDb website
pub struct HttpSource {
    client: ImdbClient,
}

impl HttpSource {
    /// Create a source with the default client configuration.
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be created.
    pub fn new() -> Result<Self> {
        Ok(Self {
            client: ImdbClient::new()?,
        })
    }

    pub fn with_client(client: ImdbClient) -> Self {
        Self { client }
    }

    /// Page path of an entity, optionally below a sub-page.
    fn entity_path(kind: Kind, id: &RecordId, page: &str) -> String {
        let base = match kind {
            Kind::Movie | Kind::TvSeries => format!("/title/tt{}/", id),
            Kind::Person => format!("/name/nm{}/", id),
            Kind::Company => format!("/company/co{}/", id),
        };
        if page.is_empty() {
            base
        } else {
            format!("{}{}/", base, page)
        }
    }

    /// Find page path for a kind of entity.
    fn search_path(kind: Kind, term: &str) -> String {
        let section = match kind {
            Kind::Movie | Kind::TvSeries => "tt",
            Kind::Person => "nm",
            Kind::Company => "co",
        };
        format!("/find/?q={}&s={}", urlencoding::encode(term), section)
    }
}

#[async_trait]
impl Source for HttpSource {
    /// Fetches each distinct page once and parses every category it carries.
    /// Titles always fetch their main page too, for the title type.
    ///
    /// A sub-page that does not exist leaves its categories empty; the
    /// entity is reported missing only when none of its pages exist.
    async fn fetch_entity(
        &self,
        kind: Kind,
        id: &RecordId,
        categories: &[InfoCategory],
    ) -> Result<RawData> {
        let mut pages: BTreeMap<&'static str, Vec<InfoCategory>> = BTreeMap::new();
        if kind.is_title() {
            // The main page carries the title type whatever else is requested.
            pages.entry(InfoCategory::Main.page(kind)).or_default();
        }
        for category in categories {
            if category.applies_to(kind) {
                pages.entry(category.page(kind)).or_default().push(*category);
            }
        }

        let mut raw = RawData::new();
        let mut missing = 0;
        for (page, page_categories) in &pages {
            let path = Self::entity_path(kind, id, page);
            let html = match self.client.fetch(&path).await {
                Ok(html) => html,
                Err(err) if err.is_not_found() => {
                    debug!(path = %path, "page not found, categories left empty");
                    missing += 1;
                    continue;
                }
                Err(err) => return Err(err),
            };
            if kind.is_title() && page.is_empty() {
                if let Some(title_type) = parse_title_type(&html) {
                    raw.set_title_type(title_type);
                }
            }
            for category in page_categories {
                let fields = parse_category(kind, *category, &html)?;
                raw.insert(*category, fields);
            }
        }

        if !pages.is_empty() && missing == pages.len() {
            return Err(ImdbError::NotFound(Self::entity_path(kind, id, "")));
        }
        Ok(raw)
    }

    async fn fetch_chart(&self, chart: &Chart) -> Result<Vec<JsonValue>> {
        let html = self.client.fetch(&chart.path()).await?;
        parse_chart(&html)
    }

    async fn fetch_search(&self, kind: Kind, term: &str) -> Result<Vec<JsonValue>> {
        let html = self.client.fetch(&Self::search_path(kind, term)).await?;
        parse_find_results(&html, kind)
    }

    async fn fetch_keyword_matches(&self, term: &str) -> Result<Vec<String>> {
        let path = format!("/find/?q={}&s=kw", urlencoding::encode(term));
        let html = self.client.fetch(&path).await?;
        parse_keyword_matches(&html)
    }

    async fn fetch_showtimes(&self, location: &ShowtimesLocation) -> Result<Vec<JsonValue>> {
        let html = self.client.fetch(&location.path()).await?;
        parse_showtimes(&html)
    }
}
