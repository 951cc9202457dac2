//! Main IMDb Scraper API
//!
//! This module provides the high-level API for querying IMDb. It combines
//! a [`Source`] with the normalizer to return [`Record`]s for movies,
//! people and companies, ranked charts and lists, search results, keyword
//! matches and cinema showtimes.

use serde::Deserialize;
use serde_json::Value as JsonValue;
use tracing::debug;

use crate::category::InfoCategory;
use crate::client::ImdbClient;
use crate::error::{ImdbError, Result};
use crate::normalize::{normalize, rank, reference, references, text};
use crate::record::{Kind, Record, RecordId, SharedRecord};
use crate::source::{HttpSource, Source};
use crate::types::{Chart, CinemaShowtimes, ScheduledMovie, ShowtimesLocation};

/// Default upper bound on keyword search results.
pub const KEYWORD_SEARCH_LIMIT: usize = 200;

/// Configuration for the scraper facade
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ScraperConfig {
    /// Maximum number of keywords returned by `search_keyword`
    pub keyword_limit: usize,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            keyword_limit: KEYWORD_SEARCH_LIMIT,
        }
    }
}

/// Main scraper API for IMDb
///
/// Provides methods for fetching movies, people and companies, charts and
/// lists, searching, and cinema showtimes. All operations are asynchronous
/// and may be called concurrently through a shared reference.
///
/// # Example
/// ```no_run
/// use imdb_core::ImdbScraper;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let scraper = ImdbScraper::new()?;
///
///     let movie = scraper.get_movie("0133093", &["main", "plot"]).await?;
///     println!("{:?}", movie.get_str("title"));
///
///     let top = scraper.top_movies().await?;
///     println!("Top 250 has {} entries", top.len());
///
///     Ok(())
/// }
/// ```
pub struct ImdbScraper<S = HttpSource> {
    source: S,
    config: ScraperConfig,
}

impl ImdbScraper<HttpSource> {
    /// Create a new scraper with default configuration.
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be created.
    ///
    /// # Example
    /// ```
    /// use imdb_core::ImdbScraper;
    ///
    /// let scraper = ImdbScraper::new().expect("Failed to create scraper");
    /// ```
    pub fn new() -> Result<Self> {
        Ok(Self::with_source(HttpSource::new()?))
    }

    /// Create a new scraper with a custom client.
    ///
    /// This is useful for testing or when you need custom client configuration.
    pub fn with_client(client: ImdbClient) -> Self {
        Self::with_source(HttpSource::with_client(client))
    }
}

impl<S: Source> ImdbScraper<S> {
    /// Create a scraper over any fetch+parse source.
    pub fn with_source(source: S) -> Self {
        Self {
            source,
            config: ScraperConfig::default(),
        }
    }

    /// Replace the scraper configuration.
    pub fn with_config(mut self, config: ScraperConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &ScraperConfig {
        &self.config
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Get a movie (or tv-series) with the requested info categories.
    ///
    /// # Arguments
    /// * `id` - IMDb title id, with or without the `tt` prefix
    /// * `categories` - Info category names; unrecognized names are ignored
    ///   and an empty set means `main`
    ///
    /// # Returns
    /// * `Ok(Record)` of kind movie, or tv-series when the title is a series
    /// * `Err(ImdbError::InvalidId)` if `id` is not a valid identifier
    /// * `Err(ImdbError::NotFound)` if the title doesn't exist
    ///
    /// # Example
    /// ```no_run
    /// use imdb_core::ImdbScraper;
    ///
    /// # async fn example() -> Result<(), imdb_core::ImdbError> {
    /// let scraper = ImdbScraper::new()?;
    /// let movie = scraper.get_movie("tt0133093", &["plot"]).await?;
    /// if !movie.contains_key("plot") {
    ///     println!("no plot available");
    /// }
    /// # Ok(())
    /// # }
    /// ```
    pub async fn get_movie(&self, id: &str, categories: &[&str]) -> Result<Record> {
        self.get_entity(Kind::Movie, id, categories).await
    }

    /// Get a person with the requested info categories.
    ///
    /// # Returns
    /// * `Ok(Record)` of kind person
    /// * `Err(ImdbError::InvalidId)` if `id` is not a valid identifier
    /// * `Err(ImdbError::NotFound)` if the person doesn't exist
    pub async fn get_person(&self, id: &str, categories: &[&str]) -> Result<Record> {
        self.get_entity(Kind::Person, id, categories).await
    }

    /// Get a company with the requested info categories.
    pub async fn get_company(&self, id: &str, categories: &[&str]) -> Result<Record> {
        self.get_entity(Kind::Company, id, categories).await
    }

    async fn get_entity(&self, kind: Kind, id: &str, categories: &[&str]) -> Result<Record> {
        let id = RecordId::parse_for(kind, id)?;
        let categories = resolve_categories(kind, categories);
        self.fetch_record(kind, id, &categories).await
    }

    async fn fetch_record(
        &self,
        kind: Kind,
        id: RecordId,
        categories: &[InfoCategory],
    ) -> Result<Record> {
        let raw = self.source.fetch_entity(kind, &id, categories).await?;
        Ok(normalize(kind, id, &raw, categories))
    }

    /// Fetch more info categories for a record and merge them into it.
    ///
    /// Keys already on the record are kept unless the new categories
    /// overwrite them.
    pub async fn update(&self, record: &mut Record, categories: &[&str]) -> Result<()> {
        let fresh = self.fetch_update(record.kind(), record.id().clone(), categories).await?;
        record.merge(fresh)
    }

    /// Like [`update`](Self::update), for a record shared with concurrent
    /// readers. No lock is held while fetching.
    pub async fn update_shared(&self, record: &SharedRecord, categories: &[&str]) -> Result<()> {
        let current = record.snapshot();
        let fresh = self.fetch_update(current.kind(), current.id().clone(), categories).await?;
        record.merge(fresh)
    }

    async fn fetch_update(&self, kind: Kind, id: RecordId, categories: &[&str]) -> Result<Record> {
        let categories = resolve_categories(kind, categories);
        let fresh = self.fetch_record(kind, id, &categories).await?;
        Ok(retag(fresh, kind))
    }

    /// Top 250 movies, ranked.
    ///
    /// # Example
    /// ```no_run
    /// use imdb_core::ImdbScraper;
    ///
    /// # async fn example() -> Result<(), imdb_core::ImdbError> {
    /// let scraper = ImdbScraper::new()?;
    /// for movie in scraper.top_movies().await?.iter().take(10) {
    ///     println!("{:?} {:?}", movie.get("rank"), movie.get_str("title"));
    /// }
    /// # Ok(())
    /// # }
    /// ```
    pub async fn top_movies(&self) -> Result<Vec<Record>> {
        self.chart(Chart::TopMovies, Kind::Movie).await
    }

    /// Bottom 100 movies, ranked.
    pub async fn bottom_movies(&self) -> Result<Vec<Record>> {
        self.chart(Chart::BottomMovies, Kind::Movie).await
    }

    /// Most popular movies, ranked.
    pub async fn popular_movies(&self) -> Result<Vec<Record>> {
        self.chart(Chart::PopularMovies, Kind::Movie).await
    }

    /// Most popular tv shows, ranked.
    pub async fn popular_tv(&self) -> Result<Vec<Record>> {
        self.chart(Chart::PopularTv, Kind::TvSeries).await
    }

    /// Top rated Indian movies, ranked.
    pub async fn top_indian_movies(&self) -> Result<Vec<Record>> {
        self.chart(Chart::TopIndianMovies, Kind::Movie).await
    }

    /// Top 250 tv shows, ranked.
    pub async fn top_tv(&self) -> Result<Vec<Record>> {
        self.chart(Chart::TopTv, Kind::TvSeries).await
    }

    /// Weekend box office, ranked.
    pub async fn box_office(&self) -> Result<Vec<Record>> {
        self.chart(Chart::BoxOffice, Kind::Movie).await
    }

    /// Top rated movies having all of the given genres, ranked.
    ///
    /// # Errors
    /// `ImdbError::InvalidUrl` if no genre is given.
    pub async fn top_movies_by_genres(&self, genres: &[&str]) -> Result<Vec<Record>> {
        let chart = genre_chart(genres, false)?;
        self.chart(chart, Kind::Movie).await
    }

    /// Top rated tv shows having all of the given genres, ranked.
    pub async fn top_tv_by_genres(&self, genres: &[&str]) -> Result<Vec<Record>> {
        let chart = genre_chart(genres, true)?;
        self.chart(chart, Kind::TvSeries).await
    }

    /// Titles of a user list (`ls...`), ranked in list order.
    ///
    /// # Errors
    /// `ImdbError::InvalidId` if `list_id` is not a valid identifier. A list
    /// that doesn't exist yields an empty vec.
    pub async fn get_list(&self, list_id: &str) -> Result<Vec<Record>> {
        let id = RecordId::parse_with_prefix(list_id, "ls")?;
        self.chart(Chart::List(id), Kind::Movie).await
    }

    /// Titles tagged with a keyword, ranked.
    pub async fn get_keyword(&self, keyword: &str) -> Result<Vec<Record>> {
        let keyword = search_term(keyword)?;
        self.chart(Chart::Keyword(keyword.to_string()), Kind::Movie).await
    }

    async fn chart(&self, chart: Chart, kind: Kind) -> Result<Vec<Record>> {
        let entries = collection(self.source.fetch_chart(&chart).await)?;
        let records: Vec<Record> = entries.iter().filter_map(|e| reference(e, kind)).collect();
        debug!(?chart, entries = entries.len(), records = records.len(), "chart fetched");
        Ok(rank(records))
    }

    /// Search movies and tv shows by title, in relevance order.
    ///
    /// # Returns
    /// * `Ok(Vec<Record>)` with matching titles (unranked), possibly empty
    /// * `Err(ImdbError::InvalidUrl)` if the term is empty or whitespace-only
    pub async fn search_movie(&self, term: &str) -> Result<Vec<Record>> {
        self.search(Kind::Movie, term).await
    }

    /// Search people by name, in relevance order.
    pub async fn search_person(&self, term: &str) -> Result<Vec<Record>> {
        self.search(Kind::Person, term).await
    }

    /// Search companies by name, in relevance order.
    pub async fn search_company(&self, term: &str) -> Result<Vec<Record>> {
        self.search(Kind::Company, term).await
    }

    async fn search(&self, kind: Kind, term: &str) -> Result<Vec<Record>> {
        let term = search_term(term)?;
        let entries = collection(self.source.fetch_search(kind, term).await)?;
        Ok(references(&JsonValue::Array(entries), kind))
    }

    /// Search keywords matching a term.
    ///
    /// Returns plain keyword names in source order, at most
    /// [`ScraperConfig::keyword_limit`] of them. No matches is an empty vec.
    ///
    /// # Example
    /// ```no_run
    /// use imdb_core::ImdbScraper;
    ///
    /// # async fn example() -> Result<(), imdb_core::ImdbError> {
    /// let scraper = ImdbScraper::new()?;
    /// let keywords = scraper.search_keyword("computer").await?;
    /// assert!(keywords.len() <= 200);
    /// # Ok(())
    /// # }
    /// ```
    pub async fn search_keyword(&self, term: &str) -> Result<Vec<String>> {
        let term = search_term(term)?;
        let mut keywords = collection(self.source.fetch_keyword_matches(term).await)?;
        if keywords.len() > self.config.keyword_limit {
            debug!(
                found = keywords.len(),
                limit = self.config.keyword_limit,
                "keyword matches capped"
            );
            keywords.truncate(self.config.keyword_limit);
        }
        Ok(keywords)
    }

    /// Cinemas and their scheduled movies near a location.
    ///
    /// Movies without an id or without showtimes are dropped, and so are
    /// cinemas left with no movies.
    pub async fn get_showtimes(&self, location: &ShowtimesLocation) -> Result<Vec<CinemaShowtimes>> {
        let entries = collection(self.source.fetch_showtimes(location).await)?;
        Ok(entries.iter().filter_map(cinema_showtimes).collect())
    }
}

/// Resolve category names for `kind`, falling back to `main` when none apply.
fn resolve_categories(kind: Kind, names: &[&str]) -> Vec<InfoCategory> {
    let mut categories = InfoCategory::parse_set(names);
    categories.retain(|category| {
        let applies = category.applies_to(kind);
        if !applies {
            debug!(category = category.name(), kind = %kind, "category does not apply, skipping");
        }
        applies
    });
    if categories.is_empty() {
        vec![InfoCategory::Main]
    } else {
        categories
    }
}

/// Validate a search term, returning it trimmed.
fn search_term(term: &str) -> Result<&str> {
    let trimmed = term.trim();
    if trimmed.is_empty() {
        return Err(ImdbError::InvalidUrl("Search query cannot be empty".to_string()));
    }
    Ok(trimmed)
}

fn genre_chart(genres: &[&str], tv: bool) -> Result<Chart> {
    let genres: Vec<String> = genres
        .iter()
        .map(|g| g.trim())
        .filter(|g| !g.is_empty())
        .map(str::to_string)
        .collect();
    if genres.is_empty() {
        return Err(ImdbError::InvalidUrl("At least one genre is required".to_string()));
    }
    Ok(Chart::TopByGenres { genres, tv })
}

/// A collection that doesn't exist is an empty collection.
fn collection<T>(result: Result<Vec<T>>) -> Result<Vec<T>> {
    match result {
        Err(ImdbError::NotFound(what)) => {
            debug!(what = %what, "collection not found, returning empty");
            Ok(Vec::new())
        }
        other => other,
    }
}

/// Keep the kind a record was fetched as, even if the fresh data refines it.
fn retag(fresh: Record, kind: Kind) -> Record {
    if fresh.kind() == kind {
        return fresh;
    }
    let mut record = Record::new(kind, fresh.id().clone());
    for (key, value) in fresh.attributes() {
        record.set(key.as_str(), value.clone());
    }
    record
}

fn cinema_showtimes(entry: &JsonValue) -> Option<CinemaShowtimes> {
    let cinema = entry.get("cinema").and_then(text)?;
    let address = entry.get("address").and_then(text);
    let movies: Vec<ScheduledMovie> = entry
        .get("movies")?
        .as_array()?
        .iter()
        .filter_map(scheduled_movie)
        .collect();
    if movies.is_empty() {
        debug!(cinema = %cinema, "cinema without scheduled movies, dropped");
        return None;
    }
    Some(CinemaShowtimes {
        cinema,
        address,
        movies,
    })
}

fn scheduled_movie(entry: &JsonValue) -> Option<ScheduledMovie> {
    let mut fields = entry.as_object()?.clone();
    let showtimes: Vec<String> = fields
        .remove("showtimes")?
        .as_array()?
        .iter()
        .filter_map(text)
        .collect();
    if showtimes.is_empty() {
        return None;
    }
    let movie = reference(&JsonValue::Object(fields), Kind::Movie)?;
    Some(ScheduledMovie { movie, showtimes })
}
