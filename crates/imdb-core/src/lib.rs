//! IMDb Scraper Core Library
//!
//! This crate provides a record-and-query client for IMDb: movies,
//! tv-series, people and companies are fetched per info category and
//! normalized into [`Record`]s with consistent, typed attributes.
//!
//! # Features
//! - Get movies, people and companies with selectable info categories
//! - Ranked charts (top 250, most popular, box office, genres) and user lists
//! - Title, person, company and keyword search
//! - Cinema showtimes
//! - Identity-based record equality and cross-reference lookups
//! - XML export of records
//! - Rate-limited HTTP client to avoid server overload

pub mod category;
pub mod client;
pub mod error;
pub mod markup;
pub mod normalize;
pub mod parser;
pub mod record;
pub mod scraper;
pub mod source;
pub mod types;

// Re-export main types for convenience
pub use category::InfoCategory;
pub use client::{ClientConfig, ImdbClient, RateLimiter};
pub use error::{ImdbError, Result};
pub use normalize::{RawData, RawFields};
pub use record::{Kind, Record, RecordId, SharedRecord, Value};
pub use scraper::{ImdbScraper, ScraperConfig, KEYWORD_SEARCH_LIMIT};
pub use source::{HttpSource, Source};
pub use types::{Chart, CinemaShowtimes, ScheduledMovie, ShowtimesLocation};
