//! Data types for IMDb Scraper
//!
//! Chart selectors, showtimes locations and showtimes results. Records
//! themselves live in [`crate::record`].

use serde::{Deserialize, Serialize};

use crate::record::{Record, RecordId};

/// A ranked title listing on IMDb
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Chart {
    /// Top 250 movies
    TopMovies,
    /// Bottom 100 movies
    BottomMovies,
    /// Most popular movies (MOVIEmeter)
    PopularMovies,
    /// Top 250 TV shows
    TopTv,
    /// Most popular TV shows (TVmeter)
    PopularTv,
    /// Top rated Indian movies
    TopIndianMovies,
    /// Weekend box office
    BoxOffice,
    /// Top 50 titles matching all of the genres
    TopByGenres { genres: Vec<String>, tv: bool },
    /// A user-curated list (`ls...`)
    List(RecordId),
    /// Titles tagged with a keyword
    Keyword(String),
}

impl Chart {
    /// Page path of the chart, including any query string.
    ///
    /// # Examples
    /// ```
    /// use imdb_core::Chart;
    ///
    /// assert_eq!(Chart::TopMovies.path(), "/chart/top/");
    /// assert_eq!(Chart::Keyword("time travel".into()).path(), "/search/keyword/?keywords=time%20travel");
    /// ```
    pub fn path(&self) -> String {
        match self {
            Chart::TopMovies => "/chart/top/".to_string(),
            Chart::BottomMovies => "/chart/bottom/".to_string(),
            Chart::PopularMovies => "/chart/moviemeter/".to_string(),
            Chart::TopTv => "/chart/toptv/".to_string(),
            Chart::PopularTv => "/chart/tvmeter/".to_string(),
            Chart::TopIndianMovies => "/india/top-rated-indian-movies/".to_string(),
            Chart::BoxOffice => "/chart/boxoffice/".to_string(),
            Chart::TopByGenres { genres, tv } => {
                let genres = genres
                    .iter()
                    .map(|g| urlencoding::encode(&g.trim().to_lowercase()).into_owned())
                    .collect::<Vec<_>>()
                    .join(",");
                let title_type = if *tv { "tv_series,tv_miniseries" } else { "feature" };
                format!(
                    "/search/title/?genres={}&title_type={}&sort=user_rating,desc&num_votes=25000,",
                    genres, title_type
                )
            }
            Chart::List(id) => format!("/list/ls{}/", id),
            Chart::Keyword(keyword) => format!(
                "/search/keyword/?keywords={}",
                urlencoding::encode(keyword.trim())
            ),
        }
    }
}

/// Where to look up cinema showtimes
///
/// An empty location lets IMDb pick one from the request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShowtimesLocation {
    /// ISO country code (e.g., "US")
    pub country: String,
    /// Postal code within the country (e.g., "10001")
    pub postal_code: String,
}

impl ShowtimesLocation {
    pub fn new(country: impl Into<String>, postal_code: impl Into<String>) -> Self {
        Self {
            country: country.into(),
            postal_code: postal_code.into(),
        }
    }

    /// Page path of the showtimes listing.
    pub fn path(&self) -> String {
        let country = self.country.trim();
        let postal = self.postal_code.trim();
        if country.is_empty() || postal.is_empty() {
            return "/showtimes/".to_string();
        }
        format!(
            "/showtimes/location/{}/{}/",
            urlencoding::encode(&country.to_uppercase()),
            urlencoding::encode(postal)
        )
    }
}

/// One cinema and what it is showing
#[derive(Debug, Clone, Serialize)]
pub struct CinemaShowtimes {
    /// Cinema name
    pub cinema: String,
    /// Street address, if listed
    pub address: Option<String>,
    /// Scheduled movies, never empty
    pub movies: Vec<ScheduledMovie>,
}

/// A movie scheduled at a cinema
#[derive(Debug, Clone, Serialize)]
pub struct ScheduledMovie {
    /// The movie being shown
    pub movie: Record,
    /// Start times as listed (e.g., "7:30 pm"), never empty
    pub showtimes: Vec<String>,
}
