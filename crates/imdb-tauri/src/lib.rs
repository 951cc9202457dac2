//! IMDb Scraper Tauri Integration
//!
//! This crate provides Tauri commands for integrating the IMDb scraper
//! into Tauri 2.0 applications.
//!
//! # Usage
//!
//! ```rust,ignore
//! use imdb_tauri::ScraperState;
//! use tauri::Manager;
//!
//! fn main() {
//!     tauri::Builder::default()
//!         .setup(|app| {
//!             app.manage(ScraperState::new()?);
//!             Ok(())
//!         })
//!         .invoke_handler(tauri::generate_handler![
//!             imdb_tauri::commands::get_movie,
//!             imdb_tauri::commands::get_person,
//!             imdb_tauri::commands::get_company,
//!             imdb_tauri::commands::search_movie,
//!             imdb_tauri::commands::search_person,
//!             imdb_tauri::commands::search_keyword,
//!             imdb_tauri::commands::top_movies,
//!             imdb_tauri::commands::get_list,
//!             imdb_tauri::commands::get_showtimes,
//!         ])
//!         .run(tauri::generate_context!())
//!         .expect("error while running tauri application");
//! }
//! ```
//!
//! # Commands
//! - `get_movie` / `get_person` / `get_company` - Fetch a record with info categories
//! - `search_movie` / `search_person` - Search by title or name
//! - `search_keyword` - Keyword names matching a term
//! - `top_movies` - Top 250 chart
//! - `get_list` - A user list
//! - `get_showtimes` - Cinema showtimes for a location

pub mod commands;

use std::sync::Arc;

use imdb_core::{ClientConfig, ImdbClient, ImdbScraper};

/// Shared ImdbScraper for Tauri commands.
///
/// The scraper is callable concurrently through a shared reference, so
/// commands run in parallel; the client's rate limiter still spaces out
/// the requests they make.
///
/// # Example
/// ```rust,ignore
/// use imdb_tauri::ScraperState;
/// use tauri::Manager;
///
/// tauri::Builder::default()
///     .setup(|app| {
///         app.manage(ScraperState::new()?);
///         Ok(())
///     })
/// ```
pub struct ScraperState {
    scraper: Arc<ImdbScraper>,
}

impl ScraperState {
    /// Create a new ScraperState with default configuration.
    ///
    /// # Errors
    /// Returns an error string if the scraper cannot be created.
    pub fn new() -> Result<Self, String> {
        let scraper = ImdbScraper::new().map_err(|e| e.to_string())?;
        Ok(Self {
            scraper: Arc::new(scraper),
        })
    }

    /// Create a ScraperState with a custom client configuration.
    pub fn with_config(config: ClientConfig) -> Result<Self, String> {
        let client = ImdbClient::with_config(config).map_err(|e| e.to_string())?;
        Ok(Self {
            scraper: Arc::new(ImdbScraper::with_client(client)),
        })
    }

    /// Get a reference to the inner scraper.
    pub fn scraper(&self) -> &Arc<ImdbScraper> {
        &self.scraper
    }
}
