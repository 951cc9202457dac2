//! Tauri commands for IMDb Scraper
//!
//! This module contains all Tauri commands that can be invoked from the frontend.
//! Records are returned as `{ kind, id, attributes }` objects.

use tauri::State;

use crate::ScraperState;
use imdb_core::{CinemaShowtimes, Record, ShowtimesLocation};

fn as_strs(categories: &[String]) -> Vec<&str> {
    categories.iter().map(String::as_str).collect()
}

/// Get a movie or tv-series.
///
/// # Arguments
/// * `id` - IMDb title id (e.g., "tt0133093")
/// * `categories` - Info category names (e.g., ["main", "plot"]); empty means main
///
/// # Returns
/// * `Ok(Record)` with the requested information
/// * `Err(String)` with error message if retrieval fails
#[tauri::command]
pub async fn get_movie(
    state: State<'_, ScraperState>,
    id: String,
    categories: Vec<String>,
) -> Result<Record, String> {
    state
        .scraper()
        .get_movie(&id, &as_strs(&categories))
        .await
        .map_err(|e| e.to_string())
}

/// Get a person.
#[tauri::command]
pub async fn get_person(
    state: State<'_, ScraperState>,
    id: String,
    categories: Vec<String>,
) -> Result<Record, String> {
    state
        .scraper()
        .get_person(&id, &as_strs(&categories))
        .await
        .map_err(|e| e.to_string())
}

/// Get a company.
#[tauri::command]
pub async fn get_company(
    state: State<'_, ScraperState>,
    id: String,
    categories: Vec<String>,
) -> Result<Record, String> {
    state
        .scraper()
        .get_company(&id, &as_strs(&categories))
        .await
        .map_err(|e| e.to_string())
}

/// Search movies and tv shows by title.
///
/// # Returns
/// * `Ok(Vec<Record>)` with matching titles in relevance order
/// * `Err(String)` with error message if the query is empty or search fails
#[tauri::command]
pub async fn search_movie(
    state: State<'_, ScraperState>,
    query: String,
) -> Result<Vec<Record>, String> {
    state
        .scraper()
        .search_movie(&query)
        .await
        .map_err(|e| e.to_string())
}

/// Search people by name.
#[tauri::command]
pub async fn search_person(
    state: State<'_, ScraperState>,
    query: String,
) -> Result<Vec<Record>, String> {
    state
        .scraper()
        .search_person(&query)
        .await
        .map_err(|e| e.to_string())
}

/// Search keyword names.
#[tauri::command]
pub async fn search_keyword(
    state: State<'_, ScraperState>,
    query: String,
) -> Result<Vec<String>, String> {
    state
        .scraper()
        .search_keyword(&query)
        .await
        .map_err(|e| e.to_string())
}

/// Get the top 250 movies, ranked.
#[tauri::command]
pub async fn top_movies(state: State<'_, ScraperState>) -> Result<Vec<Record>, String> {
    state.scraper().top_movies().await.map_err(|e| e.to_string())
}

/// Get the titles of a user list, ranked.
///
/// # Arguments
/// * `list_id` - IMDb list id (e.g., "ls055592025")
#[tauri::command]
pub async fn get_list(
    state: State<'_, ScraperState>,
    list_id: String,
) -> Result<Vec<Record>, String> {
    state
        .scraper()
        .get_list(&list_id)
        .await
        .map_err(|e| e.to_string())
}

/// Get cinema showtimes.
///
/// # Arguments
/// * `country` - ISO country code; empty lets IMDb pick a location
/// * `postal_code` - Postal code within the country
#[tauri::command]
pub async fn get_showtimes(
    state: State<'_, ScraperState>,
    country: String,
    postal_code: String,
) -> Result<Vec<CinemaShowtimes>, String> {
    let location = ShowtimesLocation::new(country, postal_code);
    state
        .scraper()
        .get_showtimes(&location)
        .await
        .map_err(|e| e.to_string())
}
