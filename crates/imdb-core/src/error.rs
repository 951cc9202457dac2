//! Error types for IMDb Scraper
//!
//! This module defines all error types used throughout the library.
//! ImdbError implements Serialize for Tauri compatibility.
//!
//! Errors fall into three groups:
//! - "not found": the identifier has no page (`NotFound`)
//! - retrieval failures: the page could not be fetched or understood
//! - caller mistakes: bad identifiers, empty queries, mismatched merges

use serde::{Serialize, Serializer};
use thiserror::Error;

/// Error type for IMDb Scraper operations
#[derive(Error, Debug)]
pub enum ImdbError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    /// Failed to parse page content
    #[error("Failed to parse page: {0}")]
    ParseError(String),

    /// Required HTML element was not found
    #[error("Element not found: {0}")]
    ElementNotFound(String),

    /// Invalid URL or query
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Rate limited by the server (HTTP 429)
    #[error("Rate limited - too many requests")]
    RateLimited,

    /// Requested resource was not found (HTTP 404)
    #[error("Not found: {0}")]
    NotFound(String),

    /// Identifier is not a valid IMDb id
    #[error("Invalid IMDb ID: {0}")]
    InvalidId(String),

    /// Tried to merge two records that describe different entities
    #[error("Cannot merge {found} into {expected}")]
    IdentityMismatch { expected: String, found: String },

    /// Markup export failed
    #[error("Markup export failed: {0}")]
    Markup(String),
}

impl ImdbError {
    /// True when the entity or page does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self, ImdbError::NotFound(_))
    }

    /// True when the source could not be fetched or understood.
    ///
    /// These are never folded into empty results.
    pub fn is_retrieval_failure(&self) -> bool {
        matches!(
            self,
            ImdbError::HttpError(_)
                | ImdbError::ParseError(_)
                | ImdbError::ElementNotFound(_)
                | ImdbError::RateLimited
        )
    }
}

/// Serialize ImdbError as a string for Tauri compatibility
impl Serialize for ImdbError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

/// Result type alias for IMDb Scraper operations
pub type Result<T> = std::result::Result<T, ImdbError>;
