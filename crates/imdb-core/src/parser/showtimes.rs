//! Showtimes parser for IMDb
//!
//! Parses the cinema showtimes listing: cinemas, their addresses and the
//! movies each one is scheduled to show with start times.

use scraper::Html;
use serde_json::{json, Value as JsonValue};

use crate::error::Result;

use super::{element_text, first_text, selector};

/// Parse a showtimes page into raw cinema entries.
///
/// Each entry has `cinema`, an optional `address` and `movies`, where a
/// movie carries `url`, `title` and its `showtimes`. Empty cinemas are kept
/// here; filtering is up to the caller.
pub fn parse_showtimes(html: &str) -> Result<Vec<JsonValue>> {
    let document = Html::parse_document(html);

    let cinema_selector = selector(
        "div[itemtype*='MovieTheater'], div.cinema, section[data-testid='cinema']",
    )?;
    let movie_selector = selector("div.list_item, li[data-testid='showtimes-title']")?;
    let link_selector = selector("a[href*='/title/tt']")?;
    let time_selector = selector(
        "div.showtimes a, div.showtimes span[itemprop='startDate'], [data-testid='showtime'], time",
    )?;

    let mut cinemas = Vec::new();
    for cinema in document.select(&cinema_selector) {
        let Some(name) = first_text(
            &cinema,
            &["[data-testid='cinema-name']", "h3 [itemprop='name']", "h3", "h2"],
        ) else {
            continue;
        };
        let address = first_text(
            &cinema,
            &["[itemprop='streetAddress']", ".address", "[data-testid='cinema-address']"],
        );

        let mut movies = Vec::new();
        for movie in cinema.select(&movie_selector) {
            let Some(link) = movie.select(&link_selector).find(|a| !element_text(a).is_empty()) else {
                continue;
            };
            let Some(url) = link.value().attr("href") else {
                continue;
            };
            let title = first_text(&movie, &["h4 [itemprop='name']", "h4"])
                .unwrap_or_else(|| element_text(&link));

            let mut times: Vec<String> = Vec::new();
            for time in movie.select(&time_selector) {
                for part in element_text(&time).split('|') {
                    let part = part.trim();
                    if !part.is_empty() && !times.iter().any(|t| t == part) {
                        times.push(part.to_string());
                    }
                }
            }
            movies.push(json!({ "url": url, "title": title, "showtimes": times }));
        }

        cinemas.push(json!({ "cinema": name, "address": address, "movies": movies }));
    }

    Ok(cinemas)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SHOWTIMES: &str = r##"
        <html><body>
          <div class="list detail" itemtype="http://schema.org/MovieTheater">
            <h3><a href="/showtimes/cinema/US/ci0001"><span itemprop="name">Regal Union Square</span></a></h3>
            <div class="address"><span itemprop="streetAddress">850 Broadway</span></div>
            <div class="list_item">
              <h4><a href="/showtimes/title/tt0133093/"><span itemprop="name">The Matrix</span></a></h4>
              <div class="showtimes"><a href="#">7:00 pm</a><a href="#">9:45 pm</a></div>
            </div>
            <div class="list_item">
              <h4><a href="/showtimes/title/tt0234215/">The Matrix Reloaded</a></h4>
              <div class="showtimes"></div>
            </div>
          </div>
          <div class="cinema" itemtype="http://schema.org/MovieTheater">
            <h3>Closed Cinema</h3>
          </div>
        </body></html>
    "##;

    #[test]
    fn test_parse_showtimes() {
        let cinemas = parse_showtimes(SHOWTIMES).unwrap();
        assert_eq!(cinemas.len(), 2);

        let regal = &cinemas[0];
        assert_eq!(regal["cinema"], "Regal Union Square");
        assert_eq!(regal["address"], "850 Broadway");
        assert_eq!(regal["movies"][0]["title"], "The Matrix");
        assert_eq!(regal["movies"][0]["url"], "/showtimes/title/tt0133093/");
        assert_eq!(regal["movies"][0]["showtimes"], json!(["7:00 pm", "9:45 pm"]));
        assert_eq!(regal["movies"][1]["showtimes"], json!([]));

        assert_eq!(cinemas[1]["movies"], json!([]));
        assert!(cinemas[1]["address"].is_null());
    }

    #[test]
    fn test_parse_showtimes_splits_piped_times() {
        let html = r#"
            <html><body><div class="cinema">
              <h3>Metrograph</h3>
              <div class="list_item">
                <a href="/title/tt0133093/">The Matrix</a>
                <div class="showtimes"><span itemprop="startDate">4:00 | 6:30 | 4:00</span></div>
              </div>
            </div></body></html>
        "#;
        let cinemas = parse_showtimes(html).unwrap();
        assert_eq!(cinemas[0]["movies"][0]["showtimes"], json!(["4:00", "6:30"]));
        assert_eq!(cinemas[0]["movies"][0]["title"], "The Matrix");
    }
}
