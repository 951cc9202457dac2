//! End-to-end tests of the scraper against fixture pages served by wiremock.

use imdb_core::{
    ClientConfig, ImdbClient, ImdbError, ImdbScraper, Kind, ShowtimesLocation, Value,
    KEYWORD_SEARCH_LIMIT,
};
use quick_xml::events::Event;
use quick_xml::Reader;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn scraper_for(server: &MockServer) -> ImdbScraper {
    let config = ClientConfig {
        base_url: server.uri(),
        requests_per_second: 100.0,
        timeout_secs: 5,
        max_retries: 0,
        retry_delay_ms: 1,
    };
    ImdbScraper::with_client(ImdbClient::with_config(config).unwrap())
}

async fn serve(server: &MockServer, page: &str, body: String) {
    Mock::given(method("GET"))
        .and(path(page))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(server)
        .await;
}

const MATRIX_PLOT: &str = r#"
<html><body>
  <div data-testid="sub-section-summaries"><ul>
    <li><div class="ipc-html-content-inner-div">Thomas A. Anderson is a man living two lives.—redcommander27</div></li>
  </ul></div>
  <div data-testid="sub-section-synopsis">
    <div class="ipc-html-content-inner-div">The screen is filled with green, cascading code which gives way to the title, The Matrix.</div>
  </div>
</body></html>
"#;

const NO_PLOT: &str = r#"
<html><body>
  <div data-testid="sub-section-summaries"><ul>
    <li><div class="ipc-html-content-inner-div">It looks like we don't have any plot summaries for this title yet.</div></li>
  </ul></div>
  <div data-testid="sub-section-synopsis">
    <div class="ipc-html-content-inner-div">It looks like we don't have a Synopsis for this title yet.</div>
  </div>
</body></html>
"#;

const MATRIX_MAIN: &str = r#"
<html><head><script type="application/ld+json">
{"@type": "Movie", "name": "The Matrix", "datePublished": "1999-03-31",
 "aggregateRating": {"ratingValue": 8.7, "ratingCount": 2100000},
 "genre": ["Action", "Sci-Fi"],
 "actor": [{"@type": "Person", "url": "https://www.imdb.com/name/nm0000206/", "name": "Keanu Reeves"}]}
</script></head><body></body></html>
"#;

const BREAKING_BAD_MAIN: &str = r#"
<html><head><script type="application/ld+json">
{"@type": "TVSeries", "name": "Breaking Bad", "datePublished": "2008-01-20"}
</script></head><body></body></html>
"#;

const BREAKING_BAD_PLOT: &str = r#"
<html><body>
  <div data-testid="sub-section-summaries"><ul>
    <li><div class="ipc-html-content-inner-div">A chemistry teacher diagnosed with cancer turns to manufacturing methamphetamine.</div></li>
  </ul></div>
</body></html>
"#;

const KEANU_FILMOGRAPHY: &str = r#"
<html><head><script type="application/ld+json">
{"@type": "Person", "name": "Keanu Reeves", "birthDate": "1964-09-02"}
</script></head><body><div id="filmography">
  <div class="filmo-row odd" id="actor-tt0133093">
    <span class="year_column">1999</span><b><a href="/title/tt0133093/">The Matrix</a></b><br/>Neo
  </div>
  <div class="filmo-row even" id="actor-tt0234215">
    <span class="year_column">2003</span><b><a href="/title/tt0234215/">The Matrix Reloaded</a></b><br/>Neo
  </div>
</div></body></html>
"#;

fn keyword_page(count: usize) -> String {
    let links: String = (0..count)
        .map(|i| {
            format!(
                "<li><a href=\"/search/keyword/?keywords=computer-{i}\">computer {i}</a></li>\n"
            )
        })
        .collect();
    format!("<html><body><ul>{}</ul></body></html>", links)
}

fn chart_page(titles: &[(&str, &str)]) -> String {
    let items: String = titles
        .iter()
        .enumerate()
        .map(|(i, (id, title))| {
            format!(
                "<li class=\"ipc-metadata-list-summary-item\">\
                 <a class=\"ipc-title-link-wrapper\" href=\"/title/tt{id}/\"><h3 class=\"ipc-title__text\">{}. {title}</h3></a>\
                 <span class=\"cli-title-metadata-item\">1994</span>\
                 <span class=\"ipc-rating-star--rating\">9.0</span>\
                 </li>",
                i + 1
            )
        })
        .collect();
    format!("<html><body><ul>{}</ul></body></html>", items)
}

#[tokio::test]
async fn test_plot_and_synopsis_of_the_matrix() {
    let server = MockServer::start().await;
    serve(&server, "/title/tt0133093/plotsummary/", MATRIX_PLOT.to_string()).await;
    let scraper = scraper_for(&server);

    let movie = scraper.get_movie("0133093", &["plot"]).await.unwrap();

    let synopsis = movie.get("synopsis").and_then(Value::as_list).unwrap();
    assert!(!synopsis.is_empty());
    let plot = movie.get("plot").and_then(Value::as_list).unwrap();
    assert_eq!(plot[0].as_str(), Some("Thomas A. Anderson is a man living two lives."));
    assert!(!movie.contains_key("title"));
}

#[tokio::test]
async fn test_plotless_title_omits_plot() {
    let server = MockServer::start().await;
    serve(&server, "/title/tt1863157/plotsummary/", NO_PLOT.to_string()).await;
    let scraper = scraper_for(&server);

    let movie = scraper.get_movie("1863157", &["plot"]).await.unwrap();
    assert!(!movie.contains_key("plot"));
    assert!(!movie.contains_key("synopsis"));
}

#[tokio::test]
async fn test_keyword_search_is_capped() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/find/"))
        .and(query_param("q", "computer"))
        .and(query_param("s", "kw"))
        .respond_with(ResponseTemplate::new(200).set_body_string(keyword_page(260)))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/find/"))
        .and(query_param("q", "zxqvwk"))
        .respond_with(ResponseTemplate::new(200).set_body_string(keyword_page(0)))
        .mount(&server)
        .await;
    let scraper = scraper_for(&server);

    let keywords = scraper.search_keyword("computer").await.unwrap();
    assert_eq!(keywords.len(), KEYWORD_SEARCH_LIMIT);
    assert_eq!(keywords[0], "computer-0");

    let none = scraper.search_keyword("zxqvwk").await.unwrap();
    assert!(none.is_empty());
}

#[tokio::test]
async fn test_missing_title_is_not_found() {
    let server = MockServer::start().await;
    let scraper = scraper_for(&server);

    let err = scraper.get_movie("0000001", &["main"]).await.unwrap_err();
    assert!(err.is_not_found());
    assert!(!err.is_retrieval_failure());
}

#[tokio::test]
async fn test_series_kind_does_not_depend_on_categories() {
    let server = MockServer::start().await;
    serve(&server, "/title/tt0903747/", BREAKING_BAD_MAIN.to_string()).await;
    serve(&server, "/title/tt0903747/plotsummary/", BREAKING_BAD_PLOT.to_string()).await;
    let scraper = scraper_for(&server);

    let mut by_main = scraper.get_movie("0903747", &["main"]).await.unwrap();
    let by_plot = scraper.get_movie("tt0903747", &["plot"]).await.unwrap();

    assert_eq!(by_main.kind(), Kind::TvSeries);
    assert_eq!(by_plot.kind(), Kind::TvSeries);
    assert_eq!(by_main, by_plot);

    by_main.merge(by_plot).unwrap();
    assert_eq!(by_main.get_str("title"), Some("Breaking Bad"));
    assert!(by_main.contains_key("plot"));
}

#[tokio::test]
async fn test_person_with_only_title_categories_is_not_found() {
    let server = MockServer::start().await;
    let scraper = scraper_for(&server);

    let err = scraper.get_person("nm9999999", &["plot"]).await.unwrap_err();
    assert!(err.is_not_found());

    let err = scraper.get_movie("nm0000206", &["main"]).await.unwrap_err();
    assert!(matches!(err, ImdbError::InvalidId(_)));
}

#[tokio::test]
async fn test_missing_list_is_empty() {
    let server = MockServer::start().await;
    let scraper = scraper_for(&server);

    let list = scraper.get_list("ls000000001").await.unwrap();
    assert!(list.is_empty());
}

#[tokio::test]
async fn test_server_error_is_retrieval_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/chart/top/"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    let scraper = scraper_for(&server);

    let err = scraper.top_movies().await.unwrap_err();
    assert!(matches!(err, ImdbError::HttpError(_)));
    assert!(err.is_retrieval_failure());
}

#[tokio::test]
async fn test_top_chart_ranks() {
    let server = MockServer::start().await;
    let page = chart_page(&[
        ("0111161", "The Shawshank Redemption"),
        ("0068646", "The Godfather"),
        ("0468569", "The Dark Knight"),
    ]);
    serve(&server, "/chart/top/", page).await;
    let scraper = scraper_for(&server);

    let top = scraper.top_movies().await.unwrap();
    let ranks: Vec<i64> = top
        .iter()
        .filter_map(|r| r.get("rank").and_then(Value::as_int))
        .collect();
    assert_eq!(ranks, vec![1, 2, 3]);
    assert_eq!(top[1].get_str("title"), Some("The Godfather"));
    assert_eq!(top[0].get("year"), Some(&Value::Int(1994)));
    assert_eq!(top[0].get("rating"), Some(&Value::Float(9.0)));
}

#[tokio::test]
async fn test_markup_of_non_ascii_title_parses() {
    let server = MockServer::start().await;
    let page = r#"
        <html><head><script type="application/ld+json">
        {"@type": "Movie", "name": "Le fabuleux destin d'Amélie Poulain & «Co»", "genre": "Comedy"}
        </script></head><body></body></html>
    "#;
    serve(&server, "/title/tt0211915/", page.to_string()).await;
    let scraper = scraper_for(&server);

    let movie = scraper.get_movie("0211915", &["main"]).await.unwrap();
    let xml = movie.to_markup().unwrap();

    let mut reader = Reader::from_str(&xml);
    reader.config_mut().trim_text(true);
    let mut texts = Vec::new();
    loop {
        match reader.read_event() {
            Ok(Event::Text(e)) => texts.push(e.unescape().unwrap().to_string()),
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => panic!("markup did not parse: {e}\n{xml}"),
        }
    }
    assert!(texts.contains(&"Le fabuleux destin d'Amélie Poulain & «Co»".to_string()));
}

#[tokio::test]
async fn test_cast_and_filmography_cross_reference() {
    let server = MockServer::start().await;
    serve(&server, "/title/tt0133093/", MATRIX_MAIN.to_string()).await;
    Mock::given(method("GET"))
        .and(path("/name/nm0000206/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(KEANU_FILMOGRAPHY))
        .expect(1)
        .mount(&server)
        .await;
    let scraper = scraper_for(&server);

    let movie = scraper.get_movie("0133093", &["main"]).await.unwrap();
    let person = scraper
        .get_person("nm0000206", &["main", "filmography"])
        .await
        .unwrap();

    assert_eq!(person.get_str("name"), Some("Keanu Reeves"));
    assert!(movie.contains_reference(&person));
    assert!(person.contains_reference(&movie));

    // The cast entry and the independently fetched person are the same entity
    let cast = movie.get("cast").and_then(Value::as_list).unwrap();
    assert_eq!(cast[0].as_record(), Some(&person));
}

#[tokio::test]
async fn test_search_movie_results() {
    let server = MockServer::start().await;
    let page = r#"
        <html><body><ul>
          <li class="ipc-metadata-list-summary-item find-result-item">
            <a class="ipc-metadata-list-summary-item__t" href="/title/tt0133093/">The Matrix</a>
            <ul><li>1999</li></ul>
          </li>
          <li class="ipc-metadata-list-summary-item find-result-item">
            <a class="ipc-metadata-list-summary-item__t" href="/title/tt0106062/">Matrix</a>
            <ul><li>1993</li><li>TV Series</li></ul>
          </li>
        </ul></body></html>
    "#;
    Mock::given(method("GET"))
        .and(path("/find/"))
        .and(query_param("q", "the matrix"))
        .and(query_param("s", "tt"))
        .respond_with(ResponseTemplate::new(200).set_body_string(page))
        .mount(&server)
        .await;
    let scraper = scraper_for(&server);

    let results = scraper.search_movie(" the matrix ").await.unwrap();
    assert_eq!(results.len(), 2);
    assert_eq!(results[0].get("year"), Some(&Value::Int(1999)));
    assert_eq!(results[1].kind(), Kind::TvSeries);
    assert!(results.iter().all(|r| !r.contains_key("rank")));
}

#[tokio::test]
async fn test_showtimes_for_location() {
    let server = MockServer::start().await;
    let page = r##"
        <html><body>
          <div class="cinema" itemtype="http://schema.org/MovieTheater">
            <h3><span itemprop="name">Regal Union Square</span></h3>
            <div class="list_item">
              <h4><a href="/showtimes/title/tt0133093/">The Matrix</a></h4>
              <div class="showtimes"><a href="#">7:00 pm</a></div>
            </div>
          </div>
          <div class="cinema"><h3>Empty Cinema</h3></div>
        </body></html>
    "##;
    serve(&server, "/showtimes/location/US/10001/", page.to_string()).await;
    let scraper = scraper_for(&server);

    let cinemas = scraper
        .get_showtimes(&ShowtimesLocation::new("US", "10001"))
        .await
        .unwrap();
    assert_eq!(cinemas.len(), 1);
    assert_eq!(cinemas[0].cinema, "Regal Union Square");
    assert_eq!(cinemas[0].movies[0].movie.id().as_str(), "0133093");
    assert_eq!(cinemas[0].movies[0].showtimes, vec!["7:00 pm".to_string()]);
}
