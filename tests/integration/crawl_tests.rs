//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and test
//! the full crawl cycle end-to-end through the HTTP page source.

use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};
use wordcrawl::config::{compile_patterns, UserAgentConfig};
use wordcrawl::parser::build_http_client;
use wordcrawl::{
    CrawlEngine, CrawlError, CrawlResult, CrawlSettings, FetchError, HttpPageSource, SystemClock,
};

fn test_user_agent() -> UserAgentConfig {
    UserAgentConfig {
        crawler_name: "TestBot".to_string(),
        crawler_version: "1.0.0".to_string(),
        contact_url: "https://example.com/contact".to_string(),
    }
}

fn html(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(
        format!("<html><body>{}</body></html>", body),
        "text/html",
    )
}

/// Runs a crawl on a blocking thread; the engine owns its own worker pool
async fn run_crawl(
    settings: CrawlSettings,
    ignored_words: &[&str],
    seeds: Vec<String>,
) -> wordcrawl::Result<CrawlResult> {
    let ignored_words: Vec<String> = ignored_words.iter().map(|w| w.to_string()).collect();

    tokio::task::spawn_blocking(move || {
        let client = build_http_client(&test_user_agent()).expect("Failed to build client");
        let source = HttpPageSource::new(client, compile_patterns(&ignored_words)?);
        let engine = CrawlEngine::new(settings, Arc::new(source), Arc::new(SystemClock))?;
        engine.crawl(&seeds)
    })
    .await
    .expect("Crawl thread panicked")
}

fn settings(max_depth: u32) -> CrawlSettings {
    CrawlSettings::new(max_depth, Duration::from_secs(30), 10)
}

#[tokio::test(flavor = "multi_thread")]
async fn test_full_crawl_single_site() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html(
            r#"Rust crawler home
            <a href="/page1">Page 1</a>
            <a href="/page2">Page 2</a>"#,
        ))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/page1"))
        .respond_with(html(r#"rust everywhere <a href="/">Home</a>"#))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/page2"))
        .respond_with(html(r#"Rust <script>var hidden = 1;</script> <a href="/page1">again</a>"#))
        .expect(1)
        .mount(&mock_server)
        .await;

    let result = run_crawl(settings(3), &[], vec![format!("{}/", mock_server.uri())])
        .await
        .expect("Crawl failed");

    assert_eq!(result.urls_visited, 3);
    assert_eq!(result.word_counts.words()[0], "rust");
    assert_eq!(result.word_counts.get("rust"), Some(3));
    assert_eq!(result.word_counts.get("page"), Some(2));
    assert_eq!(result.word_counts.get("hidden"), None);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_user_agent_is_sent() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .and(header(
            "user-agent",
            "TestBot/1.0.0 (+https://example.com/contact)",
        ))
        .respond_with(html("identified"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let result = run_crawl(settings(1), &[], vec![format!("{}/", mock_server.uri())])
        .await
        .expect("Crawl failed");

    assert_eq!(result.word_counts.get("identified"), Some(1));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_ignored_words_are_not_counted() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html("The cat and the hat. A cat!"))
        .mount(&mock_server)
        .await;

    let result = run_crawl(
        settings(1),
        &["the", "a", "and"],
        vec![format!("{}/", mock_server.uri())],
    )
    .await
    .expect("Crawl failed");

    assert_eq!(result.word_counts.words(), vec!["cat", "hat"]);
    assert_eq!(result.word_counts.get("cat"), Some(2));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_non_html_page_is_visited_without_words() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html(r#"start <a href="/data.json">data</a>"#))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/data.json"))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw(r#"{"secret": "words"}"#, "application/json"),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let result = run_crawl(settings(2), &[], vec![format!("{}/", mock_server.uri())])
        .await
        .expect("Crawl failed");

    assert_eq!(result.urls_visited, 2);
    assert_eq!(result.word_counts.get("secret"), None);
    assert_eq!(result.word_counts.get("start"), Some(1));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_missing_page_aborts_the_crawl() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html(r#"<a href="/gone">gone</a>"#))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/gone"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;

    let result = run_crawl(settings(2), &[], vec![format!("{}/", mock_server.uri())]).await;

    assert!(matches!(
        result,
        Err(CrawlError::Fetch(FetchError::Status { status: 404, .. }))
    ));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_depth_one_does_not_follow_links() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html(r#"root <a href="/child">child</a>"#))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/child"))
        .respond_with(html("child"))
        .expect(0)
        .mount(&mock_server)
        .await;

    let result = run_crawl(settings(1), &[], vec![format!("{}/", mock_server.uri())])
        .await
        .expect("Crawl failed");

    assert_eq!(result.urls_visited, 1);
}

#[test]
fn test_crawl_local_files() {
    let dir = TempDir::new().unwrap();
    std::fs::write(
        dir.path().join("index.html"),
        r#"<html><body>local index <a href="other.html">other</a></body></html>"#,
    )
    .unwrap();
    std::fs::write(
        dir.path().join("other.html"),
        r#"<html><body>local page <a href="index.html">back</a></body></html>"#,
    )
    .unwrap();

    let seed = url::Url::from_file_path(dir.path().join("index.html"))
        .unwrap()
        .to_string();

    let client = build_http_client(&test_user_agent()).unwrap();
    let engine = CrawlEngine::new(
        settings(3),
        Arc::new(HttpPageSource::new(client, vec![])),
        Arc::new(SystemClock),
    )
    .unwrap();

    let result = engine.crawl(&[seed]).expect("Crawl failed");

    assert_eq!(result.urls_visited, 2);
    assert_eq!(result.word_counts.words()[0], "local");
    assert_eq!(result.word_counts.get("local"), Some(2));
}
