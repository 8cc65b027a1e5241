//! HTTP and local file page source
//!
//! This module handles fetching page bodies for the crawler, including:
//! - Building HTTP clients with proper user agent strings
//! - GET requests for `http`/`https` URLs
//! - Reading `file:` URLs from disk
//! - Error classification into `FetchError`

use crate::config::UserAgentConfig;
use crate::parser::html::parse_html;
use crate::parser::{PageSource, ParsedPage};
use crate::profiler::{Instrumented, Operation};
use crate::FetchError;
use async_trait::async_trait;
use regex::Regex;
use reqwest::Client;
use std::time::Duration;
use url::Url;

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `config` - The user agent configuration
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
///
/// # Example
///
/// ```no_run
/// use wordcrawl::config::UserAgentConfig;
/// use wordcrawl::parser::build_http_client;
///
/// let config = UserAgentConfig {
///     crawler_name: "wordcrawl".to_string(),
///     crawler_version: "0.1".to_string(),
///     contact_url: "https://example.com/about".to_string(),
/// };
///
/// let client = build_http_client(&config).unwrap();
/// ```
pub fn build_http_client(config: &UserAgentConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.header_value())
        .timeout(Duration::from_secs(30))
        .connect_timeout(Duration::from_secs(10))
        .redirect(reqwest::redirect::Policy::limited(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Page source that downloads pages over HTTP(S) or reads them from disk
#[derive(Debug, Clone)]
pub struct HttpPageSource {
    client: Client,
    ignored_words: Vec<Regex>,
}

impl HttpPageSource {
    /// Creates a page source from an HTTP client
    ///
    /// # Arguments
    ///
    /// * `client` - The HTTP client to use
    /// * `ignored_words` - Full-match patterns of words not to count
    pub fn new(client: Client, ignored_words: Vec<Regex>) -> Self {
        Self {
            client,
            ignored_words,
        }
    }

    /// Fetches the raw body of a page
    ///
    /// Non-HTML HTTP responses yield `None`: they are visited but contribute
    /// no words and no links.
    async fn fetch_body(&self, url: &Url) -> Result<Option<String>, FetchError> {
        match url.scheme() {
            "http" | "https" => self.fetch_http(url).await,
            "file" => {
                let path = url
                    .to_file_path()
                    .map_err(|_| FetchError::UnsupportedScheme {
                        url: url.to_string(),
                    })?;
                let body = tokio::fs::read_to_string(&path)
                    .await
                    .map_err(|source| FetchError::Io {
                        url: url.to_string(),
                        source,
                    })?;
                Ok(Some(body))
            }
            _ => Err(FetchError::UnsupportedScheme {
                url: url.to_string(),
            }),
        }
    }

    async fn fetch_http(&self, url: &Url) -> Result<Option<String>, FetchError> {
        let http_error = |source| FetchError::Http {
            url: url.to_string(),
            source,
        };

        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(http_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        // Check Content-Type; a missing header is treated as HTML
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("text/html")
            .to_string();

        if !content_type.contains("html") {
            tracing::debug!("Skipping body of {} ({})", url, content_type);
            return Ok(None);
        }

        response.text().await.map(Some).map_err(http_error)
    }
}

#[async_trait]
impl PageSource for HttpPageSource {
    async fn parse(&self, url: &str) -> crate::Result<ParsedPage> {
        let parsed_url = Url::parse(url).map_err(|source| FetchError::InvalidUrl {
            url: url.to_string(),
            source,
        })?;

        let page = match self.fetch_body(&parsed_url).await? {
            Some(body) => parse_html(&body, &parsed_url, &self.ignored_words),
            None => ParsedPage::default(),
        };

        tracing::debug!(
            "Parsed {}: {} distinct words, {} links",
            url,
            page.word_counts.len(),
            page.links.len()
        );

        Ok(page)
    }
}

impl Instrumented for HttpPageSource {
    const OPERATIONS: &'static [Operation] = &[Operation::profiled("parse")];
}
