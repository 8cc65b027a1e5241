//! Page sources
//!
//! A [`PageSource`] turns a URL into the words and links of that page. The
//! crawler only ever talks to this trait; [`HttpPageSource`] is the
//! implementation used by the binary.

mod fetch;
mod html;

pub use fetch::{build_http_client, HttpPageSource};
pub use html::parse_html;

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;

/// Words and outbound links of a single page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedPage {
    /// Occurrences of each word on the page
    pub word_counts: HashMap<String, u64>,

    /// Absolute URLs linked from the page, in document order
    pub links: Vec<String>,
}

/// Fetches and parses pages
///
/// Implementations must be shareable across the crawl's worker threads.
/// Failures are returned as `CrawlError::Fetch` for fetch or parse problems.
#[async_trait]
pub trait PageSource: Send + Sync {
    /// Fetches `url` and returns its word counts and links
    async fn parse(&self, url: &str) -> crate::Result<ParsedPage>;
}

#[async_trait]
impl<S: PageSource + ?Sized> PageSource for Arc<S> {
    async fn parse(&self, url: &str) -> crate::Result<ParsedPage> {
        (**self).parse(url).await
    }
}
