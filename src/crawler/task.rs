//! Recursive crawl tasks
//!
//! A [`CrawlTask`] is one URL at one remaining depth. Running it either
//! short-circuits at the entry check or fetches the page, merges its words and
//! runs one child task per outbound link, returning only once the whole
//! subtree has finished.

use crate::clock::Clock;
use crate::crawler::engine::CrawlSettings;
use crate::crawler::state::CrawlState;
use crate::parser::PageSource;
use crate::Result;
use chrono::{DateTime, Utc};
use regex::Regex;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use tokio::task::JoinSet;

/// Boxed future of a task's subtree; resolves to whether the task's own URL was fetched
pub type CrawlFuture = Pin<Box<dyn Future<Output = Result<bool>> + Send + 'static>>;

/// Why a task stopped at its entry check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// No hops left
    DepthExhausted,
    /// The crawl deadline has passed
    DeadlinePassed,
    /// The URL fully matches an ignored pattern
    Ignored,
    /// The URL was already admitted in this crawl
    AlreadyVisited,
}

/// Runs the entry checks of a task, in order
///
/// The checks short-circuit on the first match. This function only reads the
/// state; admitting the URL is a separate atomic step
/// (`CrawlState::try_visit`).
///
/// # Returns
///
/// * `Some(SkipReason)` - The task must stop without fetching
/// * `None` - The task may try to admit its URL
pub fn evaluate_entry(
    url: &str,
    remaining_depth: u32,
    now: DateTime<Utc>,
    deadline: DateTime<Utc>,
    ignored_urls: &[Regex],
    state: &CrawlState,
) -> Option<SkipReason> {
    if remaining_depth == 0 {
        return Some(SkipReason::DepthExhausted);
    }

    if now > deadline {
        return Some(SkipReason::DeadlinePassed);
    }

    if ignored_urls.iter().any(|pattern| pattern.is_match(url)) {
        return Some(SkipReason::Ignored);
    }

    if state.is_visited(url) {
        return Some(SkipReason::AlreadyVisited);
    }

    None
}

/// Everything a crawl's tasks share; fixed once the crawl starts
pub struct CrawlContext {
    pub source: Arc<dyn PageSource>,
    pub clock: Arc<dyn Clock>,
    pub settings: Arc<CrawlSettings>,
    pub deadline: DateTime<Utc>,
    pub state: Arc<CrawlState>,
}

/// One unit of recursive crawl work
#[derive(Clone)]
pub struct CrawlTask {
    url: String,
    remaining_depth: u32,
    context: Arc<CrawlContext>,
}

impl CrawlTask {
    /// Creates a task for `url` with `remaining_depth` hops left
    pub fn new(url: impl Into<String>, remaining_depth: u32, context: Arc<CrawlContext>) -> Self {
        Self {
            url: url.into(),
            remaining_depth,
            context,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn remaining_depth(&self) -> u32 {
        self.remaining_depth
    }

    /// Task for a link found on this task's page
    fn child(&self, link: String) -> Self {
        Self {
            url: link,
            remaining_depth: self.remaining_depth.saturating_sub(1),
            context: Arc::clone(&self.context),
        }
    }

    /// Runs the task and its whole subtree
    ///
    /// The first failure anywhere in the subtree is returned; sibling subtrees
    /// still in flight are aborted.
    pub fn run(self) -> CrawlFuture {
        Box::pin(self.compute())
    }

    async fn compute(self) -> Result<bool> {
        let context = &self.context;

        if let Some(reason) = evaluate_entry(
            &self.url,
            self.remaining_depth,
            context.clock.now(),
            context.deadline,
            &context.settings.ignored_urls,
            &context.state,
        ) {
            tracing::trace!("Skipping {}: {:?}", self.url, reason);
            return Ok(false);
        }

        if !context.state.try_visit(&self.url) {
            tracing::trace!("Skipping {}: {:?}", self.url, SkipReason::AlreadyVisited);
            return Ok(false);
        }

        tracing::debug!("Fetching {} (depth left {})", self.url, self.remaining_depth);
        let page = context.source.parse(&self.url).await?;
        context.state.merge_counts(&page.word_counts);

        let mut children = JoinSet::new();
        for link in page.links {
            children.spawn(self.child(link).run());
        }

        while let Some(joined) = children.join_next().await {
            joined??;
        }

        Ok(true)
    }
}
