//! Shared state of a single crawl
//!
//! One [`CrawlState`] is created per `CrawlEngine::crawl` call and shared by
//! every task of that call. Both halves are sharded concurrent structures, so
//! tasks never take a crate-level lock.

use dashmap::{DashMap, DashSet};
use std::collections::HashMap;

/// Visited URLs and aggregated word counts for one crawl invocation
#[derive(Debug, Default)]
pub struct CrawlState {
    /// URLs admitted for fetching; never shrinks
    visited: DashSet<String>,

    /// Sum of per-page word counts over every admitted page
    counts: DashMap<String, u64>,
}

impl CrawlState {
    /// Creates an empty state
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if the URL has already been admitted
    pub fn is_visited(&self, url: &str) -> bool {
        self.visited.contains(url)
    }

    /// Admits a URL for fetching
    ///
    /// The containment test and the insert happen under one shard lock, so of
    /// any number of concurrent callers for the same URL exactly one gets
    /// `true`.
    ///
    /// # Returns
    ///
    /// * `true` - The caller won and must fetch the URL
    /// * `false` - The URL was already admitted by someone else
    pub fn try_visit(&self, url: &str) -> bool {
        self.visited.insert(url.to_string())
    }

    /// Adds a page's word counts to the running totals
    pub fn merge_counts(&self, page_counts: &HashMap<String, u64>) {
        for (word, count) in page_counts {
            *self.counts.entry(word.clone()).or_insert(0) += *count;
        }
    }

    /// Number of URLs admitted so far
    pub fn visited_count(&self) -> usize {
        self.visited.len()
    }

    /// Returns true if no word has been counted yet
    pub fn has_no_counts(&self) -> bool {
        self.counts.is_empty()
    }

    /// Copies the current totals into a plain map
    pub fn counts_snapshot(&self) -> HashMap<String, u64> {
        self.counts
            .iter()
            .map(|entry| (entry.key().clone(), *entry.value()))
            .collect()
    }
}
