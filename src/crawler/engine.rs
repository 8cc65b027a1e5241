//! Crawl engine - entry point of a crawl
//!
//! The engine owns the worker pool, creates a fresh [`CrawlState`] for every
//! call to [`CrawlEngine::crawl`], runs one root task per seed and ranks the
//! aggregated word counts once every seed's subtree has finished.

use crate::clock::Clock;
use crate::config::compile_patterns;
use crate::crawler::result::{CrawlResult, WordCounts};
use crate::crawler::state::CrawlState;
use crate::crawler::task::{CrawlContext, CrawlTask};
use crate::parser::PageSource;
use crate::profiler::{Instrumented, Operation};
use crate::words::{PopularWordRanker, WordRanker};
use crate::{ConfigError, CrawlError, Result};
use regex::Regex;
use std::num::NonZeroUsize;
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::{Builder, Runtime};

/// Returns the number of threads the platform can run in parallel
pub fn max_parallelism() -> usize {
    std::thread::available_parallelism()
        .map(NonZeroUsize::get)
        .unwrap_or(1)
}

/// Engine-level crawl settings
#[derive(Debug, Clone)]
pub struct CrawlSettings {
    /// Hops allowed from a seed; zero means nothing is fetched
    pub max_depth: u32,

    /// Time budget, added to the clock's reading when a crawl starts
    pub timeout: Duration,

    /// Number of ranked words in the result
    pub popular_word_count: usize,

    /// Requested worker count, capped by [`max_parallelism`]
    pub parallelism: usize,

    /// Full-match patterns of URLs never to visit, set through
    /// [`CrawlSettings::with_ignored_urls`]
    pub(crate) ignored_urls: Vec<Regex>,
}

impl CrawlSettings {
    /// Creates settings with no ignored URLs and the platform's parallelism
    pub fn new(max_depth: u32, timeout: Duration, popular_word_count: usize) -> Self {
        Self {
            max_depth,
            timeout,
            popular_word_count,
            parallelism: max_parallelism(),
            ignored_urls: Vec::new(),
        }
    }

    pub fn with_parallelism(mut self, parallelism: usize) -> Self {
        self.parallelism = parallelism;
        self
    }

    /// Sets the URLs never to visit
    ///
    /// Each pattern is anchored on both ends, so it only excludes URLs it
    /// matches in full.
    ///
    /// # Returns
    ///
    /// * `Ok(CrawlSettings)` - Settings with the compiled patterns
    /// * `Err(ConfigError::InvalidPattern)` - A pattern failed to compile
    pub fn with_ignored_urls(
        mut self,
        patterns: &[String],
    ) -> std::result::Result<Self, ConfigError> {
        self.ignored_urls = compile_patterns(patterns)?;
        Ok(self)
    }
}

/// Parallel crawler running recursive crawl tasks on its own worker pool
///
/// The pool is built once per engine and reused by every crawl. `crawl` blocks
/// the calling thread, so it must not be called from inside an async runtime,
/// and the engine must not be dropped there either.
pub struct CrawlEngine {
    settings: Arc<CrawlSettings>,
    source: Arc<dyn PageSource>,
    ranker: Arc<dyn WordRanker>,
    clock: Arc<dyn Clock>,
    timeout: chrono::Duration,
    workers: usize,
    runtime: Runtime,
}

impl CrawlEngine {
    /// Creates an engine and its worker pool
    ///
    /// # Arguments
    ///
    /// * `settings` - Depth, timeout, ranking and parallelism settings
    /// * `source` - Where pages come from
    /// * `clock` - Time source for the deadline
    ///
    /// # Returns
    ///
    /// * `Ok(CrawlEngine)` - Ready to crawl
    /// * `Err(CrawlError::Config)` - Zero parallelism or an unrepresentable timeout
    /// * `Err(CrawlError::Io)` - The worker pool could not be started
    pub fn new(
        settings: CrawlSettings,
        source: Arc<dyn PageSource>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self> {
        if settings.parallelism < 1 {
            return Err(ConfigError::Validation(format!(
                "parallelism must be >= 1, got {}",
                settings.parallelism
            ))
            .into());
        }

        let out_of_range =
            || ConfigError::Validation(format!("timeout {:?} is out of range", settings.timeout));
        let timeout = chrono::Duration::from_std(settings.timeout).map_err(|_| out_of_range())?;
        clock
            .now()
            .checked_add_signed(timeout)
            .ok_or_else(out_of_range)?;

        let workers = settings.parallelism.min(max_parallelism());
        let runtime = Builder::new_multi_thread()
            .worker_threads(workers)
            .thread_name("wordcrawl-worker")
            .enable_all()
            .build()?;

        tracing::debug!(
            "Crawl engine ready with {} workers ({} requested)",
            workers,
            settings.parallelism
        );

        Ok(Self {
            settings: Arc::new(settings),
            source,
            ranker: Arc::new(PopularWordRanker),
            clock,
            timeout,
            workers,
            runtime,
        })
    }

    /// Replaces the word ranker
    pub fn with_ranker(mut self, ranker: Arc<dyn WordRanker>) -> Self {
        self.ranker = ranker;
        self
    }

    /// Number of worker threads in the pool
    pub fn parallelism(&self) -> usize {
        self.workers
    }

    pub fn settings(&self) -> &CrawlSettings {
        &self.settings
    }

    /// Crawls outward from `seeds`
    ///
    /// Seeds run one after another, each to completion, against one shared
    /// state: a page reachable from several seeds is fetched once.
    ///
    /// # Returns
    ///
    /// * `Ok(CrawlResult)` - Ranked words and the number of visited URLs
    /// * `Err(CrawlError)` - The first page that failed to fetch, which
    ///   aborts the rest of the crawl
    pub fn crawl(&self, seeds: &[String]) -> Result<CrawlResult> {
        let deadline = self
            .clock
            .now()
            .checked_add_signed(self.timeout)
            .ok_or_else(|| {
                ConfigError::Validation(format!(
                    "timeout {:?} overflows the deadline",
                    self.settings.timeout
                ))
            })?;
        let state = Arc::new(CrawlState::new());
        let context = Arc::new(CrawlContext {
            source: Arc::clone(&self.source),
            clock: Arc::clone(&self.clock),
            settings: Arc::clone(&self.settings),
            deadline,
            state: Arc::clone(&state),
        });

        tracing::info!(
            "Starting crawl of {} seeds (max depth {}, deadline {})",
            seeds.len(),
            self.settings.max_depth,
            deadline
        );

        for seed in seeds {
            let task = CrawlTask::new(seed.clone(), self.settings.max_depth, Arc::clone(&context));
            let fetched = self
                .runtime
                .block_on(async move { tokio::spawn(task.run()).await })
                .map_err(CrawlError::from)
                .and_then(|outcome| outcome)
                .map_err(|e| {
                    tracing::warn!("Crawl from {} aborted: {}", seed, e);
                    e
                })?;
            tracing::debug!("Seed {} finished (fetched: {})", seed, fetched);
        }

        let urls_visited = state.visited_count();
        let word_counts = if state.has_no_counts() {
            WordCounts::new()
        } else {
            self.ranker
                .rank(&state.counts_snapshot(), self.settings.popular_word_count)
        };

        tracing::info!(
            "Crawl finished: {} URLs visited, {} popular words",
            urls_visited,
            word_counts.len()
        );

        Ok(CrawlResult {
            word_counts,
            urls_visited,
        })
    }
}

impl Instrumented for CrawlEngine {
    const OPERATIONS: &'static [Operation] = &[
        Operation::profiled("crawl"),
        Operation::unmarked("parallelism"),
    ];
}
