//! Crawler module for parallel, depth-limited crawling
//!
//! This module contains the core crawling logic:
//! - The engine owning the worker pool and assembling results
//! - Recursive crawl tasks and their entry checks
//! - Shared, concurrently updated crawl state

mod engine;
mod result;
mod state;
mod task;

pub use engine::{max_parallelism, CrawlEngine, CrawlSettings};
pub use result::{CrawlResult, WordCounts};
pub use state::CrawlState;
pub use task::{evaluate_entry, CrawlContext, CrawlFuture, CrawlTask, SkipReason};
