//! Wordcrawl: a bounded, time-boxed parallel word crawler
//!
//! This crate crawls outward from a set of seed URLs up to a depth limit or a
//! deadline, never fetching a page twice, and aggregates word counts across
//! every page it visits. A separate profiling layer times marked operations on
//! wrapped objects and accumulates the totals in a shared ledger.

pub mod clock;
pub mod config;
pub mod crawler;
pub mod output;
pub mod parser;
pub mod profiler;
pub mod words;

use thiserror::Error;

/// Main error type for crawl operations
#[derive(Debug, Error)]
pub enum CrawlError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    /// Failures of the crawler's own machinery, never of a wrapped operation
    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Crawl task panicked: {0}")]
    TaskPanicked(#[from] tokio::task::JoinError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Invalid pattern: {0}")]
    InvalidPattern(String),
}

/// Errors raised by a page source while fetching or parsing a single URL
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Failed to parse URL {url}: {source}")]
    InvalidUrl {
        url: String,
        source: ::url::ParseError,
    },

    #[error("Unsupported URL scheme for {url}")]
    UnsupportedScheme { url: String },

    #[error("HTTP error for {url}: {source}")]
    Http { url: String, source: reqwest::Error },

    #[error("HTTP {status} for {url}")]
    Status { url: String, status: u16 },

    #[error("Failed to read {url}: {source}")]
    Io { url: String, source: std::io::Error },
}

/// Profiling-specific errors
#[derive(Debug, Error)]
pub enum ProfilerError {
    #[error("Operation {operation} is not declared by {type_name}")]
    Dispatch {
        type_name: &'static str,
        operation: &'static str,
    },

    #[error("{type_name} does not declare any profiled operations")]
    NoProfiledOperations { type_name: &'static str },

    #[error("Failed to write profiling data: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for crawl operations
pub type Result<T> = std::result::Result<T, CrawlError>;

// Re-export commonly used types
pub use clock::{Clock, FakeClock, SystemClock};
pub use config::Config;
pub use crawler::{CrawlEngine, CrawlResult, CrawlSettings, WordCounts};
pub use parser::{HttpPageSource, PageSource, ParsedPage};
pub use profiler::{Instrumented, Operation, Profiler, TimingInterceptor, TimingLedger};
pub use words::{PopularWordRanker, WordRanker};
