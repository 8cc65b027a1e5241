//! Integration tests for Wordcrawl
//!
//! `engine_tests` drives the engine against a scripted in-memory page source,
//! `crawl_tests` runs full crawls against wiremock servers and
//! `profiler_tests` covers timing a crawl end to end.

mod crawl_tests;
mod profiler_tests;
