//! Timing a crawl end to end through interceptors

use crate::common::ScriptedSource;
use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use wordcrawl::profiler::{OperationKey, TimingInterceptor};
use wordcrawl::{
    CrawlEngine, CrawlError, CrawlSettings, FakeClock, Instrumented, Operation, PageSource,
    ParsedPage, Profiler, ProfilerError,
};

impl Instrumented for ScriptedSource {
    const OPERATIONS: &'static [Operation] = &[Operation::profiled("parse")];
}

fn clock() -> Arc<FakeClock> {
    Arc::new(FakeClock::ticking(
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
        chrono::Duration::milliseconds(1),
    ))
}

fn key<T: Instrumented + 'static>(operation: &'static str) -> OperationKey {
    OperationKey::of::<T>(operation)
}

fn profiled_engine(
    profiler: &Profiler,
    clock: Arc<FakeClock>,
    source: ScriptedSource,
) -> TimingInterceptor<CrawlEngine> {
    let source: Arc<dyn PageSource> = Arc::new(profiler.wrap(source).unwrap());
    let engine = CrawlEngine::new(
        CrawlSettings::new(3, Duration::from_secs(60), 10),
        source,
        clock,
    )
    .unwrap();
    profiler.wrap(engine).unwrap()
}

#[test]
fn test_profiled_crawl_records_engine_and_source() {
    let clock = clock();
    let profiler = Profiler::new(clock.clone());
    let engine = profiled_engine(
        &profiler,
        clock,
        ScriptedSource::new()
            .page("https://a", &["foo"], &["https://b"])
            .page("https://b", &["bar"], &[]),
    );

    let result = engine
        .call("crawl", |e| e.crawl(&["https://a".to_string()]))
        .unwrap()
        .unwrap();

    assert_eq!(result.urls_visited, 2);

    let ledger = profiler.ledger();
    assert_eq!(ledger.samples(&key::<CrawlEngine>("crawl")), 1);
    assert_eq!(ledger.samples(&key::<ScriptedSource>("parse")), 2);
    assert!(ledger.total(&key::<CrawlEngine>("crawl")).unwrap() > Duration::ZERO);
}

#[test]
fn test_unmarked_operation_is_not_recorded() {
    let clock = clock();
    let profiler = Profiler::new(clock.clone());
    let engine = profiled_engine(&profiler, clock, ScriptedSource::new());

    let workers = engine.call("parallelism", |e| e.parallelism()).unwrap();

    assert!(workers >= 1);
    assert!(profiler.ledger().is_empty());
}

#[test]
fn test_failed_crawl_is_forwarded_and_recorded() {
    let clock = clock();
    let profiler = Profiler::new(clock.clone());
    let engine = profiled_engine(
        &profiler,
        clock,
        ScriptedSource::new().failing("https://a", 503),
    );

    let outcome = engine
        .call("crawl", |e| e.crawl(&["https://a".to_string()]))
        .unwrap();

    assert!(matches!(outcome, Err(CrawlError::Fetch(_))));
    assert_eq!(profiler.ledger().samples(&key::<CrawlEngine>("crawl")), 1);
    assert_eq!(profiler.ledger().samples(&key::<ScriptedSource>("parse")), 1);
}

#[test]
fn test_undeclared_operation_is_rejected() {
    let clock = clock();
    let profiler = Profiler::new(clock.clone());
    let engine = profiled_engine(&profiler, clock, ScriptedSource::new());

    let outcome = engine.call("settings", |e| e.settings().max_depth);

    assert!(matches!(
        outcome,
        Err(ProfilerError::Dispatch {
            operation: "settings",
            ..
        })
    ));
    assert!(profiler.ledger().is_empty());
}

#[test]
fn test_report_lists_every_key() {
    let clock = clock();
    let profiler = Profiler::new(clock.clone());
    let engine = profiled_engine(
        &profiler,
        clock,
        ScriptedSource::new().page("https://a", &["word"], &[]),
    );
    engine
        .call("crawl", |e| e.crawl(&["https://a".to_string()]))
        .unwrap()
        .unwrap();

    let mut out = Vec::new();
    profiler.write_to(&mut out).unwrap();
    let report = String::from_utf8(out).unwrap();

    assert!(report.starts_with("Run at Mon, "));
    assert!(report.contains(&format!(
        "{}#crawl took 0m 0s ",
        std::any::type_name::<CrawlEngine>()
    )));
    assert!(report.contains(&format!(
        "{}#parse took 0m 0s ",
        std::any::type_name::<ScriptedSource>()
    )));
    assert!(report.ends_with("\n\n"));
}

#[test]
fn test_write_data_appends_runs() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("profile.txt");

    for _ in 0..2 {
        let clock = clock();
        let profiler = Profiler::new(clock.clone());
        let engine = profiled_engine(&profiler, clock, ScriptedSource::new());
        engine
            .call("crawl", |e| e.crawl(&["https://a".to_string()]))
            .unwrap()
            .unwrap();
        profiler.write_data(&path).unwrap();
    }

    let content = std::fs::read_to_string(&path).unwrap();
    assert_eq!(content.matches("Run at ").count(), 2);
    assert_eq!(content.matches("#crawl took").count(), 2);
}

/// Page source whose operation table lacks `parse`
#[derive(Debug, Default)]
struct UndeclaredParse {
    calls: AtomicUsize,
}

#[async_trait]
impl PageSource for UndeclaredParse {
    async fn parse(&self, _url: &str) -> wordcrawl::Result<ParsedPage> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(ParsedPage::default())
    }
}

impl Instrumented for UndeclaredParse {
    const OPERATIONS: &'static [Operation] = &[Operation::profiled("other")];
}

#[tokio::test]
async fn test_undeclared_parse_becomes_internal_error() {
    let profiler = Profiler::new(clock());
    let source = profiler.wrap(UndeclaredParse::default()).unwrap();

    let outcome = source.parse("https://a").await;

    match outcome {
        Err(CrawlError::Internal(message)) => assert!(message.contains("parse")),
        other => panic!("expected an internal error, got {:?}", other),
    }
    assert_eq!(source.get_ref().calls.load(Ordering::SeqCst), 0);
    assert!(profiler.ledger().is_empty());
}

#[test]
fn test_crawl_through_undeclared_parse_fails_internally() {
    let clock = clock();
    let profiler = Profiler::new(clock.clone());
    let source = Arc::new(profiler.wrap(UndeclaredParse::default()).unwrap());
    let engine = CrawlEngine::new(
        CrawlSettings::new(2, Duration::from_secs(60), 10),
        source.clone(),
        clock,
    )
    .unwrap();

    let outcome = engine.crawl(&["https://a".to_string()]);

    assert!(matches!(outcome, Err(CrawlError::Internal(_))));
    assert_eq!(source.get_ref().calls.load(Ordering::SeqCst), 0);
}
