//! Wordcrawl main entry point
//!
//! This is the command-line interface for the Wordcrawl word crawler.

use anyhow::Context;
use clap::Parser;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use wordcrawl::config::{compile_patterns, load_config_with_hash, Config};
use wordcrawl::output::write_result;
use wordcrawl::parser::build_http_client;
use wordcrawl::{CrawlEngine, HttpPageSource, PageSource, Profiler, SystemClock};

/// Wordcrawl: a bounded, time-boxed parallel word crawler
///
/// Wordcrawl follows links outward from the configured start pages until the
/// depth limit or the timeout is reached, then reports the most popular words
/// across every page it visited.
#[derive(Parser, Debug)]
#[command(name = "wordcrawl")]
#[command(version)]
#[command(about = "A bounded parallel word crawler", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and show what would be crawled without actually crawling
    #[arg(long)]
    dry_run: bool,

    /// Write the JSON result here instead of the configured path
    #[arg(long, value_name = "PATH")]
    result_path: Option<PathBuf>,

    /// Append profiling data here instead of the configured path
    #[arg(long, value_name = "PATH")]
    profile_path: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    // Load and validate configuration
    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, config_hash) = load_config_with_hash(&cli.config).map_err(|e| {
        tracing::error!("Failed to load configuration: {}", e);
        e
    })?;
    tracing::info!("Configuration loaded successfully (hash: {})", config_hash);

    if cli.dry_run {
        handle_dry_run(&config);
        return Ok(());
    }

    let result_path = cli
        .result_path
        .or_else(|| config.output.result_path.as_ref().map(PathBuf::from));
    let profile_path = cli
        .profile_path
        .or_else(|| config.output.profile_output_path.as_ref().map(PathBuf::from));

    handle_crawl(&config, result_path.as_deref(), profile_path.as_deref())
}

/// Sets up the logging/tracing subscriber based on verbosity level
///
/// Logs go to stderr so stdout stays free for the result and profile data.
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("wordcrawl=info,warn"),
            1 => EnvFilter::new("wordcrawl=debug,info"),
            2 => EnvFilter::new("wordcrawl=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Handles the --dry-run mode: shows what would be crawled
fn handle_dry_run(config: &Config) {
    println!("=== Wordcrawl Dry Run ===\n");

    println!("Crawler Configuration:");
    println!("  Max depth: {}", config.crawler.max_depth);
    println!("  Timeout: {}s", config.crawler.timeout_seconds);
    println!("  Popular words: {}", config.crawler.popular_word_count);
    match config.crawler.parallelism {
        Some(parallelism) => println!("  Parallelism: {}", parallelism),
        None => println!("  Parallelism: platform default"),
    }

    println!("\nUser Agent: {}", config.user_agent.header_value());

    println!("\nOutput:");
    println!(
        "  Result: {}",
        config.output.result_path.as_deref().unwrap_or("stdout")
    );
    println!(
        "  Profile: {}",
        config
            .output
            .profile_output_path
            .as_deref()
            .unwrap_or("stdout")
    );

    println!("\nStart Pages ({}):", config.crawler.start_pages.len());
    for page in &config.crawler.start_pages {
        println!("  - {}", page);
    }

    println!("\nIgnored URL patterns ({}):", config.crawler.ignored_urls.len());
    for pattern in &config.crawler.ignored_urls {
        println!("  - {}", pattern);
    }

    println!(
        "\nIgnored word patterns ({}):",
        config.crawler.ignored_words.len()
    );
    for pattern in &config.crawler.ignored_words {
        println!("  - {}", pattern);
    }

    println!("\n✓ Configuration is valid");
}

/// Handles the main crawl operation
///
/// The profiling report is written even when the crawl fails, so the time
/// spent before the failure is not lost.
fn handle_crawl(
    config: &Config,
    result_path: Option<&Path>,
    profile_path: Option<&Path>,
) -> anyhow::Result<()> {
    let profiler = Profiler::new(Arc::new(SystemClock));

    let client =
        build_http_client(&config.user_agent).context("Failed to build HTTP client")?;
    let ignored_words = compile_patterns(&config.crawler.ignored_words)?;
    let source: Arc<dyn PageSource> =
        Arc::new(profiler.wrap(HttpPageSource::new(client, ignored_words))?);

    let engine = profiler.wrap(CrawlEngine::new(
        config.crawl_settings()?,
        source,
        Arc::new(SystemClock),
    )?)?;
    tracing::info!(
        "Crawling {} start pages with {} workers",
        config.crawler.start_pages.len(),
        engine.get_ref().parallelism()
    );

    let outcome = engine.call("crawl", |e| e.crawl(&config.crawler.start_pages))?;

    match profile_path {
        Some(path) => profiler
            .write_data(path)
            .with_context(|| format!("Failed to write profiling data to {}", path.display()))?,
        None => profiler.write_to(&mut std::io::stdout().lock())?,
    }

    let result = outcome.map_err(|e| {
        tracing::error!("Crawl failed: {}", e);
        e
    })?;

    write_result(&result, result_path).context("Failed to write crawl result")?;

    Ok(())
}
