use crate::crawler::CrawlSettings;
use crate::ConfigError;
use serde::Deserialize;
use std::time::Duration;

/// Main configuration structure for Wordcrawl
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub crawler: CrawlerConfig,
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// Seed URLs the crawl starts from
    #[serde(rename = "start-pages", default)]
    pub start_pages: Vec<String>,

    /// Maximum number of link hops from a seed (a seed itself uses one)
    #[serde(rename = "max-depth")]
    pub max_depth: u32,

    /// Crawl time budget in seconds, measured from the start of the crawl
    #[serde(rename = "timeout-seconds")]
    pub timeout_seconds: u64,

    /// Number of most popular words reported
    #[serde(rename = "popular-word-count")]
    pub popular_word_count: usize,

    /// Requested number of worker threads
    ///
    /// Capped by the platform's available parallelism. Defaults to it.
    #[serde(default)]
    pub parallelism: Option<usize>,

    /// Regular expressions; a URL fully matching any of them is never visited
    #[serde(rename = "ignored-urls", default)]
    pub ignored_urls: Vec<String>,

    /// Regular expressions; words fully matching any of them are not counted
    #[serde(rename = "ignored-words", default)]
    pub ignored_words: Vec<String>,
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
pub struct UserAgentConfig {
    /// Name of the crawler
    #[serde(rename = "crawler-name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(rename = "crawler-version")]
    pub crawler_version: String,

    /// URL with information about the crawler
    #[serde(rename = "contact-url")]
    pub contact_url: String,
}

impl UserAgentConfig {
    /// Formats the `User-Agent` header value
    pub fn header_value(&self) -> String {
        format!(
            "{}/{} (+{})",
            self.crawler_name, self.crawler_version, self.contact_url
        )
    }
}

/// Output configuration
///
/// Absent paths mean the data is written to stdout.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OutputConfig {
    /// Path of the JSON crawl result
    #[serde(rename = "result-path", default)]
    pub result_path: Option<String>,

    /// Path the profiling report is appended to
    #[serde(rename = "profile-output-path", default)]
    pub profile_output_path: Option<String>,
}

impl Config {
    /// Builds the engine settings, compiling the ignored-URL patterns
    ///
    /// # Returns
    ///
    /// * `Ok(CrawlSettings)` - Settings ready to hand to a `CrawlEngine`
    /// * `Err(ConfigError)` - A pattern failed to compile
    pub fn crawl_settings(&self) -> Result<CrawlSettings, ConfigError> {
        let mut settings = CrawlSettings::new(
            self.crawler.max_depth,
            Duration::from_secs(self.crawler.timeout_seconds),
            self.crawler.popular_word_count,
        )
        .with_ignored_urls(&self.crawler.ignored_urls)?;

        if let Some(parallelism) = self.crawler.parallelism {
            settings = settings.with_parallelism(parallelism);
        }

        Ok(settings)
    }
}
