use crate::config::types::{Config, CrawlerConfig, OutputConfig, UserAgentConfig};
use crate::ConfigError;
use regex::Regex;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawler_config(&config.crawler)?;
    validate_user_agent_config(&config.user_agent)?;
    validate_output_config(&config.output)?;
    Ok(())
}

/// Compiles patterns so that they only match a whole input
///
/// `foo` becomes `^(?:foo)$`, which makes `Regex::is_match` a full match.
pub fn compile_patterns(patterns: &[String]) -> Result<Vec<Regex>, ConfigError> {
    patterns
        .iter()
        .map(|pattern| {
            Regex::new(&format!("^(?:{})$", pattern)).map_err(|e| {
                ConfigError::InvalidPattern(format!("'{}': {}", pattern, e))
            })
        })
        .collect()
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    // max_depth >= 0 is always true for u32, so no check needed

    if let Some(parallelism) = config.parallelism {
        if parallelism < 1 {
            return Err(ConfigError::Validation(format!(
                "parallelism must be >= 1, got {}",
                parallelism
            )));
        }
    }

    if config.timeout_seconds < 1 {
        return Err(ConfigError::Validation(format!(
            "timeout_seconds must be >= 1, got {}",
            config.timeout_seconds
        )));
    }

    for page in &config.start_pages {
        let url = Url::parse(page).map_err(|e| {
            ConfigError::InvalidUrl(format!("Invalid start page '{}': {}", page, e))
        })?;

        if !matches!(url.scheme(), "http" | "https" | "file") {
            return Err(ConfigError::Validation(format!(
                "Start page '{}' must use http, https or file scheme",
                page
            )));
        }
    }

    compile_patterns(&config.ignored_urls)?;
    compile_patterns(&config.ignored_words)?;

    Ok(())
}

/// Validates user agent configuration
fn validate_user_agent_config(config: &UserAgentConfig) -> Result<(), ConfigError> {
    // Validate crawler name: non-empty, alphanumeric + hyphens only
    if config.crawler_name.is_empty() {
        return Err(ConfigError::Validation(
            "crawler_name cannot be empty".to_string(),
        ));
    }

    if !config
        .crawler_name
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-')
    {
        return Err(ConfigError::Validation(format!(
            "crawler_name must contain only alphanumeric characters and hyphens, got '{}'",
            config.crawler_name
        )));
    }

    Url::parse(&config.contact_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid contact_url: {}", e)))?;

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.result_path.as_deref() == Some("") {
        return Err(ConfigError::Validation(
            "result_path cannot be empty".to_string(),
        ));
    }

    if config.profile_output_path.as_deref() == Some("") {
        return Err(ConfigError::Validation(
            "profile_output_path cannot be empty".to_string(),
        ));
    }

    Ok(())
}
