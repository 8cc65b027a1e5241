//! Config file loading
//!
//! The file is read once. The parsed config and its fingerprint always
//! describe the same bytes.

use crate::config::types::Config;
use crate::config::validation::validate;
use crate::ConfigError;
use sha2::{Digest, Sha256};
use std::path::Path;

/// Loads and validates the config file at `path`
///
/// # Example
///
/// ```no_run
/// use std::path::Path;
/// use wordcrawl::config::load_config;
///
/// let config = load_config(Path::new("wordcrawl.toml")).unwrap();
/// println!("Start pages: {:?}", config.crawler.start_pages);
/// ```
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    load_config_with_hash(path).map(|(config, _)| config)
}

/// Loads the config file at `path` along with its SHA-256 fingerprint
///
/// # Returns
///
/// * `Ok((Config, String))` - The validated config and the hex digest of the
///   exact text it was parsed from
/// * `Err(ConfigError)` - The file could not be read, parsed or validated
pub fn load_config_with_hash(path: &Path) -> Result<(Config, String), ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let config = parse_config(&content)?;
    Ok((config, hash_content(&content)))
}

/// Parses and validates config text
pub fn parse_config(content: &str) -> Result<Config, ConfigError> {
    let config: Config = toml::from_str(content)?;
    validate(&config)?;
    Ok(config)
}

/// Hex-encoded SHA-256 of config text
pub fn hash_content(content: &str) -> String {
    hex::encode(Sha256::digest(content.as_bytes()))
}
