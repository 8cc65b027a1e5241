//! HTML parser for extracting words and links
//!
//! This module turns a fetched document into the crawler's view of a page:
//! - Word counts over the visible text
//! - Links to follow (from `<a>` tags)

use crate::parser::ParsedPage;
use regex::Regex;
use scraper::{Html, Node, Selector};
use std::collections::HashMap;
use url::Url;

/// Elements whose text is never counted
const INVISIBLE_ELEMENTS: &[&str] = &["script", "style", "noscript", "template"];

/// Parses HTML content and extracts word counts and links
///
/// # Word Extraction Rules
///
/// - Text is split on whitespace and lower-cased
/// - Characters other than letters, digits and `_` are stripped
/// - Empty words and words fully matching an ignored pattern are dropped
/// - Text inside `<script>`, `<style>`, `<noscript>` and `<template>` is skipped
///
/// # Link Extraction Rules
///
/// **Include:**
/// - `<a href="...">` tags anywhere in the document
///
/// **Exclude:**
/// - `<a href="..." download>`
/// - `javascript:`, `mailto:`, `tel:` links
/// - Data URIs and fragment-only links
///
/// # Arguments
///
/// * `html` - The HTML content to parse
/// * `base_url` - The base URL for resolving relative links
/// * `ignored_words` - Full-match patterns of words not to count
///
/// # Example
///
/// ```
/// use wordcrawl::parser::parse_html;
/// use url::Url;
///
/// let html = r#"<html><body><p>Hello hello</p><a href="/page">Link</a></body></html>"#;
/// let base_url = Url::parse("https://example.com/").unwrap();
/// let parsed = parse_html(html, &base_url, &[]);
/// assert_eq!(parsed.word_counts["hello"], 2);
/// assert_eq!(parsed.links, vec!["https://example.com/page".to_string()]);
/// ```
pub fn parse_html(html: &str, base_url: &Url, ignored_words: &[Regex]) -> ParsedPage {
    let document = Html::parse_document(html);

    ParsedPage {
        word_counts: count_words(&document, ignored_words),
        links: extract_links(&document, base_url),
    }
}

/// Counts words over the visible text of the document
fn count_words(document: &Html, ignored_words: &[Regex]) -> HashMap<String, u64> {
    let mut counts = HashMap::new();

    for node in document.root_element().descendants() {
        let Node::Text(text) = node.value() else {
            continue;
        };

        let hidden = node
            .ancestors()
            .filter_map(|ancestor| ancestor.value().as_element())
            .any(|element| INVISIBLE_ELEMENTS.contains(&element.name()));
        if hidden {
            continue;
        }

        for word in text.split_whitespace().filter_map(normalize_word) {
            if ignored_words.iter().any(|pattern| pattern.is_match(&word)) {
                continue;
            }
            *counts.entry(word).or_insert(0) += 1;
        }
    }

    counts
}

/// Lower-cases a token and strips non-word characters
///
/// Returns None if nothing is left.
fn normalize_word(token: &str) -> Option<String> {
    let word: String = token
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == '_')
        .flat_map(char::to_lowercase)
        .collect();

    if word.is_empty() {
        None
    } else {
        Some(word)
    }
}

/// Extracts all valid links from the HTML document
fn extract_links(document: &Html, base_url: &Url) -> Vec<String> {
    let mut links = Vec::new();

    if let Ok(a_selector) = Selector::parse("a[href]") {
        for element in document.select(&a_selector) {
            // Skip if it has the download attribute
            if element.value().attr("download").is_some() {
                continue;
            }

            if let Some(href) = element.value().attr("href") {
                if let Some(absolute_url) = resolve_link(href, base_url) {
                    links.push(absolute_url);
                }
            }
        }
    }

    links
}

/// Resolves a link href to an absolute URL and validates it
///
/// Returns None if the link should be excluded:
/// - javascript:, mailto:, tel: schemes
/// - data: URIs
/// - Invalid URLs
/// - Schemes the page source cannot fetch after resolution
fn resolve_link(href: &str, base_url: &Url) -> Option<String> {
    let href = href.trim();

    // Skip empty hrefs
    if href.is_empty() {
        return None;
    }

    // Skip special schemes
    if href.starts_with("javascript:")
        || href.starts_with("mailto:")
        || href.starts_with("tel:")
        || href.starts_with("data:")
    {
        return None;
    }

    // Skip fragment-only links (same page anchors)
    if href.starts_with('#') {
        return None;
    }

    match base_url.join(href) {
        Ok(absolute_url) => match absolute_url.scheme() {
            "http" | "https" | "file" => Some(absolute_url.to_string()),
            _ => None,
        },
        Err(_) => None,
    }
}
