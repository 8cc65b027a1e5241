//! Crawl results

use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;

/// Ordered word → count mapping
///
/// Iteration and serialization follow insertion order, which is the rank
/// order produced by a `WordRanker`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WordCounts(Vec<(String, u64)>);

impl WordCounts {
    /// Creates an empty mapping
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an entry at the lowest rank
    pub fn push(&mut self, word: impl Into<String>, count: u64) {
        self.0.push((word.into(), count));
    }

    /// Looks up the count of a word
    pub fn get(&self, word: &str) -> Option<u64> {
        self.0
            .iter()
            .find(|(w, _)| w == word)
            .map(|(_, count)| *count)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates entries in rank order
    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.0.iter().map(|(w, c)| (w.as_str(), *c))
    }

    /// Words in rank order
    pub fn words(&self) -> Vec<&str> {
        self.0.iter().map(|(w, _)| w.as_str()).collect()
    }
}

impl FromIterator<(String, u64)> for WordCounts {
    fn from_iter<I: IntoIterator<Item = (String, u64)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl Serialize for WordCounts {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (word, count) in &self.0 {
            map.serialize_entry(word, count)?;
        }
        map.end()
    }
}

/// Outcome of one crawl invocation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CrawlResult {
    /// Most popular words, ranked
    pub word_counts: WordCounts,

    /// Number of distinct URLs visited
    pub urls_visited: usize,
}
