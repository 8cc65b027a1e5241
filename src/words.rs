//! Ranking of aggregated word counts

use crate::crawler::WordCounts;
use std::collections::HashMap;

/// Turns a full word-count map into an ordered top-N mapping
pub trait WordRanker: Send + Sync {
    /// Returns at most `limit` entries of `counts`, most popular first
    ///
    /// A `limit` of zero yields an empty mapping.
    fn rank(&self, counts: &HashMap<String, u64>, limit: usize) -> WordCounts;
}

/// Default ranking: higher count first, then longer word, then alphabetical
#[derive(Debug, Clone, Copy, Default)]
pub struct PopularWordRanker;

impl WordRanker for PopularWordRanker {
    fn rank(&self, counts: &HashMap<String, u64>, limit: usize) -> WordCounts {
        let mut entries: Vec<(&String, u64)> = counts.iter().map(|(w, c)| (w, *c)).collect();

        entries.sort_by(|(a_word, a_count), (b_word, b_count)| {
            b_count
                .cmp(a_count)
                .then_with(|| b_word.chars().count().cmp(&a_word.chars().count()))
                .then_with(|| a_word.cmp(b_word))
        });

        entries
            .into_iter()
            .take(limit)
            .map(|(word, count)| (word.clone(), count))
            .collect()
    }
}
