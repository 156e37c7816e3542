//! Entity resolution.
//!
//! Quotes are grouped by normalized name. An exact key hit joins the
//! existing group; otherwise the key is compared against every existing key
//! and joins the most similar one if it clears the threshold, earliest key
//! winning ties. A group keeps the key of the quote that started it.

use std::collections::HashMap;

use tracing::debug;
use unify_core::config::{MatchingConfig, SimilarityMeasure};
use unify_core::RawQuote;
use unify_ingestion::NameNormalizer;

use crate::similarity::similarity;

/// Quotes believed to describe the same event.
#[derive(Debug, Clone)]
pub struct Group {
    /// Canonical key, the normalized name of the first quote.
    pub key: String,
    /// Member quotes in arrival order. Never empty.
    pub quotes: Vec<RawQuote>,
    /// Lowest similarity at which any member joined (1.0 for exact keys).
    pub weakest_match: f64,
}

impl Group {
    fn new(key: String, quote: RawQuote) -> Self {
        Self {
            key,
            quotes: vec![quote],
            weakest_match: 1.0,
        }
    }

    fn push(&mut self, quote: RawQuote, score: f64) {
        self.quotes.push(quote);
        self.weakest_match = self.weakest_match.min(score);
    }

    /// Number of member quotes.
    pub fn len(&self) -> usize {
        self.quotes.len()
    }

    /// Always false for groups built by the [`Grouper`].
    pub fn is_empty(&self) -> bool {
        self.quotes.is_empty()
    }
}

/// Insertion-ordered mapping from canonical key to group.
#[derive(Debug, Clone, Default)]
pub struct Grouping {
    groups: Vec<Group>,
    index: HashMap<String, usize>,
}

impl Grouping {
    /// Number of groups.
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Look up a group by canonical key.
    pub fn get(&self, key: &str) -> Option<&Group> {
        self.index.get(key).map(|&i| &self.groups[i])
    }

    /// Canonical keys in creation order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.groups.iter().map(|g| g.key.as_str())
    }

    /// Groups in creation order.
    pub fn iter(&self) -> std::slice::Iter<'_, Group> {
        self.groups.iter()
    }

    /// Total quotes across all groups.
    pub fn quote_count(&self) -> usize {
        self.groups.iter().map(Group::len).sum()
    }

    /// Consume into groups in creation order.
    pub fn into_groups(self) -> Vec<Group> {
        self.groups
    }

    fn insert(&mut self, group: Group) {
        self.index.insert(group.key.clone(), self.groups.len());
        self.groups.push(group);
    }
}

impl<'a> IntoIterator for &'a Grouping {
    type Item = &'a Group;
    type IntoIter = std::slice::Iter<'a, Group>;

    fn into_iter(self) -> Self::IntoIter {
        self.groups.iter()
    }
}

/// Clusters raw quotes into groups.
#[derive(Debug, Clone)]
pub struct Grouper {
    normalizer: NameNormalizer,
    threshold: f64,
    measure: SimilarityMeasure,
}

impl Grouper {
    /// Create a grouper. The threshold is assumed validated.
    pub fn new(normalizer: NameNormalizer, matching: &MatchingConfig) -> Self {
        Self {
            normalizer,
            threshold: matching.similarity_threshold,
            measure: matching.measure,
        }
    }

    /// Normalized key for a name.
    pub fn key_for(&self, name: &str) -> String {
        self.normalizer.normalize(name)
    }

    /// Partition quotes into groups. Deterministic for a fixed input order.
    pub fn group(&self, quotes: impl IntoIterator<Item = RawQuote>) -> Grouping {
        let mut grouping = Grouping::default();

        for quote in quotes {
            let key = self.key_for(&quote.name);

            if let Some(&i) = grouping.index.get(&key) {
                grouping.groups[i].push(quote, 1.0);
                continue;
            }

            match self.best_match(&key, &grouping.groups) {
                Some((i, score)) if score >= self.threshold => {
                    debug!(
                        key = %key,
                        canonical = %grouping.groups[i].key,
                        similarity = score,
                        "joined near-duplicate group"
                    );
                    grouping.groups[i].push(quote, score);
                }
                _ => {
                    debug!(key = %key, "new group");
                    grouping.insert(Group::new(key, quote));
                }
            }
        }

        grouping
    }

    /// Most similar existing group. Only a strictly higher score replaces the
    /// current best, so the earliest group wins ties.
    fn best_match(&self, key: &str, groups: &[Group]) -> Option<(usize, f64)> {
        let mut best: Option<(usize, f64)> = None;
        for (i, group) in groups.iter().enumerate() {
            let score = similarity(self.measure, key, &group.key);
            if best.map_or(true, |(_, s)| score > s) {
                best = Some((i, score));
            }
        }
        best
    }
}
