//! Product name normalization.
//!
//! Maps a free-text event name to the key used for grouping: lower-cased,
//! punctuation trimmed from token edges, stop words and year tokens dropped,
//! whitespace collapsed. Removal works on whole tokens, so the order of the
//! stop-word list never changes the result.

use std::collections::HashSet;

use unify_core::config::NormalizerConfig;

/// Name normalizer built from a [`NormalizerConfig`].
#[derive(Debug, Clone)]
pub struct NameNormalizer {
    stop_words: HashSet<String>,
    punctuation: Vec<char>,
    strip_years: bool,
}

impl NameNormalizer {
    /// Create a normalizer from configuration.
    pub fn new(config: &NormalizerConfig) -> Self {
        Self {
            stop_words: config
                .stop_words
                .iter()
                .map(|w| w.trim().to_lowercase())
                .collect(),
            punctuation: config.punctuation.chars().collect(),
            strip_years: config.strip_years,
        }
    }

    /// Normalize a name. Never fails; an all-noise name yields "".
    pub fn normalize(&self, name: &str) -> String {
        let lowered = name.to_lowercase();
        let mut key = String::with_capacity(lowered.len());

        for raw in lowered.split_whitespace() {
            let token = raw.trim_matches(|c: char| self.punctuation.contains(&c));
            if token.is_empty() || self.is_removed(token) {
                continue;
            }
            if !key.is_empty() {
                key.push(' ');
            }
            key.push_str(token);
        }

        key
    }

    fn is_removed(&self, token: &str) -> bool {
        self.stop_words.contains(token) || (self.strip_years && is_year(token))
    }

    /// Number of configured stop words.
    pub fn stop_word_count(&self) -> usize {
        self.stop_words.len()
    }
}

impl Default for NameNormalizer {
    fn default() -> Self {
        Self::new(&NormalizerConfig::default())
    }
}

/// A 4-digit token such as "2024".
#[inline]
fn is_year(token: &str) -> bool {
    token.len() == 4 && token.bytes().all(|b| b.is_ascii_digit())
}
