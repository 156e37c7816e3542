//! Configuration structures for the market-unify system.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Main configuration for the unification engine.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Entity-resolution configuration.
    pub matching: MatchingConfig,
    /// Name normalization configuration.
    pub normalizer: NormalizerConfig,
    /// Confidence scoring configuration.
    pub confidence: ConfidenceConfig,
}

impl Config {
    /// Check every section, failing on the first invalid field.
    pub fn validate(&self) -> Result<()> {
        self.matching.validate()?;
        self.normalizer.validate()?;
        self.confidence.validate()?;
        Ok(())
    }

    /// Override the similarity threshold.
    pub fn with_similarity_threshold(mut self, threshold: f64) -> Self {
        self.matching.similarity_threshold = threshold;
        self
    }
}

/// String similarity measure used for near-duplicate matching.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SimilarityMeasure {
    /// 2 * LCS(a, b) / (|a| + |b|) over characters.
    #[default]
    Lcs,
    /// 1 - levenshtein(a, b) / max(|a|, |b|).
    Levenshtein,
    /// Jaro-Winkler similarity.
    JaroWinkler,
}

impl SimilarityMeasure {
    /// Parse a measure name as used in config files and the CLI.
    pub fn from_name(name: &str) -> Result<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "lcs" => Ok(SimilarityMeasure::Lcs),
            "levenshtein" => Ok(SimilarityMeasure::Levenshtein),
            "jaro_winkler" | "jaro-winkler" => Ok(SimilarityMeasure::JaroWinkler),
            other => Err(Error::config(format!("unknown similarity measure: {other}"))),
        }
    }

    /// Name used in config files.
    pub fn as_str(self) -> &'static str {
        match self {
            SimilarityMeasure::Lcs => "lcs",
            SimilarityMeasure::Levenshtein => "levenshtein",
            SimilarityMeasure::JaroWinkler => "jaro_winkler",
        }
    }
}

/// Entity-resolution configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchingConfig {
    /// Minimum similarity for a quote to join an existing group. Valid range (0, 1].
    pub similarity_threshold: f64,
    /// Similarity measure.
    pub measure: SimilarityMeasure,
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            similarity_threshold: 0.7,
            measure: SimilarityMeasure::Lcs,
        }
    }
}

impl MatchingConfig {
    fn validate(&self) -> Result<()> {
        let t = self.similarity_threshold;
        // Also rejects NaN.
        if !(t > 0.0 && t <= 1.0) {
            return Err(Error::config(format!(
                "matching.similarity_threshold must be in (0, 1], got {t}"
            )));
        }
        Ok(())
    }
}

/// Name normalization configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NormalizerConfig {
    /// Whole tokens removed from names (compared after lower-casing).
    pub stop_words: Vec<String>,
    /// Characters trimmed from both ends of every token.
    pub punctuation: String,
    /// Drop 4-digit year tokens such as "2024".
    pub strip_years: bool,
}

impl Default for NormalizerConfig {
    fn default() -> Self {
        Self {
            stop_words: [
                "will", "the", "and", "or", "a", "an", "of", "in", "by", "to", "win", "victory",
            ]
            .iter()
            .map(|w| w.to_string())
            .collect(),
            punctuation: "?!.,;:\"'()[]-".to_string(),
            strip_years: true,
        }
    }
}

impl NormalizerConfig {
    fn validate(&self) -> Result<()> {
        for word in &self.stop_words {
            if word.trim().is_empty() {
                return Err(Error::config("normalizer.stop_words contains an empty entry"));
            }
            if word.split_whitespace().count() > 1 {
                return Err(Error::config(format!(
                    "normalizer.stop_words entry {word:?} spans several tokens"
                )));
            }
        }
        Ok(())
    }
}

/// Confidence scoring configuration.
///
/// A singleton group scores `baseline`. A group of `n > 1` corroborating
/// quotes scores `min(intercept + increment * n, ceiling)`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfidenceConfig {
    /// Score of a single-quote group.
    pub baseline: f64,
    /// Linear intercept for multi-quote groups.
    pub intercept: f64,
    /// Score added per corroborating quote.
    pub increment: f64,
    /// Upper bound for any score.
    pub ceiling: f64,
}

impl Default for ConfidenceConfig {
    fn default() -> Self {
        Self {
            baseline: 0.7,
            intercept: 0.5,
            increment: 0.1,
            ceiling: 0.9,
        }
    }
}

impl ConfidenceConfig {
    fn validate(&self) -> Result<()> {
        let fields = [
            ("baseline", self.baseline),
            ("intercept", self.intercept),
            ("increment", self.increment),
            ("ceiling", self.ceiling),
        ];
        for (name, value) in fields {
            if !(0.0..=1.0).contains(&value) {
                return Err(Error::config(format!(
                    "confidence.{name} must be in [0, 1], got {value}"
                )));
            }
        }
        if self.baseline > self.ceiling {
            return Err(Error::config(format!(
                "confidence.baseline ({}) exceeds confidence.ceiling ({})",
                self.baseline, self.ceiling
            )));
        }
        // A pair must never score below a singleton.
        let pair = (self.intercept + 2.0 * self.increment).min(self.ceiling);
        if pair + 1e-9 < self.baseline {
            return Err(Error::config(format!(
                "confidence for two quotes ({pair}) is below the singleton baseline ({})",
                self.baseline
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.matching.similarity_threshold, 0.7);
        assert_eq!(config.matching.measure, SimilarityMeasure::Lcs);
        assert_eq!(config.confidence.baseline, 0.7);
        assert_eq!(config.confidence.ceiling, 0.9);
        assert!(config.normalizer.stop_words.iter().any(|w| w == "will"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_threshold_out_of_range() {
        for bad in [0.0, -0.1, 1.01, f64::NAN] {
            let config = Config::default().with_similarity_threshold(bad);
            let err = config.validate().unwrap_err();
            assert!(err.is_config(), "threshold {bad} should be a config error");
            assert!(err.to_string().contains("similarity_threshold"));
        }
        assert!(Config::default().with_similarity_threshold(1.0).validate().is_ok());
    }

    #[test]
    fn test_confidence_validation() {
        let mut config = Config::default();
        config.confidence.ceiling = 0.6;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.confidence.increment = 0.0;
        config.confidence.intercept = 0.2;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.confidence.baseline = 1.5;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_stop_word_validation() {
        let mut config = Config::default();
        config.normalizer.stop_words.push("  ".to_string());
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.normalizer.stop_words.push("who will".to_string());
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let json = r#"{"matching": {"similarity_threshold": 0.8}}"#;
        let config: Config = serde_json::from_str(json).unwrap();
        assert_eq!(config.matching.similarity_threshold, 0.8);
        assert_eq!(config.matching.measure, SimilarityMeasure::Lcs);
        assert_eq!(config.confidence.increment, 0.1);
    }

    #[test]
    fn test_measure_names() {
        assert_eq!(SimilarityMeasure::from_name("LCS").unwrap(), SimilarityMeasure::Lcs);
        assert_eq!(
            SimilarityMeasure::from_name("jaro-winkler").unwrap(),
            SimilarityMeasure::JaroWinkler
        );
        assert!(SimilarityMeasure::from_name("cosine").is_err());
        let json = serde_json::to_string(&SimilarityMeasure::JaroWinkler).unwrap();
        assert_eq!(json, "\"jaro_winkler\"");
    }
}
