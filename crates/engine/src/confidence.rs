//! Confidence scoring.
//!
//! Linear in the number of corroborating quotes and saturating at a ceiling
//! below 1.0; grouping is heuristic, so full confidence is never assigned
//! under the default parameters.

use unify_core::config::ConfidenceConfig;

/// Maps a corroboration count to a confidence score.
#[derive(Debug, Clone, Copy)]
pub struct ConfidencePolicy {
    baseline: f64,
    intercept: f64,
    increment: f64,
    ceiling: f64,
}

impl ConfidencePolicy {
    /// Create a policy from validated configuration.
    pub fn new(config: &ConfidenceConfig) -> Self {
        Self {
            baseline: config.baseline,
            intercept: config.intercept,
            increment: config.increment,
            ceiling: config.ceiling,
        }
    }

    /// Score a group of `corroborating` quotes.
    pub fn score(&self, corroborating: usize) -> f64 {
        let raw = if corroborating > 1 {
            (self.intercept + self.increment * corroborating as f64).min(self.ceiling)
        } else {
            self.baseline
        };
        raw.clamp(0.0, 1.0)
    }

    /// Smallest count that reaches the ceiling, if any.
    pub fn saturation_count(&self) -> Option<usize> {
        (2..=1_000).find(|&n| self.score(n) >= self.ceiling)
    }
}

impl Default for ConfidencePolicy {
    fn default() -> Self {
        Self::new(&ConfidenceConfig::default())
    }
}
