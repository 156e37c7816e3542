//! Unification engine.
//!
//! Combines normalization, grouping and aggregation behind a single
//! `unify` entry point. Configuration is validated once, at construction.

use chrono::{DateTime, Utc};
use tracing::info;
use unify_core::{Config, RawQuote, Result, UnifiedProduct, UnifyOutput, UnifySummary};
use unify_ingestion::NameNormalizer;

use crate::{
    aggregator::Aggregator,
    confidence::ConfidencePolicy,
    grouper::{Group, Grouper, Grouping},
};

/// Pure, synchronous unification engine.
#[derive(Debug, Clone)]
pub struct UnificationEngine {
    config: Config,
    grouper: Grouper,
    aggregator: Aggregator,
}

impl UnificationEngine {
    /// Create an engine, failing fast on invalid configuration.
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;
        Ok(Self::build(config))
    }

    fn build(config: Config) -> Self {
        let normalizer = NameNormalizer::new(&config.normalizer);
        Self {
            grouper: Grouper::new(normalizer, &config.matching),
            aggregator: Aggregator::new(ConfidencePolicy::new(&config.confidence)),
            config,
        }
    }

    /// Configuration in use.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Normalized comparison key for a name.
    pub fn normalize(&self, name: &str) -> String {
        self.grouper.key_for(name)
    }

    /// Group quotes by event.
    pub fn group(&self, quotes: impl IntoIterator<Item = RawQuote>) -> Grouping {
        self.grouper.group(quotes)
    }

    /// Aggregate one group, stamping the product with the current time.
    pub fn aggregate(&self, group: &Group) -> Option<UnifiedProduct> {
        self.aggregator.aggregate(group, Utc::now())
    }

    /// Run the full pipeline.
    pub fn unify(&self, quotes: impl IntoIterator<Item = RawQuote>) -> UnifyOutput {
        self.unify_at(quotes, Utc::now())
    }

    /// Run the full pipeline with a fixed production timestamp.
    pub fn unify_at(
        &self,
        quotes: impl IntoIterator<Item = RawQuote>,
        produced_at: DateTime<Utc>,
    ) -> UnifyOutput {
        let grouping = self.group(quotes);

        let mut summary = UnifySummary {
            total_quotes: grouping.quote_count(),
            groups: grouping.len(),
            ..UnifySummary::default()
        };
        let mut products = Vec::with_capacity(grouping.len());

        for group in &grouping {
            let outcome = self.aggregator.aggregate_counted(group, produced_at);
            summary.discarded_quotes += outcome.discarded_quotes;
            match outcome.product {
                Some(product) => products.push(product),
                None => summary.discarded_groups += 1,
            }
        }
        summary.emitted = products.len();

        info!(
            quotes = summary.total_quotes,
            groups = summary.groups,
            emitted = summary.emitted,
            discarded_quotes = summary.discarded_quotes,
            discarded_groups = summary.discarded_groups,
            "unified quotes"
        );

        UnifyOutput { products, summary }
    }
}

impl Default for UnificationEngine {
    fn default() -> Self {
        Self::build(Config::default())
    }
}
