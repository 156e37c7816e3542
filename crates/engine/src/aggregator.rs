//! Per-group aggregation.
//!
//! Reduces one group to a [`UnifiedProduct`]. Stateless across groups, so
//! groups can be aggregated independently and in any order.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use ordered_float::OrderedFloat;
use tracing::debug;
use unify_core::{MarketSource, UnifiedProduct};
use unify_ingestion::coerce_price;

use crate::confidence::ConfidencePolicy;
use crate::grouper::Group;

/// Result of aggregating one group.
#[derive(Debug, Clone)]
pub struct AggregateOutcome {
    /// The product, absent when no quote had a usable price.
    pub product: Option<UnifiedProduct>,
    /// Quotes dropped because their price failed coercion.
    pub discarded_quotes: usize,
}

/// Builds unified products from groups.
#[derive(Debug, Clone, Default)]
pub struct Aggregator {
    confidence: ConfidencePolicy,
}

impl Aggregator {
    /// Create an aggregator with the given confidence policy.
    pub fn new(confidence: ConfidencePolicy) -> Self {
        Self { confidence }
    }

    /// Reduce a group to a product, or `None` if no price survives coercion.
    pub fn aggregate(&self, group: &Group, produced_at: DateTime<Utc>) -> Option<UnifiedProduct> {
        self.aggregate_counted(group, produced_at).product
    }

    /// Like [`Aggregator::aggregate`], also reporting dropped quotes.
    pub fn aggregate_counted(&self, group: &Group, produced_at: DateTime<Utc>) -> AggregateOutcome {
        let mut prices: BTreeMap<MarketSource, f64> = BTreeMap::new();
        // Sources by first appearance, for the best-price tie-break.
        let mut first_seen: Vec<MarketSource> = Vec::new();
        let mut valid = 0usize;
        let mut discarded = 0usize;

        for quote in &group.quotes {
            match coerce_price(&quote.price) {
                Ok(price) => {
                    valid += 1;
                    if prices.insert(quote.source.clone(), price).is_none() {
                        first_seen.push(quote.source.clone());
                    }
                }
                Err(reason) => {
                    debug!(
                        key = %group.key,
                        source = %quote.source,
                        %reason,
                        "dropping quote"
                    );
                    discarded += 1;
                }
            }
        }

        let product = best_of(&prices, &first_seen).map(|(best_source, best_price)| {
            let min_price = prices.values().copied().map(OrderedFloat).min().map_or(best_price, |p| p.0);
            let max_price = prices.values().copied().map(OrderedFloat).max().map_or(best_price, |p| p.0);
            let arbitrage_opportunity = if prices.len() > 1 {
                max_price - min_price
            } else {
                0.0
            };

            UnifiedProduct {
                canonical_name: group.key.clone(),
                price_range: UnifiedProduct::format_range(min_price, max_price, prices.len()),
                prices: prices.clone(),
                best_price,
                best_source,
                min_price,
                max_price,
                arbitrage_opportunity,
                // Quotes dropped above are already counted in `discarded`.
                confidence_score: self.confidence.score(valid),
                source_count: valid,
                timestamp: produced_at,
            }
        });

        AggregateOutcome {
            product,
            discarded_quotes: discarded,
        }
    }
}

/// Highest price; among equal prices the source seen first wins.
fn best_of(
    prices: &BTreeMap<MarketSource, f64>,
    first_seen: &[MarketSource],
) -> Option<(MarketSource, f64)> {
    let mut best: Option<(&MarketSource, f64)> = None;
    for source in first_seen {
        let price = prices[source];
        if best.map_or(true, |(_, p)| price > p) {
            best = Some((source, price));
        }
    }
    best.map(|(s, p)| (s.clone(), p))
}
