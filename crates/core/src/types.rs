//! Core data types for the market-unify system.

use chrono::{DateTime, Utc};
use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Marketplace a quote was collected from.
///
/// Known marketplaces get their own variant; any other identifier is kept
/// verbatim (lower-cased) in `Other`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum MarketSource {
    Polymarket,
    PredictionMarket,
    Kalshi,
    Manual,
    Other(String),
}

impl MarketSource {
    /// Identifier as it appears in input and output records.
    pub fn as_str(&self) -> &str {
        match self {
            MarketSource::Polymarket => "polymarket",
            MarketSource::PredictionMarket => "prediction_market",
            MarketSource::Kalshi => "kalshi",
            MarketSource::Manual => "manual",
            MarketSource::Other(name) => name,
        }
    }
}

impl From<&str> for MarketSource {
    fn from(s: &str) -> Self {
        let id = s.trim().to_lowercase();
        match id.as_str() {
            "polymarket" => MarketSource::Polymarket,
            "prediction_market" => MarketSource::PredictionMarket,
            "kalshi" => MarketSource::Kalshi,
            "manual" => MarketSource::Manual,
            _ => MarketSource::Other(id),
        }
    }
}

impl From<String> for MarketSource {
    fn from(s: String) -> Self {
        MarketSource::from(s.as_str())
    }
}

impl From<MarketSource> for String {
    fn from(source: MarketSource) -> Self {
        match source {
            MarketSource::Other(name) => name,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for MarketSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Price exactly as a collaborator delivered it, before coercion.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawPrice {
    /// Numeric value.
    Number(f64),
    /// Textual value such as "0.45".
    Text(String),
    /// Absent or null.
    #[default]
    Missing,
    /// Any other JSON value (bool, array, object).
    Other(serde_json::Value),
}

impl From<f64> for RawPrice {
    fn from(v: f64) -> Self {
        RawPrice::Number(v)
    }
}

impl From<&str> for RawPrice {
    fn from(s: &str) -> Self {
        RawPrice::Text(s.to_string())
    }
}

impl From<String> for RawPrice {
    fn from(s: String) -> Self {
        RawPrice::Text(s)
    }
}

/// One price observation for one event from one marketplace.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawQuote {
    /// Free-text event description.
    pub name: String,
    /// Raw price, expected to coerce to a probability in [0, 1].
    #[serde(default)]
    pub price: RawPrice,
    /// Marketplace identifier.
    pub source: MarketSource,
    /// Reference link.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Trading volume if the marketplace reports it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volume: Option<f64>,
    /// When the quote was collected.
    #[serde(default = "Utc::now")]
    pub timestamp: DateTime<Utc>,
}

impl RawQuote {
    /// Create a quote stamped with the current time.
    pub fn new(
        name: impl Into<String>,
        price: impl Into<RawPrice>,
        source: impl Into<MarketSource>,
    ) -> Self {
        Self {
            name: name.into(),
            price: price.into(),
            source: source.into(),
            url: None,
            volume: None,
            timestamp: Utc::now(),
        }
    }

    /// Attach a reference link.
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// Override the collection timestamp.
    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }
}

/// Aggregated cross-source record for one event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnifiedProduct {
    /// Group key, fixed when the group was created.
    pub canonical_name: String,
    /// One price per distinct source.
    pub prices: BTreeMap<MarketSource, f64>,
    /// Highest price across sources.
    pub best_price: f64,
    /// Source quoting `best_price`.
    pub best_source: MarketSource,
    /// Lowest price across sources.
    pub min_price: f64,
    /// Highest price across sources.
    pub max_price: f64,
    /// "min-max" with three decimals, or a single price for one source.
    pub price_range: String,
    /// max_price - min_price when at least two sources contributed.
    pub arbitrage_opportunity: f64,
    /// Heuristic certainty of the grouping, in [0, 1].
    pub confidence_score: f64,
    /// Quotes folded into this product. Counts only quotes whose price
    /// coerced; a dropped quote is in `UnifySummary::discarded_quotes` instead.
    pub source_count: usize,
    /// When the record was produced.
    pub timestamp: DateTime<Utc>,
}

impl UnifiedProduct {
    /// Number of distinct sources.
    #[inline]
    pub fn distinct_sources(&self) -> usize {
        self.prices.len()
    }

    /// Whether more than one marketplace quotes this event.
    #[inline]
    pub fn is_multi_source(&self) -> bool {
        self.distinct_sources() > 1
    }

    /// Whether the cross-source spread exceeds `min_spread`.
    pub fn has_arbitrage(&self, min_spread: f64) -> bool {
        self.is_multi_source() && self.arbitrage_opportunity > min_spread
    }

    /// Sources ordered by price, highest first. Equal prices keep source order.
    pub fn ranked_prices(&self) -> Vec<(&MarketSource, f64)> {
        let mut ranked: Vec<(&MarketSource, f64)> =
            self.prices.iter().map(|(s, p)| (s, *p)).collect();
        ranked.sort_by_key(|(_, p)| std::cmp::Reverse(OrderedFloat(*p)));
        ranked
    }

    /// Format a price range the way reports display it.
    pub fn format_range(min_price: f64, max_price: f64, distinct_sources: usize) -> String {
        if distinct_sources > 1 {
            format!("{min_price:.3}-{max_price:.3}")
        } else {
            format!("{max_price:.3}")
        }
    }
}

/// Counts describing one `unify` run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnifySummary {
    /// Quotes received.
    pub total_quotes: usize,
    /// Groups formed by entity resolution.
    pub groups: usize,
    /// Unified products emitted.
    pub emitted: usize,
    /// Quotes whose price failed coercion.
    pub discarded_quotes: usize,
    /// Groups with no valid price.
    pub discarded_groups: usize,
}

impl UnifySummary {
    /// Quotes whose price coerced successfully.
    pub fn valid_quotes(&self) -> usize {
        self.total_quotes - self.discarded_quotes
    }

    /// Fraction of quotes discarded.
    pub fn discard_rate(&self) -> f64 {
        if self.total_quotes > 0 {
            self.discarded_quotes as f64 / self.total_quotes as f64
        } else {
            0.0
        }
    }
}

/// Result of a `unify` run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UnifyOutput {
    /// Products in group-creation order.
    pub products: Vec<UnifiedProduct>,
    /// Discard accounting.
    pub summary: UnifySummary,
}
