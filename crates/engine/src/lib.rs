//! Unification engine for the market-unify system.
//!
//! This crate handles:
//! - String similarity between normalized names
//! - Entity resolution (grouping quotes for the same event)
//! - Per-group aggregation (best price, range, arbitrage)
//! - Confidence scoring
//! - The `unify` pipeline tying them together

pub mod aggregator;
pub mod confidence;
pub mod engine;
pub mod grouper;
pub mod similarity;

pub use aggregator::{AggregateOutcome, Aggregator};
pub use confidence::ConfidencePolicy;
pub use engine::UnificationEngine;
pub use grouper::{Group, Grouper, Grouping};
pub use similarity::{lcs_ratio, similarity};
