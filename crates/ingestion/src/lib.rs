//! Quote intake and normalization for the market-unify system.
//!
//! This crate handles:
//! - Name normalization into comparison keys
//! - Price coercion to probabilities in [0, 1]
//! - Lenient JSON decoding of raw quote records
//! - Concatenating batches from several quote sources

pub mod coercion;
pub mod loader;
pub mod normalizer;
pub mod source;

pub use coercion::{coerce_price, PriceRejection};
pub use loader::{load_quotes_from_path, load_quotes_from_str, parse_timestamp, LoadReport};
pub use normalizer::NameNormalizer;
pub use source::{collect_quotes, CollectedQuotes, JsonFileSource, QuoteSource, StaticSource};
