//! Lenient decoding of raw quote records from JSON.
//!
//! Input is a JSON array of objects shaped like
//! `{"name", "price", "source", "url"?, "volume"?, "timestamp"?}`. A record
//! that cannot be read as a quote is skipped and counted; only a document
//! that is not an array fails the whole load.

use std::fs;
use std::path::Path;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::Deserialize;
use tracing::{debug, warn};
use unify_core::{Error, RawPrice, RawQuote, Result};

/// Quotes decoded from one document.
#[derive(Debug, Clone, Default)]
pub struct LoadReport {
    /// Decoded quotes, in document order.
    pub quotes: Vec<RawQuote>,
    /// Records skipped because they were not quote-shaped.
    pub rejected: usize,
}

/// Wire shape of one record. Only `source` is typed strictly; the other
/// fields degrade on a type mismatch.
#[derive(Debug, Deserialize)]
struct QuoteRecord {
    #[serde(default)]
    name: Option<serde_json::Value>,
    #[serde(default)]
    price: RawPrice,
    #[serde(default)]
    source: Option<String>,
    #[serde(default)]
    url: Option<serde_json::Value>,
    #[serde(default)]
    volume: Option<serde_json::Value>,
    #[serde(default)]
    timestamp: Option<serde_json::Value>,
}

impl QuoteRecord {
    fn into_quote(self, collected_at: DateTime<Utc>) -> Option<RawQuote> {
        let source = self.source.filter(|s| !s.trim().is_empty())?;
        let timestamp = self
            .timestamp
            .as_ref()
            .and_then(value_as_timestamp)
            .unwrap_or(collected_at);

        let mut quote = RawQuote::new(
            self.name.as_ref().map(value_as_name).unwrap_or_default(),
            self.price,
            source,
        )
        .with_timestamp(timestamp);
        if let Some(url) = self.url.as_ref().and_then(value_as_url) {
            quote = quote.with_url(url);
        }
        quote.volume = self.volume.as_ref().and_then(value_as_f64);
        Some(quote)
    }
}

/// Parse RFC 3339, falling back to a naive ISO-8601 timestamp taken as UTC.
pub fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(s) {
        return Some(ts.with_timezone(&Utc));
    }
    match NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f") {
        Ok(naive) => Some(naive.and_utc()),
        Err(_) => {
            debug!(timestamp = s, "unparseable timestamp");
            None
        }
    }
}

/// Text timestamps are parsed; integers are read as Unix seconds.
fn value_as_timestamp(value: &serde_json::Value) -> Option<DateTime<Utc>> {
    match value {
        serde_json::Value::String(s) => parse_timestamp(s),
        serde_json::Value::Number(n) => n.as_i64().and_then(|secs| DateTime::from_timestamp(secs, 0)),
        _ => None,
    }
}

/// Names are free text; scalars keep their JSON spelling.
fn value_as_name(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Number(n) => n.to_string(),
        serde_json::Value::Bool(b) => b.to_string(),
        _ => String::new(),
    }
}

fn value_as_url(value: &serde_json::Value) -> Option<String> {
    value.as_str().map(str::to_string)
}

fn value_as_f64(value: &serde_json::Value) -> Option<f64> {
    match value {
        serde_json::Value::Number(n) => n.as_f64(),
        serde_json::Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Decode quotes from a JSON string.
///
/// Records without a timestamp are stamped with `collected_at`.
pub fn load_quotes_from_str(json: &str, collected_at: DateTime<Utc>) -> Result<LoadReport> {
    let document: serde_json::Value = serde_json::from_str(json)?;
    let records = match document {
        serde_json::Value::Array(records) => records,
        other => {
            return Err(Error::data(format!(
                "expected a JSON array of quotes, found {}",
                json_kind(&other)
            )))
        }
    };

    let mut report = LoadReport {
        quotes: Vec::with_capacity(records.len()),
        rejected: 0,
    };

    for (index, record) in records.into_iter().enumerate() {
        let quote = serde_json::from_value::<QuoteRecord>(record)
            .ok()
            .and_then(|r| r.into_quote(collected_at));
        match quote {
            Some(quote) => report.quotes.push(quote),
            None => {
                warn!(index, "skipping record that is not a quote");
                report.rejected += 1;
            }
        }
    }

    Ok(report)
}

/// Decode quotes from a JSON file.
pub fn load_quotes_from_path(path: impl AsRef<Path>, collected_at: DateTime<Utc>) -> Result<LoadReport> {
    let path = path.as_ref();
    let json = fs::read_to_string(path)?;
    let report = load_quotes_from_str(&json, collected_at)?;
    debug!(
        path = %path.display(),
        quotes = report.quotes.len(),
        rejected = report.rejected,
        "loaded quote file"
    );
    Ok(report)
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}
