//! Quote sources.
//!
//! A source hands over a flat batch of already-collected quotes. Several
//! sources are concatenated, in order, before the batch reaches the engine.
//! A source that fails is logged and left out; nothing is substituted for it.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use tracing::{info, warn};
use unify_core::{Error, RawQuote, Result};

use crate::loader::{load_quotes_from_path, LoadReport};

/// Something that can produce a batch of raw quotes.
pub trait QuoteSource {
    /// Identifier used in logs.
    fn id(&self) -> &str;

    /// Produce the batch, stamping undated quotes with `collected_at`.
    fn fetch(&self, collected_at: DateTime<Utc>) -> Result<LoadReport>;
}

/// Quotes read from a JSON file.
#[derive(Debug, Clone)]
pub struct JsonFileSource {
    id: String,
    path: PathBuf,
}

impl JsonFileSource {
    /// Create a source identified by its file path.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        Self {
            id: path.display().to_string(),
            path,
        }
    }
}

impl QuoteSource for JsonFileSource {
    fn id(&self) -> &str {
        &self.id
    }

    fn fetch(&self, collected_at: DateTime<Utc>) -> Result<LoadReport> {
        load_quotes_from_path(&self.path, collected_at)
            .map_err(|e| Error::source_failed(&self.id, e.to_string()))
    }
}

/// Fixed in-memory batch, for collaborators that already hold their quotes.
#[derive(Debug, Clone)]
pub struct StaticSource {
    id: String,
    quotes: Vec<RawQuote>,
}

impl StaticSource {
    pub fn new(id: impl Into<String>, quotes: Vec<RawQuote>) -> Self {
        Self {
            id: id.into(),
            quotes,
        }
    }
}

impl QuoteSource for StaticSource {
    fn id(&self) -> &str {
        &self.id
    }

    fn fetch(&self, _collected_at: DateTime<Utc>) -> Result<LoadReport> {
        Ok(LoadReport {
            quotes: self.quotes.clone(),
            rejected: 0,
        })
    }
}

/// Concatenated output of several sources.
#[derive(Debug, Default)]
pub struct CollectedQuotes {
    /// All quotes, source by source in the order given.
    pub quotes: Vec<RawQuote>,
    /// Records rejected by the loaders.
    pub rejected_records: usize,
    /// Ids of sources that failed.
    pub failed_sources: Vec<String>,
}

/// Fetch every source and concatenate the batches.
pub fn collect_quotes(sources: &[Box<dyn QuoteSource>], collected_at: DateTime<Utc>) -> CollectedQuotes {
    let mut collected = CollectedQuotes::default();

    for source in sources {
        match source.fetch(collected_at) {
            Ok(batch) => {
                info!(
                    source = source.id(),
                    quotes = batch.quotes.len(),
                    rejected = batch.rejected,
                    "collected quotes"
                );
                collected.rejected_records += batch.rejected;
                collected.quotes.extend(batch.quotes);
            }
            Err(e) => {
                warn!(source = source.id(), error = %e, "source failed, skipping");
                collected.failed_sources.push(source.id().to_string());
            }
        }
    }

    collected
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    struct FailingSource;

    impl QuoteSource for FailingSource {
        fn id(&self) -> &str {
            "broken"
        }

        fn fetch(&self, _collected_at: DateTime<Utc>) -> Result<LoadReport> {
            Err(Error::source_failed("broken", "connection refused"))
        }
    }

    #[test]
    fn test_concatenates_in_order() {
        let sources: Vec<Box<dyn QuoteSource>> = vec![
            Box::new(StaticSource::new(
                "polymarket",
                vec![RawQuote::new("Fed rate cut", 0.75, "polymarket")],
            )),
            Box::new(FailingSource),
            Box::new(StaticSource::new(
                "kalshi",
                vec![
                    RawQuote::new("Fed Rate Cut 2024", 0.6, "kalshi"),
                    RawQuote::new("Recession 2025", 0.3, "kalshi"),
                ],
            )),
        ];

        let collected = collect_quotes(&sources, Utc::now());
        let names: Vec<&str> = collected.quotes.iter().map(|q| q.name.as_str()).collect();
        assert_eq!(names, vec!["Fed rate cut", "Fed Rate Cut 2024", "Recession 2025"]);
        assert_eq!(collected.failed_sources, vec!["broken".to_string()]);
        assert_eq!(collected.rejected_records, 0);
    }

    #[test]
    fn test_json_file_source() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[{{"name": "A", "price": 0.1, "source": "kalshi"}}, {{"price": 0.2}}]"#
        )
        .unwrap();

        let source = JsonFileSource::new(file.path());
        assert_eq!(source.id(), file.path().display().to_string());

        let sources: Vec<Box<dyn QuoteSource>> = vec![Box::new(source)];
        let collected = collect_quotes(&sources, Utc::now());
        assert_eq!(collected.quotes.len(), 1);
        assert_eq!(collected.rejected_records, 1);
        assert!(collected.failed_sources.is_empty());
    }

    #[test]
    fn test_missing_file_is_a_source_error() {
        let source = JsonFileSource::new("/nonexistent/quotes.json");
        let err = source.fetch(Utc::now()).unwrap_err();
        assert!(matches!(err, Error::Source { .. }));
    }
}
