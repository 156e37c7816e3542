//! PyO3 bindings for the market-unify engine.
//!
//! Exposes to Python:
//! - Raw quotes and unified products
//! - The unification engine
//! - Name normalization and string similarity

use std::collections::HashMap;

use pyo3::exceptions::{PyRuntimeError, PyValueError};
use pyo3::prelude::*;

use unify_core::{
    config::SimilarityMeasure, Config as RustConfig, Error as RustError, RawPrice,
    RawQuote as RustRawQuote, UnifiedProduct as RustUnifiedProduct,
    UnifySummary as RustUnifySummary,
};
use unify_engine::UnificationEngine;
use unify_ingestion::{parse_timestamp, NameNormalizer};

fn to_py_err(err: RustError) -> PyErr {
    match err {
        RustError::Config(msg) => PyValueError::new_err(msg),
        other => PyRuntimeError::new_err(other.to_string()),
    }
}

// ============================================================================
// Python-exposed Types
// ============================================================================

/// Price argument as Python hands it over.
#[derive(FromPyObject)]
enum PriceArg {
    Number(f64),
    Text(String),
    Other(PyObject),
}

impl PriceArg {
    fn into_raw(arg: Option<Self>, py: Python<'_>) -> RawPrice {
        match arg {
            Some(PriceArg::Number(v)) => RawPrice::Number(v),
            Some(PriceArg::Text(s)) => RawPrice::Text(s),
            // Kept for the rejection message; coercion drops it.
            Some(PriceArg::Other(obj)) => {
                RawPrice::Other(serde_json::Value::String(obj.bind(py).to_string()))
            }
            None => RawPrice::Missing,
        }
    }
}

/// One price observation from one marketplace.
#[pyclass]
#[derive(Clone)]
pub struct RawQuote {
    inner: RustRawQuote,
}

#[pymethods]
impl RawQuote {
    /// `timestamp` is RFC 3339 or naive ISO-8601 (taken as UTC); omitted means now.
    #[new]
    #[pyo3(signature = (name, price, source, url=None, volume=None, timestamp=None))]
    fn new(
        py: Python<'_>,
        name: String,
        price: Option<PriceArg>,
        source: &str,
        url: Option<String>,
        volume: Option<f64>,
        timestamp: Option<&str>,
    ) -> PyResult<Self> {
        let mut inner = RustRawQuote::new(name, PriceArg::into_raw(price, py), source);
        if let Some(url) = url {
            inner = inner.with_url(url);
        }
        if let Some(ts) = timestamp {
            let parsed = parse_timestamp(ts)
                .ok_or_else(|| PyValueError::new_err(format!("unparseable timestamp: {ts:?}")))?;
            inner = inner.with_timestamp(parsed);
        }
        inner.volume = volume;
        Ok(RawQuote { inner })
    }

    #[getter]
    fn name(&self) -> &str {
        &self.inner.name
    }

    /// Price as supplied: float, str, or None.
    #[getter]
    fn price(&self, py: Python<'_>) -> PyObject {
        match &self.inner.price {
            RawPrice::Number(v) => (*v).into_py(py),
            RawPrice::Text(s) => s.as_str().into_py(py),
            RawPrice::Missing => py.None(),
            RawPrice::Other(value) => value.to_string().into_py(py),
        }
    }

    #[getter]
    fn source(&self) -> &str {
        self.inner.source.as_str()
    }

    #[getter]
    fn url(&self) -> Option<&str> {
        self.inner.url.as_deref()
    }

    #[getter]
    fn volume(&self) -> Option<f64> {
        self.inner.volume
    }

    /// Collection time, RFC 3339.
    #[getter]
    fn timestamp(&self) -> String {
        self.inner.timestamp.to_rfc3339()
    }

    fn __repr__(&self) -> String {
        format!(
            "RawQuote(name={:?}, price={:?}, source={})",
            self.inner.name, self.inner.price, self.inner.source
        )
    }
}

/// Aggregated cross-source record for one event.
#[pyclass]
#[derive(Clone)]
pub struct UnifiedProduct {
    #[pyo3(get)]
    pub canonical_name: String,
    #[pyo3(get)]
    pub prices: HashMap<String, f64>,
    /// (source, price) pairs, highest price first.
    #[pyo3(get)]
    pub ranked_prices: Vec<(String, f64)>,
    #[pyo3(get)]
    pub best_price: f64,
    #[pyo3(get)]
    pub best_source: String,
    #[pyo3(get)]
    pub min_price: f64,
    #[pyo3(get)]
    pub max_price: f64,
    #[pyo3(get)]
    pub price_range: String,
    #[pyo3(get)]
    pub arbitrage_opportunity: f64,
    #[pyo3(get)]
    pub confidence_score: f64,
    #[pyo3(get)]
    pub source_count: usize,
    #[pyo3(get)]
    pub timestamp: String,
}

#[pymethods]
impl UnifiedProduct {
    /// Whether more than one source quotes this event with a spread above `min_spread`.
    #[pyo3(signature = (min_spread=0.0))]
    fn has_arbitrage(&self, min_spread: f64) -> bool {
        self.prices.len() > 1 && self.arbitrage_opportunity > min_spread
    }

    fn __repr__(&self) -> String {
        format!(
            "UnifiedProduct(canonical_name={:?}, best={}@{:.3}, range={}, confidence={:.2})",
            self.canonical_name, self.best_source, self.best_price, self.price_range, self.confidence_score
        )
    }
}

impl From<RustUnifiedProduct> for UnifiedProduct {
    fn from(p: RustUnifiedProduct) -> Self {
        let ranked_prices = p
            .ranked_prices()
            .into_iter()
            .map(|(s, v)| (s.as_str().to_string(), v))
            .collect();
        UnifiedProduct {
            ranked_prices,
            prices: p.prices.into_iter().map(|(s, v)| (String::from(s), v)).collect(),
            best_source: p.best_source.as_str().to_string(),
            timestamp: p.timestamp.to_rfc3339(),
            canonical_name: p.canonical_name,
            best_price: p.best_price,
            min_price: p.min_price,
            max_price: p.max_price,
            price_range: p.price_range,
            arbitrage_opportunity: p.arbitrage_opportunity,
            confidence_score: p.confidence_score,
            source_count: p.source_count,
        }
    }
}

/// Counts describing one `unify` run.
#[pyclass]
#[derive(Clone, Copy)]
pub struct UnifySummary {
    #[pyo3(get)]
    pub total_quotes: usize,
    #[pyo3(get)]
    pub groups: usize,
    #[pyo3(get)]
    pub emitted: usize,
    #[pyo3(get)]
    pub discarded_quotes: usize,
    #[pyo3(get)]
    pub discarded_groups: usize,
}

#[pymethods]
impl UnifySummary {
    #[getter]
    fn discard_rate(&self) -> f64 {
        RustUnifySummary::from(*self).discard_rate()
    }

    fn __repr__(&self) -> String {
        format!(
            "UnifySummary(total_quotes={}, groups={}, emitted={}, discarded_quotes={}, discarded_groups={})",
            self.total_quotes, self.groups, self.emitted, self.discarded_quotes, self.discarded_groups
        )
    }
}

impl From<RustUnifySummary> for UnifySummary {
    fn from(s: RustUnifySummary) -> Self {
        UnifySummary {
            total_quotes: s.total_quotes,
            groups: s.groups,
            emitted: s.emitted,
            discarded_quotes: s.discarded_quotes,
            discarded_groups: s.discarded_groups,
        }
    }
}

impl From<UnifySummary> for RustUnifySummary {
    fn from(s: UnifySummary) -> Self {
        RustUnifySummary {
            total_quotes: s.total_quotes,
            groups: s.groups,
            emitted: s.emitted,
            discarded_quotes: s.discarded_quotes,
            discarded_groups: s.discarded_groups,
        }
    }
}

// ============================================================================
// Python-exposed Engine Classes
// ============================================================================

/// Unification engine: groups quotes by event and aggregates each group.
#[pyclass]
pub struct PyUnificationEngine {
    inner: UnificationEngine,
}

#[pymethods]
impl PyUnificationEngine {
    #[new]
    #[pyo3(signature = (
        similarity_threshold=0.7,
        measure="lcs",
        stop_words=None,
        strip_years=true,
        baseline=0.7,
        intercept=0.5,
        increment=0.1,
        ceiling=0.9
    ))]
    #[allow(clippy::too_many_arguments)]
    fn new(
        similarity_threshold: f64,
        measure: &str,
        stop_words: Option<Vec<String>>,
        strip_years: bool,
        baseline: f64,
        intercept: f64,
        increment: f64,
        ceiling: f64,
    ) -> PyResult<Self> {
        let mut config = RustConfig::default().with_similarity_threshold(similarity_threshold);
        config.matching.measure = SimilarityMeasure::from_name(measure).map_err(to_py_err)?;
        if let Some(words) = stop_words {
            config.normalizer.stop_words = words;
        }
        config.normalizer.strip_years = strip_years;
        config.confidence.baseline = baseline;
        config.confidence.intercept = intercept;
        config.confidence.increment = increment;
        config.confidence.ceiling = ceiling;

        let inner = UnificationEngine::new(config).map_err(to_py_err)?;
        Ok(PyUnificationEngine { inner })
    }

    #[getter]
    fn similarity_threshold(&self) -> f64 {
        self.inner.config().matching.similarity_threshold
    }

    #[getter]
    fn measure(&self) -> &'static str {
        self.inner.config().matching.measure.as_str()
    }

    /// Unify a batch of quotes. Returns (products, summary).
    fn unify(&self, quotes: Vec<RawQuote>) -> (Vec<UnifiedProduct>, UnifySummary) {
        let output = self.inner.unify(quotes.into_iter().map(|q| q.inner));
        let products = output.products.into_iter().map(UnifiedProduct::from).collect();
        (products, output.summary.into())
    }

    /// Comparison key for a name under this engine's normalizer.
    fn normalize(&self, name: &str) -> String {
        self.inner.normalize(name)
    }

    /// Group names only: list of (canonical key, member names).
    fn group(&self, quotes: Vec<RawQuote>) -> Vec<(String, Vec<String>)> {
        self.inner
            .group(quotes.into_iter().map(|q| q.inner))
            .into_groups()
            .into_iter()
            .map(|g| (g.key, g.quotes.into_iter().map(|q| q.name).collect()))
            .collect()
    }
}

// ============================================================================
// Free functions
// ============================================================================

/// Comparison key for a name under the default normalizer.
#[pyfunction]
fn normalize(name: &str) -> String {
    NameNormalizer::default().normalize(name)
}

/// Similarity of two strings in [0, 1].
#[pyfunction]
#[pyo3(signature = (a, b, measure="lcs"))]
fn similarity(a: &str, b: &str, measure: &str) -> PyResult<f64> {
    let measure = SimilarityMeasure::from_name(measure).map_err(to_py_err)?;
    Ok(unify_engine::similarity(measure, a, b))
}

// ============================================================================
// Module Definition
// ============================================================================

/// market-unify - Cross-market quote unification in Rust.
#[pymodule]
fn market_unify(m: &Bound<'_, PyModule>) -> PyResult<()> {
    // Types
    m.add_class::<RawQuote>()?;
    m.add_class::<UnifiedProduct>()?;
    m.add_class::<UnifySummary>()?;

    // Engine classes
    m.add_class::<PyUnificationEngine>()?;

    // Functions
    m.add_function(wrap_pyfunction!(normalize, m)?)?;
    m.add_function(wrap_pyfunction!(similarity, m)?)?;

    Ok(())
}
