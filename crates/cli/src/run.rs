//! Subcommand handlers.

use std::fs;
use std::io::{self, Write};

use anyhow::{bail, Context, Result};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use unify_core::UnifyOutput;
use unify_engine::{ConfidencePolicy, UnificationEngine};
use unify_ingestion::{collect_quotes, JsonFileSource, NameNormalizer, QuoteSource};

use crate::cli::{ConfigArgs, NormalizeArgs, UnifyArgs};

/// What `unify` writes: the engine output plus intake accounting.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct RunReport {
    #[serde(flatten)]
    pub output: UnifyOutput,
    /// Input records that were not quote-shaped and never reached the engine.
    pub rejected_records: usize,
    /// Inputs that could not be read at all.
    pub failed_sources: Vec<String>,
}

/// Load every input, unify, and write the products.
pub fn unify(args: &UnifyArgs) -> Result<()> {
    let config = args.config.resolve()?;
    let engine = UnificationEngine::new(config).context("failed to build engine")?;

    let sources: Vec<Box<dyn QuoteSource>> = args
        .inputs
        .iter()
        .map(|path| Box::new(JsonFileSource::new(path)) as Box<dyn QuoteSource>)
        .collect();
    let collected = collect_quotes(&sources, Utc::now());

    if collected.failed_sources.len() == sources.len() {
        bail!("every input failed to load: {}", collected.failed_sources.join(", "));
    }
    if !collected.failed_sources.is_empty() {
        warn!(failed = ?collected.failed_sources, "continuing without failed inputs");
    }

    let mut output = engine.unify(collected.quotes);
    info!(
        rejected_records = collected.rejected_records,
        discard_rate = output.summary.discard_rate(),
        "run complete"
    );

    if let Some(min_spread) = args.min_spread {
        filter_arbitrage(&mut output, min_spread);
    }

    let report = RunReport {
        output,
        rejected_records: collected.rejected_records,
        failed_sources: collected.failed_sources,
    };
    let json = render(&report, args.pretty)?;
    match &args.output {
        Some(path) => fs::write(path, json + "\n")
            .with_context(|| format!("failed to write {}", path.display()))?,
        None => {
            let mut stdout = io::stdout().lock();
            writeln!(stdout, "{json}").context("failed to write to stdout")?;
        }
    }
    Ok(())
}

/// Print the comparison key of each name, one per line.
pub fn normalize(args: &NormalizeArgs) -> Result<()> {
    let config = args.config.resolve()?;
    let normalizer = NameNormalizer::new(&config.normalizer);

    let mut stdout = io::stdout().lock();
    for name in &args.names {
        writeln!(stdout, "{}\t{}", name, normalizer.normalize(name))
            .context("failed to write to stdout")?;
    }
    Ok(())
}

/// Validate configuration and report the effective values.
pub fn check_config(args: &ConfigArgs) -> Result<()> {
    let config = args.resolve()?;
    let normalizer = NameNormalizer::new(&config.normalizer);
    let confidence = ConfidencePolicy::new(&config.confidence);
    info!(
        threshold = config.matching.similarity_threshold,
        measure = config.matching.measure.as_str(),
        stop_words = normalizer.stop_word_count(),
        confidence_saturates_at = ?confidence.saturation_count(),
        "configuration ok"
    );
    let rendered = toml::to_string_pretty(&config).context("failed to render configuration")?;
    print!("{rendered}");
    Ok(())
}

/// Keep only products whose spread exceeds `min_spread`. Summary counts are
/// left describing the whole run.
fn filter_arbitrage(output: &mut UnifyOutput, min_spread: f64) {
    output.products.retain(|p| p.has_arbitrage(min_spread));
}

fn render(report: &RunReport, pretty: bool) -> Result<String> {
    let json = if pretty {
        serde_json::to_string_pretty(report)
    } else {
        serde_json::to_string(report)
    };
    json.context("failed to serialize output")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn write_quotes(dir: &tempfile::TempDir, name: &str, body: &str) -> PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, body).unwrap();
        path
    }

    fn read_report(path: &PathBuf) -> RunReport {
        serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap()
    }

    fn args(inputs: Vec<PathBuf>, output: PathBuf) -> UnifyArgs {
        UnifyArgs {
            inputs,
            config: ConfigArgs::default(),
            output: Some(output),
            pretty: true,
            min_spread: None,
        }
    }

    #[test]
    fn test_unify_writes_products() {
        let dir = tempfile::tempdir().unwrap();
        let a = write_quotes(
            &dir,
            "a.json",
            r#"[{"name": "Will Biden win the 2024 election?", "price": 0.45, "source": "polymarket"},
                {"name": "Fed Rate Cut 2024", "price": "0.60", "source": "kalshi"}]"#,
        );
        let b = write_quotes(
            &dir,
            "b.json",
            r#"[{"name": "Biden 2024 election victory", "price": 0.65, "source": "predictit"},
                {"name": "Recession 2025?", "price": "broken", "source": "manual"}]"#,
        );
        let out = dir.path().join("out.json");

        unify(&args(vec![a, b], out.clone())).unwrap();

        let written = read_report(&out);
        let names: Vec<&str> = written.output.products.iter().map(|p| p.canonical_name.as_str()).collect();
        assert_eq!(names, vec!["biden election", "fed rate cut"]);
        assert_eq!(written.output.summary.total_quotes, 4);
        assert_eq!(written.output.summary.discarded_quotes, 1);
        assert_eq!(written.output.summary.discarded_groups, 1);
    }

    #[test]
    fn test_unify_skips_missing_input() {
        let dir = tempfile::tempdir().unwrap();
        let a = write_quotes(&dir, "a.json", r#"[{"name": "Fed rate cut", "price": 0.6, "source": "kalshi"}]"#);
        let out = dir.path().join("out.json");

        unify(&args(vec![a, dir.path().join("missing.json")], out.clone())).unwrap();
        let written = read_report(&out);
        assert_eq!(written.output.products.len(), 1);
        assert_eq!(written.failed_sources.len(), 1);
        assert!(written.failed_sources[0].ends_with("missing.json"));
    }

    #[test]
    fn test_rejected_records_are_reported() {
        let dir = tempfile::tempdir().unwrap();
        let a = write_quotes(
            &dir,
            "a.json",
            r#"[{"name": "Fed rate cut", "price": 0.6, "source": "kalshi"},
                {"name": "No source", "price": 0.6},
                "not a record"]"#,
        );
        let out = dir.path().join("out.json");

        unify(&args(vec![a], out.clone())).unwrap();
        let written = read_report(&out);
        assert_eq!(written.rejected_records, 2);
        assert!(written.failed_sources.is_empty());
        assert_eq!(written.output.summary.total_quotes, 1);

        let raw: serde_json::Value = serde_json::from_str(&fs::read_to_string(&out).unwrap()).unwrap();
        assert_eq!(raw["rejected_records"], 2);
        assert!(raw["products"].is_array());
        assert!(raw["summary"].is_object());
    }

    #[test]
    fn test_unify_fails_when_all_inputs_fail() {
        let dir = tempfile::tempdir().unwrap();
        let bad = write_quotes(&dir, "bad.json", r#"{"name": "not an array"}"#);
        let err = unify(&args(vec![bad], dir.path().join("out.json"))).unwrap_err();
        assert!(err.to_string().contains("every input failed"));
    }

    #[test]
    fn test_min_spread_filter() {
        let dir = tempfile::tempdir().unwrap();
        let a = write_quotes(
            &dir,
            "a.json",
            r#"[{"name": "Biden election", "price": 0.45, "source": "polymarket"},
                {"name": "Biden election", "price": 0.65, "source": "predictit"},
                {"name": "Fed rate cut", "price": 0.60, "source": "kalshi"},
                {"name": "Fed rate cut", "price": 0.62, "source": "polymarket"}]"#,
        );
        let out = dir.path().join("out.json");
        let mut run_args = args(vec![a], out.clone());
        run_args.min_spread = Some(0.05);

        unify(&run_args).unwrap();
        let written = read_report(&out);
        assert_eq!(written.output.products.len(), 1);
        assert_eq!(written.output.products[0].canonical_name, "biden election");
        assert_eq!(written.output.summary.emitted, 2);
    }

    #[test]
    fn test_render_compact() {
        let json = render(&RunReport::default(), false).unwrap();
        assert!(!json.contains('\n'));
        assert!(json.contains("\"products\":[]"));
        assert!(json.contains("\"rejected_records\":0"));
    }
}
