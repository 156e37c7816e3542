//! Engine configuration from a TOML file plus command-line overrides.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use unify_core::config::SimilarityMeasure;
use unify_core::Config;

use crate::cli::ConfigArgs;

/// Parse a TOML configuration document. Missing sections take defaults.
pub fn parse_config(toml_src: &str) -> Result<Config> {
    toml::from_str(toml_src).context("invalid configuration TOML")
}

/// Read a TOML configuration file.
pub fn load_config_file(path: &Path) -> Result<Config> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("failed to read config file {}", path.display()))?;
    parse_config(&content).with_context(|| format!("in {}", path.display()))
}

impl ConfigArgs {
    /// Resolve the effective configuration and validate it.
    pub fn resolve(&self) -> Result<Config> {
        let mut config = match &self.config {
            Some(path) => load_config_file(path)?,
            None => Config::default(),
        };

        if let Some(threshold) = self.threshold {
            config = config.with_similarity_threshold(threshold);
        }
        if let Some(name) = &self.measure {
            config.matching.measure = SimilarityMeasure::from_name(name)?;
        }

        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use std::io::Write;

    #[test]
    fn test_parse_partial_config() {
        let config = parse_config(
            r#"
            [matching]
            similarity_threshold = 0.8
            measure = "jaro_winkler"

            [confidence]
            ceiling = 0.95
            "#,
        )
        .unwrap();

        assert_abs_diff_eq!(config.matching.similarity_threshold, 0.8);
        assert_eq!(config.matching.measure, SimilarityMeasure::JaroWinkler);
        assert_abs_diff_eq!(config.confidence.ceiling, 0.95);
        assert_abs_diff_eq!(config.confidence.baseline, 0.7);
        assert!(config.normalizer.strip_years);
    }

    #[test]
    fn test_parse_empty_config() {
        let config = parse_config("").unwrap();
        assert_abs_diff_eq!(config.matching.similarity_threshold, 0.7);
    }

    #[test]
    fn test_parse_rejects_bad_toml() {
        assert!(parse_config("[matching\nsimilarity_threshold = ").is_err());
        assert!(parse_config("[matching]\nmeasure = \"soundex\"").is_err());
    }

    #[test]
    fn test_resolve_overrides_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[matching]\nsimilarity_threshold = 0.9").unwrap();

        let args = ConfigArgs {
            config: Some(file.path().to_path_buf()),
            threshold: Some(0.65),
            measure: Some("levenshtein".to_string()),
        };
        let config = args.resolve().unwrap();
        assert_abs_diff_eq!(config.matching.similarity_threshold, 0.65);
        assert_eq!(config.matching.measure, SimilarityMeasure::Levenshtein);
    }

    #[test]
    fn test_resolve_validates() {
        let args = ConfigArgs {
            threshold: Some(1.5),
            ..ConfigArgs::default()
        };
        let err = args.resolve().unwrap_err();
        assert!(err.to_string().contains("similarity_threshold"));

        let args = ConfigArgs {
            measure: Some("soundex".to_string()),
            ..ConfigArgs::default()
        };
        assert!(args.resolve().is_err());
    }

    #[test]
    fn test_missing_config_file() {
        let args = ConfigArgs {
            config: Some("/nonexistent/unify.toml".into()),
            ..ConfigArgs::default()
        };
        let err = args.resolve().unwrap_err();
        assert!(format!("{err:#}").contains("failed to read config file"));
    }
}
