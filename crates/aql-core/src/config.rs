//! aql configuration loading.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::grading::GradingConfig;
use crate::scoring::{NormalizationMode, RoundingMode, ScoringConfig};

/// Top-level aql configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AqlConfig {
    /// Scoring weights, slider bounds, and normalization.
    #[serde(default)]
    pub scoring: ScoringConfig,
    /// Module quiz tier thresholds.
    #[serde(default)]
    pub grading: GradingConfig,
    /// Step bank used by `aql take` when no `--bank` is given.
    #[serde(default)]
    pub default_bank: Option<PathBuf>,
    /// Output directory for saved reports.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("./aql-results")
}

impl Default for AqlConfig {
    fn default() -> Self {
        Self {
            scoring: ScoringConfig::default(),
            grading: GradingConfig::default(),
            default_bank: None,
            output_dir: default_output_dir(),
        }
    }
}

/// Resolve environment variable references like `${VAR_NAME}` in a string.
///
/// Unset variables resolve to the empty string.
fn resolve_env_vars(s: &str) -> String {
    let mut result = s.to_string();
    while let Some(start) = result.find("${") {
        let Some(end) = result[start..].find('}') else {
            break;
        };
        let var_name = &result[start + 2..start + end];
        let value = std::env::var(var_name).unwrap_or_default();
        result = format!("{}{}{}", &result[..start], value, &result[start + end + 1..]);
    }
    result
}

fn resolve_path(path: &Path) -> PathBuf {
    PathBuf::from(resolve_env_vars(&path.to_string_lossy()))
}

/// Load configuration from well-known paths.
///
/// Search order:
/// 1. `aql.toml` in the current directory
/// 2. `~/.config/aql/config.toml`
///
/// Environment variable overrides: `AQL_NORMALIZATION`, `AQL_ROUNDING`,
/// `AQL_OUTPUT_DIR`.
pub fn load_config() -> Result<AqlConfig> {
    load_config_from(None)
}

/// Load config from an explicit path, or search the default locations.
pub fn load_config_from(path: Option<&Path>) -> Result<AqlConfig> {
    let config_path = match path {
        Some(p) if p.exists() => Some(p.to_path_buf()),
        Some(p) => anyhow::bail!("config file not found: {}", p.display()),
        None => {
            let local = PathBuf::from("aql.toml");
            if local.exists() {
                Some(local)
            } else {
                dirs_path()
                    .map(|home| home.join("config.toml"))
                    .filter(|global| global.exists())
            }
        }
    };

    let mut config = match &config_path {
        Some(path) => {
            tracing::debug!(path = %path.display(), "loading config");
            parse_config_str(
                &std::fs::read_to_string(path)
                    .with_context(|| format!("failed to read config: {}", path.display()))?,
                path,
            )?
        }
        None => AqlConfig::default(),
    };

    apply_env_overrides(&mut config)?;

    config.default_bank = config.default_bank.as_deref().map(resolve_path);
    config.output_dir = resolve_path(&config.output_dir);

    config
        .scoring
        .validate()
        .context("invalid [scoring] configuration")?;

    Ok(config)
}

/// Parse config TOML without touching the environment.
pub fn parse_config_str(content: &str, source_path: &Path) -> Result<AqlConfig> {
    toml::from_str::<AqlConfig>(content)
        .with_context(|| format!("failed to parse config: {}", source_path.display()))
}

fn apply_env_overrides(config: &mut AqlConfig) -> Result<()> {
    if let Ok(value) = std::env::var("AQL_NORMALIZATION") {
        config.scoring.normalization = value
            .parse::<NormalizationMode>()
            .map_err(|e| anyhow::anyhow!(e))
            .context("invalid AQL_NORMALIZATION")?;
    }
    if let Ok(value) = std::env::var("AQL_ROUNDING") {
        config.scoring.rounding = value
            .parse::<RoundingMode>()
            .map_err(|e| anyhow::anyhow!(e))
            .context("invalid AQL_ROUNDING")?;
    }
    if let Ok(dir) = std::env::var("AQL_OUTPUT_DIR") {
        config.output_dir = PathBuf::from(dir);
    }
    Ok(())
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("aql"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::LearningStyle;

    #[test]
    fn resolve_env_vars_basic() {
        std::env::set_var("_AQL_TEST_VAR", "hello");
        assert_eq!(resolve_env_vars("${_AQL_TEST_VAR}"), "hello");
        assert_eq!(
            resolve_env_vars("prefix_${_AQL_TEST_VAR}_suffix"),
            "prefix_hello_suffix"
        );
        assert_eq!(resolve_env_vars("no_vars"), "no_vars");
        assert_eq!(resolve_env_vars("${unterminated"), "${unterminated");
        std::env::remove_var("_AQL_TEST_VAR");
    }

    #[test]
    fn default_config() {
        let config = AqlConfig::default();
        assert_eq!(config.scoring, ScoringConfig::default());
        assert_eq!(config.grading.mastery_threshold, 80);
        assert_eq!(config.output_dir, PathBuf::from("./aql-results"));
        assert!(config.default_bank.is_none());
    }

    #[test]
    fn parse_partial_config() {
        let toml_str = r#"
default_bank = "banks/personality.toml"

[scoring]
learning_style_weight = 5
learning_style_order = ["kinesthetic", "visual"]
normalization = "largest-remainder"

[grading]
mastery_threshold = 90
"#;
        let config = parse_config_str(toml_str, Path::new("aql.toml")).unwrap();
        assert_eq!(config.scoring.learning_style_weight, 5);
        assert_eq!(config.scoring.trait_choice_weight, 7);
        assert_eq!(
            config.scoring.learning_style_order,
            vec![LearningStyle::Kinesthetic, LearningStyle::Visual]
        );
        assert_eq!(
            config.scoring.normalization,
            NormalizationMode::LargestRemainder
        );
        assert_eq!(config.grading.mastery_threshold, 90);
        assert_eq!(config.grading.proficiency_threshold, 60);
        assert_eq!(
            config.default_bank,
            Some(PathBuf::from("banks/personality.toml"))
        );
    }

    #[test]
    fn explicit_path_must_exist() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_config_from(Some(&dir.path().join("missing.toml"))).unwrap_err();
        assert!(err.to_string().contains("config file not found"));
    }

    #[test]
    fn rejects_inverted_slider_range() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("aql.toml");
        std::fs::write(&path, "[scoring]\nslider_min = 10\nslider_max = 1\n").unwrap();
        let err = load_config_from(Some(&path)).unwrap_err();
        assert!(format!("{err:#}").contains("slider_min"));
    }

    #[test]
    fn mode_names_parse() {
        assert_eq!(
            "half_to_even".parse::<RoundingMode>().unwrap(),
            RoundingMode::HalfToEven
        );
        assert_eq!(
            "Largest-Remainder".parse::<NormalizationMode>().unwrap(),
            NormalizationMode::LargestRemainder
        );
        assert!("nearest".parse::<RoundingMode>().is_err());
    }
}
