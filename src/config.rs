//! Evaluation configuration.
//!
//! Settings load from a TOML file when one is present and fall back to
//! defaults otherwise; command-line flags override both. Nothing is read
//! from the environment.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::analysis::ScoreOptions;

/// Paths tried, in order, when no config file is given explicitly.
pub const CONFIG_CANDIDATES: &[&str] = &["rebus-eval.toml", "config/rebus-eval.toml"];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvalConfig {
    #[serde(default)]
    pub scoring: ScoringConfig,
    #[serde(default)]
    pub data: DataConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Scoring behavior.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoringConfig {
    /// Extract answers from responses before comparing.
    #[serde(default = "default_true")]
    pub use_extraction: bool,
    /// Also compute token-level F1 per sample.
    #[serde(default)]
    pub use_token_f1: bool,
    /// Drop leading articles during normalization.
    #[serde(default)]
    pub strip_leading_articles: bool,
}

/// Where runs and dataset files live.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataConfig {
    #[serde(default = "default_logs_dir")]
    pub logs_dir: String,
    #[serde(default = "default_images_dir")]
    pub images_dir: String,
    #[serde(default = "default_annotations")]
    pub annotations: String,
}

/// Report output behavior.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Write metrics into the run directory after evaluation.
    #[serde(default = "default_true")]
    pub save_metrics: bool,
    /// Include the per-sample breakdown in saved metrics.
    #[serde(default)]
    pub include_breakdown: bool,
    #[serde(default = "default_metrics_filename")]
    pub metrics_filename: String,
}

fn default_true() -> bool {
    true
}

fn default_logs_dir() -> String {
    "logs".to_string()
}

fn default_images_dir() -> String {
    "data/raw/img".to_string()
}

fn default_annotations() -> String {
    "data/raw/annotations.csv".to_string()
}

fn default_metrics_filename() -> String {
    "metrics.json".to_string()
}

impl Default for EvalConfig {
    fn default() -> Self {
        EvalConfig {
            scoring: ScoringConfig::default(),
            data: DataConfig::default(),
            output: OutputConfig::default(),
        }
    }
}

impl Default for ScoringConfig {
    fn default() -> Self {
        ScoringConfig {
            use_extraction: true,
            use_token_f1: false,
            strip_leading_articles: false,
        }
    }
}

impl Default for DataConfig {
    fn default() -> Self {
        DataConfig {
            logs_dir: default_logs_dir(),
            images_dir: default_images_dir(),
            annotations: default_annotations(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        OutputConfig {
            save_metrics: true,
            include_breakdown: false,
            metrics_filename: default_metrics_filename(),
        }
    }
}

impl EvalConfig {
    /// Parse a TOML document. Missing sections and fields take defaults.
    pub fn from_toml(raw: &str) -> Result<Self, ConfigError> {
        toml::from_str(raw).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Load from a specific file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(format!("{}: {}", path.display(), e)))?;
        Self::from_toml(&raw)
    }

    /// Load the first candidate config file that exists, or defaults when
    /// none does.
    pub fn load_or_default() -> Result<Self, ConfigError> {
        for candidate in CONFIG_CANDIDATES {
            let path = Path::new(candidate);
            if path.exists() {
                tracing::debug!("loading config from {}", candidate);
                return Self::from_file(path);
            }
        }
        Ok(EvalConfig::default())
    }

    /// Write the configuration as TOML.
    pub fn save_toml(&self, path: &Path) -> Result<(), ConfigError> {
        let raw =
            toml::to_string_pretty(self).map_err(|e| ConfigError::Serialize(e.to_string()))?;
        fs::write(path, raw).map_err(|e| ConfigError::Io(format!("{}: {}", path.display(), e)))
    }

    /// Scoring knobs in the shape the analysis layer takes.
    pub fn score_options(&self) -> ScoreOptions {
        ScoreOptions {
            use_extraction: self.scoring.use_extraction,
            use_token_f1: self.scoring.use_token_f1,
            strip_leading_articles: self.scoring.strip_leading_articles,
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Io(String),
    Parse(String),
    Serialize(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "config io error: {}", e),
            ConfigError::Parse(e) => write!(f, "config parse error: {}", e),
            ConfigError::Serialize(e) => write!(f, "config serialize error: {}", e),
        }
    }
}

impl std::error::Error for ConfigError {}
