//! Run log discovery and loading.

use std::fs;
use std::path::Path;

use thiserror::Error;

use super::{RunRecord, Sample};

/// Timestamp layout used for run directory names, e.g. `20250614_174002`.
pub const RUN_KEY_FORMAT: &str = "%Y%m%d_%H%M%S";

/// Errors raised while locating or reading run data.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("parse error: {0}")]
    Parse(String),
    #[error("missing column {0:?} in annotation header")]
    MissingField(String),
    #[error("no results.json under {0}")]
    MissingResults(String),
    #[error("no runs found under {0}")]
    NoRuns(String),
}

/// Directory listing entry for one run.
#[derive(Debug, Clone)]
pub struct RunInfo {
    pub timestamp: String,
    /// Sample count, when results.json is present and readable.
    pub samples: Option<usize>,
    /// Whether the run already has a saved metrics.json.
    pub has_metrics: bool,
}

/// Load the samples of one run from `<logs_dir>/<timestamp>/results.json`.
pub fn load_run(logs_dir: &Path, timestamp: &str) -> Result<Vec<Sample>, LoadError> {
    let path = logs_dir.join(timestamp).join("results.json");
    if !path.exists() {
        return Err(LoadError::MissingResults(path.display().to_string()));
    }

    let raw = fs::read_to_string(&path)?;
    let records: Vec<RunRecord> = serde_json::from_str(&raw)
        .map_err(|e| LoadError::Parse(format!("{}: {}", path.display(), e)))?;

    tracing::info!("loaded {} samples from {}", records.len(), path.display());
    Ok(records.into_iter().map(Sample::from).collect())
}

/// List run directories under `logs_dir`, newest first.
///
/// Entries whose names do not parse as run timestamps are skipped, so
/// scratch directories next to the runs stay invisible.
pub fn list_runs(logs_dir: &Path) -> Result<Vec<RunInfo>, LoadError> {
    let mut runs = Vec::new();

    for entry in fs::read_dir(logs_dir)? {
        let entry = entry?;
        let path = entry.path();
        if !path.is_dir() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().into_owned();
        if !is_run_key(&name) {
            tracing::debug!("skipping non-run directory {}", name);
            continue;
        }

        let samples = fs::read_to_string(path.join("results.json"))
            .ok()
            .and_then(|raw| serde_json::from_str::<Vec<RunRecord>>(&raw).ok())
            .map(|records| records.len());
        let has_metrics = path.join("metrics.json").exists();

        runs.push(RunInfo {
            timestamp: name,
            samples,
            has_metrics,
        });
    }

    // The key format is fixed-width, so the lexicographic order is the
    // chronological one.
    runs.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    Ok(runs)
}

/// Timestamp of the most recent run under `logs_dir`.
pub fn latest_run(logs_dir: &Path) -> Result<String, LoadError> {
    let runs = list_runs(logs_dir)?;
    runs.into_iter()
        .next()
        .map(|run| run.timestamp)
        .ok_or_else(|| LoadError::NoRuns(logs_dir.display().to_string()))
}

fn is_run_key(name: &str) -> bool {
    chrono::NaiveDateTime::parse_from_str(name, RUN_KEY_FORMAT).is_ok()
}
