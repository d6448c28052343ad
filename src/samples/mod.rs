//! Run samples and their on-disk sources.
//!
//! A run is one pass of a vision model over the rebus image set; its
//! results land in a timestamped directory under the logs root. This
//! module loads those results into [`Sample`] values and handles the
//! ground-truth annotation table that accompanies the image set.

pub mod annotations;
pub mod loader;

pub use annotations::{check_dataset, load_annotations, DatasetReport};
pub use loader::{latest_run, list_runs, load_run, LoadError, RunInfo};

use serde::{Deserialize, Serialize};

/// Prefix marking a response that records a generation failure rather than
/// model output.
pub const ERROR_PREFIX: &str = "ERROR:";

/// One scored unit of a run: a model response paired with the ground-truth
/// answer for its puzzle, when one is known.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sample {
    pub sample_id: String,
    pub response_text: String,
    pub ground_truth: Option<String>,
}

impl Sample {
    pub fn new(
        sample_id: impl Into<String>,
        response_text: impl Into<String>,
        ground_truth: Option<String>,
    ) -> Self {
        Sample {
            sample_id: sample_id.into(),
            response_text: response_text.into(),
            ground_truth,
        }
    }

    /// Whether the sample can enter scoring aggregates.
    pub fn is_scorable(&self) -> bool {
        self.ground_truth.is_some()
    }

    /// Whether the response records a generation failure instead of model
    /// output.
    pub fn is_generation_error(&self) -> bool {
        self.response_text.starts_with(ERROR_PREFIX)
    }
}

/// On-disk shape of one entry in a run's `results.json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunRecord {
    pub image_id: String,
    #[serde(default)]
    pub ground_truth: Option<String>,
    pub prediction: String,
}

impl From<RunRecord> for Sample {
    /// A blank ground-truth string counts as missing, matching the
    /// annotation loader's treatment of empty rows.
    fn from(record: RunRecord) -> Self {
        let ground_truth = record.ground_truth.filter(|t| !t.trim().is_empty());
        Sample {
            sample_id: record.image_id,
            response_text: record.prediction,
            ground_truth,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generation_error_detection() {
        let err = Sample::new("r1", "ERROR: request timed out", None);
        assert!(err.is_generation_error());

        let ok = Sample::new("r2", "{{{break the ice}}}", None);
        assert!(!ok.is_generation_error());
    }

    #[test]
    fn test_scorable_requires_ground_truth() {
        assert!(Sample::new("r1", "x", Some("y".into())).is_scorable());
        assert!(!Sample::new("r2", "x", None).is_scorable());
    }

    #[test]
    fn test_record_conversion_blank_truth() {
        let record = RunRecord {
            image_id: "rebus_001".into(),
            ground_truth: Some("   ".into()),
            prediction: "{{{break the ice}}}".into(),
        };

        let sample = Sample::from(record);
        assert_eq!(sample.sample_id, "rebus_001");
        assert!(sample.ground_truth.is_none());
    }
}
