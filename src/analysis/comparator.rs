//! Extraction impact analysis
//!
//! Replays a run twice, scoring raw responses and extracted answers side by
//! side, to show where extraction turns misses into hits and where it does
//! the opposite.

use serde::Serialize;

use crate::analysis::extract::extract_answer;
use crate::analysis::metrics::{score_answer, ScoreError, ScoreOptions};
use crate::samples::Sample;

/// Side-by-side result for one sample. Matches are judged on normalized
/// equality, the same relation the headline accuracy uses.
#[derive(Debug, Clone, Serialize)]
pub struct SampleComparison {
    pub sample_id: String,
    pub ground_truth: String,
    pub raw_answer: String,
    pub extracted_answer: String,
    pub extracted_by: String,
    pub raw_match: bool,
    pub extracted_match: bool,
}

impl SampleComparison {
    /// Extraction turned a miss into a hit.
    pub fn helped(&self) -> bool {
        self.extracted_match && !self.raw_match
    }

    /// Extraction turned a hit into a miss.
    pub fn hurt(&self) -> bool {
        self.raw_match && !self.extracted_match
    }
}

/// Run-level comparison of raw versus extracted scoring.
#[derive(Debug, Clone, Serialize)]
pub struct ComparisonReport {
    pub total_samples: usize,
    pub scored_samples: usize,
    pub raw_accuracy: f64,
    pub extracted_accuracy: f64,
    pub helped: usize,
    pub hurt: usize,
    /// Helped minus hurt; negative when extraction loses more than it wins.
    pub net_improvement: i64,
    /// Net improvement as a fraction of scored samples.
    pub improvement_rate: f64,
    pub samples: Vec<SampleComparison>,
}

/// Compares raw-response scoring against extracted-answer scoring.
#[derive(Debug, Clone, Default)]
pub struct ExtractionComparator {
    options: ScoreOptions,
}

impl ExtractionComparator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: ScoreOptions) -> Self {
        ExtractionComparator { options }
    }

    /// Compare one sample; `None` when there is no ground truth to compare
    /// against.
    pub fn compare_sample(&self, sample: &Sample) -> Option<SampleComparison> {
        let truth = sample.ground_truth.as_deref()?;

        let extraction = extract_answer(&sample.response_text);
        let raw = score_answer(&sample.response_text, truth, self.options);
        let extracted = score_answer(&extraction.text, truth, self.options);

        Some(SampleComparison {
            sample_id: sample.sample_id.clone(),
            ground_truth: truth.to_string(),
            raw_answer: sample.response_text.clone(),
            extracted_answer: extraction.text,
            extracted_by: extraction.strategy.as_str().to_string(),
            raw_match: raw.normalized_match,
            extracted_match: extracted.normalized_match,
        })
    }

    /// Compare every sample in a run. Samples without ground truth are
    /// skipped; an empty run is a usage error.
    pub fn compare_run(&self, samples: &[Sample]) -> Result<ComparisonReport, ScoreError> {
        if samples.is_empty() {
            return Err(ScoreError::EmptyRun);
        }

        let comparisons: Vec<SampleComparison> = samples
            .iter()
            .filter_map(|s| self.compare_sample(s))
            .collect();

        let scored = comparisons.len();
        let raw_hits = comparisons.iter().filter(|c| c.raw_match).count();
        let extracted_hits = comparisons.iter().filter(|c| c.extracted_match).count();
        let helped = comparisons.iter().filter(|c| c.helped()).count();
        let hurt = comparisons.iter().filter(|c| c.hurt()).count();

        let (raw_accuracy, extracted_accuracy, improvement_rate) = if scored > 0 {
            let denom = scored as f64;
            (
                raw_hits as f64 / denom,
                extracted_hits as f64 / denom,
                (helped as f64 - hurt as f64) / denom,
            )
        } else {
            (0.0, 0.0, 0.0)
        };

        Ok(ComparisonReport {
            total_samples: samples.len(),
            scored_samples: scored,
            raw_accuracy,
            extracted_accuracy,
            helped,
            hurt,
            net_improvement: helped as i64 - hurt as i64,
            improvement_rate,
            samples: comparisons,
        })
    }
}
