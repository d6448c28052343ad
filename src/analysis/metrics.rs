//! Scoring and aggregation
//!
//! Compares predicted answers against ground truth at three levels of
//! strictness (raw equality, normalized equality, token overlap) and rolls
//! per-sample results up into run-level metrics.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::analysis::extract::extract_answer;
use crate::analysis::normalize::normalize_answer;
use crate::samples::Sample;

/// Errors from scoring a run.
#[derive(Debug, Error)]
pub enum ScoreError {
    /// The run contained no samples at all. Distinct from a run where every
    /// sample lacks ground truth, which scores normally with empty
    /// aggregates.
    #[error("run contains no samples")]
    EmptyRun,
}

/// Knobs controlling how a run is scored.
///
/// Callers pass these explicitly; nothing is read from the environment or
/// global state, so two calls with equal options always agree.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ScoreOptions {
    /// Run answer extraction on each response before comparing. When off,
    /// the raw response text is compared as-is.
    #[serde(default = "default_true")]
    pub use_extraction: bool,
    /// Also compute token-level F1 overlap per sample.
    #[serde(default)]
    pub use_token_f1: bool,
    /// Drop leading articles ("a", "an", "the") during normalization.
    #[serde(default)]
    pub strip_leading_articles: bool,
}

impl Default for ScoreOptions {
    fn default() -> Self {
        ScoreOptions {
            use_extraction: true,
            use_token_f1: false,
            strip_leading_articles: false,
        }
    }
}

fn default_true() -> bool {
    true
}

/// Outcome of comparing one predicted answer against its ground truth.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreResult {
    /// Trimmed string equality before any normalization.
    pub exact_match: bool,
    /// Equality after normalization.
    pub normalized_match: bool,
    /// Token-level F1 overlap, present when requested.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_f1: Option<f64>,
}

/// Per-sample record kept for breakdown output and debugging.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SampleScore {
    pub sample_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extracted_answer: Option<String>,
    /// Name of the extraction strategy that produced the answer.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extracted_by: Option<String>,
    /// Ground truth was missing; the sample is excluded from aggregates.
    #[serde(default)]
    pub unscorable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<ScoreResult>,
}

/// Aggregated metrics for one run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    pub total_samples: usize,
    /// Samples with ground truth that entered the aggregates.
    pub scored_samples: usize,
    pub unscorable_samples: usize,
    /// Responses carrying the generation error marker.
    pub generation_errors: usize,
    pub exact_matches: usize,
    pub normalized_matches: usize,
    pub exact_match_accuracy: f64,
    pub normalized_accuracy: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mean_token_f1: Option<f64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub breakdown: Vec<SampleScore>,
}

/// Score one predicted answer against its ground truth.
pub fn score_answer(predicted: &str, ground_truth: &str, options: ScoreOptions) -> ScoreResult {
    let exact_match = predicted.trim() == ground_truth.trim();

    let norm_pred = normalize_answer(predicted, options.strip_leading_articles);
    let norm_truth = normalize_answer(ground_truth, options.strip_leading_articles);
    let normalized_match = norm_pred == norm_truth;

    let token_f1 = if options.use_token_f1 {
        Some(token_f1(&norm_pred, &norm_truth))
    } else {
        None
    };

    ScoreResult {
        exact_match,
        normalized_match,
        token_f1,
    }
}

/// Harmonic mean of token precision and recall over whitespace tokens,
/// counting repeated tokens once per occurrence shared by both sides.
///
/// Two empty strings count as full agreement (1.0); an empty string against
/// a non-empty one scores 0.0.
pub fn token_f1(predicted: &str, ground_truth: &str) -> f64 {
    let pred_tokens: Vec<&str> = predicted.split_whitespace().collect();
    let truth_tokens: Vec<&str> = ground_truth.split_whitespace().collect();

    if pred_tokens.is_empty() && truth_tokens.is_empty() {
        return 1.0;
    }
    if pred_tokens.is_empty() || truth_tokens.is_empty() {
        return 0.0;
    }

    let overlap = count_overlap(&pred_tokens, &truth_tokens);
    if overlap == 0 {
        return 0.0;
    }

    let precision = overlap as f64 / pred_tokens.len() as f64;
    let recall = overlap as f64 / truth_tokens.len() as f64;
    2.0 * precision * recall / (precision + recall)
}

/// Multiset intersection size between two token lists.
fn count_overlap(pred: &[&str], truth: &[&str]) -> usize {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for &token in truth {
        *counts.entry(token).or_insert(0) += 1;
    }

    let mut overlap = 0;
    for &token in pred {
        if let Some(n) = counts.get_mut(token) {
            if *n > 0 {
                *n -= 1;
                overlap += 1;
            }
        }
    }
    overlap
}

/// Score every sample in a run and aggregate the results.
///
/// Samples without ground truth are recorded as unscorable and left out of
/// every aggregate; the run itself still succeeds. A run with no samples at
/// all is a usage error.
pub fn score_run(samples: &[Sample], options: ScoreOptions) -> Result<RunSummary, ScoreError> {
    if samples.is_empty() {
        return Err(ScoreError::EmptyRun);
    }

    let mut breakdown = Vec::with_capacity(samples.len());
    let mut scored = 0usize;
    let mut unscorable = 0usize;
    let mut generation_errors = 0usize;
    let mut exact = 0usize;
    let mut normalized = 0usize;
    let mut f1_sum = 0.0f64;

    for sample in samples {
        if sample.is_generation_error() {
            generation_errors += 1;
        }

        let truth = match sample.ground_truth.as_deref() {
            Some(t) => t,
            None => {
                tracing::warn!(
                    "sample {} has no ground truth; excluded from metrics",
                    sample.sample_id
                );
                unscorable += 1;
                breakdown.push(SampleScore {
                    sample_id: sample.sample_id.clone(),
                    extracted_answer: None,
                    extracted_by: None,
                    unscorable: true,
                    score: None,
                });
                continue;
            }
        };

        let (predicted, extracted_by) = if options.use_extraction {
            let extraction = extract_answer(&sample.response_text);
            let by = extraction.strategy.as_str().to_string();
            (extraction.text, Some(by))
        } else {
            (sample.response_text.clone(), None)
        };

        let score = score_answer(&predicted, truth, options);
        scored += 1;
        if score.exact_match {
            exact += 1;
        }
        if score.normalized_match {
            normalized += 1;
        }
        if let Some(f1) = score.token_f1 {
            f1_sum += f1;
        }

        let extracted_answer = if options.use_extraction {
            Some(predicted)
        } else {
            None
        };
        breakdown.push(SampleScore {
            sample_id: sample.sample_id.clone(),
            extracted_answer,
            extracted_by,
            unscorable: false,
            score: Some(score),
        });
    }

    let mut summary = RunSummary {
        total_samples: samples.len(),
        scored_samples: scored,
        unscorable_samples: unscorable,
        generation_errors,
        exact_matches: exact,
        normalized_matches: normalized,
        exact_match_accuracy: 0.0,
        normalized_accuracy: 0.0,
        mean_token_f1: None,
        breakdown,
    };

    if scored > 0 {
        let denom = scored as f64;
        summary.exact_match_accuracy = exact as f64 / denom;
        summary.normalized_accuracy = normalized as f64 / denom;
        if options.use_token_f1 {
            summary.mean_token_f1 = Some(f1_sum / denom);
        }
    }

    Ok(summary)
}
