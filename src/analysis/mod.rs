//! Answer analysis: extraction, normalization, scoring, and extraction
//! impact comparison.

pub mod comparator;
pub mod extract;
pub mod metrics;
pub mod normalize;

pub use comparator::{ComparisonReport, ExtractionComparator, SampleComparison};
pub use extract::{extract_answer, Extraction, Strategy};
pub use metrics::{
    score_answer, score_run, token_f1, RunSummary, SampleScore, ScoreError, ScoreOptions,
    ScoreResult,
};
pub use normalize::normalize_answer;
