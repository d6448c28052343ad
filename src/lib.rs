//! Answer extraction and scoring for rebus puzzle runs.
//!
//! Vision models answer rebus puzzles in prose, burying the idiom inside
//! reasoning, markdown, and hedging. This crate pulls the intended answer
//! out of each response, compares it to ground truth at several levels of
//! strictness, and aggregates run-level accuracy.
//!
//! ```no_run
//! use rebus_eval::prelude::*;
//! use std::path::Path;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let samples = load_run(Path::new("logs"), "20250614_174002")?;
//! let summary = score_run(&samples, ScoreOptions::default())?;
//! println!("normalized accuracy: {:.3}", summary.normalized_accuracy);
//! # Ok(())
//! # }
//! ```

pub mod analysis;
pub mod config;
pub mod reporting;
pub mod samples;

pub use config::EvalConfig;

/// Common imports for typical callers.
pub mod prelude {
    pub use crate::analysis::{
        extract_answer, normalize_answer, score_run, ExtractionComparator, RunSummary,
        ScoreOptions,
    };
    pub use crate::config::EvalConfig;
    pub use crate::samples::{latest_run, list_runs, load_run, Sample};
}
