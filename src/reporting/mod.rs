//! Console and JSON reporting.

use std::fs;
use std::io;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::analysis::{ComparisonReport, RunSummary, ScoreOptions};
use crate::samples::{DatasetReport, RunInfo};

/// Metrics document written next to a run's results.
#[derive(Debug, Clone, Serialize)]
pub struct MetricsFile {
    /// Run timestamp the metrics belong to.
    pub run: String,
    pub generated_at: DateTime<Utc>,
    pub options: ScoreOptions,
    #[serde(flatten)]
    pub summary: RunSummary,
}

impl MetricsFile {
    pub fn new(
        run: &str,
        options: ScoreOptions,
        mut summary: RunSummary,
        include_breakdown: bool,
    ) -> Self {
        if !include_breakdown {
            summary.breakdown.clear();
        }
        MetricsFile {
            run: run.to_string(),
            generated_at: Utc::now(),
            options,
            summary,
        }
    }

    /// Serialize to pretty JSON and write to `path`.
    pub fn write_to_file(&self, path: &Path) -> io::Result<()> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        fs::write(path, json)
    }
}

/// Extraction comparison document for the debug dump.
#[derive(Debug, Clone, Serialize)]
pub struct ComparisonDump {
    pub run: String,
    pub generated_at: DateTime<Utc>,
    #[serde(flatten)]
    pub report: ComparisonReport,
}

impl ComparisonDump {
    pub fn new(run: &str, report: ComparisonReport) -> Self {
        ComparisonDump {
            run: run.to_string(),
            generated_at: Utc::now(),
            report,
        }
    }

    pub fn write_to_file(&self, path: &Path) -> io::Result<()> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        fs::write(path, json)
    }
}

/// Print the run summary to stdout.
pub fn print_console_report(
    run: &str,
    options: ScoreOptions,
    summary: &RunSummary,
    show_breakdown: bool,
) {
    println!();
    println!("=== Evaluation: {} ===", run);
    println!("{:-<50}", "");
    println!("Total samples:      {}", summary.total_samples);
    println!("Scored samples:     {}", summary.scored_samples);
    if summary.unscorable_samples > 0 {
        println!("Unscorable:         {}", summary.unscorable_samples);
    }
    if summary.generation_errors > 0 {
        println!("Generation errors:  {}", summary.generation_errors);
    }
    println!("{:-<50}", "");
    println!(
        "Exact match:        {:>5.1}%  ({}/{})",
        summary.exact_match_accuracy * 100.0,
        summary.exact_matches,
        summary.scored_samples
    );
    println!(
        "Normalized match:   {:>5.1}%  ({}/{})",
        summary.normalized_accuracy * 100.0,
        summary.normalized_matches,
        summary.scored_samples
    );
    if let Some(f1) = summary.mean_token_f1 {
        println!("Mean token F1:      {:.3}", f1);
    }
    println!(
        "Extraction:         {}",
        if options.use_extraction { "on" } else { "off" }
    );
    println!("{:-<50}", "");

    if show_breakdown && !summary.breakdown.is_empty() {
        println!();
        println!("Per-sample breakdown:");
        for entry in &summary.breakdown {
            let mark = match &entry.score {
                Some(s) if s.normalized_match => "ok  ",
                Some(_) => "MISS",
                None => "skip",
            };
            let extracted = entry.extracted_answer.as_deref().unwrap_or("-");
            match entry.extracted_by.as_deref() {
                Some(by) => {
                    println!("  [{}] {:<24} {} ({})", mark, entry.sample_id, extracted, by)
                }
                None => println!("  [{}] {:<24} {}", mark, entry.sample_id, extracted),
            }
        }
    }
}

/// Print the aggregate block of an extraction comparison.
pub fn print_comparison_report(run: &str, report: &ComparisonReport) {
    println!();
    println!("=== Extraction impact: {} ===", run);
    println!("{:-<50}", "");
    println!("Total samples:      {}", report.total_samples);
    println!("Scored samples:     {}", report.scored_samples);
    println!("{:-<50}", "");
    println!("Raw accuracy:       {:>5.1}%", report.raw_accuracy * 100.0);
    println!(
        "Extracted accuracy: {:>5.1}%",
        report.extracted_accuracy * 100.0
    );
    println!("Helped:             {}", report.helped);
    println!("Hurt:               {}", report.hurt);
    println!("Net improvement:    {:+}", report.net_improvement);
    println!(
        "Improvement rate:   {:+.1}%",
        report.improvement_rate * 100.0
    );
    println!("{:-<50}", "");
}

/// Print the run listing, newest first.
pub fn print_run_listing(runs: &[RunInfo]) {
    println!();
    println!("=== Runs ===");
    println!("{:-<50}", "");
    for run in runs {
        let samples = match run.samples {
            Some(n) => format!("{} samples", n),
            None => "unreadable".to_string(),
        };
        let metrics = if run.has_metrics {
            "metrics saved"
        } else {
            "no metrics"
        };
        println!("{}  {:>14}  {}", run.timestamp, samples, metrics);
    }
    println!("{:-<50}", "");
    println!("{} run(s)", runs.len());
}

/// Print the dataset hygiene report.
pub fn print_dataset_report(report: &DatasetReport) {
    println!();
    println!("=== Dataset ===");
    println!("{:-<50}", "");
    println!("Images on disk:     {}", report.images.len());
    println!("Annotated:          {}", report.annotated);
    println!("Missing annotation: {}", report.missing_annotation.len());
    println!("Orphan annotations: {}", report.orphan_annotations.len());
    if !report.missing_annotation.is_empty() {
        println!("{:-<50}", "");
        println!("Images without annotation:");
        for stem in &report.missing_annotation {
            println!("  {}", stem);
        }
    }
    if !report.orphan_annotations.is_empty() {
        println!("{:-<50}", "");
        println!("Annotations without image:");
        for key in &report.orphan_annotations {
            println!("  {}", key);
        }
    }
    println!("{:-<50}", "");
}
