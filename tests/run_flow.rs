//! End-to-end flow over a run directory on disk: write results, load them,
//! score them, and check the artifacts land where the CLI expects them.

use std::fs;
use std::path::Path;

use rebus_eval::analysis::{score_run, ExtractionComparator, ScoreOptions};
use rebus_eval::reporting::MetricsFile;
use rebus_eval::samples::{latest_run, list_runs, load_run};

const RESULTS: &str = r#"[
  {
    "image_id": "rebus_001",
    "ground_truth": "break the ice",
    "prediction": "Looking at the image, ice with a pick next to it. The idiom is: \"break the ice\""
  },
  {
    "image_id": "rebus_002",
    "ground_truth": "spill the beans",
    "prediction": "{{{spill the beans}}}"
  },
  {
    "image_id": "rebus_003",
    "ground_truth": "close shave",
    "prediction": "ERROR: request timed out"
  }
]"#;

fn write_results(root: &Path, stamp: &str, body: &str) {
    let dir = root.join(stamp);
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join("results.json"), body).unwrap();
}

#[test]
fn evaluate_run_from_disk() {
    let tmp = tempfile::tempdir().unwrap();
    write_results(tmp.path(), "20250614_174002", RESULTS);

    let samples = load_run(tmp.path(), "20250614_174002").unwrap();
    assert_eq!(samples.len(), 3);

    let options = ScoreOptions {
        use_token_f1: true,
        ..ScoreOptions::default()
    };
    let summary = score_run(&samples, options).unwrap();

    assert_eq!(summary.total_samples, 3);
    assert_eq!(summary.scored_samples, 3);
    assert_eq!(summary.generation_errors, 1);
    assert_eq!(summary.normalized_matches, 2);
    assert!((summary.normalized_accuracy - 2.0 / 3.0).abs() < 1e-9);
    assert!(summary.mean_token_f1.is_some());
}

#[test]
fn metrics_file_lands_in_run_dir() {
    let tmp = tempfile::tempdir().unwrap();
    write_results(tmp.path(), "20250614_174002", RESULTS);

    let samples = load_run(tmp.path(), "20250614_174002").unwrap();
    let summary = score_run(&samples, ScoreOptions::default()).unwrap();

    let path = tmp.path().join("20250614_174002").join("metrics.json");
    MetricsFile::new("20250614_174002", ScoreOptions::default(), summary, false)
        .write_to_file(&path)
        .unwrap();

    let runs = list_runs(tmp.path()).unwrap();
    assert_eq!(runs.len(), 1);
    assert!(runs[0].has_metrics);
    assert_eq!(runs[0].samples, Some(3));
}

#[test]
fn latest_run_resolves_newest() {
    let tmp = tempfile::tempdir().unwrap();
    write_results(tmp.path(), "20250614_174002", "[]");
    write_results(tmp.path(), "20250801_090500", RESULTS);

    let stamp = latest_run(tmp.path()).unwrap();
    assert_eq!(stamp, "20250801_090500");

    let samples = load_run(tmp.path(), &stamp).unwrap();
    assert_eq!(samples.len(), 3);
}

#[test]
fn comparison_over_loaded_run() {
    let tmp = tempfile::tempdir().unwrap();
    write_results(tmp.path(), "20250614_174002", RESULTS);

    let samples = load_run(tmp.path(), "20250614_174002").unwrap();
    let report = ExtractionComparator::new().compare_run(&samples).unwrap();

    assert_eq!(report.scored_samples, 3);
    // Only the verbose first response needs extraction to match; the brace
    // response matches raw as well once normalization strips the braces.
    assert_eq!(report.helped, 1);
    assert_eq!(report.hurt, 0);
    assert_eq!(report.net_improvement, 1);
}
