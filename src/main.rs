//! Command-line interface for evaluating rebus puzzle runs.

use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

use rebus_eval::analysis::{score_run, ExtractionComparator, SampleComparison};
use rebus_eval::config::EvalConfig;
use rebus_eval::reporting::{
    print_comparison_report, print_console_report, print_dataset_report, print_run_listing,
    ComparisonDump, MetricsFile,
};
use rebus_eval::samples::{check_dataset, latest_run, list_runs, load_run, LoadError};

#[derive(Parser)]
#[command(name = "rebus-eval", version, about = "Score rebus puzzle runs")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file path; the default locations are searched when omitted.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging.
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Score a run and report accuracy.
    Evaluate {
        /// Run timestamp; the latest run when omitted.
        #[arg(long)]
        timestamp: Option<String>,
        /// Override the logs directory.
        #[arg(long)]
        logs_dir: Option<PathBuf>,
        /// Compute token-level F1 as well.
        #[arg(long)]
        use_f1: bool,
        /// Score raw responses without extraction.
        #[arg(long)]
        no_extraction: bool,
        /// Evaluate only the first N samples.
        #[arg(long)]
        sample_size: Option<usize>,
        /// Print the per-sample breakdown.
        #[arg(long)]
        breakdown: bool,
        /// Skip writing metrics into the run directory.
        #[arg(long)]
        no_save: bool,
    },
    /// Compare raw scoring against extracted scoring.
    Compare {
        /// Run timestamp; the latest run when omitted.
        #[arg(long)]
        timestamp: Option<String>,
        #[arg(long)]
        logs_dir: Option<PathBuf>,
        /// Compare only the first N samples.
        #[arg(long)]
        sample_size: Option<usize>,
    },
    /// Inspect extraction decisions sample by sample.
    Debug {
        /// Run timestamp; the latest run when omitted.
        #[arg(long)]
        timestamp: Option<String>,
        #[arg(long)]
        logs_dir: Option<PathBuf>,
        /// Which samples to show.
        #[arg(long, value_enum, default_value = "all")]
        show: ShowFilter,
        /// Maximum samples to print.
        #[arg(long, default_value_t = 10)]
        max_samples: usize,
        /// Also write the full comparison as JSON to this path.
        #[arg(long)]
        save: Option<PathBuf>,
    },
    /// List runs under the logs directory.
    ListRuns {
        #[arg(long)]
        logs_dir: Option<PathBuf>,
    },
    /// Cross-check images on disk against the annotation table.
    CheckDataset {
        #[arg(long)]
        images_dir: Option<PathBuf>,
        #[arg(long)]
        annotations: Option<PathBuf>,
    },
    /// Write a config file with the default settings.
    InitConfig {
        /// Destination path.
        #[arg(long, default_value = "rebus-eval.toml")]
        output: PathBuf,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ShowFilter {
    All,
    Helped,
    Hurt,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("rebus_eval=debug,info")
    } else {
        EnvFilter::new("rebus_eval=info,warn")
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    let config = match &cli.config {
        Some(path) => EvalConfig::from_file(path)?,
        None => EvalConfig::load_or_default()?,
    };

    match cli.command {
        Commands::Evaluate {
            timestamp,
            logs_dir,
            use_f1,
            no_extraction,
            sample_size,
            breakdown,
            no_save,
        } => {
            let logs_dir = logs_dir.unwrap_or_else(|| PathBuf::from(&config.data.logs_dir));
            let run = resolve_run(&logs_dir, timestamp)?;
            let mut samples = load_run(&logs_dir, &run)?;
            if let Some(n) = sample_size {
                samples.truncate(n);
            }
            if samples.is_empty() {
                eprintln!("run {} has no samples to evaluate", run);
                process::exit(1);
            }

            let mut options = config.score_options();
            if use_f1 {
                options.use_token_f1 = true;
            }
            if no_extraction {
                options.use_extraction = false;
            }

            let summary = score_run(&samples, options)?;
            print_console_report(
                &run,
                options,
                &summary,
                breakdown || config.output.include_breakdown,
            );

            if config.output.save_metrics && !no_save {
                let path = logs_dir.join(&run).join(&config.output.metrics_filename);
                let metrics =
                    MetricsFile::new(&run, options, summary, config.output.include_breakdown);
                metrics.write_to_file(&path)?;
                println!("Metrics written to {}", path.display());
            }
        }

        Commands::Compare {
            timestamp,
            logs_dir,
            sample_size,
        } => {
            let logs_dir = logs_dir.unwrap_or_else(|| PathBuf::from(&config.data.logs_dir));
            let run = resolve_run(&logs_dir, timestamp)?;
            let mut samples = load_run(&logs_dir, &run)?;
            if let Some(n) = sample_size {
                samples.truncate(n);
            }
            if samples.is_empty() {
                eprintln!("run {} has no samples to compare", run);
                process::exit(1);
            }

            let comparator = ExtractionComparator::with_options(config.score_options());
            let report = comparator.compare_run(&samples)?;
            print_comparison_report(&run, &report);
        }

        Commands::Debug {
            timestamp,
            logs_dir,
            show,
            max_samples,
            save,
        } => {
            let logs_dir = logs_dir.unwrap_or_else(|| PathBuf::from(&config.data.logs_dir));
            let run = resolve_run(&logs_dir, timestamp)?;
            let samples = load_run(&logs_dir, &run)?;
            if samples.is_empty() {
                eprintln!("run {} has no samples to inspect", run);
                process::exit(1);
            }

            let comparator = ExtractionComparator::with_options(config.score_options());
            let report = comparator.compare_run(&samples)?;
            print_comparison_report(&run, &report);

            let shown: Vec<&SampleComparison> = report
                .samples
                .iter()
                .filter(|c| match show {
                    ShowFilter::All => true,
                    ShowFilter::Helped => c.helped(),
                    ShowFilter::Hurt => c.hurt(),
                })
                .take(max_samples)
                .collect();

            for c in &shown {
                println!();
                println!("[{}] truth: {}", c.sample_id, c.ground_truth);
                println!(
                    "  raw       ({}): {}",
                    mark(c.raw_match),
                    truncate_text(&c.raw_answer, 120)
                );
                println!(
                    "  extracted ({}): {} [{}]",
                    mark(c.extracted_match),
                    c.extracted_answer,
                    c.extracted_by
                );
                if c.helped() {
                    println!("  extraction helped");
                } else if c.hurt() {
                    println!("  extraction hurt");
                }
            }
            if shown.is_empty() {
                println!();
                println!("No samples match the filter.");
            }

            if let Some(path) = save {
                let dump = ComparisonDump::new(&run, report);
                dump.write_to_file(&path)?;
                println!();
                println!("Comparison written to {}", path.display());
            }
        }

        Commands::ListRuns { logs_dir } => {
            let logs_dir = logs_dir.unwrap_or_else(|| PathBuf::from(&config.data.logs_dir));
            let runs = list_runs(&logs_dir)?;
            if runs.is_empty() {
                eprintln!("no runs under {}", logs_dir.display());
                process::exit(1);
            }
            print_run_listing(&runs);
        }

        Commands::CheckDataset {
            images_dir,
            annotations,
        } => {
            let images_dir = images_dir.unwrap_or_else(|| PathBuf::from(&config.data.images_dir));
            let annotations =
                annotations.unwrap_or_else(|| PathBuf::from(&config.data.annotations));
            let report = check_dataset(&images_dir, &annotations)?;
            print_dataset_report(&report);
        }

        Commands::InitConfig { output } => {
            if output.exists() {
                eprintln!("{} already exists", output.display());
                process::exit(1);
            }
            EvalConfig::default().save_toml(&output)?;
            println!("Config written to {}", output.display());
        }
    }

    Ok(())
}

/// Use the given timestamp or fall back to the newest run on disk.
fn resolve_run(logs_dir: &Path, timestamp: Option<String>) -> Result<String, LoadError> {
    match timestamp {
        Some(t) => Ok(t),
        None => latest_run(logs_dir),
    }
}

fn mark(hit: bool) -> &'static str {
    if hit {
        "hit"
    } else {
        "miss"
    }
}

/// Flatten newlines and cap display length for raw responses.
fn truncate_text(text: &str, max_chars: usize) -> String {
    let flat = text.replace('\n', " ");
    if flat.chars().count() <= max_chars {
        flat
    } else {
        let cut: String = flat.chars().take(max_chars).collect();
        format!("{}...", cut)
    }
}
