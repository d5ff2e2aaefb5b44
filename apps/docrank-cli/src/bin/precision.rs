use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use docrank_cli::init_tracing;
use docrank_core::answers::AnswerFile;
use docrank_core::dataset::load_ground_truths;
use docrank_core::precision::calculate_precision;

/// Score an answer file against the ground truth.
#[derive(Debug, Parser)]
#[command(name = "docrank-precision", version)]
struct Cli {
    #[arg(long)]
    ground_truth_path: PathBuf,
    #[arg(long)]
    prediction_path: PathBuf,
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let truths = load_ground_truths(&cli.ground_truth_path)
        .with_context(|| format!("reading {}", cli.ground_truth_path.display()))?;
    let predictions = AnswerFile::read(&cli.prediction_path)
        .with_context(|| format!("reading {}", cli.prediction_path.display()))?;
    let report = calculate_precision(&truths, &predictions.answers)?;

    for (category, misses) in &report.misses {
        println!("[{}] {} wrong", category, misses.len());
        for miss in misses {
            println!("  qid={} expected={} predicted={}", miss.truth.qid, miss.truth.retrieve, miss.predicted.retrieve);
        }
    }
    println!("Correct: {}/{}", report.correct, report.total);
    println!("Precision: {:.4}", report.precision());
    Ok(())
}
