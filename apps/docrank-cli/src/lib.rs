//! Shared plumbing for the docrank binaries.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use tracing_subscriber::EnvFilter;

use docrank_core::config::Settings;
use docrank_core::dataset::Dataset;
use docrank_engine::{
    answer_dataset, answer_dataset_concurrent, output_file_name, RetrievalMode, Retriever, Strategy, StrategyKind,
};

/// Log to stderr, filtered by `RUST_LOG` (default `info`).
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).with_target(false).with_writer(std::io::stderr).init();
}

#[derive(Debug, Clone, Args)]
pub struct RetrieveArgs {
    /// Question file ({"questions": [...]})
    #[arg(long)]
    pub question_path: PathBuf,
    /// Directory of per-category corpus files (<category>.json)
    #[arg(long)]
    pub source_dir: PathBuf,
    #[arg(long)]
    pub output_dir: PathBuf,
    /// bm25, biencoder, reranker or flag
    #[arg(long, default_value = "bm25")]
    pub strategy: StrategyKind,
    /// Hugging Face id or local directory; required by every strategy but bm25
    #[arg(long)]
    pub model_name: Option<String>,
    /// Chunk window in characters
    #[arg(long)]
    pub window: Option<usize>,
    /// Chunk overlap in characters
    #[arg(long)]
    pub overlap: Option<usize>,
    /// Candidates scored concurrently per question
    #[arg(long)]
    pub pool_size: Option<usize>,
    /// Per-question retrieval timeout
    #[arg(long)]
    pub timeout_secs: Option<u64>,
    /// Score each candidate as one document instead of by its best chunk
    #[arg(long)]
    pub whole_document: bool,
    /// Hide the progress bar
    #[arg(long)]
    pub quiet: bool,
}

impl RetrieveArgs {
    /// Command-line values take precedence over configuration.
    pub fn apply(&self, settings: &mut Settings) {
        if let Some(window) = self.window {
            settings.chunking.window = window;
        }
        if let Some(overlap) = self.overlap {
            settings.chunking.overlap = overlap;
        }
        if let Some(pool_size) = self.pool_size {
            settings.engine.pool_size = pool_size;
        }
        if self.timeout_secs.is_some() {
            settings.engine.timeout_secs = self.timeout_secs;
        }
        if self.whole_document {
            settings.engine.whole_document = true;
        }
    }
}

/// Answer every question and write the answer file; returns its path.
pub fn run_retrieve(args: &RetrieveArgs, mut settings: Settings) -> Result<PathBuf> {
    args.apply(&mut settings);
    settings.validate()?;
    let chunking = settings.chunking.chunk_config()?;

    let dataset = Dataset::load(&args.question_path, &args.source_dir)
        .with_context(|| format!("loading questions from {}", args.question_path.display()))?;
    tracing::info!(questions = dataset.len(), strategy = %args.strategy, "Dataset loaded");

    let strategy = Strategy::load(args.strategy, args.model_name.as_deref(), &settings.model)?;
    let mode = if settings.engine.whole_document { RetrievalMode::WholeDocument } else { RetrievalMode::Paragraph };
    let retriever = Retriever::new(strategy, chunking)
        .with_mode(mode)
        .with_pool_size(settings.engine.pool_size)
        .with_timeout(settings.engine.timeout());

    let answers = if retriever.pool_size() > 1 {
        let runtime = tokio::runtime::Runtime::new().context("starting tokio runtime")?;
        runtime.block_on(answer_dataset_concurrent(&retriever, &dataset, !args.quiet))?
    } else {
        answer_dataset(&retriever, &dataset, !args.quiet)?
    };

    let path = args.output_dir.join(output_file_name(args.strategy, args.model_name.as_deref()));
    answers.write(&path).with_context(|| format!("writing {}", path.display()))?;
    tracing::info!(path = %path.display(), answers = answers.len(), "Answers written");
    Ok(path)
}
