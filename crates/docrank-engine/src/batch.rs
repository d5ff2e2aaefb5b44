//! Answer every question of a dataset and name the resulting file.

use indicatif::{ProgressBar, ProgressStyle};

use docrank_core::answers::AnswerFile;
use docrank_core::dataset::Dataset;
use docrank_core::error::Result;
use docrank_core::traits::Scorer;

use crate::retriever::Retriever;
use crate::strategy::StrategyKind;

/// `bm25.json`, or `<strategy>_<model>.json` with `/` and `-` in the model
/// name replaced by `_`.
pub fn output_file_name(kind: StrategyKind, model: Option<&str>) -> String {
    match model.map(str::trim).filter(|m| !m.is_empty()) {
        Some(model) => format!("{}_{}.json", kind, model.replace(['/', '-'], "_")),
        None => format!("{}.json", kind),
    }
}

fn progress_bar(len: usize, show: bool) -> ProgressBar {
    if !show {
        return ProgressBar::hidden();
    }
    let pb = ProgressBar::new(len as u64);
    let style = ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} questions ({percent}%) {msg}")
        .map(|s| s.progress_chars("#>-"))
        .unwrap_or_else(|_| ProgressStyle::default_bar());
    pb.set_style(style);
    pb
}

/// Answer each question in order. The first failure aborts the run.
pub fn answer_dataset<S: Scorer>(retriever: &Retriever<S>, dataset: &Dataset, show_progress: bool) -> Result<AnswerFile> {
    let pb = progress_bar(dataset.len(), show_progress);
    let mut answers = AnswerFile::new();
    for sample in dataset.samples() {
        let sample = sample?;
        pb.set_message(format!("qid {}", sample.qid));
        answers.push(retriever.retrieve_sample(&sample)?);
        pb.inc(1);
    }
    pb.finish_with_message("done");
    tracing::info!(answered = answers.len(), "Dataset answered");
    Ok(answers)
}

/// Same as [`answer_dataset`], scoring each question's candidates
/// concurrently. Questions are still answered one at a time.
pub async fn answer_dataset_concurrent<S: Scorer + 'static>(
    retriever: &Retriever<S>,
    dataset: &Dataset,
    show_progress: bool,
) -> Result<AnswerFile> {
    let pb = progress_bar(dataset.len(), show_progress);
    let mut answers = AnswerFile::new();
    for sample in dataset.samples() {
        let sample = sample?;
        pb.set_message(format!("qid {}", sample.qid));
        answers.push(retriever.retrieve_sample_concurrent(&sample).await?);
        pb.inc(1);
    }
    pb.finish_with_message("done");
    tracing::info!(answered = answers.len(), "Dataset answered");
    Ok(answers)
}
