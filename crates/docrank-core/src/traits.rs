use crate::error::Result;
use crate::types::{Embedding, Score};

/// Capability shared by every ranking strategy.
///
/// `score_chunks` returns the best chunk score of one document, or
/// `minimum_score()` when there is nothing to score. Chunks that fail to
/// encode are skipped, not reported.
pub trait Scorer: Send + Sync {
    fn minimum_score(&self) -> Score;

    fn score_chunks(&self, query: &str, chunks: &[&str]) -> Result<Score>;

    fn best_of(&self, query: &str, chunks: &[&str]) -> Result<Score> {
        self.score_chunks(query, chunks)
    }

    /// One score per whole document, in input order, without chunking.
    ///
    /// Scorers whose scores depend on the collection (BM25 document
    /// frequencies) override this to score all documents together. A
    /// document that fails to encode gets `minimum_score()`.
    fn score_documents(&self, query: &str, documents: &[&str]) -> Result<Vec<Score>> {
        documents.iter().map(|doc| self.score_chunks(query, &[*doc])).collect()
    }
}

/// Dense sentence encoder.
///
/// The outer `Result` carries backend failures. Each inner entry is either a
/// unit-normalized vector of length `dim()` or `Error::Encoding` for a text
/// that produced no usable tokens.
pub trait Embedder: Send + Sync {
    fn dim(&self) -> usize;
    fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Result<Embedding>>>;
}

/// Joint (query, passage) relevance model producing one normalized score per pair.
pub trait PairScorer: Send + Sync {
    fn score_pairs(&self, query: &str, passages: &[&str]) -> Result<Vec<Result<Score>>>;
}

/// Max over scores, with `None` when the iterator is empty.
///
/// NaN never wins against a real number.
pub fn max_score<I: IntoIterator<Item = Score>>(scores: I) -> Option<Score> {
    scores.into_iter().fold(None, |best, s| match best {
        None => Some(s),
        Some(b) if s > b || b.is_nan() => Some(s),
        Some(b) => Some(b),
    })
}
