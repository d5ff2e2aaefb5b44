use docrank_core::error::{Error, Result};
use docrank_core::traits::{max_score, Embedder, PairScorer, Scorer};
use docrank_core::types::{Embedding, Score};

/// Query instruction used by BGE models for retrieval queries.
pub const BGE_QUERY_INSTRUCTION: &str = "为这个句子生成表示以用于检索相关文章：";

fn dot(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

/// `None` entries become the scorer's minimum.
fn or_minimum(scores: Vec<Option<Score>>, minimum: Score) -> Vec<Score> {
    scores.into_iter().map(|s| s.unwrap_or(minimum)).collect()
}

/// Bi-encoder scoring: cosine similarity between unit vectors.
pub struct EmbeddingScorer {
    embedder: Box<dyn Embedder>,
    query_instruction: Option<String>,
}

impl EmbeddingScorer {
    /// Cosine similarity never drops below -1.
    pub const MINIMUM_SCORE: Score = -2.0;

    pub fn new(embedder: Box<dyn Embedder>) -> Self {
        Self { embedder, query_instruction: None }
    }

    /// Prefix every query (not passages) with `instruction` before encoding.
    pub fn with_query_instruction(mut self, instruction: impl Into<String>) -> Self {
        self.query_instruction = Some(instruction.into());
        self
    }

    fn checked(&self, v: Embedding) -> Result<Embedding> {
        if v.len() != self.embedder.dim() {
            return Err(Error::Inference(format!("embedding has {} dims, expected {}", v.len(), self.embedder.dim())));
        }
        Ok(v)
    }

    /// Similarity of every chunk to the query; `None` for chunks that failed to encode.
    ///
    /// The query rides in the same `embed_batch` call as the chunks.
    pub fn chunk_scores(&self, query: &str, chunks: &[&str]) -> Result<Vec<Option<Score>>> {
        let query_text = match &self.query_instruction {
            Some(instruction) => format!("{}{}", instruction, query),
            None => query.to_string(),
        };
        let mut texts = Vec::with_capacity(chunks.len() + 1);
        texts.push(query_text.as_str());
        texts.extend_from_slice(chunks);

        let vectors = self.embedder.embed_batch(&texts)?;
        if vectors.len() != texts.len() {
            return Err(Error::Inference(format!("{} embeddings for {} texts", vectors.len(), texts.len())));
        }
        let mut vectors = vectors.into_iter();
        let query_vec = match vectors.next() {
            Some(Ok(v)) => self.checked(v)?,
            Some(Err(e)) => {
                tracing::warn!(error = %e, "query could not be encoded");
                return Ok(vec![None; chunks.len()]);
            }
            None => return Ok(vec![None; chunks.len()]),
        };
        vectors
            .enumerate()
            .map(|(i, v)| match v {
                Ok(v) => Ok(Some(dot(&query_vec, &self.checked(v)?))),
                Err(e) => {
                    tracing::warn!(chunk = i, error = %e, "skipping chunk");
                    Ok(None)
                }
            })
            .collect()
    }
}

impl Scorer for EmbeddingScorer {
    fn minimum_score(&self) -> Score { Self::MINIMUM_SCORE }

    fn score_chunks(&self, query: &str, chunks: &[&str]) -> Result<Score> {
        if chunks.is_empty() {
            return Ok(self.minimum_score());
        }
        let scores = self.chunk_scores(query, chunks)?;
        Ok(max_score(scores.into_iter().flatten()).unwrap_or(self.minimum_score()))
    }

    fn score_documents(&self, query: &str, documents: &[&str]) -> Result<Vec<Score>> {
        if documents.is_empty() {
            return Ok(Vec::new());
        }
        Ok(or_minimum(self.chunk_scores(query, documents)?, self.minimum_score()))
    }
}

/// Reranker scoring: each (query, chunk) pair goes through the model jointly.
pub struct CrossEncoderScorer {
    model: Box<dyn PairScorer>,
}

impl CrossEncoderScorer {
    /// Normalized pair scores live in `[0, 1]`.
    pub const MINIMUM_SCORE: Score = -1.0;

    pub fn new(model: Box<dyn PairScorer>) -> Self { Self { model } }

    pub fn chunk_scores(&self, query: &str, chunks: &[&str]) -> Result<Vec<Option<Score>>> {
        Ok(self
            .model
            .score_pairs(query, chunks)?
            .into_iter()
            .enumerate()
            .map(|(i, s)| match s {
                Ok(s) => Some(s),
                Err(e) => {
                    tracing::warn!(chunk = i, error = %e, "skipping chunk");
                    None
                }
            })
            .collect())
    }
}

impl Scorer for CrossEncoderScorer {
    fn minimum_score(&self) -> Score { Self::MINIMUM_SCORE }

    fn score_chunks(&self, query: &str, chunks: &[&str]) -> Result<Score> {
        if chunks.is_empty() {
            return Ok(self.minimum_score());
        }
        let scores = self.chunk_scores(query, chunks)?;
        Ok(max_score(scores.into_iter().flatten()).unwrap_or(self.minimum_score()))
    }

    fn score_documents(&self, query: &str, documents: &[&str]) -> Result<Vec<Score>> {
        if documents.is_empty() {
            return Ok(Vec::new());
        }
        Ok(or_minimum(self.chunk_scores(query, documents)?, self.minimum_score()))
    }
}
