use std::fmt;
use std::str::FromStr;

use docrank_core::config::{expand_path, ModelSettings};
use docrank_core::error::{Error, Result};
use docrank_core::traits::Scorer;
use docrank_core::types::Score;
use docrank_embed::{
    get_default_cross_encoder, get_default_embedder, CrossEncoderScorer, EmbeddingOptions, EmbeddingScorer, Pooling,
    BGE_QUERY_INSTRUCTION,
};
use docrank_text::LexicalScorer;

/// Strategy names accepted on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StrategyKind {
    /// BM25 over jieba-segmented chunks.
    Bm25,
    /// Sentence-transformers style bi-encoder.
    BiEncoder,
    /// Cross-encoder reranker.
    Reranker,
    /// BGE bi-encoder: CLS pooling plus the retrieval query instruction.
    Flag,
}

impl StrategyKind {
    pub const ALL: [StrategyKind; 4] = [StrategyKind::Bm25, StrategyKind::BiEncoder, StrategyKind::Reranker, StrategyKind::Flag];

    pub fn as_str(&self) -> &'static str {
        match self {
            StrategyKind::Bm25 => "bm25",
            StrategyKind::BiEncoder => "biencoder",
            StrategyKind::Reranker => "reranker",
            StrategyKind::Flag => "flag",
        }
    }

    pub fn requires_model(&self) -> bool {
        !matches!(self, StrategyKind::Bm25)
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StrategyKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        StrategyKind::ALL
            .into_iter()
            .find(|k| k.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| Error::Config(format!("unknown strategy '{}' (expected bm25, biencoder, reranker or flag)", s)))
    }
}

/// The active ranking method. Long-lived and shared read-only across queries.
pub enum Strategy {
    Lexical(LexicalScorer),
    Embedding(EmbeddingScorer),
    CrossEncoder(CrossEncoderScorer),
}

impl Strategy {
    /// Build the scorer for `kind`, loading its model if it needs one.
    pub fn load(kind: StrategyKind, model: Option<&str>, settings: &ModelSettings) -> Result<Self> {
        let model = match (kind.requires_model(), model) {
            (false, _) => None,
            (true, Some(m)) if !m.trim().is_empty() => Some(m),
            (true, _) => return Err(Error::Config(format!("strategy '{}' requires a model name", kind))),
        };
        let mut options = EmbeddingOptions {
            max_len: settings.max_len,
            batch_size: settings.batch_size,
            pooling: None,
            model_dir: settings.model_dir.as_ref().map(expand_path),
        };
        let strategy = match (kind, model) {
            (StrategyKind::Bm25, _) => Strategy::Lexical(LexicalScorer::new()),
            (StrategyKind::BiEncoder, Some(m)) => Strategy::Embedding(EmbeddingScorer::new(get_default_embedder(m, &options)?)),
            (StrategyKind::Flag, Some(m)) => {
                options.pooling = Some(Pooling::Cls);
                Strategy::Embedding(
                    EmbeddingScorer::new(get_default_embedder(m, &options)?).with_query_instruction(BGE_QUERY_INSTRUCTION),
                )
            }
            (StrategyKind::Reranker, Some(m)) => Strategy::CrossEncoder(CrossEncoderScorer::new(get_default_cross_encoder(m, &options)?)),
            (_, None) => return Err(Error::Config(format!("strategy '{}' requires a model name", kind))),
        };
        tracing::info!(strategy = %kind, model = model.unwrap_or("-"), "Strategy ready");
        Ok(strategy)
    }

    pub fn lexical() -> Self {
        Strategy::Lexical(LexicalScorer::new())
    }

    pub fn name(&self) -> &'static str {
        match self {
            Strategy::Lexical(_) => "lexical",
            Strategy::Embedding(_) => "embedding",
            Strategy::CrossEncoder(_) => "cross-encoder",
        }
    }
}

impl Scorer for Strategy {
    fn minimum_score(&self) -> Score {
        match self {
            Strategy::Lexical(s) => s.minimum_score(),
            Strategy::Embedding(s) => s.minimum_score(),
            Strategy::CrossEncoder(s) => s.minimum_score(),
        }
    }

    fn score_chunks(&self, query: &str, chunks: &[&str]) -> Result<Score> {
        match self {
            Strategy::Lexical(s) => s.score_chunks(query, chunks),
            Strategy::Embedding(s) => s.score_chunks(query, chunks),
            Strategy::CrossEncoder(s) => s.score_chunks(query, chunks),
        }
    }

    fn score_documents(&self, query: &str, documents: &[&str]) -> Result<Vec<Score>> {
        match self {
            Strategy::Lexical(s) => s.score_documents(query, documents),
            Strategy::Embedding(s) => s.score_documents(query, documents),
            Strategy::CrossEncoder(s) => s.score_documents(query, documents),
        }
    }
}
