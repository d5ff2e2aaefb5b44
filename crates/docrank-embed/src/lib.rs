//! docrank-embed
//!
//! Candle-backed XLM-RoBERTa models for dense (bi-encoder) and pairwise
//! (cross-encoder) scoring, their deterministic fakes, and the scorers built
//! on top of them.

pub mod cross_encoder;
pub mod device;
pub mod fake;
pub mod files;
pub mod model;
pub mod pool;
pub mod scorer;
pub mod tokenize;

use docrank_core::error::Result;
use docrank_core::traits::{Embedder, PairScorer};

pub use cross_encoder::CrossEncoderModel;
pub use fake::{FakeCrossEncoder, FakeEmbedder};
pub use files::ModelFiles;
pub use model::{EmbeddingModel, EmbeddingOptions};
pub use pool::{masked_mean_l2, Pooling};
pub use scorer::{CrossEncoderScorer, EmbeddingScorer, BGE_QUERY_INSTRUCTION};

pub const FAKE_EMBEDDING_DIM: usize = 1024;

fn env_flag(name: &str) -> bool {
    std::env::var(name).ok().map(|v| v == "1" || v.eq_ignore_ascii_case("true")).unwrap_or(false)
}

/// The embedding model for `model`, or a [`FakeEmbedder`] when
/// `APP_USE_FAKE_EMBEDDINGS=1`.
pub fn get_default_embedder(model: &str, options: &EmbeddingOptions) -> Result<Box<dyn Embedder>> {
    if env_flag("APP_USE_FAKE_EMBEDDINGS") {
        tracing::info!("Using FakeEmbedder in place of {}", model);
        return Ok(Box::new(FakeEmbedder::new(FAKE_EMBEDDING_DIM)));
    }
    tracing::info!("Loading embedding model {}", model);
    Ok(Box::new(EmbeddingModel::load(model, options)?))
}

/// The cross-encoder for `model`, or a [`FakeCrossEncoder`] when
/// `APP_USE_FAKE_RERANKER=1`.
pub fn get_default_cross_encoder(model: &str, options: &EmbeddingOptions) -> Result<Box<dyn PairScorer>> {
    if env_flag("APP_USE_FAKE_RERANKER") {
        tracing::info!("Using FakeCrossEncoder in place of {}", model);
        return Ok(Box::new(FakeCrossEncoder::new()));
    }
    tracing::info!("Loading cross-encoder {}", model);
    Ok(Box::new(CrossEncoderModel::load(model, options)?))
}
