//! docrank-core
//!
//! Shared types, errors and configuration, plus the strategy-independent
//! parts of retrieval: chunking, max-aggregation and arg-max selection.

#![deny(unused_variables)]
#![deny(unused_imports)]

pub mod aggregate;
pub mod answers;
pub mod chunker;
pub mod config;
pub mod dataset;
pub mod error;
pub mod precision;
pub mod select;
pub mod traits;
pub mod types;

pub use aggregate::aggregate;
pub use chunker::{chunk, ChunkConfig};
pub use error::{Error, Result};
pub use select::select;
pub use traits::{Embedder, PairScorer, Scorer};
pub use types::{Answer, DocId, Embedding, GroundTruth, Question, QueryId, Sample, Score};
