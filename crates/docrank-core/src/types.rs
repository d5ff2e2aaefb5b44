//! Domain types shared by every scorer and the retrieval facade.

use serde::{Deserialize, Serialize};

/// Caller-supplied document identifier.
pub type DocId = i64;
/// Query identifier, passed through to the answer file untouched.
pub type QueryId = i64;
/// Relevance score. The scale is strategy-specific but higher is always better.
pub type Score = f32;
/// Unit-normalized dense vector.
pub type Embedding = Vec<f32>;

/// A single question as published in the question file.
///
/// `source` lists the candidate ids; `category` selects the corpus partition
/// their texts come from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    pub qid: QueryId,
    pub source: Vec<DocId>,
    pub query: String,
    pub category: String,
}

/// A question joined with its candidate texts, ready for retrieval.
///
/// `ids` and `texts` are parallel and always the same length.
#[derive(Debug, Clone)]
pub struct Sample {
    pub qid: QueryId,
    pub query: String,
    pub category: String,
    pub ids: Vec<DocId>,
    pub texts: Vec<String>,
}

/// The retrieved document for one query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Answer {
    pub qid: QueryId,
    pub retrieve: DocId,
}

/// Reference answer used by precision evaluation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroundTruth {
    pub qid: QueryId,
    pub retrieve: DocId,
    pub category: String,
}
