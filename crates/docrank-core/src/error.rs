use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Empty candidate set")]
    EmptyCandidateSet,

    #[error("Length mismatch: {ids} candidate ids but {values} values")]
    LengthMismatch { ids: usize, values: usize },

    #[error("Model unavailable: {0}")]
    ModelUnavailable(String),

    #[error("Encoding failed: {0}")]
    Encoding(String),

    #[error("Inference failed: {0}")]
    Inference(String),

    #[error("Retrieval timed out after {0:?}")]
    RetrievalTimeout(Duration),

    #[error("Dataset error: {0}")]
    Dataset(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
