//! docrank-engine
//!
//! Strategy selection, the retrieval facade and dataset-level batch runs.

pub mod batch;
pub mod retriever;
pub mod strategy;

pub use batch::{answer_dataset, answer_dataset_concurrent, output_file_name};
pub use retriever::{RetrievalMode, Retriever};
pub use strategy::{Strategy, StrategyKind};
