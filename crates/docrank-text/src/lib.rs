//! docrank-text
//!
//! Lexical (BM25) scoring with jieba segmentation, built on request-scoped
//! in-RAM tantivy indexes.

pub mod lexical;
pub mod tantivy_utils;
pub mod tokenizer;

pub use lexical::LexicalScorer;
pub use tokenizer::JiebaTokenizer;
