//! Deterministic stand-ins for the neural models, for tests and development
//! without model downloads.

use std::collections::HashSet;
use std::hash::{Hash, Hasher};
use twox_hash::XxHash64;

use docrank_core::error::{Error, Result};
use docrank_core::traits::{Embedder, PairScorer};
use docrank_core::types::{Embedding, Score};

fn is_cjk(c: char) -> bool {
    matches!(c as u32, 0x3040..=0x30FF | 0x3400..=0x4DBF | 0x4E00..=0x9FFF | 0xAC00..=0xD7AF | 0xF900..=0xFAFF)
}

/// Lower-cased alphanumeric runs; CJK characters each count as a term.
pub fn fake_terms(text: &str) -> Vec<String> {
    let mut terms = Vec::new();
    let mut current = String::new();
    for c in text.chars() {
        if is_cjk(c) {
            if !current.is_empty() { terms.push(std::mem::take(&mut current)); }
            terms.push(c.to_string());
        } else if c.is_alphanumeric() {
            current.extend(c.to_lowercase());
        } else if !current.is_empty() {
            terms.push(std::mem::take(&mut current));
        }
    }
    if !current.is_empty() { terms.push(current); }
    terms
}

/// Hashed bag-of-terms vectors, L2-normalized.
pub struct FakeEmbedder { dim: usize }

impl FakeEmbedder {
    pub fn new(dim: usize) -> Self { Self { dim: dim.max(1) } }

    fn embed_one(&self, text: &str) -> Result<Embedding> {
        let terms = fake_terms(text);
        if terms.is_empty() {
            return Err(Error::Encoding("text produced no tokens".to_string()));
        }
        let mut v = vec![0f32; self.dim];
        for token in terms {
            let mut hasher = XxHash64::with_seed(0);
            token.hash(&mut hasher);
            let h = hasher.finish();
            let idx = (h as usize) % self.dim;
            let val = 0.5 + (((h >> 32) as u32) as f32) / (u32::MAX as f32);
            v[idx] += val;
        }
        let norm = (v.iter().map(|x| x * x).sum::<f32>()).sqrt().max(1e-6);
        for x in &mut v { *x /= norm; }
        Ok(v)
    }
}

impl Embedder for FakeEmbedder {
    fn dim(&self) -> usize { self.dim }

    fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Result<Embedding>>> {
        Ok(texts.iter().map(|t| self.embed_one(t)).collect())
    }
}

/// Fraction of distinct query terms present in the passage, in `[0, 1]`.
#[derive(Default)]
pub struct FakeCrossEncoder;

impl FakeCrossEncoder {
    pub fn new() -> Self { Self }
}

impl PairScorer for FakeCrossEncoder {
    fn score_pairs(&self, query: &str, passages: &[&str]) -> Result<Vec<Result<Score>>> {
        let query_terms: HashSet<String> = fake_terms(query).into_iter().collect();
        Ok(passages
            .iter()
            .map(|p| {
                let doc_terms: HashSet<String> = fake_terms(p).into_iter().collect();
                if doc_terms.is_empty() {
                    return Err(Error::Encoding("passage produced no tokens".to_string()));
                }
                let overlap = query_terms.iter().filter(|t| doc_terms.contains(*t)).count();
                Ok(overlap as Score / query_terms.len().max(1) as Score)
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terms_split_cjk_per_char() {
        assert_eq!(fake_terms("Deductible: 自付額 applies"), vec!["deductible", "自", "付", "額", "applies"]);
        assert!(fake_terms(" ... ").is_empty());
    }

    #[test]
    fn cross_encoder_scores_overlap() {
        let scores = FakeCrossEncoder.score_pairs("rust memory safety", &["Rust memory model", "python", "!!"]).unwrap();
        assert!((scores[0].as_ref().unwrap() - 2.0 / 3.0).abs() < 1e-6);
        assert_eq!(*scores[1].as_ref().unwrap(), 0.0);
        assert!(matches!(scores[2], Err(Error::Encoding(_))));
    }
}
