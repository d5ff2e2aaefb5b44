use crate::chunker::ChunkConfig;
use crate::error::Result;
use crate::traits::Scorer;
use crate::types::Score;

/// Reduce one candidate document to a single score: the best chunk wins.
///
/// Empty text short-circuits to `scorer.minimum_score()` without chunking or
/// calling the scorer.
pub fn aggregate<S>(candidate_text: &str, query: &str, scorer: &S, chunking: &ChunkConfig) -> Result<Score>
where
    S: Scorer + ?Sized,
{
    if candidate_text.is_empty() {
        return Ok(scorer.minimum_score());
    }
    let chunks = chunking.split(candidate_text);
    scorer.best_of(query, &chunks)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Scores a chunk by its length; counts calls.
    struct LengthScorer {
        calls: AtomicUsize,
    }

    impl Scorer for LengthScorer {
        fn minimum_score(&self) -> Score { -1.0 }

        fn score_chunks(&self, _query: &str, chunks: &[&str]) -> Result<Score> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(chunks.iter().map(|c| c.chars().count() as Score).fold(self.minimum_score(), Score::max))
        }
    }

    #[test]
    fn empty_text_skips_scorer() {
        let scorer = LengthScorer { calls: AtomicUsize::new(0) };
        let config = ChunkConfig::new(4, 1).unwrap();
        let score = aggregate("", "q", &scorer, &config).unwrap();
        assert_eq!(score, -1.0);
        assert_eq!(scorer.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn takes_max_over_chunks() {
        let scorer = LengthScorer { calls: AtomicUsize::new(0) };
        let config = ChunkConfig::new(4, 1).unwrap();
        // chunks: "abcd", "defg", "g"
        let score = aggregate("abcdefg", "q", &scorer, &config).unwrap();
        assert_eq!(score, 4.0);
        assert_eq!(scorer.calls.load(Ordering::SeqCst), 1);
        assert_eq!(aggregate("abcdefg", "q", &scorer, &config).unwrap(), score);
    }
}
