use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::Semaphore;

use docrank_core::error::{Error, Result};
use docrank_core::traits::Scorer;
use docrank_core::types::{Answer, DocId, Sample, Score};
use docrank_core::{aggregate, select, ChunkConfig};

use crate::strategy::Strategy;

/// How candidate texts are turned into scores.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RetrievalMode {
    /// Chunk each candidate and keep its best chunk score.
    #[default]
    Paragraph,
    /// Score each candidate as one unit, all candidates in one scorer call.
    WholeDocument,
}

/// Picks the best candidate for a query under one strategy.
///
/// Holds the scorer behind an `Arc` so the same loaded model can serve
/// every query and every worker of a concurrent retrieval.
pub struct Retriever<S = Strategy> {
    scorer: Arc<S>,
    chunking: ChunkConfig,
    mode: RetrievalMode,
    pool_size: usize,
    timeout: Option<Duration>,
}

impl<S: Scorer> Retriever<S> {
    pub fn new(scorer: S, chunking: ChunkConfig) -> Self {
        Self { scorer: Arc::new(scorer), chunking, mode: RetrievalMode::Paragraph, pool_size: 1, timeout: None }
    }

    pub fn with_mode(mut self, mode: RetrievalMode) -> Self {
        self.mode = mode;
        self
    }

    /// Upper bound on candidates scored at once by `retrieve_concurrent`.
    pub fn with_pool_size(mut self, pool_size: usize) -> Self {
        self.pool_size = pool_size.max(1);
        self
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn scorer(&self) -> &S { &self.scorer }

    pub fn mode(&self) -> RetrievalMode { self.mode }

    pub fn pool_size(&self) -> usize { self.pool_size }

    /// Score every candidate and return the id of the best one.
    ///
    /// In paragraph mode candidates are scored one after another. With a
    /// timeout set, the deadline is checked after each candidate; a scorer
    /// call already in progress is not interrupted.
    pub fn retrieve<T: AsRef<str>>(&self, query: &str, ids: &[DocId], texts: &[T]) -> Result<DocId> {
        check_candidates(ids.len(), texts.len())?;
        let scores = self.score_all(query, texts)?;
        select(ids, &scores)
    }

    /// [`Retriever::retrieve`] in whole-document mode, whatever the
    /// configured mode.
    pub fn retrieve_whole_documents<T: AsRef<str>>(&self, query: &str, ids: &[DocId], texts: &[T]) -> Result<DocId> {
        check_candidates(ids.len(), texts.len())?;
        let started = Instant::now();
        let scores = score_whole_documents(self.scorer.as_ref(), query, texts)?;
        self.check_deadline(started)?;
        select(ids, &scores)
    }

    /// Score of each candidate under the configured mode, in input order.
    pub fn score_all<T: AsRef<str>>(&self, query: &str, texts: &[T]) -> Result<Vec<Score>> {
        let started = Instant::now();
        if self.mode == RetrievalMode::WholeDocument {
            let scores = score_whole_documents(self.scorer.as_ref(), query, texts)?;
            self.check_deadline(started)?;
            return Ok(scores);
        }
        let mut scores = Vec::with_capacity(texts.len());
        for (i, text) in texts.iter().enumerate() {
            let score = aggregate(text.as_ref(), query, self.scorer.as_ref(), &self.chunking)?;
            tracing::trace!(candidate = i, score, "scored");
            scores.push(score);
            self.check_deadline(started)?;
        }
        Ok(scores)
    }

    fn check_deadline(&self, started: Instant) -> Result<()> {
        match self.timeout {
            Some(limit) if started.elapsed() > limit => Err(Error::RetrievalTimeout(limit)),
            _ => Ok(()),
        }
    }

    pub fn retrieve_sample(&self, sample: &Sample) -> Result<Answer> {
        let retrieve = self.retrieve(&sample.query, &sample.ids, &sample.texts)?;
        tracing::debug!(qid = sample.qid, retrieve, "answered");
        Ok(Answer { qid: sample.qid, retrieve })
    }
}

impl<S: Scorer + 'static> Retriever<S> {
    /// Like [`Retriever::retrieve`], but scores on the blocking thread pool.
    ///
    /// In paragraph mode up to `pool_size` candidates are scored at once and
    /// their scores gathered back in input order, so the first-max rule sees
    /// the same sequence as the sequential path. With a timeout set, the
    /// whole retrieval is abandoned once it elapses.
    pub async fn retrieve_concurrent(&self, query: &str, ids: &[DocId], texts: &[String]) -> Result<DocId> {
        check_candidates(ids.len(), texts.len())?;
        let scoring = self.score_all_concurrent(query, texts);
        let scores = match self.timeout {
            Some(limit) => tokio::time::timeout(limit, scoring).await.map_err(|_| Error::RetrievalTimeout(limit))??,
            None => scoring.await?,
        };
        select(ids, &scores)
    }

    pub async fn score_all_concurrent(&self, query: &str, texts: &[String]) -> Result<Vec<Score>> {
        if self.mode == RetrievalMode::WholeDocument {
            let scorer = Arc::clone(&self.scorer);
            let query = query.to_string();
            let texts = texts.to_vec();
            return tokio::task::spawn_blocking(move || score_whole_documents(scorer.as_ref(), &query, &texts))
                .await
                .map_err(|e| Error::Inference(format!("scoring task failed: {}", e)))?;
        }
        let permits = Semaphore::new(self.pool_size);
        let query: Arc<str> = Arc::from(query);
        let tasks = texts.iter().map(|text| {
            let scorer = Arc::clone(&self.scorer);
            let query = Arc::clone(&query);
            let text = text.clone();
            let chunking = self.chunking;
            let permits = &permits;
            async move {
                let _permit = permits.acquire().await.map_err(|e| Error::Inference(e.to_string()))?;
                tokio::task::spawn_blocking(move || aggregate(&text, &query, scorer.as_ref(), &chunking))
                    .await
                    .map_err(|e| Error::Inference(format!("scoring task failed: {}", e)))?
            }
        });
        futures::future::try_join_all(tasks).await
    }

    pub async fn retrieve_sample_concurrent(&self, sample: &Sample) -> Result<Answer> {
        let retrieve = self.retrieve_concurrent(&sample.query, &sample.ids, &sample.texts).await?;
        tracing::debug!(qid = sample.qid, retrieve, "answered");
        Ok(Answer { qid: sample.qid, retrieve })
    }
}

/// Empty candidates keep the minimum score and never reach the scorer.
fn score_whole_documents<S, T>(scorer: &S, query: &str, texts: &[T]) -> Result<Vec<Score>>
where
    S: Scorer + ?Sized,
    T: AsRef<str>,
{
    let mut scores = vec![scorer.minimum_score(); texts.len()];
    let present: Vec<usize> = (0..texts.len()).filter(|&i| !texts[i].as_ref().is_empty()).collect();
    if present.is_empty() {
        return Ok(scores);
    }
    let documents: Vec<&str> = present.iter().map(|&i| texts[i].as_ref()).collect();
    let found = scorer.score_documents(query, &documents)?;
    if found.len() != documents.len() {
        return Err(Error::Inference(format!("{} scores for {} documents", found.len(), documents.len())));
    }
    for (i, score) in present.into_iter().zip(found) {
        scores[i] = score;
    }
    Ok(scores)
}

fn check_candidates(ids: usize, texts: usize) -> Result<()> {
    if ids != texts {
        return Err(Error::LengthMismatch { ids, values: texts });
    }
    if ids == 0 {
        return Err(Error::EmptyCandidateSet);
    }
    Ok(())
}
