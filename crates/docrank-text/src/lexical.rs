use tantivy::collector::TopDocs;
use tantivy::query::{BooleanQuery, Occur, Query, TermQuery};
use tantivy::schema::{Field, IndexRecordOption, Value};
use tantivy::{doc, Index, IndexWriter, TantivyDocument, TantivyError, Term};

use docrank_core::error::{Error, Result};
use docrank_core::traits::{max_score, Scorer};
use docrank_core::types::Score;

use crate::tantivy_utils::{analyze, build_analyzer, build_schema, register_tokenizer, CHUNK_FIELD, TEXT_FIELD};
use crate::tokenizer::JiebaTokenizer;

const WRITER_HEAP_BYTES: usize = 20_000_000;

fn index_error(e: TantivyError) -> Error {
	Error::Inference(format!("lexical index: {}", e))
}

/// BM25 over the chunks of a single document.
///
/// The index lives in RAM for the duration of one `score_chunks` call, since
/// document frequencies only make sense within that chunk collection.
#[derive(Clone, Default)]
pub struct LexicalScorer {
	segmenter: JiebaTokenizer,
}

impl LexicalScorer {
	/// BM25 is never negative, so empty documents rank below any real chunk.
	pub const MINIMUM_SCORE: Score = -1.0;

	pub fn new() -> Self {
		Self { segmenter: JiebaTokenizer::new() }
	}

	/// BM25 score of every chunk, in input order.
	///
	/// `None` marks a chunk that yields no terms and was left out of the
	/// index. Indexed chunks that share no term with the query score 0.
	pub fn chunk_scores(&self, query: &str, chunks: &[&str]) -> Result<Vec<Option<Score>>> {
		let mut analyzer = build_analyzer(self.segmenter.clone());
		let mut scores: Vec<Option<Score>> = vec![None; chunks.len()];

		let mut indexable = Vec::with_capacity(chunks.len());
		for (i, chunk) in chunks.iter().enumerate() {
			if analyze(&mut analyzer, chunk).is_empty() {
				let err = Error::Encoding(format!("chunk {} produced no terms", i));
				tracing::warn!(error = %err, "skipping chunk");
				continue;
			}
			scores[i] = Some(0.0);
			indexable.push(i);
		}
		if indexable.is_empty() {
			return Ok(scores);
		}

		let terms = analyze(&mut analyzer, query);
		if terms.is_empty() {
			tracing::debug!("query produced no terms");
			return Ok(scores);
		}

		let index = ChunkIndex::build(&self.segmenter, chunks, &indexable)?;
		for (i, score) in index.search(&terms, indexable.len())? {
			scores[i] = Some(score);
		}
		Ok(scores)
	}
}

impl Scorer for LexicalScorer {
	fn minimum_score(&self) -> Score { Self::MINIMUM_SCORE }

	fn score_chunks(&self, query: &str, chunks: &[&str]) -> Result<Score> {
		if chunks.is_empty() {
			return Ok(self.minimum_score());
		}
		let scores = self.chunk_scores(query, chunks)?;
		Ok(max_score(scores.into_iter().flatten()).unwrap_or(self.minimum_score()))
	}

	/// All documents go into one index, so term rarity is judged across the
	/// whole candidate set.
	fn score_documents(&self, query: &str, documents: &[&str]) -> Result<Vec<Score>> {
		let scores = self.chunk_scores(query, documents)?;
		Ok(scores.into_iter().map(|s| s.unwrap_or(self.minimum_score())).collect())
	}
}

struct ChunkIndex {
	index: Index,
	text_field: Field,
	chunk_field: Field,
}

impl ChunkIndex {
	fn build(segmenter: &JiebaTokenizer, chunks: &[&str], indexable: &[usize]) -> Result<Self> {
		let schema = build_schema();
		let index = Index::create_in_ram(schema.clone());
		register_tokenizer(&index, segmenter.clone());
		let text_field = schema.get_field(TEXT_FIELD).map_err(index_error)?;
		let chunk_field = schema.get_field(CHUNK_FIELD).map_err(index_error)?;

		let mut index_writer: IndexWriter = index.writer_with_num_threads(1, WRITER_HEAP_BYTES).map_err(index_error)?;
		for &i in indexable {
			let doc = doc!(
				text_field => chunks[i].to_string(),
				chunk_field => i as u64,
			);
			index_writer.add_document(doc).map_err(index_error)?;
		}
		index_writer.commit().map_err(index_error)?;
		Ok(Self { index, text_field, chunk_field })
	}

	/// Chunks matching at least one term, with their BM25 score.
	fn search(&self, terms: &[String], limit: usize) -> Result<Vec<(usize, Score)>> {
		let reader = self.index.reader().map_err(index_error)?;
		let searcher = reader.searcher();
		let clauses: Vec<(Occur, Box<dyn Query>)> = terms
			.iter()
			.map(|t| {
				let term = Term::from_field_text(self.text_field, t);
				(Occur::Should, Box::new(TermQuery::new(term, IndexRecordOption::WithFreqs)) as Box<dyn Query>)
			})
			.collect();
		let query = BooleanQuery::new(clauses);
		let top_docs = searcher.search(&query, &TopDocs::with_limit(limit.max(1))).map_err(index_error)?;
		let mut hits = Vec::with_capacity(top_docs.len());
		for (score, addr) in top_docs {
			let doc: TantivyDocument = searcher.doc(addr).map_err(index_error)?;
			if let Some(i) = doc.get_first(self.chunk_field).and_then(|v| v.as_u64()) {
				hits.push((i as usize, score));
			}
		}
		Ok(hits)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn empty_chunk_list_scores_minimum() {
		let scorer = LexicalScorer::new();
		assert_eq!(scorer.score_chunks("anything", &[]).unwrap(), LexicalScorer::MINIMUM_SCORE);
	}

	#[test]
	fn punctuation_only_chunks_are_excluded() {
		let scorer = LexicalScorer::new();
		let scores = scorer.chunk_scores("deductible", &["...", "the deductible applies"]).unwrap();
		assert_eq!(scores[0], None);
		assert!(scores[1].unwrap() > 0.0);
	}

	#[test]
	fn all_chunks_unencodable_scores_minimum() {
		let scorer = LexicalScorer::new();
		assert_eq!(scorer.score_chunks("deductible", &["?!", "  "]).unwrap(), LexicalScorer::MINIMUM_SCORE);
	}

	#[test]
	fn non_matching_chunks_score_zero() {
		let scorer = LexicalScorer::new();
		assert_eq!(scorer.score_chunks("deductible", &["quarterly revenue grew"]).unwrap(), 0.0);
	}
}
