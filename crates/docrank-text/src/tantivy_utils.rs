use tantivy::schema::{IndexRecordOption, Schema, TextFieldIndexing, TextOptions, STORED};
use tantivy::tokenizer::{LowerCaser, RemoveLongFilter, TextAnalyzer, TokenStream};
use tantivy::Index;

use crate::tokenizer::JiebaTokenizer;

pub const TOKENIZER_NAME: &str = "jieba_search";
pub const TEXT_FIELD: &str = "text";
pub const CHUNK_FIELD: &str = "chunk";

pub fn build_schema() -> Schema {
	let mut schema_builder = Schema::builder();
	let text_field_indexing = TextFieldIndexing::default().set_tokenizer(TOKENIZER_NAME).set_index_option(IndexRecordOption::WithFreqs);
	let text_options = TextOptions::default().set_indexing_options(text_field_indexing);
	let _text_field = schema_builder.add_text_field(TEXT_FIELD, text_options);
	let _chunk_field = schema_builder.add_u64_field(CHUNK_FIELD, STORED);
	schema_builder.build()
}

pub fn build_analyzer(segmenter: JiebaTokenizer) -> TextAnalyzer {
	TextAnalyzer::builder(segmenter)
		.filter(RemoveLongFilter::limit(40))
		.filter(LowerCaser)
		.build()
}

pub fn register_tokenizer(index: &Index, segmenter: JiebaTokenizer) {
	index.tokenizers().register(TOKENIZER_NAME, build_analyzer(segmenter));
}

/// Run `text` through the analyzer and collect the resulting terms.
pub fn analyze(analyzer: &mut TextAnalyzer, text: &str) -> Vec<String> {
	let mut terms = Vec::new();
	let mut stream = analyzer.token_stream(text);
	stream.process(&mut |token| terms.push(token.text.clone()));
	terms
}
