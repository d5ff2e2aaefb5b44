//! Tantivy tokenizer backed by jieba search-mode segmentation.
//!
//! Search mode emits both whole words and their dictionary sub-words, so
//! "中華人民共和國" also yields "中華" and "人民". Latin text falls out as
//! ordinary words. Tokens without any alphanumeric character (spaces,
//! punctuation) are dropped.

use std::sync::Arc;

use jieba_rs::Jieba;
use tantivy::tokenizer::{Token, TokenStream, Tokenizer};

#[derive(Clone)]
pub struct JiebaTokenizer {
    jieba: Arc<Jieba>,
}

impl JiebaTokenizer {
    /// Loads the bundled dictionary; do this once and clone the tokenizer.
    pub fn new() -> Self {
        Self { jieba: Arc::new(Jieba::new()) }
    }
}

impl Default for JiebaTokenizer {
    fn default() -> Self { Self::new() }
}

pub struct JiebaTokenStream {
    tokens: Vec<Token>,
    index: usize,
}

impl Tokenizer for JiebaTokenizer {
    type TokenStream<'a> = JiebaTokenStream;

    fn token_stream<'a>(&'a mut self, text: &'a str) -> JiebaTokenStream {
        let base = text.as_ptr() as usize;
        let tokens = self
            .jieba
            .cut_for_search(text, true)
            .into_iter()
            .filter(|word| word.chars().any(char::is_alphanumeric))
            .enumerate()
            .map(|(position, word)| {
                // every word is a subslice of `text`
                let offset_from = word.as_ptr() as usize - base;
                Token {
                    offset_from,
                    offset_to: offset_from + word.len(),
                    position,
                    text: word.to_string(),
                    position_length: 1,
                }
            })
            .collect();
        JiebaTokenStream { tokens, index: 0 }
    }
}

impl TokenStream for JiebaTokenStream {
    fn advance(&mut self) -> bool {
        if self.index < self.tokens.len() {
            self.index += 1;
            true
        } else {
            false
        }
    }

    fn token(&self) -> &Token { &self.tokens[self.index - 1] }

    fn token_mut(&mut self) -> &mut Token { &mut self.tokens[self.index - 1] }
}
