//! Fixed-length overlapping windows over a document.
//!
//! Lengths are counted in `char`s so multi-byte (CJK) text is never split
//! inside a code point.

use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkConfig {
    window: usize,
    overlap: usize,
}

impl ChunkConfig {
    /// Requires `0 < overlap < window`.
    pub fn new(window: usize, overlap: usize) -> Result<Self> {
        if overlap == 0 || overlap >= window {
            return Err(Error::Config(format!(
                "chunk overlap must satisfy 0 < overlap < window (window={}, overlap={})",
                window, overlap
            )));
        }
        Ok(Self { window, overlap })
    }

    pub fn window(&self) -> usize { self.window }

    pub fn overlap(&self) -> usize { self.overlap }

    /// Distance between consecutive window starts.
    pub fn stride(&self) -> usize { self.window - self.overlap }

    pub fn split<'a>(&self, text: &'a str) -> Vec<&'a str> {
        split_by_length_with_overlap(text, self)
    }
}

/// Validating form of [`ChunkConfig::split`].
pub fn chunk(text: &str, window: usize, overlap: usize) -> Result<Vec<&str>> {
    Ok(ChunkConfig::new(window, overlap)?.split(text))
}

fn split_by_length_with_overlap<'a>(text: &'a str, config: &ChunkConfig) -> Vec<&'a str> {
    // byte offset of every char, plus the end of the string
    let mut bounds: Vec<usize> = text.char_indices().map(|(i, _)| i).collect();
    let len = bounds.len();
    bounds.push(text.len());

    let mut chunks = Vec::with_capacity(len / config.stride() + 1);
    let mut start = 0;
    while start < len {
        let end = (start + config.window).min(len);
        chunks.push(&text[bounds[start]..bounds[end]]);
        start += config.stride();
    }
    chunks
}
