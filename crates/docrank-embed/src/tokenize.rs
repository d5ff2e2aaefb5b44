use candle_core::{Device, Tensor};
use tokenizers::{Encoding, Tokenizer, TruncationParams, TruncationStrategy};

use docrank_core::error::{Error, Result};

/// Token ids and attention mask of one input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Encoded {
    pub ids: Vec<u32>,
    pub mask: Vec<u32>,
}

impl From<Encoding> for Encoded {
    fn from(enc: Encoding) -> Self {
        Self { ids: enc.get_ids().to_vec(), mask: enc.get_attention_mask().to_vec() }
    }
}

/// Make the tokenizer truncate to `max_len` tokens, special tokens included.
///
/// Truncation happens before the post-processor adds `<s>`/`</s>`, so every
/// sequence keeps its closing token. Pairs are trimmed longest-first.
/// Padding is disabled; batches are padded by [`batch_on_device`].
pub fn configure_truncation(tokenizer: &mut Tokenizer, max_len: usize) -> Result<()> {
    let params = TruncationParams { max_length: max_len, strategy: TruncationStrategy::LongestFirst, ..Default::default() };
    tokenizer
        .with_truncation(Some(params))
        .map_err(|e| Error::ModelUnavailable(format!("tokenizer truncation: {}", e)))?;
    tokenizer.with_padding(None);
    Ok(())
}

/// Encode one text. Fails with `Error::Encoding` if it yields only special tokens.
pub fn encode_text(tokenizer: &Tokenizer, text: &str) -> Result<Encoded> {
    let enc = tokenizer.encode(text, true).map_err(|e| Error::Encoding(format!("tokenization failed: {}", e)))?;
    let content = enc.get_special_tokens_mask().iter().filter(|m| **m == 0).count();
    if content == 0 {
        return Err(Error::Encoding("text produced no tokens".to_string()));
    }
    Ok(enc.into())
}

/// Encode a (query, passage) pair. Fails with `Error::Encoding` if the
/// passage side yields no tokens.
pub fn encode_pair(tokenizer: &Tokenizer, query: &str, passage: &str) -> Result<Encoded> {
    let enc = tokenizer
        .encode((query, passage), true)
        .map_err(|e| Error::Encoding(format!("tokenization failed: {}", e)))?;
    let passage_tokens = enc
        .get_sequence_ids()
        .iter()
        .zip(enc.get_special_tokens_mask())
        .filter(|(seq, special)| **seq == Some(1) && **special == 0)
        .count();
    if passage_tokens == 0 {
        return Err(Error::Encoding("passage produced no tokens".to_string()));
    }
    Ok(enc.into())
}

/// Stack a batch into `[B, T]` id and mask tensors, right-padding to the longest input.
pub fn batch_on_device(batch: &[&Encoded], pad_id: u32, device: &Device) -> candle_core::Result<(Tensor, Tensor)> {
    let seq_len = batch.iter().map(|e| e.ids.len()).max().unwrap_or(0);
    let mut ids = Vec::with_capacity(batch.len() * seq_len);
    let mut mask = Vec::with_capacity(batch.len() * seq_len);
    for e in batch {
        let pad = seq_len - e.ids.len();
        ids.extend_from_slice(&e.ids);
        ids.extend(std::iter::repeat(pad_id).take(pad));
        mask.extend_from_slice(&e.mask);
        mask.extend(std::iter::repeat(0u32).take(pad));
    }
    let input_ids = Tensor::from_vec(ids, (batch.len(), seq_len), device)?;
    let attention_mask = Tensor::from_vec(mask, (batch.len(), seq_len), device)?;
    Ok((input_ids, attention_mask))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pads_to_longest_in_batch() {
        let a = Encoded { ids: vec![0, 5, 6, 2], mask: vec![1, 1, 1, 1] };
        let b = Encoded { ids: vec![0, 7, 2], mask: vec![1, 1, 1] };
        let (ids, mask) = batch_on_device(&[&a, &b], 1, &Device::Cpu).unwrap();
        assert_eq!(ids.dims(), &[2, 4]);
        let ids: Vec<Vec<u32>> = ids.to_vec2().unwrap();
        let mask: Vec<Vec<u32>> = mask.to_vec2().unwrap();
        assert_eq!(ids[1], vec![0, 7, 2, 1]);
        assert_eq!(mask[1], vec![1, 1, 1, 0]);
    }
}
