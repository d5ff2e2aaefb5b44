use candle_core::{DType, Device, D};
use candle_nn::VarBuilder;
use candle_transformers::models::xlm_roberta::XLMRobertaForSequenceClassification;
use tokenizers::Tokenizer;

use docrank_core::error::{Error, Result};
use docrank_core::traits::PairScorer;
use docrank_core::types::Score;

use crate::device::select_device;
use crate::files::ModelFiles;
use crate::model::{inference, unavailable, EmbeddingOptions, LoadedFiles};
use crate::tokenize::{batch_on_device, encode_pair, Encoded};

/// XLM-RoBERTa sequence classifier scoring (query, passage) pairs, e.g.
/// `BAAI/bge-reranker-*`. The first logit is squashed with a sigmoid.
pub struct CrossEncoderModel {
    model: XLMRobertaForSequenceClassification,
    tokenizer: Tokenizer,
    device: Device,
    pad_id: u32,
    batch_size: usize,
}

impl CrossEncoderModel {
    pub fn load(model: &str, options: &EmbeddingOptions) -> Result<Self> {
        let files = ModelFiles::resolve(model, options.model_dir.as_deref())?;
        Self::from_files(&files, options)
    }

    pub fn from_files(files: &ModelFiles, options: &EmbeddingOptions) -> Result<Self> {
        let device = select_device();
        let loaded = LoadedFiles::load(files, &device, options.max_len)?;
        let vb = VarBuilder::from_tensors(loaded.tensors, DType::F32, &device);
        let model = XLMRobertaForSequenceClassification::new(loaded.num_labels, &loaded.config, vb)
            .map_err(unavailable("reranker"))?;
        tracing::info!(labels = loaded.num_labels, max_len = loaded.max_len, "Cross-encoder loaded");
        Ok(Self { model, tokenizer: loaded.tokenizer, device, pad_id: loaded.pad_id, batch_size: options.batch_size.max(1) })
    }

    fn forward(&self, batch: &[&Encoded]) -> candle_core::Result<Vec<f32>> {
        let (input_ids, attention_mask) = batch_on_device(batch, self.pad_id, &self.device)?;
        let token_type_ids = input_ids.zeros_like()?;
        let logits = self.model.forward(&input_ids, &attention_mask, &token_type_ids)?;
        let first = logits.narrow(D::Minus1, 0, 1)?.squeeze(D::Minus1)?;
        candle_nn::ops::sigmoid(&first)?.to_device(&Device::Cpu)?.to_dtype(DType::F32)?.to_vec1()
    }
}

impl PairScorer for CrossEncoderModel {
    fn score_pairs(&self, query: &str, passages: &[&str]) -> Result<Vec<Result<Score>>> {
        let encoded: Vec<Result<Encoded>> = passages.iter().map(|p| encode_pair(&self.tokenizer, query, p)).collect();
        let ok: Vec<usize> = encoded.iter().enumerate().filter(|(_, e)| e.is_ok()).map(|(i, _)| i).collect();
        let mut scores: Vec<Option<Score>> = vec![None; passages.len()];
        for group in ok.chunks(self.batch_size) {
            let batch: Vec<&Encoded> = group.iter().filter_map(|&i| encoded[i].as_ref().ok()).collect();
            let out = self.forward(&batch).map_err(inference)?;
            for (&i, s) in group.iter().zip(out) { scores[i] = Some(s); }
        }
        Ok(encoded
            .into_iter()
            .zip(scores)
            .map(|(e, s)| e.and_then(|_| s.ok_or_else(|| Error::Inference("missing pair score".to_string()))))
            .collect())
    }
}
