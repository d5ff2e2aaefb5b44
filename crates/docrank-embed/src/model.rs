use std::collections::HashMap;
use std::path::Path;

use candle_core::{DType, Device, Tensor};
use candle_nn::VarBuilder;
use candle_transformers::models::xlm_roberta::{Config as XLMRobertaConfig, XLMRobertaModel};
use serde::Deserialize;
use tokenizers::Tokenizer;

use docrank_core::error::{Error, Result};
use docrank_core::traits::Embedder;
use docrank_core::types::Embedding;

use crate::device::select_device;
use crate::files::ModelFiles;
use crate::pool::Pooling;
use crate::tokenize::{batch_on_device, configure_truncation, encode_text, Encoded};

pub(crate) fn unavailable<E: std::fmt::Display>(what: &str) -> impl Fn(E) -> Error + '_ {
    move |e| Error::ModelUnavailable(format!("{}: {}", what, e))
}

pub(crate) fn inference(e: candle_core::Error) -> Error {
    Error::Inference(e.to_string())
}

#[derive(Deserialize)]
struct ExtraConfig {
    #[serde(default = "default_pad_id")]
    pad_token_id: u32,
    #[serde(default)]
    id2label: HashMap<String, String>,
}

fn default_pad_id() -> u32 { 1 }

/// Everything needed to build an XLM-RoBERTa model, loaded from disk.
pub(crate) struct LoadedFiles {
    pub config: XLMRobertaConfig,
    pub tokenizer: Tokenizer,
    pub tensors: HashMap<String, Tensor>,
    pub pad_id: u32,
    pub num_labels: usize,
    /// Token budget per input, special tokens included.
    pub max_len: usize,
}

impl LoadedFiles {
    /// `max_len` is capped by the model's position embeddings; the tokenizer
    /// is set up to truncate to the result.
    pub fn load(files: &ModelFiles, device: &Device, max_len: usize) -> Result<Self> {
        tracing::info!("Loading tokenizer from {}", files.tokenizer.display());
        let mut tokenizer = Tokenizer::from_file(&files.tokenizer).map_err(unavailable("tokenizer"))?;
        let raw = std::fs::read_to_string(&files.config).map_err(unavailable("config.json"))?;
        let config: XLMRobertaConfig = serde_json::from_str(&raw).map_err(unavailable("config.json"))?;
        let extra: ExtraConfig = serde_json::from_str(&raw).map_err(unavailable("config.json"))?;
        // RoBERTa positions start after the padding index
        let max_len = max_len.min(config.max_position_embeddings.saturating_sub(2)).max(8);
        configure_truncation(&mut tokenizer, max_len)?;
        tracing::info!("Loading model weights from {}", files.weights.display());
        let tensors = load_weights(&files.weights, device)?;
        Ok(Self { config, tokenizer, tensors, pad_id: extra.pad_token_id, num_labels: extra.id2label.len().max(1), max_len })
    }
}

fn load_weights(path: &Path, device: &Device) -> Result<HashMap<String, Tensor>> {
    let is_safetensors = path.extension().and_then(|s| s.to_str()) == Some("safetensors");
    if is_safetensors {
        candle_core::safetensors::load(path, device).map_err(unavailable("weights"))
    } else {
        let weights = candle_core::pickle::read_all(path).map_err(unavailable("weights"))?;
        weights
            .into_iter()
            .map(|(name, t)| t.to_device(device).map(|t| (name, t)))
            .collect::<candle_core::Result<HashMap<_, _>>>()
            .map_err(unavailable("weights"))
    }
}

#[derive(Debug, Clone)]
pub struct EmbeddingOptions {
    pub max_len: usize,
    pub batch_size: usize,
    /// Overrides the pooling declared by the model files.
    pub pooling: Option<Pooling>,
    pub model_dir: Option<std::path::PathBuf>,
}

impl Default for EmbeddingOptions {
    fn default() -> Self {
        Self { max_len: 512, batch_size: 16, pooling: None, model_dir: None }
    }
}

/// XLM-RoBERTa sentence encoder (BGE-M3 and friends).
pub struct EmbeddingModel {
    model: XLMRobertaModel,
    tokenizer: Tokenizer,
    device: Device,
    pooling: Pooling,
    pad_id: u32,
    dim: usize,
    batch_size: usize,
}

impl EmbeddingModel {
    pub fn load(model: &str, options: &EmbeddingOptions) -> Result<Self> {
        let files = ModelFiles::resolve(model, options.model_dir.as_deref())?;
        Self::from_files(&files, options)
    }

    pub fn from_files(files: &ModelFiles, options: &EmbeddingOptions) -> Result<Self> {
        let device = select_device();
        let loaded = LoadedFiles::load(files, &device, options.max_len)?;
        let has_prefix = !loaded.tensors.contains_key("embeddings.word_embeddings.weight");
        let vb = VarBuilder::from_tensors(loaded.tensors, DType::F32, &device);
        let vb = if has_prefix { vb.pp("roberta") } else { vb };
        let model = XLMRobertaModel::new(&loaded.config, vb).map_err(unavailable("model"))?;
        let pooling = options.pooling.unwrap_or_else(|| Pooling::from_config_file(files.pooling.as_deref()));
        tracing::info!(?pooling, dim = loaded.config.hidden_size, max_len = loaded.max_len, "Embedding model loaded");
        Ok(Self {
            model,
            tokenizer: loaded.tokenizer,
            device,
            pooling,
            pad_id: loaded.pad_id,
            dim: loaded.config.hidden_size,
            batch_size: options.batch_size.max(1),
        })
    }

    fn forward(&self, batch: &[&Encoded]) -> candle_core::Result<Vec<Vec<f32>>> {
        let (input_ids, attention_mask) = batch_on_device(batch, self.pad_id, &self.device)?;
        let token_type_ids = input_ids.zeros_like()?;
        let hidden = self.model.forward(&input_ids, &attention_mask, &token_type_ids, None, None, None)?;
        let pooled = self.pooling.apply(&hidden, &attention_mask)?;
        pooled.to_device(&Device::Cpu)?.to_dtype(DType::F32)?.to_vec2()
    }
}

impl Embedder for EmbeddingModel {
    fn dim(&self) -> usize { self.dim }

    fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Result<Embedding>>> {
        let encoded: Vec<Result<Encoded>> = texts.iter().map(|t| encode_text(&self.tokenizer, t)).collect();
        let ok: Vec<usize> = encoded.iter().enumerate().filter(|(_, e)| e.is_ok()).map(|(i, _)| i).collect();
        let mut vectors: HashMap<usize, Embedding> = HashMap::with_capacity(ok.len());
        for group in ok.chunks(self.batch_size) {
            let batch: Vec<&Encoded> = group.iter().filter_map(|&i| encoded[i].as_ref().ok()).collect();
            let out = self.forward(&batch).map_err(inference)?;
            vectors.extend(group.iter().copied().zip(out));
        }
        Ok(encoded
            .into_iter()
            .enumerate()
            .map(|(i, e)| e.and_then(|_| vectors.remove(&i).ok_or_else(|| Error::Inference("missing embedding".to_string()))))
            .collect())
    }
}
