use candle_core::{DType, Tensor};
use serde::Deserialize;
use std::path::Path;

/// How token states are reduced to one sentence vector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pooling {
    /// First (`<s>`/`[CLS]`) token.
    Cls,
    /// Mean over unmasked tokens.
    Mean,
}

#[derive(Deserialize)]
struct PoolingConfig {
    #[serde(default)]
    pooling_mode_cls_token: bool,
}

impl Pooling {
    /// Read a sentence-transformers `1_Pooling/config.json`; mean pooling when absent.
    pub fn from_config_file(path: Option<&Path>) -> Self {
        let Some(path) = path else { return Pooling::Mean };
        let parsed = std::fs::read_to_string(path)
            .ok()
            .and_then(|s| serde_json::from_str::<PoolingConfig>(&s).ok());
        match parsed {
            Some(cfg) if cfg.pooling_mode_cls_token => Pooling::Cls,
            _ => Pooling::Mean,
        }
    }

    pub fn apply(&self, hidden: &Tensor, attention_mask: &Tensor) -> candle_core::Result<Tensor> {
        match self {
            Pooling::Cls => l2_normalize(&hidden.narrow(1, 0, 1)?.squeeze(1)?),
            Pooling::Mean => masked_mean_l2(hidden, attention_mask),
        }
    }
}

fn eps_for(t: &Tensor) -> candle_core::Result<Tensor> {
    let eps_val = match t.dtype() { DType::F16 => 1e-6f32, _ => 1e-12f32 };
    Tensor::new(&[eps_val], t.device())?.to_dtype(t.dtype())?.unsqueeze(0)
}

/// Row-wise L2 normalization of a `[B, H]` tensor.
pub fn l2_normalize(x: &Tensor) -> candle_core::Result<Tensor> {
    let norm = x.sqr()?.sum_keepdim(1)?.sqrt()?;
    let norm = norm.broadcast_add(&eps_for(x)?)?;
    x.broadcast_div(&norm)
}

pub fn masked_mean_l2(hidden: &Tensor, attention_mask: &Tensor) -> candle_core::Result<Tensor> {
    let hidden_dim = hidden.dim(2)?;
    let mask = attention_mask.to_device(hidden.device())?.to_dtype(hidden.dtype())?;
    let mask_3d = mask.unsqueeze(2)?;
    let mask_broadcast = match mask_3d.broadcast_as(hidden.shape()) {
        Ok(m) => m,
        Err(_) => mask_3d.repeat((1, 1, hidden_dim))?,
    };
    let masked = (hidden * &mask_broadcast)?;
    let sum = masked.sum(1)?;
    let lengths = mask.sum(1)?.unsqueeze(1)?.to_dtype(sum.dtype())?;
    let mean = sum.broadcast_div(&lengths)?;
    l2_normalize(&mean)
}

#[cfg(test)]
mod tests {
    use super::*;
    use candle_core::Device;

    #[test]
    fn cls_pooling_takes_first_token() {
        let dev = Device::Cpu;
        let h = Tensor::from_slice(&[3.0f32, 4.0, 1.0, 1.0], (1, 2, 2), &dev).unwrap();
        let mask = Tensor::from_slice(&[1u32, 1], (1, 2), &dev).unwrap();
        let v: Vec<Vec<f32>> = Pooling::Cls.apply(&h, &mask).unwrap().to_vec2().unwrap();
        assert!((v[0][0] - 0.6).abs() < 1e-5);
        assert!((v[0][1] - 0.8).abs() < 1e-5);
    }
}
