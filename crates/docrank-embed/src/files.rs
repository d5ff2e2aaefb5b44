//! Locating model files for a model identifier.
//!
//! Resolution order: the identifier as a local directory, then
//! `<model_dir>/<id>` (and `<model_dir>/<id with '/' as '_'>`) where
//! `model_dir` comes from settings or `APP_MODEL_DIR`, then the Hugging Face
//! hub cache (downloading if needed).

use std::path::{Path, PathBuf};

use docrank_core::error::{Error, Result};

const WEIGHT_FILES: [&str; 2] = ["model.safetensors", "pytorch_model.bin"];
const POOLING_CONFIG: &str = "1_Pooling/config.json";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelFiles {
    pub config: PathBuf,
    pub tokenizer: PathBuf,
    pub weights: PathBuf,
    pub pooling: Option<PathBuf>,
}

impl ModelFiles {
    pub fn in_dir(dir: &Path) -> Result<Self> {
        let require = |name: &str| {
            let p = dir.join(name);
            if p.is_file() { Ok(p) } else { Err(Error::ModelUnavailable(format!("missing {}", p.display()))) }
        };
        let config = require("config.json")?;
        let tokenizer = require("tokenizer.json")?;
        let weights = WEIGHT_FILES
            .iter()
            .map(|name| dir.join(name))
            .find(|p| p.is_file())
            .ok_or_else(|| Error::ModelUnavailable(format!("no model weights in {}", dir.display())))?;
        let pooling = Some(dir.join(POOLING_CONFIG)).filter(|p| p.is_file());
        Ok(Self { config, tokenizer, weights, pooling })
    }

    pub fn resolve(model: &str, model_dir: Option<&Path>) -> Result<Self> {
        let direct = Path::new(model);
        if direct.is_dir() {
            tracing::info!("Using model dir: {}", direct.display());
            return Self::in_dir(direct);
        }
        let env_dir = std::env::var("APP_MODEL_DIR").ok().map(PathBuf::from);
        for base in model_dir.map(Path::to_path_buf).into_iter().chain(env_dir) {
            for candidate in [base.join(model), base.join(model.replace('/', "_"))] {
                if candidate.is_dir() {
                    tracing::info!("Using model dir: {}", candidate.display());
                    return Self::in_dir(&candidate);
                }
            }
        }
        Self::from_hub(model)
    }

    fn from_hub(model: &str) -> Result<Self> {
        let unavailable = |e: hf_hub::api::sync::ApiError| Error::ModelUnavailable(format!("{}: {}", model, e));
        tracing::info!("Fetching {} from the Hugging Face hub", model);
        let api = hf_hub::api::sync::Api::new().map_err(unavailable)?;
        let repo = api.model(model.to_string());
        let config = repo.get("config.json").map_err(unavailable)?;
        let tokenizer = repo.get("tokenizer.json").map_err(unavailable)?;
        let mut weights = None;
        for name in WEIGHT_FILES {
            match repo.get(name) {
                Ok(p) => { weights = Some(p); break; }
                Err(e) => tracing::debug!("{} not available for {}: {}", name, model, e),
            }
        }
        let weights = weights.ok_or_else(|| Error::ModelUnavailable(format!("{}: no model weights on the hub", model)))?;
        let pooling = repo.get(POOLING_CONFIG).ok();
        Ok(Self { config, tokenizer, weights, pooling })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_files_are_model_unavailable() {
        let tmp = tempfile::TempDir::new().unwrap();
        std::fs::write(tmp.path().join("config.json"), "{}").unwrap();
        std::fs::write(tmp.path().join("tokenizer.json"), "{}").unwrap();
        assert!(matches!(ModelFiles::in_dir(tmp.path()), Err(Error::ModelUnavailable(_))));

        std::fs::write(tmp.path().join("pytorch_model.bin"), "").unwrap();
        let files = ModelFiles::in_dir(tmp.path()).unwrap();
        assert!(files.weights.ends_with("pytorch_model.bin"));
        assert_eq!(files.pooling, None);
    }
}
