//! Configuration loader and path helpers.
//!
//! Uses Figment to merge built-in defaults, `docrank.toml`,
//! `docrank.<env>.toml` and `APP_*` env vars (`__` separates nested keys,
//! e.g. `APP_CHUNKING__WINDOW=300`).

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::chunker::ChunkConfig;
use crate::error::{Error, Result};

pub const CONFIG_FILE: &str = "docrank.toml";

pub struct Config {
    figment: Figment,
}

impl Config {
    /// Load from the current working directory.
    pub fn load() -> Result<Self> {
        Self::load_from(Path::new("."))
    }

    pub fn load_from(dir: &Path) -> Result<Self> {
        let env_name = env::var("RUST_ENV").unwrap_or_else(|_| "dev".to_string());

        let mut figment = Figment::from(Serialized::defaults(Settings::default()))
            .merge(Toml::file(dir.join(CONFIG_FILE)));
        match env_name.as_str() {
            "dev" | "development" => figment = figment.merge(Toml::file(dir.join("docrank.dev.toml"))),
            "prod" | "production" => figment = figment.merge(Toml::file(dir.join("docrank.prod.toml"))),
            "test" | "testing" => figment = figment.merge(Toml::file(dir.join("docrank.test.toml"))),
            _ => {}
        }
        figment = figment.merge(Env::prefixed("APP_").split("__"));

        let config = Self { figment };
        config.settings()?.validate()?;
        Ok(config)
    }

    pub fn settings(&self) -> Result<Settings> {
        self.figment
            .extract()
            .map_err(|e| Error::Config(e.to_string()))
    }
}

/// Typed view over the merged configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub chunking: ChunkingSettings,
    pub engine: EngineSettings,
    pub model: ModelSettings,
}

impl Settings {
    pub fn validate(&self) -> Result<()> {
        self.chunking.chunk_config()?;
        if self.engine.pool_size == 0 {
            return Err(Error::Config("engine.pool_size must be at least 1".to_string()));
        }
        if self.model.batch_size == 0 {
            return Err(Error::Config("model.batch_size must be at least 1".to_string()));
        }
        if self.model.max_len < 8 {
            return Err(Error::Config(format!("model.max_len {} is too small", self.model.max_len)));
        }
        Ok(())
    }
}

/// Window and overlap are counted in characters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkingSettings {
    pub window: usize,
    pub overlap: usize,
}

impl Default for ChunkingSettings {
    fn default() -> Self {
        Self { window: 450, overlap: 100 }
    }
}

impl ChunkingSettings {
    pub fn chunk_config(&self) -> Result<ChunkConfig> {
        ChunkConfig::new(self.window, self.overlap)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineSettings {
    pub pool_size: usize,
    pub timeout_secs: Option<u64>,
    /// Score candidates whole instead of by their best paragraph.
    pub whole_document: bool,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self { pool_size: 1, timeout_secs: None, whole_document: false }
    }
}

impl EngineSettings {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelSettings {
    pub batch_size: usize,
    pub max_len: usize,
    pub model_dir: Option<String>,
}

impl Default for ModelSettings {
    fn default() -> Self {
        Self { batch_size: 16, max_len: 512, model_dir: None }
    }
}

/// Expand `~` and `$VAR` / `${VAR}` in a configured path. A string naming an
/// unset variable is used as written.
pub fn expand_path<S: AsRef<str>>(input: S) -> PathBuf {
    let s = input.as_ref();
    let expanded_env = shellexpand::env(s).unwrap_or(std::borrow::Cow::Borrowed(s));
    let expanded = shellexpand::tilde(&expanded_env);
    PathBuf::from(expanded.as_ref())
}
