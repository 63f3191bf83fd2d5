//! Figment-backed configuration loader, retrieval settings and path helpers.
//!
//! Merges `config.toml` + `config.<env>.toml` + `REPOQA_*` env vars (`__`
//! separates nested keys).
use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

pub struct Config {
    figment: Figment,
}

impl Config {
    pub fn load() -> anyhow::Result<Self> {
        Self::load_for_env(None)
    }

    pub fn load_for_env(env: Option<&str>) -> anyhow::Result<Self> {
        let env_name = match env {
            Some(e) => e.to_string(),
            None => env::var("RUST_ENV").unwrap_or_else(|_| "dev".to_string()),
        };

        let mut figment = Figment::new().merge(Toml::file("config.toml"));
        match env_name.as_str() {
            "dev" | "development" => figment = figment.merge(Toml::file("config.dev.toml")),
            "prod" | "production" => figment = figment.merge(Toml::file("config.prod.toml")),
            "test" | "testing" => figment = figment.merge(Toml::file("config.test.toml")),
            other => tracing::debug!(env = other, "no environment-specific config file"),
        }
        figment = figment.merge(Env::prefixed("REPOQA_").split("__"));

        let config = Self { figment };
        config.validate()?;
        Ok(config)
    }

    pub fn get<T>(&self, key: &str) -> anyhow::Result<T>
    where
        T: serde::de::DeserializeOwned,
    {
        self.figment
            .extract_inner(key)
            .map_err(|e| anyhow::anyhow!("Failed to get '{}': {}", key, e))
    }

    /// Like [`Config::get`], but an absent key yields `T::default()`.
    pub fn get_or_default<T>(&self, key: &str) -> anyhow::Result<T>
    where
        T: serde::de::DeserializeOwned + Default,
    {
        if self.figment.contains(key) { self.get(key) } else { Ok(T::default()) }
    }

    /// The `[retrieval]` section, defaulted and validated.
    pub fn retrieval(&self) -> anyhow::Result<RetrievalConfig> {
        let retrieval: RetrievalConfig = self.get_or_default("retrieval")?;
        retrieval.validate()?;
        Ok(retrieval)
    }

    fn validate(&self) -> anyhow::Result<()> {
        if self.figment.contains("retrieval") {
            self.retrieval()?;
        }
        Ok(())
    }
}

/// Everything the retrieval engine needs, passed explicitly to each component.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalConfig {
    pub top_k: usize,
    pub chunking: ChunkingConfig,
    pub bm25: Bm25Config,
    pub tfidf: TfidfConfig,
    pub fusion: FusionConfig,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            top_k: 5,
            chunking: ChunkingConfig::default(),
            bm25: Bm25Config::default(),
            tfidf: TfidfConfig::default(),
            fusion: FusionConfig::default(),
        }
    }
}

impl RetrievalConfig {
    pub fn validate(&self) -> Result<()> {
        self.chunking.validate()?;
        self.bm25.validate()?;
        self.fusion.validate()
    }
}

/// Window sizes in characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkingConfig {
    pub chunk_size: usize,
    pub overlap: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self { chunk_size: 3000, overlap: 200 }
    }
}

impl ChunkingConfig {
    pub fn validate(&self) -> Result<()> {
        if self.chunk_size == 0 {
            return Err(Error::InvalidConfig("chunking.chunk_size must be positive".into()));
        }
        if self.overlap >= self.chunk_size {
            return Err(Error::InvalidConfig(format!(
                "chunking.overlap ({}) must be smaller than chunking.chunk_size ({})",
                self.overlap, self.chunk_size
            )));
        }
        Ok(())
    }

    /// How far back from a window's hard end the chunker looks for a breakpoint.
    ///
    /// Always smaller than `chunk_size - overlap`, so every cut leaves more
    /// than `overlap` characters behind it and the next window moves forward.
    pub fn lookback(&self) -> usize {
        (self.chunk_size - self.overlap) / 4
    }
}

/// BM25 Okapi constants.
///
/// `epsilon` scales the mean IDF that replaces negative IDFs of terms present
/// in more than half of the chunks.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Bm25Config {
    pub k1: f32,
    pub b: f32,
    pub epsilon: f32,
}

impl Default for Bm25Config {
    fn default() -> Self {
        Self { k1: 1.5, b: 0.75, epsilon: 0.25 }
    }
}

impl Bm25Config {
    pub fn validate(&self) -> Result<()> {
        if !self.k1.is_finite() || self.k1 < 0.0 {
            return Err(Error::InvalidConfig(format!("bm25.k1 must be a non-negative number, got {}", self.k1)));
        }
        if !(0.0..=1.0).contains(&self.b) {
            return Err(Error::InvalidConfig(format!("bm25.b must lie in [0, 1], got {}", self.b)));
        }
        if !self.epsilon.is_finite() || self.epsilon < 0.0 {
            return Err(Error::InvalidConfig(format!(
                "bm25.epsilon must be a non-negative number, got {}",
                self.epsilon
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TfidfConfig {
    /// Fit the vectorizer once at build time instead of on every query.
    pub cache_fit: bool,
}

/// Weights applied to the BM25 and cosine score vectors before summing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FusionConfig {
    pub bm25_weight: f32,
    pub cosine_weight: f32,
}

impl Default for FusionConfig {
    fn default() -> Self {
        Self { bm25_weight: 0.5, cosine_weight: 0.5 }
    }
}

impl FusionConfig {
    pub fn validate(&self) -> Result<()> {
        for (name, w) in [("bm25_weight", self.bm25_weight), ("cosine_weight", self.cosine_weight)] {
            if !w.is_finite() || w < 0.0 {
                return Err(Error::InvalidConfig(format!("fusion.{name} must be a non-negative number, got {w}")));
            }
        }
        Ok(())
    }
}

/// Expand `~`, `$VAR` and `${VAR}` in `input`, then anchor a relative result
/// at `base`. Unset variables leave the text as written. No canonicalization.
pub fn resolve_path(base: &Path, input: &str) -> PathBuf {
    let with_env = shellexpand::env(input).unwrap_or(std::borrow::Cow::Borrowed(input));
    let path = PathBuf::from(shellexpand::tilde(&with_env).as_ref());
    if path.is_absolute() { path } else { base.join(path) }
}
