use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::Path;

use super::{EmbeddingError, Result};

/// Standard deviation of the initial weights
pub const DEFAULT_INIT_SCALE: f32 = 0.01;

fn default_init_scale() -> f32 {
    DEFAULT_INIT_SCALE
}

/// Shape and initialization settings for an [`EmbeddingTable`](super::EmbeddingTable).
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct EmbeddingConfig {
    pub vocab_size: usize,
    pub embedding_dim: usize,
    /// Weights are drawn from N(0, 1) and multiplied by this factor.
    #[serde(default = "default_init_scale")]
    pub init_scale: f32,
    /// Fixed seed for reproducible weights. `None` draws from OS entropy.
    #[serde(default)]
    pub seed: Option<u64>,
}

impl EmbeddingConfig {
    pub fn new(vocab_size: usize, embedding_dim: usize) -> Self {
        Self {
            vocab_size,
            embedding_dim,
            init_scale: DEFAULT_INIT_SCALE,
            seed: None,
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_init_scale(mut self, init_scale: f32) -> Self {
        self.init_scale = init_scale;
        self
    }

    /// Reject shapes that would produce an empty or degenerate matrix.
    pub fn validate(&self) -> Result<()> {
        if self.vocab_size == 0 {
            return Err(EmbeddingError::InvalidConfig(
                "vocab_size must be at least 1".into(),
            ));
        }
        if self.embedding_dim == 0 {
            return Err(EmbeddingError::InvalidConfig(
                "embedding_dim must be at least 1".into(),
            ));
        }
        if !self.init_scale.is_finite() || self.init_scale <= 0.0 {
            return Err(EmbeddingError::InvalidConfig(format!(
                "init_scale must be finite and positive, got {}",
                self.init_scale
            )));
        }
        Ok(())
    }

    /// Load a config from a JSON file and validate it.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        let config: Self = serde_json::from_str(&text)
            .with_context(|| format!("failed to parse config {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }
}
