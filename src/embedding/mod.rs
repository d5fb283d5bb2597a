//! Embedding table: token index -> dense vector, and back again.
//!
//! The table owns a `[vocab_size, embedding_dim]` weight matrix. Forward lookup
//! copies rows out; reverse lookup ranks every row by cosine similarity and
//! returns the best index.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, StandardNormal};
use tracing::{debug, trace, warn};

use crate::kernels::{self, parallel};
use crate::tensor::{Tensor1, Tensor2, TensorView1, TensorView2};
use crate::tokenizer::TokenId;

mod config;

pub use config::{EmbeddingConfig, DEFAULT_INIT_SCALE};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Returned by decode when no row is a better match than the initial sentinel.
pub const NO_MATCH: TokenId = -1;

/// Score every candidate has to beat. Strict comparison means a row that is
/// exactly antiparallel to the query never wins.
const INITIAL_BEST_SCORE: f32 = -1.0;

pub type Result<T> = std::result::Result<T, EmbeddingError>;

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum EmbeddingError {
    #[error("Invalid embedding config: {0}")]
    InvalidConfig(String),

    #[error("Dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },

    #[error("Row {index} out of range for vocab size {vocab_size}")]
    RowOutOfRange { index: usize, vocab_size: usize },

    #[error("Vocab mismatch: tokenizer has {tokenizer} entries, table has {table} rows")]
    VocabMismatch { tokenizer: usize, table: usize },
}

/// A decoded index together with its cosine similarity
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Match {
    pub index: usize,
    pub score: f32,
}

impl Match {
    pub fn token(&self) -> TokenId {
        self.index as TokenId
    }
}

/// Dense embedding matrix with forward and nearest-neighbour reverse lookup.
///
/// Read-only after construction apart from [`EmbeddingTable::set_row`], which
/// needs `&mut self`; shared references can be used from many threads.
#[derive(Debug, Clone)]
pub struct EmbeddingTable {
    weights: Tensor2, // [vocab_size, embedding_dim]
}

impl EmbeddingTable {
    /// Create a table with N(0, 1) * 0.01 weights drawn from `rng`.
    pub fn new<R: Rng + ?Sized>(
        vocab_size: usize,
        embedding_dim: usize,
        rng: &mut R,
    ) -> Result<Self> {
        Self::with_scale(vocab_size, embedding_dim, DEFAULT_INIT_SCALE, rng)
    }

    /// Create a table whose weights are N(0, 1) samples scaled by `init_scale`.
    ///
    /// Entries are filled in row-major order, so the same rng state always
    /// yields the same matrix.
    pub fn with_scale<R: Rng + ?Sized>(
        vocab_size: usize,
        embedding_dim: usize,
        init_scale: f32,
        rng: &mut R,
    ) -> Result<Self> {
        EmbeddingConfig::new(vocab_size, embedding_dim)
            .with_init_scale(init_scale)
            .validate()?;

        let weights = Tensor2::from_shape_simple_fn((vocab_size, embedding_dim), || {
            let sample: f32 = StandardNormal.sample(&mut *rng);
            sample * init_scale
        });

        debug!(vocab_size, embedding_dim, init_scale, "initialized embedding table");
        Ok(Self { weights })
    }

    /// Create a table from a config, seeding a ChaCha rng from `config.seed`
    /// when present and from OS entropy otherwise.
    pub fn from_config(config: &EmbeddingConfig) -> Result<Self> {
        config.validate()?;
        let mut rng = match config.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };
        Self::with_scale(
            config.vocab_size,
            config.embedding_dim,
            config.init_scale,
            &mut rng,
        )
    }

    /// Wrap an existing weight matrix.
    ///
    /// Zero rows are allowed (every decode then yields [`NO_MATCH`]); zero
    /// columns are not.
    pub fn from_weights(weights: Tensor2) -> Result<Self> {
        if weights.ncols() == 0 {
            return Err(EmbeddingError::InvalidConfig(
                "embedding_dim must be at least 1".into(),
            ));
        }
        // Row views are expected to be contiguous
        let weights = weights.as_standard_layout().into_owned();
        Ok(Self { weights })
    }

    pub fn vocab_size(&self) -> usize {
        self.weights.nrows()
    }

    pub fn embedding_dim(&self) -> usize {
        self.weights.ncols()
    }

    pub fn weights(&self) -> TensorView2<'_> {
        self.weights.view()
    }

    fn index_of(&self, token: TokenId) -> Option<usize> {
        usize::try_from(token)
            .ok()
            .filter(|&idx| idx < self.vocab_size())
    }

    /// Copy of row `token`, or `None` for an unknown token.
    pub fn row(&self, token: TokenId) -> Option<Tensor1> {
        self.index_of(token).map(|idx| self.weights.row(idx).to_owned())
    }

    /// Overwrite row `index` with `values`.
    pub fn set_row(&mut self, index: usize, values: &[f32]) -> Result<()> {
        let vocab_size = self.vocab_size();
        if index >= vocab_size {
            return Err(EmbeddingError::RowOutOfRange { index, vocab_size });
        }
        if values.len() != self.embedding_dim() {
            return Err(EmbeddingError::DimensionMismatch {
                expected: self.embedding_dim(),
                got: values.len(),
            });
        }
        self.weights
            .row_mut(index)
            .assign(&TensorView1::from(values));
        Ok(())
    }

    /// Look up a single token. Unknown tokens map to a zero vector.
    pub fn forward_token(&self, token: TokenId) -> Tensor1 {
        self.row(token)
            .unwrap_or_else(|| Tensor1::zeros(self.embedding_dim()))
    }

    /// Look up a sequence of tokens; output has one fresh vector per token.
    pub fn forward(&self, tokens: &[TokenId]) -> Vec<Tensor1> {
        tokens.iter().map(|&t| self.forward_token(t)).collect()
    }

    /// Rank every row by cosine similarity to `vector` and return the best.
    ///
    /// Rows are scanned in ascending order and a candidate must be strictly
    /// better than the current best (starting at -1.0), so ties resolve to
    /// the lowest index. Returns `None` when the vector has the wrong length,
    /// has zero or non-finite norm, or nothing beats the sentinel.
    pub fn best_match(&self, vector: TensorView1<'_>) -> Option<Match> {
        if vector.len() != self.embedding_dim() {
            warn!(
                expected = self.embedding_dim(),
                got = vector.len(),
                "decode input has wrong dimension"
            );
            return None;
        }

        let Some(unit) = kernels::normalize(vector) else {
            // Unknown tokens forward to zero vectors, so this is routine
            debug!("decode input has zero or non-finite norm");
            return None;
        };

        let scores = parallel::score_rows(self.weights.view(), unit.view());
        let best = kernels::first_strict_max(scores, INITIAL_BEST_SCORE)
            .map(|(index, score)| Match { index, score });

        trace!(?best, "decoded vector");
        best
    }

    /// Decode one vector to its nearest token, or [`NO_MATCH`].
    pub fn decode_vector(&self, vector: TensorView1<'_>) -> TokenId {
        self.best_match(vector)
            .map(|m| m.token())
            .unwrap_or(NO_MATCH)
    }

    /// Decode each vector independently, preserving order.
    #[cfg(not(feature = "parallel"))]
    pub fn decode(&self, vectors: &[Tensor1]) -> Vec<TokenId> {
        vectors.iter().map(|v| self.decode_vector(v.view())).collect()
    }

    /// Decode each vector independently, preserving order.
    #[cfg(feature = "parallel")]
    pub fn decode(&self, vectors: &[Tensor1]) -> Vec<TokenId> {
        vectors
            .par_iter()
            .map(|v| self.decode_vector(v.view()))
            .collect()
    }
}
