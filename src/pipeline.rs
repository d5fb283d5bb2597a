//! Text -> tokens -> vectors -> tokens -> text, with the tokenizer and the
//! embedding table kept in step.

use tracing::debug;

use crate::embedding::{EmbeddingConfig, EmbeddingError, EmbeddingTable, Result};
use crate::tensor::Tensor1;
use crate::tokenizer::{TokenId, Tokenizer};

/// A tokenizer paired with an embedding table of matching vocabulary size.
#[derive(Debug, Clone)]
pub struct CharPipeline {
    tokenizer: Tokenizer,
    table: EmbeddingTable,
}

impl CharPipeline {
    /// Pair an existing tokenizer and table; their vocab sizes must agree.
    pub fn new(tokenizer: Tokenizer, table: EmbeddingTable) -> Result<Self> {
        if tokenizer.vocab_size() != table.vocab_size() {
            return Err(EmbeddingError::VocabMismatch {
                tokenizer: tokenizer.vocab_size(),
                table: table.vocab_size(),
            });
        }
        Ok(Self { tokenizer, table })
    }

    /// Build the vocabulary from `texts`, then a table sized to it.
    ///
    /// `config.vocab_size` is overridden by the size of the built vocabulary.
    pub fn build<I, S>(texts: I, config: &EmbeddingConfig) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let tokenizer = Tokenizer::from_texts(texts);
        Self::with_tokenizer(tokenizer, config)
    }

    /// Create a fresh table for an already-built tokenizer.
    pub fn with_tokenizer(tokenizer: Tokenizer, config: &EmbeddingConfig) -> Result<Self> {
        let config = EmbeddingConfig {
            vocab_size: tokenizer.vocab_size(),
            ..config.clone()
        };
        let table = EmbeddingTable::from_config(&config)?;
        debug!(
            vocab_size = config.vocab_size,
            embedding_dim = config.embedding_dim,
            "built pipeline"
        );
        Ok(Self { tokenizer, table })
    }

    pub fn tokenizer(&self) -> &Tokenizer {
        &self.tokenizer
    }

    pub fn table(&self) -> &EmbeddingTable {
        &self.table
    }

    /// Mutable access for loading externally computed rows.
    pub fn table_mut(&mut self) -> &mut EmbeddingTable {
        &mut self.table
    }

    /// Tokenize `text` and look up one vector per character.
    pub fn embed(&self, text: &str) -> Vec<Tensor1> {
        let tokens = self.tokenizer.tokenize(text);
        self.table.forward(&tokens)
    }

    /// Nearest token for each vector.
    pub fn recover_tokens(&self, vectors: &[Tensor1]) -> Vec<TokenId> {
        self.table.decode(vectors)
    }

    /// Nearest token for each vector, rendered by the tokenizer.
    pub fn recover(&self, vectors: &[Tensor1]) -> String {
        let tokens = self.recover_tokens(vectors);
        self.tokenizer.decode(&tokens)
    }
}
