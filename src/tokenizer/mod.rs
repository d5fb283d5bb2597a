use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;
use tracing::debug;

mod vocab;

pub use vocab::Vocabulary;

/// Token index. Known characters are `0..vocab_size`; anything negative is unknown.
pub type TokenId = i64;

/// Emitted by [`Tokenizer::tokenize`] for characters missing from the vocabulary
pub const UNKNOWN_TOKEN: TokenId = -1;

/// Rendered by [`Tokenizer::decode`] for tokens outside the vocabulary
pub const UNKNOWN_PIECE: &str = "<UNK>";

const DECODE_SEPARATOR: &str = " ";

pub type Result<T> = std::result::Result<T, TokenizerError>;

#[derive(thiserror::Error, Debug)]
pub enum TokenizerError {
    #[error("Vocabulary I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Vocabulary JSON is malformed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Inconsistent vocabulary: {0}")]
    InconsistentVocabulary(String),
}

/// Character-level tokenizer: one token per Unicode scalar value.
#[derive(Debug, Clone, Default)]
pub struct Tokenizer {
    vocab: Vocabulary,
}

impl Tokenizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_vocabulary(vocab: Vocabulary) -> Self {
        Self { vocab }
    }

    /// Build a tokenizer whose vocabulary covers every character in `texts`.
    pub fn from_texts<I, S>(texts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut tokenizer = Self::new();
        tokenizer.build_vocabulary(texts);
        tokenizer
    }

    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocab
    }

    pub fn vocab_size(&self) -> usize {
        self.vocab.len()
    }

    /// Add every unseen character in `texts` to the vocabulary.
    ///
    /// Indices are assigned in first-occurrence order and existing indices
    /// never move.
    pub fn build_vocabulary<I, S>(&mut self, texts: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let before = self.vocab.len();
        for text in texts {
            for ch in text.as_ref().chars() {
                self.vocab.insert(ch);
            }
        }
        debug!(
            added = self.vocab.len() - before,
            vocab_size = self.vocab.len(),
            "built vocabulary"
        );
    }

    /// Map each character to its index, or [`UNKNOWN_TOKEN`].
    pub fn tokenize(&self, text: &str) -> Vec<TokenId> {
        text.chars()
            .map(|ch| {
                self.vocab
                    .index_of(ch)
                    .map(|idx| idx as TokenId)
                    .unwrap_or(UNKNOWN_TOKEN)
            })
            .collect()
    }

    /// Display form of a single token
    pub fn piece(&self, token: TokenId) -> &str {
        usize::try_from(token)
            .ok()
            .and_then(|idx| self.vocab.char_at(idx))
            .unwrap_or(UNKNOWN_PIECE)
    }

    /// Render tokens as space-separated characters, `<UNK>` for unknowns.
    pub fn decode(&self, tokens: &[TokenId]) -> String {
        self.join(tokens, DECODE_SEPARATOR)
    }

    /// Render tokens back to contiguous text, `<UNK>` for unknowns.
    pub fn decode_compact(&self, tokens: &[TokenId]) -> String {
        self.join(tokens, "")
    }

    fn join(&self, tokens: &[TokenId], sep: &str) -> String {
        tokens
            .iter()
            .map(|&t| self.piece(t))
            .collect::<Vec<_>>()
            .join(sep)
    }

    /// Write the vocabulary to `path` as JSON.
    pub fn save_vocabulary<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let mut writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer_pretty(&mut writer, &self.vocab.to_file())?;
        writer.write_all(b"\n")?;
        writer.flush()?;
        debug!(path = %path.display(), vocab_size = self.vocab.len(), "saved vocabulary");
        Ok(())
    }

    /// Replace the vocabulary with the one stored at `path`.
    pub fn load_vocabulary<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        let path = path.as_ref();
        let reader = BufReader::new(File::open(path)?);
        let file: vocab::VocabularyFile = serde_json::from_reader(reader)?;
        self.vocab = Vocabulary::from_file(file)?;
        debug!(path = %path.display(), vocab_size = self.vocab.len(), "loaded vocabulary");
        Ok(())
    }

    /// Create a tokenizer from a saved vocabulary.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut tokenizer = Self::new();
        tokenizer.load_vocabulary(path)?;
        Ok(tokenizer)
    }
}
