use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

use super::{Result, TokenizerError};

/// Bidirectional mapping between characters and contiguous indices `0..len`.
///
/// Characters are stored as one-character strings so the persisted form is a
/// plain string-keyed JSON object.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Vocabulary {
    char_to_index: HashMap<String, usize>,
    index_to_char: Vec<String>,
}

/// On-disk layout: both views are written so the file is readable by hand.
///
/// `Vocab` / `IndexToWord` are accepted on load for files written by older
/// tooling.
#[derive(Debug, Serialize, Deserialize)]
pub(super) struct VocabularyFile {
    #[serde(alias = "Vocab")]
    pub vocab: BTreeMap<String, usize>,
    #[serde(alias = "IndexToWord")]
    pub index_to_char: Vec<String>,
}

impl Vocabulary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.index_to_char.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index_to_char.is_empty()
    }

    /// Add `ch` if unseen and return its index.
    pub fn insert(&mut self, ch: char) -> usize {
        let key = ch.to_string();
        if let Some(&idx) = self.char_to_index.get(&key) {
            return idx;
        }
        let idx = self.index_to_char.len();
        self.index_to_char.push(key.clone());
        self.char_to_index.insert(key, idx);
        idx
    }

    pub fn index_of(&self, ch: char) -> Option<usize> {
        let mut buf = [0u8; 4];
        self.char_to_index.get(&*ch.encode_utf8(&mut buf)).copied()
    }

    pub fn char_at(&self, idx: usize) -> Option<&str> {
        self.index_to_char.get(idx).map(String::as_str)
    }

    /// Characters in index order
    pub fn chars(&self) -> impl Iterator<Item = &str> {
        self.index_to_char.iter().map(String::as_str)
    }

    pub(super) fn to_file(&self) -> VocabularyFile {
        VocabularyFile {
            vocab: self
                .char_to_index
                .iter()
                .map(|(k, &v)| (k.clone(), v))
                .collect(),
            index_to_char: self.index_to_char.clone(),
        }
    }

    /// Rebuild from a persisted file, checking that both views agree.
    pub(super) fn from_file(file: VocabularyFile) -> Result<Self> {
        let VocabularyFile {
            vocab,
            index_to_char,
        } = file;

        if vocab.len() != index_to_char.len() {
            return Err(TokenizerError::InconsistentVocabulary(format!(
                "vocab has {} entries but index_to_char has {}",
                vocab.len(),
                index_to_char.len()
            )));
        }

        for (idx, key) in index_to_char.iter().enumerate() {
            if key.chars().count() != 1 {
                return Err(TokenizerError::InconsistentVocabulary(format!(
                    "entry {} is not a single character: {:?}",
                    idx, key
                )));
            }
            match vocab.get(key) {
                Some(&mapped) if mapped == idx => {}
                Some(&mapped) => {
                    return Err(TokenizerError::InconsistentVocabulary(format!(
                        "{:?} is at position {} but mapped to {}",
                        key, idx, mapped
                    )));
                }
                None => {
                    return Err(TokenizerError::InconsistentVocabulary(format!(
                        "{:?} at position {} is missing from vocab",
                        key, idx
                    )));
                }
            }
        }

        Ok(Self {
            char_to_index: vocab.into_iter().collect(),
            index_to_char,
        })
    }
}
