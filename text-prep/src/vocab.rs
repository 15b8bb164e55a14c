use std::{collections::HashMap, convert::TryFrom};

use displaydoc::Display;
use itertools::Itertools;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::counter::TokenCounts;

/// The padding token.
pub const PAD: &str = "<PAD>";
/// The unknown token.
pub const UNK: &str = "<UNK>";

/// The index of the padding token.
pub const PAD_ID: usize = 0;
/// The index of the unknown token.
pub const UNK_ID: usize = 1;

/// The potential errors of the vocabulary.
#[derive(Debug, Display, Error)]
pub enum VocabularyError {
    /// The token and index mappings are inconsistent at index {0}
    Inconsistent(usize),
}

/// A bijection between tokens and dense indices.
///
/// The padding and unknown tokens have the reserved indices `0` and `1`, all other tokens are
/// indexed in descending order of their frequency.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(try_from = "VocabularyParts")]
pub struct Vocabulary {
    w2idx: HashMap<String, usize>,
    i2w: Vec<String>,
}

/// The unchecked mappings of a deserialized vocabulary.
#[derive(Deserialize)]
struct VocabularyParts {
    w2idx: HashMap<String, usize>,
    i2w: Vec<String>,
}

impl TryFrom<VocabularyParts> for Vocabulary {
    type Error = VocabularyError;

    fn try_from(parts: VocabularyParts) -> Result<Self, Self::Error> {
        Self::from_parts(parts.w2idx, parts.i2w)
    }
}

impl Default for Vocabulary {
    fn default() -> Self {
        let i2w = vec![PAD.to_string(), UNK.to_string()];
        let w2idx = i2w
            .iter()
            .enumerate()
            .map(|(idx, token)| (token.clone(), idx))
            .collect();

        Self { w2idx, i2w }
    }
}

impl Vocabulary {
    /// Builds the vocabulary from the (pruned) token counts.
    ///
    /// More frequent tokens get smaller indices, tokens with equal counts are ordered
    /// lexicographically. Counted tokens equal to a reserved token are skipped.
    pub fn build(counts: &TokenCounts) -> Self {
        let mut vocab = Self::default();
        vocab.i2w.reserve(counts.len());
        vocab.w2idx.reserve(counts.len());
        for (token, _) in counts
            .iter()
            .filter(|(token, _)| !is_reserved(token))
            .sorted_unstable_by(|(t1, c1), (t2, c2)| c2.cmp(c1).then_with(|| t1.cmp(t2)))
        {
            vocab.w2idx.insert(token.clone(), vocab.i2w.len());
            vocab.i2w.push(token.clone());
        }
        debug!("Built a vocabulary of {} tokens.", vocab.len());

        vocab
    }

    /// Creates the vocabulary from its mappings.
    ///
    /// # Errors
    /// Fails if the mappings aren't inverse to each other or if the reserved tokens don't have
    /// their reserved indices.
    pub fn from_parts(
        w2idx: HashMap<String, usize>,
        i2w: Vec<String>,
    ) -> Result<Self, VocabularyError> {
        if w2idx.len() != i2w.len() {
            return Err(VocabularyError::Inconsistent(i2w.len().min(w2idx.len())));
        }
        if i2w.get(PAD_ID).map(String::as_str) != Some(PAD) {
            return Err(VocabularyError::Inconsistent(PAD_ID));
        }
        if i2w.get(UNK_ID).map(String::as_str) != Some(UNK) {
            return Err(VocabularyError::Inconsistent(UNK_ID));
        }
        if let Some(idx) = i2w
            .iter()
            .enumerate()
            .position(|(idx, token)| w2idx.get(token) != Some(&idx))
        {
            return Err(VocabularyError::Inconsistent(idx));
        }

        Ok(Self { w2idx, i2w })
    }

    /// Gets the index of a token, the unknown index if it isn't in the vocabulary.
    pub fn index(&self, token: &str) -> usize {
        self.get(token).unwrap_or(UNK_ID)
    }

    /// Gets the index of a token.
    pub fn get(&self, token: &str) -> Option<usize> {
        self.w2idx.get(token).copied()
    }

    /// Gets the token of an index.
    pub fn token(&self, idx: usize) -> Option<&str> {
        self.i2w.get(idx).map(String::as_str)
    }

    /// Checks whether the token is in the vocabulary.
    pub fn contains(&self, token: &str) -> bool {
        self.w2idx.contains_key(token)
    }

    /// The number of tokens, including the reserved ones.
    pub fn len(&self) -> usize {
        self.i2w.len()
    }

    /// Always false, the reserved tokens are part of every vocabulary.
    pub fn is_empty(&self) -> bool {
        self.i2w.is_empty()
    }

    /// The number of tokens, excluding the reserved ones.
    pub fn n_words(&self) -> usize {
        self.len().saturating_sub(2)
    }

    /// Checks whether less than `min_words` tokens besides the reserved ones are known.
    ///
    /// Logs a warning if so.
    pub fn is_degenerate(&self, min_words: usize) -> bool {
        let is_degenerate = self.n_words() < min_words;
        if is_degenerate {
            warn!(
                "The vocabulary is degenerate with {} of at least {} words.",
                self.n_words(),
                min_words,
            );
        }

        is_degenerate
    }

    /// The mapping from token to index.
    pub fn w2idx(&self) -> &HashMap<String, usize> {
        &self.w2idx
    }

    /// The mapping from index to token.
    pub fn i2w(&self) -> &[String] {
        &self.i2w
    }
}

fn is_reserved(token: &str) -> bool {
    token == PAD || token == UNK
}
