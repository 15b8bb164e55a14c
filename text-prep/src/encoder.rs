use word_tokenizer::{Tokenizer, TokenizerError};

use crate::vocab::{Vocabulary, UNK};

/// Encodes texts into token indices of a vocabulary.
#[derive(Clone, Copy, Debug)]
pub struct Encoder<'a> {
    vocab: &'a Vocabulary,
    tokenizer: &'a Tokenizer,
}

impl<'a> Encoder<'a> {
    /// Creates an encoder from a vocabulary and the tokenizer it was built with.
    pub fn new(vocab: &'a Vocabulary, tokenizer: &'a Tokenizer) -> Self {
        Self { vocab, tokenizer }
    }

    /// Encodes a text into one index per token.
    ///
    /// Unknown tokens are encoded with the index of the unknown token. The indices are neither
    /// padded nor truncated.
    ///
    /// # Errors
    /// Fails if the text exceeds the maximum length of the tokenizer.
    pub fn encode(&self, text: &str) -> Result<Vec<usize>, TokenizerError> {
        Ok(self
            .tokenizer
            .tokenize(text)?
            .map(|token| self.vocab.index(&token))
            .collect())
    }

    /// Decodes indices into their tokens, unknown indices are decoded as the unknown token.
    pub fn decode(&self, indices: &[usize]) -> Vec<&'a str> {
        let vocab = self.vocab;
        indices
            .iter()
            .map(|&idx| vocab.token(idx).unwrap_or(UNK))
            .collect()
    }

    /// The vocabulary.
    pub fn vocab(&self) -> &'a Vocabulary {
        self.vocab
    }
}
