use displaydoc::Display;
use thiserror::Error;

use crate::{normalizer::Normalizer, pre_tokenizer::PreTokenizer, tokenizer::Tokenizer};

/// A builder to create a [`Tokenizer`].
#[derive(Clone, Debug)]
pub struct Builder {
    normalizer: Normalizer,
    pre_tokenizer: PreTokenizer,
    max_length: usize,
}

/// The potential errors of the builder.
#[derive(Debug, Display, Error, PartialEq)]
pub enum BuilderError {
    /// The maximum length must be at least one character
    MaxLength,
}

impl Default for Builder {
    fn default() -> Self {
        Self::new()
    }
}

impl Builder {
    /// The default maximum number of characters per tokenized sequence.
    pub const MAX_LENGTH: usize = 1_000_000;

    /// Creates a [`Tokenizer`] builder.
    ///
    /// The default settings are:
    /// - A normalizer which treats control characters like whitespace and keeps the case.
    /// - A pre-tokenizer which keeps infix punctuation.
    /// - A maximum length of [`MAX_LENGTH`] characters.
    ///
    /// [`MAX_LENGTH`]: Self::MAX_LENGTH
    pub fn new() -> Self {
        Self {
            normalizer: Normalizer::default(),
            pre_tokenizer: PreTokenizer::default(),
            max_length: Self::MAX_LENGTH,
        }
    }

    /// Configures the normalizer.
    pub fn with_normalizer(mut self, clean_text: bool, lowercase: bool) -> Self {
        self.normalizer = Normalizer::new(clean_text, lowercase);
        self
    }

    /// Configures the pre-tokenizer.
    pub fn with_pre_tokenizer(mut self, keep_infix: bool) -> Self {
        self.pre_tokenizer = PreTokenizer::new(keep_infix);
        self
    }

    /// Configures the maximum number of characters per tokenized sequence.
    ///
    /// # Errors
    /// Fails if the length is zero.
    pub fn with_max_length(mut self, max_length: usize) -> Result<Self, BuilderError> {
        if max_length > 0 {
            self.max_length = max_length;
            Ok(self)
        } else {
            Err(BuilderError::MaxLength)
        }
    }

    /// Builds the tokenizer.
    pub fn build(self) -> Tokenizer {
        Tokenizer {
            normalizer: self.normalizer,
            pre_tokenizer: self.pre_tokenizer,
            max_length: self.max_length,
        }
    }
}
