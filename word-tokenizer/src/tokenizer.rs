use std::borrow::Cow;

use displaydoc::Display;
use thiserror::Error;

use crate::{normalizer::Normalizer, pre_tokenizer::PreTokenizer};

/// A word tokenizer.
///
/// Can be created via the [`Builder`] and consists of a normalizer and a pre-tokenizer.
///
/// [`Builder`]: crate::Builder
#[derive(Clone, Debug)]
pub struct Tokenizer {
    pub(crate) normalizer: Normalizer,
    pub(crate) pre_tokenizer: PreTokenizer,
    pub(crate) max_length: usize,
}

/// The potential errors of the tokenizer.
#[derive(Debug, Display, Error, PartialEq)]
pub enum TokenizerError {
    /// The sequence of {len} characters exceeds the maximum length of {max} characters
    ResourceLimitExceeded { len: usize, max: usize },
}

impl Tokenizer {
    /// The maximum number of characters per tokenized sequence.
    pub fn max_length(&self) -> usize {
        self.max_length
    }

    /// Checks a sequence length in characters against the maximum length.
    pub fn check_length(&self, len: usize) -> Result<(), TokenizerError> {
        if len <= self.max_length {
            Ok(())
        } else {
            Err(TokenizerError::ResourceLimitExceeded {
                len,
                max: self.max_length,
            })
        }
    }

    /// Tokenizes the sequence.
    ///
    /// The tokens are produced lazily.
    ///
    /// # Errors
    /// Fails if the sequence exceeds the maximum length.
    pub fn tokenize<'s>(&self, sequence: &'s str) -> Result<Tokens<'_, 's>, TokenizerError> {
        // the number of chars is bounded by the number of bytes
        if sequence.len() > self.max_length {
            self.check_length(sequence.chars().count())?;
        }

        Ok(Tokens {
            tokenizer: self,
            sequence,
            offset: 0,
        })
    }

    /// Tokenizes the documents as if they were joined by single spaces.
    ///
    /// The joined length is checked before any token is produced, afterwards the tokens are
    /// produced lazily document by document.
    ///
    /// # Errors
    /// Fails if the joined documents exceed the maximum length.
    pub fn tokenize_corpus<'s, I>(
        &self,
        documents: I,
    ) -> Result<CorpusTokens<'_, 's, I::IntoIter>, TokenizerError>
    where
        I: IntoIterator<Item = &'s str>,
        I::IntoIter: Clone,
    {
        let documents = documents.into_iter();
        let (len, count) = documents
            .clone()
            .fold((0usize, 0usize), |(len, count), document: &str| {
                (len + document.chars().count(), count + 1)
            });
        self.check_length(len + count.saturating_sub(1))?;

        Ok(CorpusTokens {
            tokenizer: self,
            documents,
            current: None,
        })
    }
}

/// The lazily produced tokens of a sequence.
#[derive(Clone, Debug)]
pub struct Tokens<'t, 's> {
    tokenizer: &'t Tokenizer,
    sequence: &'s str,
    offset: usize,
}

impl<'t, 's> Iterator for Tokens<'t, 's> {
    type Item = Cow<'s, str>;

    fn next(&mut self) -> Option<Self::Item> {
        let sequence = self.sequence;
        let normalizer = &self.tokenizer.normalizer;
        let start = match sequence[self.offset..]
            .char_indices()
            .find(|&(_, c)| !normalizer.is_separator(c))
        {
            Some((idx, _)) => self.offset + idx,
            None => {
                self.offset = sequence.len();
                return None;
            }
        };
        let len = self
            .tokenizer
            .pre_tokenizer
            .token_len(&sequence[start..], |c| normalizer.is_separator(c));
        self.offset = start + len;

        Some(normalizer.normalize(&sequence[start..self.offset]))
    }
}

/// The lazily produced tokens of a corpus of documents.
#[derive(Clone, Debug)]
pub struct CorpusTokens<'t, 's, I> {
    tokenizer: &'t Tokenizer,
    documents: I,
    current: Option<Tokens<'t, 's>>,
}

impl<'t, 's, I> Iterator for CorpusTokens<'t, 's, I>
where
    I: Iterator<Item = &'s str>,
{
    type Item = Cow<'s, str>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(token) = self.current.as_mut().and_then(Iterator::next) {
                return Some(token);
            }
            // the corpus length was checked up front and bounds every document
            self.current = Some(Tokens {
                tokenizer: self.tokenizer,
                sequence: self.documents.next()?,
                offset: 0,
            });
        }
    }
}
