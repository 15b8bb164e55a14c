#![cfg_attr(doc, forbid(broken_intra_doc_links, private_intra_doc_links))]
//! A word tokenizer which segments text into word tokens.
//!
//! The tokenizer only segments words, there is no parsing, tagging or entity recognition
//! involved. It never materializes the tokens of a sequence, instead it lazily yields slices of
//! the sequence, which keeps the working set bounded even for corpora of hundreds of millions of
//! characters.
//!
//! The normalizer is configurable by:
//! - Treats control characters like whitespace.
//! - Lowercases tokens.
//!
//! The pre-tokenizer is configurable by:
//! - Keeps infix punctuation between alphanumeric characters, eg. `don't` or `e-mail`.
//!
//! The tokenizer is configurable by:
//! - The maximum number of characters per tokenized sequence.
//!
//! ```
//! use word_tokenizer::Builder;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let tokenizer = Builder::new()
//!         .with_normalizer(true, false)
//!         .with_pre_tokenizer(true)
//!         .with_max_length(1_000)?
//!         .build();
//!
//!     let tokens = tokenizer.tokenize("Don't panic!")?.collect::<Vec<_>>();
//!     assert_eq!(tokens, ["Don't", "panic", "!"]);
//!
//!     Ok(())
//! }
//! ```

mod builder;
mod normalizer;
mod pre_tokenizer;
mod tokenizer;

pub use crate::{
    builder::{Builder, BuilderError},
    tokenizer::{CorpusTokens, Tokenizer, TokenizerError, Tokens},
};
