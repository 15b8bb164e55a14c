use displaydoc::Display;
use thiserror::Error;
use word_tokenizer::TokenizerError;

use crate::{
    artifact::ArtifactError,
    config::ConfigError,
    embedding::EmbeddingError,
    table::TableError,
    vocab::VocabularyError,
};

/// The potential errors of the corpus preparation.
#[derive(Debug, Display, Error)]
pub enum Error {
    /// Failed to tokenize: {0}
    Tokenizer(#[from] TokenizerError),
    /// Invalid configuration: {0}
    Config(#[from] ConfigError),
    /// Failed to access an artifact: {0}
    Artifact(#[from] ArtifactError),
    /// Failed to process the table: {0}
    Table(#[from] TableError),
    /// Failed to load the word vectors: {0}
    Embedding(#[from] EmbeddingError),
    /// Invalid vocabulary: {0}
    Vocabulary(#[from] VocabularyError),
}
