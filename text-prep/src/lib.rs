#![cfg_attr(doc, forbid(broken_intra_doc_links, private_intra_doc_links))]
//! Prepares labeled texts for the training of a text classifier.
//!
//! The preparation runs in stages:
//! - The rows of a [`Table`] are filtered by their number of words.
//! - The rows are split into train, validation and test partitions by the [`CorpusSplitter`].
//! - The training texts are tokenized and their tokens counted into [`TokenCounts`].
//! - Rare tokens are pruned and the rest is indexed by frequency in a [`Vocabulary`].
//! - Pretrained word vectors are filtered down to the vocabulary in an [`EmbeddingTable`].
//!
//! The [`Pipeline`] runs all stages and saves the intermediate results to an
//! [`ArtifactStore`]. Afterwards the texts are encoded on access by an [`Encoder`] or an
//! [`EncodedDataset`] and combined into padded batches by a [`Batcher`].

mod artifact;
mod batch;
mod config;
mod counter;
mod dataset;
mod embedding;
mod encoder;
mod error;
mod filter;
mod pipeline;
mod split;
mod table;
mod vocab;

pub use word_tokenizer::{Tokenizer, TokenizerError};

pub use crate::{
    artifact::{ArtifactError, ArtifactKey, ArtifactStore, FileStore, MemoryStore},
    batch::{Batch, BatchError, Batcher, Padding, Truncation},
    config::{Config, ConfigError},
    counter::TokenCounts,
    dataset::EncodedDataset,
    embedding::{EmbeddingError, EmbeddingTable, GloveVectors, WordVector},
    encoder::Encoder,
    error::Error,
    filter::{filter_by_word_count, word_count},
    pipeline::{Pipeline, PreparedCorpus},
    split::{CorpusSplitter, Split, SplitDataset},
    table::{LabelColumn, RawRecord, Sex, Table, TableError},
    vocab::{Vocabulary, VocabularyError, PAD, PAD_ID, UNK, UNK_ID},
};
