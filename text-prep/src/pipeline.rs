use std::io::{Read, Write};

use log::info;
use serde::{
    ser::{Error as _, SerializeSeq},
    Serialize,
    Serializer,
};
use word_tokenizer::Tokenizer;

use crate::{
    artifact::{ArtifactKey, ArtifactStore},
    config::{Config, ConfigError},
    counter::TokenCounts,
    embedding::{EmbeddingError, EmbeddingTable, WordVector},
    encoder::Encoder,
    error::Error,
    filter::filter_by_word_count,
    split::{CorpusSplitter, SplitDataset},
    table::Table,
    vocab::Vocabulary,
};

/// The prepared corpus.
#[derive(Clone, Debug, PartialEq)]
pub struct PreparedCorpus {
    /// The filtered and split table.
    pub split: SplitDataset,
    /// The pruned token counts of the training texts.
    pub counts: TokenCounts,
    /// The vocabulary of the pruned tokens.
    pub vocab: Vocabulary,
    /// The word vectors of the vocabulary.
    pub embeddings: EmbeddingTable,
}

/// Serializes a cloneable token stream of known length without collecting it.
struct TokenStream<I> {
    tokens: I,
    len: usize,
}

impl<I> Serialize for TokenStream<I>
where
    I: Iterator + Clone,
    I::Item: Serialize,
{
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut seq = serializer.serialize_seq(Some(self.len))?;
        let mut len = 0;
        for token in self.tokens.clone() {
            len += 1;
            if len > self.len {
                break;
            }
            seq.serialize_element(&token)?;
        }
        if len != self.len {
            return Err(S::Error::custom(format!(
                "expected {} tokens but got at least {}",
                self.len, len,
            )));
        }

        seq.end()
    }
}

/// Prepares a labeled corpus for training.
#[derive(Clone, Debug)]
pub struct Pipeline {
    config: Config,
    tokenizer: Tokenizer,
}

impl Pipeline {
    /// Creates the pipeline.
    ///
    /// # Errors
    /// Fails if the configuration is invalid.
    pub fn new(config: Config) -> Result<Self, Error> {
        let config = config.validate()?;
        let tokenizer = config.tokenizer()?;

        Ok(Self { config, tokenizer })
    }

    /// The configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The tokenizer.
    pub fn tokenizer(&self) -> &Tokenizer {
        &self.tokenizer
    }

    /// Creates an encoder for the vocabulary with the tokenizer of the pipeline.
    pub fn encoder<'a>(&'a self, vocab: &'a Vocabulary) -> Encoder<'a> {
        Encoder::new(vocab, &self.tokenizer)
    }

    /// Reads a csv table with the configured text and label columns.
    pub fn read_table(&self, reader: impl Read) -> Result<Table, Error> {
        Table::from_csv(reader, self.config.text_column(), self.config.label_columns())
    }

    /// Writes a table as csv with the configured text and label columns.
    pub fn write_table(&self, table: &Table, writer: impl Write) -> Result<(), Error> {
        table
            .write_csv(writer, self.config.text_column(), self.config.label_columns())
            .map_err(Error::from)
    }

    /// Runs the pipeline.
    ///
    /// The table is filtered by word counts and split, the vocabulary is built from the training
    /// texts only and the word vectors are filtered down to the vocabulary. Every intermediate
    /// result is saved to the store as soon as it is available.
    ///
    /// The dimension of the first word vector is checked before anything is saved.
    ///
    /// # Errors
    /// Fails if the training texts exceed the maximum length of the tokenizer, if the word vectors
    /// can't be read or have the wrong dimension or if an artifact can't be saved.
    pub fn run(
        &self,
        table: Table,
        vectors: impl IntoIterator<Item = Result<WordVector, EmbeddingError>>,
        store: &impl ArtifactStore,
    ) -> Result<PreparedCorpus, Error> {
        let config = &self.config;

        let mut vectors = vectors.into_iter().peekable();
        if let Some(Ok((token, vector))) = vectors.peek() {
            if vector.len() != config.embedding_dim {
                return Err(ConfigError::EmbeddingDimension {
                    token: token.clone(),
                    got: vector.len(),
                    expected: config.embedding_dim,
                }
                .into());
            }
        }

        let nr_rows = table.len();
        let table = filter_by_word_count(table, config.min_words..=config.max_words);
        info!(
            "Kept {} of {} rows with {} to {} words.",
            table.len(),
            nr_rows,
            config.min_words,
            config.max_words,
        );

        let split = CorpusSplitter::from_config(config).split(table);
        let (train, validation, test) = split.sizes();
        info!(
            "Split into {} train, {} validation and {} test rows.",
            train, validation, test,
        );
        store.save(ArtifactKey::SplitData, &split)?;

        let tokens = self
            .tokenizer
            .tokenize_corpus(split.train_texts.iter().map(String::as_str))?;
        let counts = TokenCounts::count(tokens.clone());
        info!(
            "Counted {} tokens of {} types in the training texts.",
            counts.total(),
            counts.len(),
        );
        store.save(
            ArtifactKey::Tokens,
            &TokenStream {
                tokens,
                len: counts.total(),
            },
        )?;

        let counts = counts.prune(config.count_threshold);
        store.save(ArtifactKey::W2Count, counts.counts())?;

        let vocab = Vocabulary::build(&counts);
        vocab.is_degenerate(config.min_vocab_words);
        info!("Built a vocabulary of {} tokens.", vocab.len());
        store.save(ArtifactKey::W2Idx, vocab.w2idx())?;
        store.save(ArtifactKey::I2W, vocab.i2w())?;

        let embeddings = EmbeddingTable::build(&vocab, vectors, config.embedding_dim)?;
        info!(
            "Found word vectors for {} of {} tokens.",
            embeddings.len(),
            vocab.len(),
        );
        store.save(ArtifactKey::W2Vec, &*embeddings)?;

        Ok(PreparedCorpus {
            split,
            counts,
            vocab,
            embeddings,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use ndarray::Array1;
    use word_tokenizer::TokenizerError;

    use super::*;
    use crate::{
        artifact::MemoryStore,
        table::{LabelColumn, RawRecord, Sex},
        vocab::{PAD, UNK},
    };

    fn table(texts: &[&str]) -> Table {
        Table::from_records(
            texts.iter().enumerate().map(|(idx, text)| RawRecord {
                text: text.to_string(),
                sex: if idx % 2 == 0 { Sex::Female } else { Sex::Male },
                age: 20 + idx as u8,
            }),
            &[LabelColumn::Sex, LabelColumn::Age],
        )
    }

    fn config() -> Config {
        Config::new()
            .with_split(1., 0.)
            .unwrap()
            .with_shuffle(false, 1)
            .with_embedding_dim(2)
            .unwrap()
    }

    fn vectors() -> Vec<Result<WordVector, EmbeddingError>> {
        vec![
            Ok(("cat".into(), vec![1., 2.])),
            Ok(("dog".into(), vec![3., 4.])),
            Ok(("bird".into(), vec![5., 6.])),
        ]
    }

    #[test]
    fn test_run() {
        let store = MemoryStore::new();
        let table = table(&[
            "cat cat cat cat cat dog",
            "too short",
            "dog dog dog the cat",
        ]);
        let prepared = Pipeline::new(config())
            .unwrap()
            .run(table, vectors(), &store)
            .unwrap();

        assert_eq!(prepared.split.sizes(), (2, 0, 0));
        assert_eq!(prepared.counts.count_of("cat"), 6);
        assert_eq!(prepared.counts.count_of("dog"), 0);
        assert_eq!(prepared.counts.total(), 11);
        assert_eq!(prepared.vocab.i2w(), [PAD, UNK, "cat"]);
        assert_eq!(prepared.embeddings.keys().collect::<Vec<_>>(), ["cat"]);

        let tokens = store.load::<Vec<String>>(ArtifactKey::Tokens).unwrap();
        assert_eq!(tokens.len(), 11);
        assert_eq!(tokens[..3], ["cat", "cat", "cat"]);
        assert_eq!(tokens[10], "cat");
        assert_eq!(
            store
                .load::<HashMap<String, usize>>(ArtifactKey::W2Count)
                .unwrap(),
            *prepared.counts,
        );
        assert_eq!(
            store
                .load::<HashMap<String, usize>>(ArtifactKey::W2Idx)
                .unwrap(),
            *prepared.vocab.w2idx(),
        );
        assert_eq!(
            store.load::<Vec<String>>(ArtifactKey::I2W).unwrap(),
            prepared.vocab.i2w(),
        );
        assert_eq!(
            store
                .load::<HashMap<String, Array1<f32>>>(ArtifactKey::W2Vec)
                .unwrap(),
            *prepared.embeddings,
        );
        assert_eq!(
            store.load::<SplitDataset>(ArtifactKey::SplitData).unwrap(),
            prepared.split,
        );
    }

    #[test]
    fn test_configured_columns() {
        let config = config().with_columns("post", &["age"]).unwrap();
        let pipeline = Pipeline::new(config).unwrap();
        let csv = "sex,post,age\nmale,cat cat cat cat cat,31\nfemale,one two,45\n";
        let table = pipeline.read_table(csv.as_bytes()).unwrap();
        assert_eq!(table.texts(), ["cat cat cat cat cat", "one two"]);
        assert_eq!(table.labels().ncols(), 1);
        assert_eq!(table.labels().column(0).to_vec(), [31, 45]);

        let mut written = Vec::new();
        pipeline.write_table(&table, &mut written).unwrap();
        assert_eq!(
            String::from_utf8(written).unwrap(),
            "post,age\ncat cat cat cat cat,31\none two,45\n",
        );

        let prepared = pipeline.run(table, vectors(), &MemoryStore::new()).unwrap();
        assert_eq!(prepared.split.train_labels, ndarray::arr2(&[[31]]));

        assert!(matches!(
            Pipeline::new(Config::new())
                .unwrap()
                .read_table(csv.replace("post", "text").replace("sex", "gender").as_bytes())
                .unwrap_err(),
            Error::Config(ConfigError::UnknownColumn(column)) if column == "sex",
        ));
    }

    #[test]
    fn test_length_limit_fails_before_counting() {
        let store = MemoryStore::new();
        let config = config().with_max_length(10).unwrap();
        let error = Pipeline::new(config)
            .unwrap()
            .run(table(&["cat cat cat cat cat"]), vectors(), &store)
            .unwrap_err();
        assert!(matches!(
            error,
            Error::Tokenizer(TokenizerError::ResourceLimitExceeded { len: 19, max: 10 }),
        ));
        assert!(store.contains(ArtifactKey::SplitData));
        assert!(!store.contains(ArtifactKey::Tokens));
    }

    #[test]
    fn test_dimension_mismatch_fails_before_saving() {
        let store = MemoryStore::new();
        let config = config().with_embedding_dim(3).unwrap();
        let error = Pipeline::new(config)
            .unwrap()
            .run(table(&["cat cat cat cat cat dog"]), vectors(), &store)
            .unwrap_err();
        assert!(matches!(
            error,
            Error::Config(ConfigError::EmbeddingDimension { got: 2, expected: 3, .. }),
        ));
        for key in ArtifactKey::ALL.iter() {
            assert!(!store.contains(*key));
        }
    }

    #[test]
    fn test_degenerate_vocabulary() {
        let store = MemoryStore::new();
        let prepared = Pipeline::new(config())
            .unwrap()
            .run(table(&["a b c d e"]), vectors(), &store)
            .unwrap();
        assert_eq!(prepared.vocab, Vocabulary::default());
        assert!(prepared.embeddings.is_empty());
        assert!(store.contains(ArtifactKey::W2Vec));
    }

    #[test]
    fn test_token_stream_length_mismatch() {
        let stream = TokenStream {
            tokens: vec!["a", "b"].into_iter(),
            len: 3,
        };
        assert!(MemoryStore::new().save(ArtifactKey::Tokens, &stream).is_err());
        let stream = TokenStream {
            tokens: vec!["a", "b"].into_iter(),
            len: 1,
        };
        assert!(MemoryStore::new().save(ArtifactKey::Tokens, &stream).is_err());
    }
}
