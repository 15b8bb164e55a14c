use std::{
    fs::File,
    io::{BufReader, Read},
    path::Path,
};

use displaydoc::Display;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use word_tokenizer::{Builder, BuilderError, Tokenizer};

use crate::{split::validate_proportions, table::LabelColumn};

/// The potential errors of the configuration.
#[derive(Debug, Display, Error)]
pub enum ConfigError {
    /// The split proportions must be finite, non-negative and sum up to at most one (train = {train}, validation = {validation})
    Proportions { train: f64, validation: f64 },
    /// The column {0:?} doesn't exist
    UnknownColumn(String),
    /// The word vector of {token:?} has {got} dimensions but {expected} are configured
    EmbeddingDimension {
        token: String,
        got: usize,
        expected: usize,
    },
    /// The embedding dimension must be at least one
    Dimension,
    /// The word count bounds must satisfy min <= max (min = {min}, max = {max})
    WordBounds { min: usize, max: usize },
    /// Failed to configure the tokenizer: {0}
    Tokenizer(#[from] BuilderError),
    /// Failed to read the configuration file: {0}
    ConfigFile(#[from] std::io::Error),
    /// Failed to parse the configuration: {0}
    ConfigParse(#[from] serde_json::Error),
}

/// The configuration of the corpus preparation.
///
/// Can be created with defaults and refined via the validating `with_*` methods, or read from a
/// json file with the same fields, where missing fields fall back to the defaults.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub(crate) text_column: String,
    pub(crate) label_columns: Vec<LabelColumn>,
    pub(crate) min_words: usize,
    pub(crate) max_words: usize,
    pub(crate) train_split: f64,
    pub(crate) validation_split: f64,
    pub(crate) shuffle: bool,
    pub(crate) seed: u64,
    pub(crate) count_threshold: usize,
    pub(crate) min_vocab_words: usize,
    pub(crate) embedding_dim: usize,
    pub(crate) max_length: usize,
    pub(crate) lowercase: bool,
    pub(crate) keep_infix: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            text_column: "text".into(),
            label_columns: vec![LabelColumn::Sex, LabelColumn::Age],
            min_words: 5,
            max_words: 50,
            train_split: 0.96,
            validation_split: 0.02,
            shuffle: true,
            seed: 1,
            count_threshold: 4,
            min_vocab_words: 1,
            embedding_dim: 300,
            max_length: 600_000_000,
            lowercase: false,
            keep_infix: true,
        }
    }
}

impl Config {
    /// Creates a configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads a configuration from a json file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        Self::from_reader(BufReader::new(File::open(path)?))
    }

    /// Reads a configuration from json.
    pub fn from_reader(reader: impl Read) -> Result<Self, ConfigError> {
        serde_json::from_reader::<_, Self>(reader)?.validate()
    }

    /// Validates the configuration as a whole.
    pub(crate) fn validate(self) -> Result<Self, ConfigError> {
        let Self {
            train_split,
            validation_split,
            min_words,
            max_words,
            embedding_dim,
            max_length,
            ..
        } = self;

        self.with_split(train_split, validation_split)?
            .with_word_bounds(min_words, max_words)?
            .with_embedding_dim(embedding_dim)?
            .with_max_length(max_length)
    }

    /// Sets the names of the text column and the label columns.
    ///
    /// Defaults to `"text"` and `["sex", "age"]`.
    ///
    /// # Errors
    /// Fails if a label column is unknown.
    pub fn with_columns(
        mut self,
        text: impl Into<String>,
        labels: &[&str],
    ) -> Result<Self, ConfigError> {
        self.label_columns = labels
            .iter()
            .map(|label| label.parse())
            .collect::<Result<_, _>>()?;
        self.text_column = text.into();
        Ok(self)
    }

    /// Sets the inclusive bounds of whitespace separated words per text.
    ///
    /// Defaults to `5..=50`.
    ///
    /// # Errors
    /// Fails if `min` is greater than `max`.
    pub fn with_word_bounds(mut self, min: usize, max: usize) -> Result<Self, ConfigError> {
        if min <= max {
            self.min_words = min;
            self.max_words = max;
            Ok(self)
        } else {
            Err(ConfigError::WordBounds { min, max })
        }
    }

    /// Sets the proportions of the train and validation splits, the test split gets the
    /// remainder.
    ///
    /// Defaults to `0.96` and `0.02`.
    ///
    /// # Errors
    /// Fails if a proportion is negative or not finite or if they sum up to more than one.
    pub fn with_split(mut self, train: f64, validation: f64) -> Result<Self, ConfigError> {
        validate_proportions(train, validation)?;
        self.train_split = train;
        self.validation_split = validation;
        Ok(self)
    }

    /// Sets whether the rows are shuffled before splitting and the seed of the shuffling.
    ///
    /// Defaults to `true` and `1`.
    pub fn with_shuffle(mut self, shuffle: bool, seed: u64) -> Self {
        self.shuffle = shuffle;
        self.seed = seed;
        self
    }

    /// Sets the count up to which tokens are pruned from the vocabulary.
    ///
    /// Defaults to `4`.
    pub fn with_count_threshold(mut self, threshold: usize) -> Self {
        self.count_threshold = threshold;
        self
    }

    /// Sets the number of non-sentinel words below which a vocabulary is considered degenerate.
    ///
    /// Defaults to `1`.
    pub fn with_min_vocab_words(mut self, words: usize) -> Self {
        self.min_vocab_words = words;
        self
    }

    /// Sets the dimension of the word vectors.
    ///
    /// Defaults to `300`.
    ///
    /// # Errors
    /// Fails if the dimension is zero.
    pub fn with_embedding_dim(mut self, dim: usize) -> Result<Self, ConfigError> {
        if dim > 0 {
            self.embedding_dim = dim;
            Ok(self)
        } else {
            Err(ConfigError::Dimension)
        }
    }

    /// Sets the maximum number of characters the tokenizer accepts at once.
    ///
    /// Defaults to `600_000_000`, which covers the whole training corpus in one pass.
    ///
    /// # Errors
    /// Fails if the length is zero.
    pub fn with_max_length(mut self, len: usize) -> Result<Self, ConfigError> {
        Builder::new().with_max_length(len)?;
        self.max_length = len;
        Ok(self)
    }

    /// Sets whether the tokenizer lowercases and keeps infix punctuation.
    ///
    /// Defaults to `false` and `true`.
    pub fn with_tokenizer(mut self, lowercase: bool, keep_infix: bool) -> Self {
        self.lowercase = lowercase;
        self.keep_infix = keep_infix;
        self
    }

    /// The configured text column.
    pub fn text_column(&self) -> &str {
        &self.text_column
    }

    /// The configured label columns.
    pub fn label_columns(&self) -> &[LabelColumn] {
        &self.label_columns
    }

    /// The configured embedding dimension.
    pub fn embedding_dim(&self) -> usize {
        self.embedding_dim
    }

    /// Builds the configured tokenizer.
    pub fn tokenizer(&self) -> Result<Tokenizer, ConfigError> {
        Ok(Builder::new()
            .with_normalizer(true, self.lowercase)
            .with_pre_tokenizer(self.keep_infix)
            .with_max_length(self.max_length)?
            .build())
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest(
        train,
        validation,
        case(1., 0.),
        case(0., 0.),
        case(0.96, 0.02),
        case(0.7, 0.3),
        case(0.8, 0.1)
    )]
    fn test_valid_split(train: f64, validation: f64) {
        let config = Config::new().with_split(train, validation).unwrap();
        assert_eq!(config.train_split, train);
        assert_eq!(config.validation_split, validation);
    }

    #[rstest(
        train,
        validation,
        case(0.9, 0.2),
        case(-0.1, 0.5),
        case(0.5, -0.1),
        case(f64::NAN, 0.),
        case(0., f64::INFINITY)
    )]
    fn test_invalid_split(train: f64, validation: f64) {
        assert!(matches!(
            Config::new().with_split(train, validation).unwrap_err(),
            ConfigError::Proportions { .. },
        ));
    }

    #[test]
    fn test_word_bounds() {
        assert!(Config::new().with_word_bounds(5, 5).is_ok());
        assert!(matches!(
            Config::new().with_word_bounds(6, 5).unwrap_err(),
            ConfigError::WordBounds { min: 6, max: 5 },
        ));
    }

    #[test]
    fn test_columns() {
        let config = Config::new().with_columns("posts", &["age"]).unwrap();
        assert_eq!(config.text_column(), "posts");
        assert_eq!(config.label_columns(), [LabelColumn::Age]);

        assert!(matches!(
            Config::new().with_columns("text", &["sex", "gender"]).unwrap_err(),
            ConfigError::UnknownColumn(column) if column == "gender",
        ));
    }

    #[test]
    fn test_dimension_and_length() {
        assert!(matches!(
            Config::new().with_embedding_dim(0).unwrap_err(),
            ConfigError::Dimension,
        ));
        assert!(matches!(
            Config::new().with_max_length(0).unwrap_err(),
            ConfigError::Tokenizer(BuilderError::MaxLength),
        ));
        let tokenizer = Config::new().with_max_length(10).unwrap().tokenizer().unwrap();
        assert_eq!(tokenizer.max_length(), 10);
    }

    #[test]
    fn test_from_reader() {
        let json = r#"{ "train_split": 0.8, "validation_split": 0.1, "label_columns": ["age"] }"#;
        let config = Config::from_reader(json.as_bytes()).unwrap();
        assert_eq!(config.train_split, 0.8);
        assert_eq!(config.validation_split, 0.1);
        assert_eq!(config.label_columns(), [LabelColumn::Age]);
        assert_eq!(config.count_threshold, 4);
        assert_eq!(config.embedding_dim, 300);
    }

    #[test]
    fn test_from_reader_invalid() {
        let json = r#"{ "train_split": 0.8, "validation_split": 0.3 }"#;
        assert!(matches!(
            Config::from_reader(json.as_bytes()).unwrap_err(),
            ConfigError::Proportions { .. },
        ));

        let json = r#"{ "label_columns": ["gender"] }"#;
        assert!(matches!(
            Config::from_reader(json.as_bytes()).unwrap_err(),
            ConfigError::ConfigParse(_),
        ));

        let json = r#"{ "unknown": 1 }"#;
        assert!(matches!(
            Config::from_reader(json.as_bytes()).unwrap_err(),
            ConfigError::ConfigParse(_),
        ));
    }
}
