use std::{
    collections::HashMap,
    fs::File,
    io::{BufRead, BufReader, Lines},
    iter::Peekable,
    path::Path,
};

use derive_more::{Deref, From};
use displaydoc::Display;
use log::debug;
use ndarray::Array1;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{config::ConfigError, error::Error, vocab::Vocabulary};

/// The potential errors of the word vector source.
#[derive(Debug, Display, Error)]
pub enum EmbeddingError {
    /// Failed to read the word vectors: {0}
    Io(#[from] std::io::Error),
    /// Malformed word vector in line {line}: {reason}
    Malformed { line: usize, reason: String },
}

/// A word vector.
pub type WordVector = (String, Vec<f32>);

/// The word vectors of the tokens of a vocabulary.
#[derive(Clone, Debug, Default, Deref, Deserialize, From, PartialEq, Serialize)]
pub struct EmbeddingTable(HashMap<String, Array1<f32>>);

impl EmbeddingTable {
    /// Filters the word vectors down to the tokens of the vocabulary.
    ///
    /// The vectors are streamed, tokens without a vector are left out and for duplicate tokens
    /// the last vector wins.
    ///
    /// # Errors
    /// Fails if the source fails or if a kept vector doesn't have the dimension `dim`.
    pub fn build(
        vocab: &Vocabulary,
        vectors: impl IntoIterator<Item = Result<WordVector, EmbeddingError>>,
        dim: usize,
    ) -> Result<Self, Error> {
        let mut embeddings = HashMap::new();
        let mut nr_vectors = 0;
        for vector in vectors {
            let (token, vector) = vector?;
            nr_vectors += 1;
            if !vocab.contains(&token) {
                continue;
            }
            if vector.len() != dim {
                return Err(ConfigError::EmbeddingDimension {
                    token,
                    got: vector.len(),
                    expected: dim,
                }
                .into());
            }
            embeddings.insert(token, Array1::from(vector));
        }
        debug!(
            "Kept {} of {} word vectors for a vocabulary of {} tokens.",
            embeddings.len(),
            nr_vectors,
            vocab.len(),
        );

        Ok(Self(embeddings))
    }

    /// The word vector of a token.
    pub fn vector(&self, token: &str) -> Option<&Array1<f32>> {
        self.0.get(token)
    }

    /// Unwraps the mapping from token to word vector.
    pub fn into_inner(self) -> HashMap<String, Array1<f32>> {
        self.0
    }
}

/// Streams word vectors in the GloVe text format.
///
/// Each line holds a token followed by the space separated values of its vector. The token is
/// everything before the last `dim` values, hence it may contain spaces itself.
#[derive(Debug)]
pub struct GloveVectors<B>
where
    B: BufRead,
{
    lines: Peekable<Lines<B>>,
    line: usize,
    dim: usize,
}

impl GloveVectors<BufReader<File>> {
    /// Opens the file `glove.6B.{dim}d.txt` in the directory.
    pub fn from_dir(dir: impl AsRef<Path>, dim: usize) -> Result<Self, Error> {
        Self::from_file(dir.as_ref().join(format!("glove.6B.{}d.txt", dim)), dim)
    }

    /// Opens the word vector file.
    pub fn from_file(path: impl AsRef<Path>, dim: usize) -> Result<Self, Error> {
        let file = File::open(path).map_err(EmbeddingError::from)?;
        Self::new(BufReader::new(file), dim)
    }
}

impl<B> GloveVectors<B>
where
    B: BufRead,
{
    /// Creates the word vector stream.
    ///
    /// # Errors
    /// Fails if the dimension is zero or if the first line doesn't have `dim` values. The first
    /// line is checked strictly, its token must not contain spaces.
    pub fn new(reader: B, dim: usize) -> Result<Self, Error> {
        if dim == 0 {
            return Err(ConfigError::Dimension.into());
        }

        let mut lines = reader.lines().peekable();
        if let Some(Ok(first)) = lines.peek() {
            let mut fields = first.split_whitespace();
            let token = fields.next().unwrap_or_default().to_string();
            let got = fields.count();
            if got != dim {
                return Err(ConfigError::EmbeddingDimension {
                    token,
                    got,
                    expected: dim,
                }
                .into());
            }
        }

        Ok(Self {
            lines,
            line: 0,
            dim,
        })
    }

    fn parse(&self, line: &str) -> Result<WordVector, EmbeddingError> {
        let malformed = |reason: String| EmbeddingError::Malformed {
            line: self.line,
            reason,
        };

        let mut fields = line.trim_end().rsplitn(self.dim + 1, ' ').collect::<Vec<_>>();
        if fields.len() <= self.dim {
            return Err(malformed(format!(
                "expected a token and {} values",
                self.dim,
            )));
        }
        let token = fields.pop().unwrap_or_default().to_string();
        let vector = fields
            .iter()
            .rev()
            .map(|value| {
                value
                    .parse::<f32>()
                    .map_err(|_| malformed(format!("invalid value {:?}", value)))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok((token, vector))
    }
}

impl<B> Iterator for GloveVectors<B>
where
    B: BufRead,
{
    type Item = Result<WordVector, EmbeddingError>;

    fn next(&mut self) -> Option<Self::Item> {
        let line = self.lines.next()?;
        self.line += 1;
        Some(
            line.map_err(EmbeddingError::from)
                .and_then(|line| self.parse(&line)),
        )
    }
}

#[cfg(test)]
mod tests {
    use test_utils::{assert_approx_eq, fixtures::glove};

    use super::*;
    use crate::counter::TokenCounts;

    fn vocab(corpus: &str) -> Vocabulary {
        Vocabulary::build(&TokenCounts::count(corpus.split_whitespace()))
    }

    #[test]
    fn test_filter_by_vocabulary() {
        let vectors = vec![
            Ok(("cat".to_string(), vec![0.1, 0.2])),
            Ok(("dog".to_string(), vec![0.3, 0.4])),
            Ok(("bird".to_string(), vec![0.5, 0.6])),
        ];
        let embeddings = EmbeddingTable::build(&vocab("cat"), vectors, 2).unwrap();
        assert_eq!(embeddings.len(), 1);
        assert_approx_eq!(f32, embeddings.vector("cat").unwrap(), [0.1, 0.2]);
        assert!(embeddings.vector("dog").is_none());
    }

    #[test]
    fn test_dimension_mismatch() {
        let vectors = vec![
            Ok(("dog".to_string(), vec![0.3])),
            Ok(("cat".to_string(), vec![0.1, 0.2, 0.3])),
        ];
        assert!(matches!(
            EmbeddingTable::build(&vocab("cat"), vectors, 2).unwrap_err(),
            Error::Config(ConfigError::EmbeddingDimension { token, got: 3, expected: 2 })
                if token == "cat",
        ));
    }

    #[test]
    fn test_glove() {
        let text = glove(&[
            ("the", &[0.5, -1.25, 3.]),
            ("new york", &[1., 2., 3.]),
            ("cat", &[0., 0., 1e-3]),
        ]);
        let vectors = GloveVectors::new(text.as_bytes(), 3)
            .unwrap()
            .collect::<Result<Vec<_>, _>>()
            .unwrap();
        assert_eq!(vectors.len(), 3);
        assert_eq!(vectors[0].0, "the");
        assert_approx_eq!(f32, &vectors[0].1, [0.5, -1.25, 3.]);
        assert_eq!(vectors[1].0, "new york");
        assert_eq!(vectors[2].0, "cat");
        assert_approx_eq!(f32, &vectors[2].1, [0., 0., 1e-3]);

        let vectors = GloveVectors::new(text.as_bytes(), 3).unwrap();
        let embeddings = EmbeddingTable::build(&vocab("cat dog"), vectors, 3).unwrap();
        assert_eq!(embeddings.keys().collect::<Vec<_>>(), ["cat"]);
    }

    #[test]
    fn test_glove_dimension_checked_up_front() {
        let text = glove(&[("the", &[0.5, -1.25, 3.])]);
        assert!(matches!(
            GloveVectors::new(text.as_bytes(), 50).unwrap_err(),
            Error::Config(ConfigError::EmbeddingDimension { got: 3, expected: 50, .. }),
        ));
        assert!(matches!(
            GloveVectors::new(text.as_bytes(), 0).unwrap_err(),
            Error::Config(ConfigError::Dimension),
        ));
        assert_eq!(GloveVectors::new("".as_bytes(), 3).unwrap().count(), 0);
    }

    #[test]
    fn test_glove_malformed() {
        let text = "the 1 2\ncat 1\ndog 1 x\n";
        let vectors = GloveVectors::new(text.as_bytes(), 2)
            .unwrap()
            .collect::<Vec<_>>();
        assert!(vectors[0].is_ok());
        assert!(matches!(
            vectors[1],
            Err(EmbeddingError::Malformed { line: 2, .. }),
        ));
        assert!(matches!(
            vectors[2],
            Err(EmbeddingError::Malformed { line: 3, .. }),
        ));
    }

    #[test]
    fn test_glove_from_dir() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("glove.6B.2d.txt"),
            glove(&[("cat", &[1., 2.])]),
        )
        .unwrap();
        let vectors = GloveVectors::from_dir(dir.path(), 2).unwrap().collect::<Vec<_>>();
        assert_eq!(vectors.len(), 1);
        assert!(matches!(
            GloveVectors::from_dir(dir.path(), 3).unwrap_err(),
            Error::Embedding(EmbeddingError::Io(_)),
        ));
    }
}
