use ndarray::{Array2, ArrayView1};
use word_tokenizer::TokenizerError;

use crate::{
    encoder::Encoder,
    split::{Split, SplitDataset},
    table::TableError,
};

/// A read-only view of a partition which encodes its examples on access.
#[derive(Clone, Copy, Debug)]
pub struct EncodedDataset<'a> {
    texts: &'a [String],
    labels: &'a Array2<i64>,
    encoder: Encoder<'a>,
}

impl<'a> EncodedDataset<'a> {
    /// Creates a view of a partition of the split dataset.
    ///
    /// # Errors
    /// Fails if the partition doesn't have one label row per text.
    pub fn new(
        dataset: &'a SplitDataset,
        split: Split,
        encoder: Encoder<'a>,
    ) -> Result<Self, TableError> {
        let (texts, labels) = dataset.partition(split);
        if texts.len() != labels.nrows() {
            return Err(TableError::Shape {
                texts: texts.len(),
                labels: labels.nrows(),
            });
        }

        Ok(Self {
            texts,
            labels,
            encoder,
        })
    }

    /// The number of examples.
    pub fn len(&self) -> usize {
        self.texts.len()
    }

    /// Checks whether the partition has no examples.
    pub fn is_empty(&self) -> bool {
        self.texts.is_empty()
    }

    /// Gets the encoded text and the labels of an example.
    ///
    /// # Errors
    /// Fails if the text exceeds the maximum length of the tokenizer.
    pub fn get(
        &self,
        idx: usize,
    ) -> Result<Option<(Vec<usize>, ArrayView1<'a, i64>)>, TokenizerError> {
        let labels = self.labels;
        match self.texts.get(idx) {
            Some(text) => Ok(Some((self.encoder.encode(text)?, labels.row(idx)))),
            None => Ok(None),
        }
    }

    /// Iterates over the encoded examples in order.
    pub fn iter(
        &self,
    ) -> impl Iterator<Item = Result<(Vec<usize>, ArrayView1<'a, i64>), TokenizerError>> + 'a {
        let (texts, labels, encoder) = (self.texts, self.labels, self.encoder);
        texts
            .iter()
            .zip(labels.outer_iter())
            .map(move |(text, labels)| encoder.encode(text).map(|encoded| (encoded, labels)))
    }
}
