use displaydoc::Display;
use ndarray::Array2;
use thiserror::Error;

use crate::vocab::PAD_ID;

/// The potential errors of the batcher.
#[derive(Debug, Display, Error, PartialEq)]
pub enum BatchError {
    /// The sequences have different lengths ({min} to {max}) and aren't padded to a common length
    Ragged { min: usize, max: usize },
    /// The truncation length must be at least one
    Truncation,
}

/// A padding strategy.
///
/// Defaults to the [`none()`] padding strategy.
///
/// [`none()`]: Padding::none
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Padding(Paddings);

/// The available padding strategies.
#[derive(Clone, Copy, Debug, PartialEq)]
enum Paddings {
    /// No padding.
    None,
    /// Padding to at least a fixed length.
    Fixed { len: usize },
    /// Padding to the longest sequence of the batch.
    Longest,
}

impl Default for Padding {
    fn default() -> Self {
        Self::none()
    }
}

impl Padding {
    /// Creates an inert padding strategy.
    pub fn none() -> Self {
        Self(Paddings::None)
    }

    /// Creates a strategy which pads to at least the length.
    pub fn fixed(len: usize) -> Self {
        Self(Paddings::Fixed { len })
    }

    /// Creates a strategy which pads to the longest sequence of a batch.
    pub fn longest() -> Self {
        Self(Paddings::Longest)
    }

    /// The length to pad the sequences to, if any.
    fn target_len(&self, lens: impl Iterator<Item = usize>) -> Option<usize> {
        match self.0 {
            Paddings::None => None,
            Paddings::Fixed { len } => Some(lens.fold(len, usize::max)),
            Paddings::Longest => Some(lens.max().unwrap_or_default()),
        }
    }
}

/// A truncation strategy.
///
/// Defaults to the [`none()`] truncation strategy.
///
/// [`none()`]: Truncation::none
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Truncation(Truncations);

/// The available truncation strategies.
#[derive(Clone, Copy, Debug, PartialEq)]
enum Truncations {
    /// No truncation.
    None,
    /// Truncation to a fixed length.
    Fixed { len: usize },
}

impl Default for Truncation {
    fn default() -> Self {
        Self::none()
    }
}

impl Truncation {
    /// Creates an inert truncation strategy.
    pub fn none() -> Self {
        Self(Truncations::None)
    }

    /// Creates a strategy which truncates to at most the length.
    pub fn fixed(len: usize) -> Self {
        Self(Truncations::Fixed { len })
    }

    /// Validates itself.
    fn validate(self) -> Result<Self, BatchError> {
        match self.0 {
            Truncations::Fixed { len: 0 } => Err(BatchError::Truncation),
            _ => Ok(self),
        }
    }

    /// Truncates the sequence.
    fn truncate<'a>(&self, sequence: &'a [usize]) -> &'a [usize] {
        match self.0 {
            Truncations::None => sequence,
            Truncations::Fixed { len } => &sequence[..sequence.len().min(len)],
        }
    }
}

/// A batch of token indices with its attention mask.
#[derive(Clone, Debug, PartialEq)]
pub struct Batch {
    /// The token indices of shape `(batch_size, len)`, padded with the padding index.
    pub token_ids: Array2<i64>,
    /// The mask of shape `(batch_size, len)`, one for tokens and zero for padding.
    pub attention_mask: Array2<i64>,
}

/// Combines encoded sequences into batches.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Batcher {
    padding: Padding,
    truncation: Truncation,
}

impl Batcher {
    /// Creates a batcher.
    ///
    /// Sequences are truncated before they are padded.
    ///
    /// # Errors
    /// Fails if the truncation strategy is invalid.
    pub fn new(padding: Padding, truncation: Truncation) -> Result<Self, BatchError> {
        Ok(Self {
            padding,
            truncation: truncation.validate()?,
        })
    }

    /// Combines the sequences into a batch.
    ///
    /// # Errors
    /// Fails if the sequences aren't padded and have different lengths.
    pub fn batch<S>(&self, sequences: &[S]) -> Result<Batch, BatchError>
    where
        S: AsRef<[usize]>,
    {
        let sequences = sequences
            .iter()
            .map(|sequence| self.truncation.truncate(sequence.as_ref()))
            .collect::<Vec<_>>();
        let lens = sequences.iter().map(|sequence| sequence.len());
        let len = match self.padding.target_len(lens.clone()) {
            Some(len) => len,
            None => {
                let min = lens.clone().min().unwrap_or_default();
                let max = lens.max().unwrap_or_default();
                if min != max {
                    return Err(BatchError::Ragged { min, max });
                }
                max
            }
        };

        let shape = (sequences.len(), len);
        let mut token_ids = Array2::from_elem(shape, PAD_ID as i64);
        let mut attention_mask = Array2::zeros(shape);
        for (idx, sequence) in sequences.iter().enumerate() {
            for (pos, &token) in sequence.iter().enumerate() {
                token_ids[[idx, pos]] = token as i64;
                attention_mask[[idx, pos]] = 1;
            }
        }

        Ok(Batch {
            token_ids,
            attention_mask,
        })
    }
}

#[cfg(test)]
mod tests {
    use ndarray::arr2;
    use rstest::rstest;

    use super::*;

    fn sequences() -> Vec<Vec<usize>> {
        vec![vec![2, 3, 4], vec![5], vec![6, 1]]
    }

    #[test]
    fn test_longest() {
        let batch = Batcher::new(Padding::longest(), Truncation::none())
            .unwrap()
            .batch(&sequences())
            .unwrap();
        assert_eq!(batch.token_ids, arr2(&[[2, 3, 4], [5, 0, 0], [6, 1, 0]]));
        assert_eq!(
            batch.attention_mask,
            arr2(&[[1, 1, 1], [1, 0, 0], [1, 1, 0]]),
        );
    }

    #[rstest(
        padding,
        truncation,
        shape,
        case(Padding::longest(), Truncation::none(), (3, 3)),
        case(Padding::fixed(5), Truncation::none(), (3, 5)),
        case(Padding::fixed(2), Truncation::none(), (3, 3)),
        case(Padding::fixed(2), Truncation::fixed(2), (3, 2)),
        case(Padding::longest(), Truncation::fixed(1), (3, 1)),
        case(Padding::none(), Truncation::fixed(1), (3, 1))
    )]
    fn test_shape(padding: Padding, truncation: Truncation, shape: (usize, usize)) {
        let batch = Batcher::new(padding, truncation)
            .unwrap()
            .batch(&sequences())
            .unwrap();
        assert_eq!(batch.token_ids.dim(), shape);
        assert_eq!(batch.attention_mask.dim(), shape);
    }

    #[test]
    fn test_truncation() {
        let batch = Batcher::new(Padding::longest(), Truncation::fixed(2))
            .unwrap()
            .batch(&sequences())
            .unwrap();
        assert_eq!(batch.token_ids, arr2(&[[2, 3], [5, 0], [6, 1]]));
        assert_eq!(batch.attention_mask, arr2(&[[1, 1], [1, 0], [1, 1]]));
    }

    #[test]
    fn test_ragged() {
        let batcher = Batcher::default();
        assert_eq!(
            batcher.batch(&sequences()).unwrap_err(),
            BatchError::Ragged { min: 1, max: 3 },
        );
        let batch = batcher.batch(&[vec![2, 3], vec![4, 5]]).unwrap();
        assert_eq!(batch.token_ids, arr2(&[[2, 3], [4, 5]]));
    }

    #[test]
    fn test_empty() {
        let batch = Batcher::new(Padding::fixed(3), Truncation::none())
            .unwrap()
            .batch::<Vec<usize>>(&[])
            .unwrap();
        assert_eq!(batch.token_ids.dim(), (0, 3));
    }

    #[test]
    fn test_invalid_truncation() {
        assert_eq!(
            Batcher::new(Padding::none(), Truncation::fixed(0)).unwrap_err(),
            BatchError::Truncation,
        );
    }
}
