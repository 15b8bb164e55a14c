use log::debug;
use ndarray::Array2;
use rand::{prelude::SliceRandom, rngs::StdRng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::{
    config::{Config, ConfigError},
    table::Table,
};

/// The partitions of a split dataset.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Split {
    Train,
    Validation,
    Test,
}

/// A labeled corpus split into disjoint train, validation and test partitions.
///
/// Serializes in the order `x_train, x_val, x_test, y_train, y_val, y_test`.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct SplitDataset {
    pub train_texts: Vec<String>,
    pub validation_texts: Vec<String>,
    pub test_texts: Vec<String>,
    pub train_labels: Array2<i64>,
    pub validation_labels: Array2<i64>,
    pub test_labels: Array2<i64>,
}

impl SplitDataset {
    fn new(train: Table, validation: Table, test: Table) -> Self {
        let (train_texts, train_labels) = train.into_parts();
        let (validation_texts, validation_labels) = validation.into_parts();
        let (test_texts, test_labels) = test.into_parts();

        Self {
            train_texts,
            validation_texts,
            test_texts,
            train_labels,
            validation_labels,
            test_labels,
        }
    }

    /// The texts and labels of a partition.
    pub fn partition(&self, split: Split) -> (&[String], &Array2<i64>) {
        match split {
            Split::Train => (&self.train_texts, &self.train_labels),
            Split::Validation => (&self.validation_texts, &self.validation_labels),
            Split::Test => (&self.test_texts, &self.test_labels),
        }
    }

    /// The number of rows of the train, validation and test partitions.
    pub fn sizes(&self) -> (usize, usize, usize) {
        (
            self.train_texts.len(),
            self.validation_texts.len(),
            self.test_texts.len(),
        )
    }
}

/// Checks that the proportions are finite, non-negative and sum up to at most one.
pub(crate) fn validate_proportions(train: f64, validation: f64) -> Result<(), ConfigError> {
    let is_valid = |p: f64| p.is_finite() && p >= 0.;
    if is_valid(train) && is_valid(validation) && train + validation <= 1. + 1e-9 {
        Ok(())
    } else {
        Err(ConfigError::Proportions { train, validation })
    }
}

/// Splits a table into train, validation and test partitions.
#[derive(Clone, Debug)]
pub struct CorpusSplitter {
    train: f64,
    validation: f64,
    shuffle: bool,
    seed: u64,
}

impl CorpusSplitter {
    /// Creates a splitter.
    ///
    /// The test partition gets the remainder of the train and validation proportions. The rows
    /// are optionally shuffled with a generator seeded by `seed` before splitting.
    ///
    /// # Errors
    /// Fails if a proportion is negative or not finite or if they sum up to more than one.
    pub fn new(train: f64, validation: f64, shuffle: bool, seed: u64) -> Result<Self, ConfigError> {
        validate_proportions(train, validation)?;
        Ok(Self {
            train,
            validation,
            shuffle,
            seed,
        })
    }

    /// Creates a splitter from an already validated configuration.
    pub fn from_config(config: &Config) -> Self {
        Self {
            train: config.train_split,
            validation: config.validation_split,
            shuffle: config.shuffle,
            seed: config.seed,
        }
    }

    /// Calculates the exclusive ends of the train and validation partitions for a number of rows.
    pub fn boundaries(&self, nr_rows: usize) -> (usize, usize) {
        let rows = |p: f64| (p * nr_rows as f64).round() as usize;
        let train_end = rows(self.train).min(nr_rows);
        let validation_end = (train_end + rows(self.validation)).min(nr_rows);

        (train_end, validation_end)
    }

    /// Splits the table.
    ///
    /// The same table, proportions, shuffle flag and seed always result in the same split.
    pub fn split(&self, table: Table) -> SplitDataset {
        let nr_rows = table.len();
        let mut train = if self.shuffle {
            let mut order = (0..nr_rows).collect::<Vec<_>>();
            order.shuffle(&mut StdRng::seed_from_u64(self.seed));
            table.select(&order)
        } else {
            table
        };

        let (train_end, validation_end) = self.boundaries(nr_rows);
        let mut validation = train.split_off(train_end);
        let test = validation.split_off(validation_end - train_end);
        debug!(
            "Split {} rows into {} train, {} validation and {} test rows.",
            nr_rows,
            train.len(),
            validation.len(),
            test.len(),
        );

        SplitDataset::new(train, validation, test)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use rstest::rstest;

    use super::*;

    fn table(nr_rows: usize) -> Table {
        let texts = (0..nr_rows).map(|i| format!("row {}", i)).collect();
        let labels = Array2::from_shape_fn((nr_rows, 2), |(i, j)| (i * 10 + j) as i64);
        Table::new(texts, labels).unwrap()
    }

    #[test]
    fn test_reference_split() {
        let splitter = CorpusSplitter::new(0.96, 0.02, true, 1).unwrap();
        let split = splitter.split(table(1000));
        assert_eq!(split.sizes(), (960, 20, 20));
        assert_eq!(split, splitter.split(table(1000)));
    }

    #[rstest(
        nr_rows,
        train,
        validation,
        sizes,
        case(1000, 0.96, 0.02, (960, 20, 20)),
        case(10, 0.8, 0.1, (8, 1, 1)),
        case(7, 1. / 3., 1. / 3., (2, 2, 3)),
        case(3, 0.96, 0.02, (3, 0, 0)),
        case(1, 0.5, 0.5, (1, 0, 0)),
        case(0, 0.96, 0.02, (0, 0, 0)),
        case(5, 0., 0., (0, 0, 5)),
        case(5, 1., 0., (5, 0, 0))
    )]
    fn test_sizes(nr_rows: usize, train: f64, validation: f64, sizes: (usize, usize, usize)) {
        for &shuffle in &[false, true] {
            let split = CorpusSplitter::new(train, validation, shuffle, 42)
                .unwrap()
                .split(table(nr_rows));
            assert_eq!(split.sizes(), sizes);
            assert_eq!(split.train_labels.nrows(), sizes.0);
            assert_eq!(split.validation_labels.nrows(), sizes.1);
            assert_eq!(split.test_labels.nrows(), sizes.2);
        }
    }

    #[test]
    fn test_disjoint_and_complete() {
        let split = CorpusSplitter::new(0.7, 0.2, true, 7)
            .unwrap()
            .split(table(101));

        let train = split.train_texts.iter().collect::<HashSet<_>>();
        let validation = split.validation_texts.iter().collect::<HashSet<_>>();
        let test = split.test_texts.iter().collect::<HashSet<_>>();
        assert!(train.is_disjoint(&validation));
        assert!(train.is_disjoint(&test));
        assert!(validation.is_disjoint(&test));

        let mut all = split
            .train_texts
            .iter()
            .chain(&split.validation_texts)
            .chain(&split.test_texts)
            .cloned()
            .collect::<Vec<_>>();
        all.sort_unstable();
        let mut expected = table(101).into_parts().0;
        expected.sort_unstable();
        assert_eq!(all, expected);
    }

    #[test]
    fn test_labels_follow_texts() {
        let split = CorpusSplitter::new(0.5, 0.25, true, 3)
            .unwrap()
            .split(table(40));
        for split_kind in &[Split::Train, Split::Validation, Split::Test] {
            let (texts, labels) = split.partition(*split_kind);
            for (text, row) in texts.iter().zip(labels.outer_iter()) {
                let idx = text.trim_start_matches("row ").parse::<i64>().unwrap();
                assert_eq!(row.to_vec(), vec![idx * 10, idx * 10 + 1]);
            }
        }
    }

    #[test]
    fn test_seed() {
        let split = |shuffle, seed| {
            CorpusSplitter::new(0.8, 0.1, shuffle, seed)
                .unwrap()
                .split(table(100))
        };
        assert_eq!(split(true, 1), split(true, 1));
        assert_ne!(split(true, 1), split(true, 2));

        let unshuffled = split(false, 1);
        assert_eq!(unshuffled, split(false, 2));
        assert_eq!(unshuffled.train_texts[0], "row 0");
        assert_eq!(unshuffled.test_texts[9], "row 99");
    }

    #[test]
    fn test_invalid_proportions() {
        assert!(CorpusSplitter::new(0.9, 0.2, true, 1).is_err());
        assert!(CorpusSplitter::new(-0.1, 0.2, true, 1).is_err());
    }
}
