use std::{
    io::{Read, Write},
    str::FromStr,
};

use displaydoc::Display;
use ndarray::{Array2, ArrayView1, Axis};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{config::ConfigError, error::Error};

/// The potential errors of the table.
#[derive(Debug, Display, Error)]
pub enum TableError {
    /// Failed to read or write the csv table: {0}
    Csv(#[from] csv::Error),
    /// Invalid value {value:?} of the label column {column} in row {row}
    InvalidLabel {
        column: &'static str,
        value: String,
        row: usize,
    },
    /// The number of texts ({texts}) doesn't match the number of label rows ({labels})
    Shape { texts: usize, labels: usize },
    /// The table has {got} label columns but {expected} are requested
    Columns { expected: usize, got: usize },
}

/// The sex of the author of a text.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Eq, Serialize)]
pub enum Sex {
    Female = 0,
    Male = 1,
}

impl FromStr for Sex {
    type Err = ();

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "female" | "0" => Ok(Sex::Female),
            "male" | "1" => Ok(Sex::Male),
            _ => Err(()),
        }
    }
}

/// A labeled text as produced by the extraction.
#[derive(Clone, Debug, PartialEq)]
pub struct RawRecord {
    pub text: String,
    pub sex: Sex,
    pub age: u8,
}

impl RawRecord {
    fn label(&self, column: LabelColumn) -> i64 {
        match column {
            LabelColumn::Sex => self.sex as i64,
            LabelColumn::Age => self.age.into(),
        }
    }
}

/// The available label columns.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LabelColumn {
    Sex,
    Age,
}

impl LabelColumn {
    /// The name of the column.
    pub fn name(self) -> &'static str {
        match self {
            LabelColumn::Sex => "sex",
            LabelColumn::Age => "age",
        }
    }

    /// Parses a raw value of this column into its numeric label.
    fn parse_value(self, value: &str, row: usize) -> Result<i64, TableError> {
        let label = match self {
            LabelColumn::Sex => value.parse::<Sex>().map(|sex| sex as i64).ok(),
            LabelColumn::Age => value.trim().parse::<u8>().map(Into::into).ok(),
        };
        label.ok_or_else(|| TableError::InvalidLabel {
            column: self.name(),
            value: value.into(),
            row,
        })
    }
}

impl FromStr for LabelColumn {
    type Err = ConfigError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        match name {
            "sex" => Ok(LabelColumn::Sex),
            "age" => Ok(LabelColumn::Age),
            _ => Err(ConfigError::UnknownColumn(name.into())),
        }
    }
}

/// A table of texts and their numeric labels.
///
/// The labels have one row per text and one column per label column.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Table {
    texts: Vec<String>,
    labels: Array2<i64>,
}

impl Table {
    /// Creates a table from texts and labels.
    ///
    /// # Errors
    /// Fails if the number of texts and label rows differ.
    pub fn new(texts: Vec<String>, labels: Array2<i64>) -> Result<Self, TableError> {
        if texts.len() == labels.nrows() {
            Ok(Self { texts, labels })
        } else {
            Err(TableError::Shape {
                texts: texts.len(),
                labels: labels.nrows(),
            })
        }
    }

    /// Creates a table from records with the requested label columns.
    pub fn from_records(
        records: impl IntoIterator<Item = RawRecord>,
        columns: &[LabelColumn],
    ) -> Self {
        let mut texts = Vec::new();
        let mut labels = Vec::new();
        for record in records {
            labels.extend(columns.iter().map(|&column| record.label(column)));
            texts.push(record.text);
        }

        Self::from_flat(texts, labels, columns.len())
    }

    /// Reads a table from a csv with a header row.
    ///
    /// Only the text column and the requested label columns are read, other columns are
    /// ignored.
    ///
    /// # Errors
    /// Fails if a requested column is missing, if the csv is malformed or if a label value
    /// can't be parsed.
    pub fn from_csv(
        reader: impl Read,
        text_column: &str,
        label_columns: &[LabelColumn],
    ) -> Result<Self, Error> {
        let mut reader = csv::Reader::from_reader(reader);
        let headers = reader.headers().map_err(TableError::from)?.clone();
        let position = |name: &str| {
            headers
                .iter()
                .position(|header| header == name)
                .ok_or_else(|| ConfigError::UnknownColumn(name.into()))
        };
        let text_idx = position(text_column)?;
        let label_idxs = label_columns
            .iter()
            .map(|column| position(column.name()))
            .collect::<Result<Vec<_>, _>>()?;

        let mut texts = Vec::new();
        let mut labels = Vec::new();
        for (row, record) in reader.records().enumerate() {
            let record = record.map_err(TableError::from)?;
            for (&column, &idx) in label_columns.iter().zip(&label_idxs) {
                labels.push(column.parse_value(&record[idx], row)?);
            }
            texts.push(record[text_idx].to_string());
        }

        Ok(Self::from_flat(texts, labels, label_columns.len()))
    }

    /// Writes the table as csv with a header row.
    pub fn write_csv(
        &self,
        writer: impl Write,
        text_column: &str,
        label_columns: &[LabelColumn],
    ) -> Result<(), TableError> {
        if label_columns.len() != self.labels.ncols() {
            return Err(TableError::Columns {
                expected: label_columns.len(),
                got: self.labels.ncols(),
            });
        }

        let mut writer = csv::Writer::from_writer(writer);
        writer.write_record(
            std::iter::once(text_column).chain(label_columns.iter().map(|column| column.name())),
        )?;
        for (text, labels) in self.texts.iter().zip(self.labels.outer_iter()) {
            writer.write_record(
                std::iter::once(text.clone()).chain(labels.iter().map(ToString::to_string)),
            )?;
        }
        writer.flush().map_err(csv::Error::from)?;

        Ok(())
    }

    fn from_flat(texts: Vec<String>, labels: Vec<i64>, columns: usize) -> Self {
        let labels = Array2::from_shape_vec((texts.len(), columns), labels)
            // one label per text and column by construction
            .unwrap_or_else(|_| unreachable!());
        Self { texts, labels }
    }

    /// The number of rows.
    pub fn len(&self) -> usize {
        self.texts.len()
    }

    /// Checks whether the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.texts.is_empty()
    }

    /// The texts.
    pub fn texts(&self) -> &[String] {
        &self.texts
    }

    /// The labels.
    pub fn labels(&self) -> &Array2<i64> {
        &self.labels
    }

    /// The text and labels of a row.
    pub fn row(&self, idx: usize) -> Option<(&str, ArrayView1<'_, i64>)> {
        self.texts
            .get(idx)
            .map(|text| (text.as_str(), self.labels.row(idx)))
    }

    /// Splits the table into its texts and labels.
    pub fn into_parts(self) -> (Vec<String>, Array2<i64>) {
        (self.texts, self.labels)
    }

    /// Keeps the rows in the given order, rows not mentioned are dropped.
    ///
    /// The row indices must be unique and in bounds.
    pub(crate) fn select(self, rows: &[usize]) -> Self {
        let labels = self.labels.select(Axis(0), rows);

        let mut position = vec![None; self.texts.len()];
        for (pos, &row) in rows.iter().enumerate() {
            position[row] = Some(pos);
        }
        let mut texts = self
            .texts
            .into_iter()
            .zip(position)
            .filter_map(|(text, pos)| pos.map(|pos| (pos, text)))
            .collect::<Vec<_>>();
        texts.sort_unstable_by_key(|&(pos, _)| pos);
        let texts = texts.into_iter().map(|(_, text)| text).collect();

        Self { texts, labels }
    }

    /// Splits the table at the row index, the second table starts at the index.
    pub(crate) fn split_off(&mut self, at: usize) -> Self {
        let texts = self.texts.split_off(at);
        let labels = self.labels.slice_axis(Axis(0), (at..).into()).to_owned();
        self.labels = self.labels.slice_axis(Axis(0), (..at).into()).to_owned();
        Self { texts, labels }
    }
}
