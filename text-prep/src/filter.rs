use std::ops::RangeInclusive;

use log::debug;

use crate::table::Table;

/// Counts the whitespace separated words of a text.
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Keeps the rows whose texts have a whitespace separated word count within the bounds.
///
/// The order of the kept rows is preserved.
pub fn filter_by_word_count(table: Table, bounds: RangeInclusive<usize>) -> Table {
    let rows = table
        .texts()
        .iter()
        .enumerate()
        .filter_map(|(idx, text)| bounds.contains(&word_count(text)).then(|| idx))
        .collect::<Vec<_>>();

    let nr_rows = table.len();
    let table = table.select(&rows);
    debug!(
        "Kept {} of {} rows with {}..={} words.",
        table.len(),
        nr_rows,
        bounds.start(),
        bounds.end(),
    );

    table
}
