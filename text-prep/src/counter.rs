use std::collections::HashMap;

use derive_more::Deref;
use log::debug;
use serde::{Deserialize, Serialize};

/// The occurrence counts of tokens.
///
/// Dereferences to the mapping from token to count.
#[derive(Clone, Debug, Default, Deref, Deserialize, PartialEq, Serialize)]
pub struct TokenCounts {
    #[deref]
    counts: HashMap<String, usize>,
    total: usize,
}

impl TokenCounts {
    /// Counts the tokens.
    ///
    /// Tokens are trimmed and empty tokens are discarded. Only distinct tokens are allocated, so
    /// the tokens can be streamed from an arbitrarily large corpus.
    pub fn count<I>(tokens: I) -> Self
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let mut counts = HashMap::<String, usize>::new();
        let mut total = 0;
        for token in tokens {
            let token = token.as_ref().trim();
            if token.is_empty() {
                continue;
            }
            total += 1;
            if let Some(count) = counts.get_mut(token) {
                *count += 1;
            } else {
                counts.insert(token.to_string(), 1);
            }
        }
        debug!("Counted {} tokens of {} types.", total, counts.len());

        Self { counts, total }
    }

    /// Removes all tokens which occur at most `threshold` times.
    pub fn prune(mut self, threshold: usize) -> Self {
        let nr_types = self.counts.len();
        self.counts.retain(|_, count| *count > threshold);
        debug!(
            "Pruned {} of {} token types with at most {} occurrences.",
            nr_types - self.counts.len(),
            nr_types,
            threshold,
        );

        self
    }

    /// The total number of counted tokens, including pruned ones.
    pub fn total(&self) -> usize {
        self.total
    }

    /// The count of a token, zero if it is unknown or pruned.
    pub fn count_of(&self, token: &str) -> usize {
        self.counts.get(token).copied().unwrap_or_default()
    }

    /// The mapping from token to count.
    pub fn counts(&self) -> &HashMap<String, usize> {
        &self.counts
    }
}
