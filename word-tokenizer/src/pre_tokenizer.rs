use unicode_categories::UnicodeCategories;

/// A word pre-tokenizer.
///
/// Words are separated by whitespace and punctuation is isolated into single character tokens.
/// Infix punctuation between two alphanumeric characters can optionally be kept as part of the
/// surrounding word.
#[derive(Clone, Debug)]
pub(crate) struct PreTokenizer {
    keep_infix: bool,
}

impl Default for PreTokenizer {
    fn default() -> Self {
        Self::new(true)
    }
}

fn is_punctuation(c: char) -> bool {
    c.is_ascii_punctuation() || c.is_punctuation()
}

impl PreTokenizer {
    pub(crate) fn new(keep_infix: bool) -> Self {
        Self { keep_infix }
    }

    /// Finds the byte length of the token at the start of the sequence.
    ///
    /// The sequence must start with a non-separator character, the returned length is never zero
    /// for a non-empty sequence.
    pub(crate) fn token_len(&self, sequence: &str, is_separator: impl Fn(char) -> bool) -> usize {
        let mut chars = sequence.char_indices().peekable();
        let mut prev = match chars.next() {
            Some((_, c)) if is_punctuation(c) => return c.len_utf8(),
            Some((_, c)) => c,
            None => return 0,
        };

        while let Some((idx, c)) = chars.next() {
            if is_separator(c) {
                return idx;
            }
            if is_punctuation(c) {
                let is_infix = self.keep_infix
                    && prev.is_alphanumeric()
                    && chars
                        .peek()
                        .map_or(false, |&(_, next)| next.is_alphanumeric());
                if !is_infix {
                    return idx;
                }
            }
            prev = c;
        }

        sequence.len()
    }
}
