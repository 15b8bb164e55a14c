use std::borrow::Cow;

use unicode_categories::UnicodeCategories;

/// A word normalizer.
#[derive(Clone, Debug)]
pub(crate) struct Normalizer {
    clean_text: bool,
    lowercase: bool,
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::new(true, false)
    }
}

impl Normalizer {
    pub(crate) fn new(clean_text: bool, lowercase: bool) -> Self {
        Self {
            clean_text,
            lowercase,
        }
    }

    /// Checks whether the character separates two words.
    pub(crate) fn is_separator(&self, c: char) -> bool {
        // the definition of `is_other` is quite large and contains Cc, Cf, Cn, Co and Cs, cf.
        // https://unicode.org/reports/tr44/ (Table 12)
        c.is_whitespace() || (self.clean_text && (c == '\u{fffd}' || c.is_other()))
    }

    /// Normalizes the word.
    ///
    /// Only allocates if the word actually changes.
    pub(crate) fn normalize<'s>(&self, word: &'s str) -> Cow<'s, str> {
        if self.lowercase && word.chars().any(char::is_uppercase) {
            Cow::Owned(word.to_lowercase())
        } else {
            Cow::Borrowed(word)
        }
    }
}
