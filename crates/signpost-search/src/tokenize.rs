//! Word splitting and normalization.
//!
//! Words are runs of letters, optionally joined by apostrophes (Ukrainian
//! and English use them inside words). Everything else is a delimiter.

/// Characters treated as an apostrophe inside a word.
pub const APOSTROPHES: [char; 5] = ['\'', '\u{2019}', '\u{02BC}', '\u{2018}', '`'];

fn is_apostrophe(c: char) -> bool {
    APOSTROPHES.contains(&c)
}

fn is_word_char(c: char) -> bool {
    c.is_alphabetic() || is_apostrophe(c)
}

/// Split `text` into raw word runs.
pub fn split_words(text: &str) -> impl Iterator<Item = &str> {
    text.split(|c: char| !is_word_char(c))
        .map(|w| w.trim_matches(is_apostrophe))
        .filter(|w| !w.is_empty())
}

/// Case-fold and unify dialect spellings of a single word.
///
/// `ё` is folded to `е` and every apostrophe variant to `'`.
pub fn normalize(word: &str) -> String {
    word.chars()
        .flat_map(char::to_lowercase)
        .map(|c| match c {
            'ё' => 'е',
            c if is_apostrophe(c) => '\'',
            c => c,
        })
        .collect()
}

/// Splits text into normalized tokens, dropping the ones that are too short.
#[derive(Debug, Clone, Copy)]
pub struct Tokenizer {
    min_length: usize,
}

impl Tokenizer {
    pub fn new(min_length: usize) -> Self {
        Self { min_length }
    }

    pub fn min_length(&self) -> usize {
        self.min_length
    }

    /// Normalized tokens of `text`, in order, duplicates included.
    pub fn tokens(&self, text: &str) -> Vec<String> {
        split_words(text)
            .filter(|w| w.chars().count() >= self.min_length)
            .map(normalize)
            .collect()
    }
}

impl Default for Tokenizer {
    fn default() -> Self {
        Self::new(3)
    }
}
