use std::collections::HashSet;

use crate::analysis::tokenizer::{is_valid_word, split_words};
use crate::core::error::{Error, ErrorKind, Result};

/// Words excluded from both documents and queries. Built once per index,
/// immutable afterwards; lookups take borrowed tokens without allocating.
#[derive(Debug, Default)]
pub struct StopWordSet {
    words: HashSet<String>,
}

impl StopWordSet {
    /// Builds the set from a whitespace-delimited string.
    pub fn from_text(text: &str) -> Result<Self> {
        Self::from_words(split_words(text))
    }

    /// Builds the set from any iterable of words, dropping empty entries and
    /// duplicates.
    pub fn from_words<I, S>(words: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut set = HashSet::new();
        for word in words {
            let word = word.as_ref();
            if word.is_empty() {
                continue;
            }
            if !is_valid_word(word) {
                return Err(Error::new(
                    ErrorKind::InvalidStopWord,
                    format!("stop word {:?} contains a control character", word),
                ));
            }
            set.insert(word.to_string());
        }
        Ok(StopWordSet { words: set })
    }

    pub fn contains(&self, word: &str) -> bool {
        self.words.contains(word)
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}
