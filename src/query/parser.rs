use crate::analysis::stopwords::StopWordSet;
use crate::analysis::tokenizer::{is_valid_word, split_words};
use crate::core::error::{Error, ErrorKind, Result};

/// A parsed query. Plus-words select documents, minus-words exclude them;
/// both borrow from the raw query string.
#[derive(Debug, Default)]
pub struct Query<'a> {
    pub plus_words: Vec<&'a str>,
    pub minus_words: Vec<&'a str>,
}

struct QueryWord<'a> {
    word: &'a str,
    is_minus: bool,
    is_stop: bool,
}

/// Query parser for converting raw query strings into plus/minus word lists.
pub struct QueryParser<'s> {
    stop_words: &'s StopWordSet,
}

impl<'s> QueryParser<'s> {
    pub fn new(stop_words: &'s StopWordSet) -> Self {
        QueryParser { stop_words }
    }

    /// With `need_sort` the raw token sequence is sorted and deduplicated
    /// before parsing. The parallel match path passes `false` and tolerates
    /// duplicate work instead of sorting on the critical path.
    pub fn parse<'a>(&self, text: &'a str, need_sort: bool) -> Result<Query<'a>> {
        let mut words = split_words(text);
        if need_sort {
            words.sort_unstable();
            words.dedup();
        }

        let mut query = Query::default();
        for word in words {
            let parsed = self.parse_word(word)?;
            if parsed.is_stop {
                continue;
            }
            if parsed.is_minus {
                query.minus_words.push(parsed.word);
            } else {
                query.plus_words.push(parsed.word);
            }
        }
        Ok(query)
    }

    fn parse_word<'a>(&self, text: &'a str) -> Result<QueryWord<'a>> {
        if text.is_empty() {
            return Err(Error::new(ErrorKind::InvalidQuery, "query word is empty"));
        }
        let (word, is_minus) = match text.strip_prefix('-') {
            Some(stripped) => (stripped, true),
            None => (text, false),
        };
        if word.is_empty() || word.starts_with('-') || !is_valid_word(word) {
            return Err(Error::new(
                ErrorKind::InvalidQuery,
                format!("query word {:?} is invalid", text),
            ));
        }
        Ok(QueryWord {
            word,
            is_minus,
            is_stop: self.stop_words.contains(word),
        })
    }
}
