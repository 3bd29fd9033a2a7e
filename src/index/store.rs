use std::collections::{BTreeMap, BTreeSet, HashMap};

use once_cell::sync::Lazy;
use rayon::prelude::*;
use tracing::debug;

use crate::analysis::stopwords::StopWordSet;
use crate::analysis::tokenizer::{is_valid_word, split_words};
use crate::core::config::SearchConfig;
use crate::core::error::{Error, ErrorKind, Result};
use crate::core::types::{DocId, DocumentStatus};
use crate::index::dictionary::{TermDictionary, TermId};

/// Execution mode of the operations that ship a sequential and a parallel
/// path. A runtime value rather than separate entry points per mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionPolicy {
    Sequential,
    Parallel,
}

/// Per-document record: average rating, status tag and the original text the
/// document was indexed from.
#[derive(Debug)]
pub(crate) struct DocumentData {
    pub(crate) rating: i32,
    pub(crate) status: DocumentStatus,
    pub(crate) text: String,
}

static EMPTY_FREQS: Lazy<HashMap<TermId, f64>> = Lazy::new(HashMap::new);

/// In-memory inverted index over short text documents.
///
/// Postings and the per-document frequency maps mirror each other: for every
/// live document `d` and term `w`, `postings[w][d]` exists iff
/// `doc_freqs[d][w]` exists, and the two values are equal. The index follows
/// a single-writer discipline; queries assume no concurrent mutation.
pub struct SearchIndex {
    pub(crate) config: SearchConfig,
    pub(crate) stop_words: StopWordSet,
    pub(crate) dictionary: TermDictionary,
    /// term -> document -> term frequency
    pub(crate) postings: HashMap<TermId, BTreeMap<DocId, f64>>,
    /// document -> term -> term frequency, for O(|doc words|) removal and
    /// introspection
    pub(crate) doc_freqs: BTreeMap<DocId, HashMap<TermId, f64>>,
    pub(crate) documents: BTreeMap<DocId, DocumentData>,
    pub(crate) document_ids: BTreeSet<DocId>,
}

impl SearchIndex {
    /// Creates an index with stop words given as a whitespace-delimited
    /// string.
    pub fn new(stop_words_text: &str) -> Result<Self> {
        Self::with_config(stop_words_text, SearchConfig::default())
    }

    /// Creates an index from any iterable of stop words.
    pub fn from_stop_words<I, S>(stop_words: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Ok(Self::from_parts(
            StopWordSet::from_words(stop_words)?,
            SearchConfig::default(),
        ))
    }

    pub fn with_config(stop_words_text: &str, config: SearchConfig) -> Result<Self> {
        Ok(Self::from_parts(StopWordSet::from_text(stop_words_text)?, config))
    }

    fn from_parts(stop_words: StopWordSet, config: SearchConfig) -> Self {
        SearchIndex {
            config,
            stop_words,
            dictionary: TermDictionary::new(),
            postings: HashMap::new(),
            doc_freqs: BTreeMap::new(),
            documents: BTreeMap::new(),
            document_ids: BTreeSet::new(),
        }
    }

    /// Indexes a document. The id must be non-negative and not currently
    /// live; the text must tokenize to at least one non-stop word. Nothing
    /// is mutated on the error path.
    pub fn add_document(
        &mut self,
        id: DocId,
        text: &str,
        status: DocumentStatus,
        ratings: &[i32],
    ) -> Result<()> {
        if id.value() < 0 || self.documents.contains_key(&id) {
            return Err(Error::new(
                ErrorKind::DuplicateOrNegativeId,
                format!("document id {} is negative or already present", id),
            ));
        }
        let words = self.split_into_words_no_stop(text)?;
        if words.is_empty() {
            return Err(Error::new(
                ErrorKind::EmptyDocument,
                format!("document {} has no indexable words", id),
            ));
        }

        // Repeated occurrences of a word accumulate, so the frequencies of
        // one document always sum to 1.
        let inv_word_count = 1.0 / words.len() as f64;
        let terms: Vec<TermId> = words.iter().map(|word| self.dictionary.intern(word)).collect();
        for &term in &terms {
            *self
                .postings
                .entry(term)
                .or_default()
                .entry(id)
                .or_insert(0.0) += inv_word_count;
            *self
                .doc_freqs
                .entry(id)
                .or_default()
                .entry(term)
                .or_insert(0.0) += inv_word_count;
        }

        self.documents.insert(
            id,
            DocumentData {
                rating: compute_average_rating(ratings),
                status,
                text: text.to_string(),
            },
        );
        self.document_ids.insert(id);
        debug!(id = id.value(), words = terms.len(), "indexed document");
        Ok(())
    }

    /// Removes a document sequentially. Missing ids are a no-op.
    pub fn remove_document(&mut self, id: DocId) {
        self.remove_document_with(ExecutionPolicy::Sequential, id);
    }

    /// Removes a document, erasing its posting entries under the requested
    /// policy. Both policies terminate with identical final state.
    pub fn remove_document_with(&mut self, policy: ExecutionPolicy, id: DocId) {
        let Some(freqs) = self.doc_freqs.remove(&id) else {
            return;
        };
        self.document_ids.remove(&id);
        self.documents.remove(&id);

        match policy {
            ExecutionPolicy::Sequential => {
                for term in freqs.keys() {
                    if let Some(docs) = self.postings.get_mut(term) {
                        docs.remove(&id);
                    }
                }
            }
            ExecutionPolicy::Parallel => {
                // Partitioned by posting list: no two workers ever touch the
                // same list.
                self.postings.par_iter_mut().for_each(|(term, docs)| {
                    if freqs.contains_key(term) {
                        docs.remove(&id);
                    }
                });
            }
        }
        debug!(id = id.value(), "removed document");
    }

    /// Number of live documents.
    pub fn document_count(&self) -> usize {
        self.documents.len()
    }

    /// Live document ids in ascending order.
    pub fn document_ids(&self) -> impl Iterator<Item = DocId> + '_ {
        self.document_ids.iter().copied()
    }

    /// Term frequencies of one document, keyed by interned term id. Dead ids
    /// yield a shared empty map.
    pub fn word_frequencies(&self, id: DocId) -> &HashMap<TermId, f64> {
        self.doc_freqs.get(&id).unwrap_or(&*EMPTY_FREQS)
    }

    /// Resolves an interned term id to its text.
    pub fn term_text(&self, term: TermId) -> &str {
        self.dictionary.text(term)
    }

    /// Original text of a live document.
    pub fn document_text(&self, id: DocId) -> Option<&str> {
        self.documents.get(&id).map(|data| data.text.as_str())
    }

    /// Posting list of a word, if the word is indexed and the list is
    /// non-empty. Removal leaves drained lists behind, so emptiness is
    /// checked here rather than at every call site.
    pub(crate) fn postings_for(&self, word: &str) -> Option<&BTreeMap<DocId, f64>> {
        let term = self.dictionary.lookup(word)?;
        let docs = self.postings.get(&term)?;
        if docs.is_empty() { None } else { Some(docs) }
    }

    /// Whether a live document contains the given word.
    pub(crate) fn doc_contains(&self, id: DocId, word: &str) -> bool {
        match self.dictionary.lookup(word) {
            Some(term) => self.word_frequencies(id).contains_key(&term),
            None => false,
        }
    }

    fn split_into_words_no_stop<'a>(&self, text: &'a str) -> Result<Vec<&'a str>> {
        let mut words = Vec::new();
        for word in split_words(text) {
            if !is_valid_word(word) {
                return Err(Error::new(
                    ErrorKind::InvalidWord,
                    format!("word {:?} contains a control character", word),
                ));
            }
            if !self.stop_words.contains(word) {
                words.push(word);
            }
        }
        Ok(words)
    }
}

/// Truncated integer mean of the ratings; an empty list rates 0.
fn compute_average_rating(ratings: &[i32]) -> i32 {
    if ratings.is_empty() {
        return 0;
    }
    let sum: i32 = ratings.iter().sum();
    sum / ratings.len() as i32
}

#[cfg(test)]
mod tests {
    use super::*;

    fn index_fixture(stop_words: &str) -> SearchIndex {
        SearchIndex::new(stop_words).unwrap()
    }

    #[test]
    fn test_add_document_and_count() {
        let mut index = index_fixture("");
        index
            .add_document(DocId(42), "cat in the city", DocumentStatus::Actual, &[1, 2, 3])
            .unwrap();
        assert_eq!(index.document_count(), 1);
        assert_eq!(index.document_ids().collect::<Vec<_>>(), vec![DocId(42)]);
        assert_eq!(index.document_text(DocId(42)), Some("cat in the city"));
        assert_eq!(index.document_text(DocId(7)), None);
    }

    #[test]
    fn test_document_ids_are_ascending() {
        let mut index = index_fixture("");
        for id in [5, 1, 3] {
            index
                .add_document(DocId(id), "cat city", DocumentStatus::Actual, &[])
                .unwrap();
        }
        let ids: Vec<i32> = index.document_ids().map(|id| id.value()).collect();
        assert_eq!(ids, vec![1, 3, 5]);
    }

    #[test]
    fn test_negative_id_rejected() {
        let mut index = index_fixture("");
        let err = index
            .add_document(DocId(-1), "cat", DocumentStatus::Actual, &[])
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::DuplicateOrNegativeId);
        assert_eq!(index.document_count(), 0);
    }

    #[test]
    fn test_duplicate_id_rejected() {
        let mut index = index_fixture("");
        index
            .add_document(DocId(1), "cat", DocumentStatus::Actual, &[])
            .unwrap();
        let err = index
            .add_document(DocId(1), "dog", DocumentStatus::Actual, &[])
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::DuplicateOrNegativeId);
        assert_eq!(index.document_count(), 1);
    }

    #[test]
    fn test_invalid_word_rejected_without_mutation() {
        let mut index = index_fixture("");
        let err = index
            .add_document(DocId(1), "cat c\u{1}ty", DocumentStatus::Actual, &[])
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidWord);
        assert_eq!(index.document_count(), 0);
        assert!(index.word_frequencies(DocId(1)).is_empty());
    }

    #[test]
    fn test_all_stop_words_rejected() {
        let mut index = index_fixture("in the");
        let err = index
            .add_document(DocId(1), "in the", DocumentStatus::Actual, &[])
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::EmptyDocument);
        assert_eq!(index.document_count(), 0);
    }

    #[test]
    fn test_average_rating() {
        let mut index = index_fixture("");
        index
            .add_document(DocId(1), "cat", DocumentStatus::Actual, &[1, 2, 3])
            .unwrap();
        index
            .add_document(DocId(2), "dog", DocumentStatus::Actual, &[-1, -2, -3])
            .unwrap();
        index
            .add_document(DocId(3), "fox", DocumentStatus::Actual, &[])
            .unwrap();
        assert_eq!(index.documents[&DocId(1)].rating, 2);
        assert_eq!(index.documents[&DocId(2)].rating, -2);
        assert_eq!(index.documents[&DocId(3)].rating, 0);
    }

    #[test]
    fn test_word_frequencies() {
        let mut index = index_fixture("the");
        index
            .add_document(
                DocId(42),
                "fluffy cat fluffy tail",
                DocumentStatus::Actual,
                &[],
            )
            .unwrap();
        let freqs = index.word_frequencies(DocId(42));
        assert_eq!(freqs.len(), 3);
        let fluffy = index.dictionary.lookup("fluffy").unwrap();
        let cat = index.dictionary.lookup("cat").unwrap();
        assert!((freqs[&fluffy] - 0.5).abs() < 1e-12);
        assert!((freqs[&cat] - 0.25).abs() < 1e-12);
        let total: f64 = freqs.values().sum();
        assert!((total - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_word_frequencies_of_dead_id_are_shared_empty() {
        let index = index_fixture("");
        assert!(index.word_frequencies(DocId(9)).is_empty());
        let first = index.word_frequencies(DocId(9)) as *const _;
        let second = index.word_frequencies(DocId(10)) as *const _;
        assert_eq!(first, second);
    }

    #[test]
    fn test_postings_mirror_doc_freqs() {
        let mut index = index_fixture("");
        index
            .add_document(DocId(1), "cat city cat", DocumentStatus::Actual, &[])
            .unwrap();
        index
            .add_document(DocId(2), "city moon", DocumentStatus::Actual, &[])
            .unwrap();
        for (&id, freqs) in &index.doc_freqs {
            for (term, tf) in freqs {
                assert_eq!(index.postings[term][&id], *tf);
            }
        }
        for (term, docs) in &index.postings {
            for (id, tf) in docs {
                assert_eq!(index.doc_freqs[id][term], *tf);
            }
        }
    }

    #[test]
    fn test_remove_document() {
        let mut index = index_fixture("");
        index
            .add_document(DocId(1), "cat city", DocumentStatus::Actual, &[])
            .unwrap();
        index
            .add_document(DocId(2), "cat moon", DocumentStatus::Actual, &[])
            .unwrap();
        index.remove_document(DocId(1));

        assert_eq!(index.document_count(), 1);
        assert!(index.document_ids().all(|id| id != DocId(1)));
        assert!(index.word_frequencies(DocId(1)).is_empty());
        let cat = index.dictionary.lookup("cat").unwrap();
        assert!(!index.postings[&cat].contains_key(&DocId(1)));
        assert!(index.postings[&cat].contains_key(&DocId(2)));
    }

    #[test]
    fn test_remove_missing_id_is_noop() {
        let mut index = index_fixture("");
        index
            .add_document(DocId(1), "cat", DocumentStatus::Actual, &[])
            .unwrap();
        index.remove_document(DocId(7));
        assert_eq!(index.document_count(), 1);
    }

    #[test]
    fn test_parallel_remove_matches_sequential() {
        let build = || {
            let mut index = index_fixture("");
            index
                .add_document(DocId(1), "cat city moon", DocumentStatus::Actual, &[])
                .unwrap();
            index
                .add_document(DocId(2), "cat spoon", DocumentStatus::Actual, &[])
                .unwrap();
            index
                .add_document(DocId(3), "moon spoon city", DocumentStatus::Actual, &[])
                .unwrap();
            index
        };

        let mut sequential = build();
        sequential.remove_document_with(ExecutionPolicy::Sequential, DocId(2));
        let mut parallel = build();
        parallel.remove_document_with(ExecutionPolicy::Parallel, DocId(2));

        assert_eq!(
            sequential.document_ids().collect::<Vec<_>>(),
            parallel.document_ids().collect::<Vec<_>>()
        );
        for (term, docs) in &sequential.postings {
            assert_eq!(docs, &parallel.postings[term]);
        }
    }

    #[test]
    fn test_add_then_remove_restores_state() {
        let mut index = index_fixture("");
        index
            .add_document(DocId(1), "cat city", DocumentStatus::Actual, &[])
            .unwrap();
        let count_before = index.document_count();
        let ids_before: Vec<DocId> = index.document_ids().collect();

        index
            .add_document(DocId(2), "moon spoon", DocumentStatus::Actual, &[5])
            .unwrap();
        index.remove_document(DocId(2));

        assert_eq!(index.document_count(), count_before);
        assert_eq!(index.document_ids().collect::<Vec<_>>(), ids_before);
        assert!(index.word_frequencies(DocId(2)).is_empty());
        for docs in index.postings.values() {
            assert!(!docs.contains_key(&DocId(2)));
        }
    }

    #[test]
    fn test_compute_average_rating() {
        assert_eq!(compute_average_rating(&[1, 2, 3]), 2);
        assert_eq!(compute_average_rating(&[-1, -2, -3]), -2);
        assert_eq!(compute_average_rating(&[]), 0);
        assert_eq!(compute_average_rating(&[7]), 7);
    }
}
