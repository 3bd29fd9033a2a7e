use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::time::Instant;

use rayon::prelude::*;
use tracing::debug;

use crate::core::error::{Error, ErrorKind, Result};
use crate::core::types::{DocId, Document, DocumentStatus};
use crate::index::store::{ExecutionPolicy, SearchIndex};
use crate::parallel::sharded::ConcurrentMap;
use crate::query::parser::{Query, QueryParser};

impl SearchIndex {
    /// Top documents with status `Actual`, on the sequential path.
    pub fn find_top_documents(&self, raw_query: &str) -> Result<Vec<Document>> {
        self.find_top_documents_with_status(raw_query, DocumentStatus::Actual)
    }

    /// Top documents whose status equals `status`.
    pub fn find_top_documents_with_status(
        &self,
        raw_query: &str,
        status: DocumentStatus,
    ) -> Result<Vec<Document>> {
        self.find_top_documents_with(
            ExecutionPolicy::Sequential,
            raw_query,
            move |_id, document_status, _rating| document_status == status,
        )
    }

    /// Top documents selected by an arbitrary `(id, status, rating)`
    /// predicate, ranked by TF-IDF relevance. Relevances within the
    /// configured tolerance compare equal and fall back to rating; the list
    /// is truncated to the configured maximum.
    pub fn find_top_documents_with<P>(
        &self,
        policy: ExecutionPolicy,
        raw_query: &str,
        predicate: P,
    ) -> Result<Vec<Document>>
    where
        P: Fn(DocId, DocumentStatus, i32) -> bool + Sync,
    {
        let started = Instant::now();
        let parser = QueryParser::new(&self.stop_words);
        let query = parser.parse(raw_query, true)?;

        let relevance = match policy {
            ExecutionPolicy::Sequential => self.accumulate_relevance(&query, &predicate),
            ExecutionPolicy::Parallel => self.accumulate_relevance_parallel(&query, &predicate),
        };

        let mut matched: Vec<Document> = relevance
            .into_iter()
            .filter_map(|(id, relevance)| {
                self.documents
                    .get(&id)
                    .map(|data| Document::new(id, relevance, data.rating))
            })
            .collect();

        let tolerance = self.config.relevance_tolerance;
        matched.sort_by(|lhs, rhs| {
            if (lhs.relevance - rhs.relevance).abs() < tolerance {
                rhs.rating.cmp(&lhs.rating)
            } else {
                rhs.relevance
                    .partial_cmp(&lhs.relevance)
                    .unwrap_or(Ordering::Equal)
            }
        });
        matched.truncate(self.config.max_results);

        debug!(
            query = raw_query,
            hits = matched.len(),
            elapsed_us = started.elapsed().as_micros() as u64,
            "query served"
        );
        Ok(matched)
    }

    /// Reports which plus-words of the query occur in the document, along
    /// with the document's status. Any minus-word hit empties the word list.
    /// The sequential path keeps the parsed query order; the parallel path
    /// returns a sorted, deduplicated list.
    pub fn match_document(
        &self,
        raw_query: &str,
        id: DocId,
    ) -> Result<(Vec<&str>, DocumentStatus)> {
        self.match_document_with(ExecutionPolicy::Sequential, raw_query, id)
    }

    pub fn match_document_with(
        &self,
        policy: ExecutionPolicy,
        raw_query: &str,
        id: DocId,
    ) -> Result<(Vec<&str>, DocumentStatus)> {
        let status = self
            .documents
            .get(&id)
            .map(|data| data.status)
            .ok_or_else(|| {
                Error::new(
                    ErrorKind::UnknownDocument,
                    format!("document {} is not in the index", id),
                )
            })?;
        let parser = QueryParser::new(&self.stop_words);

        match policy {
            ExecutionPolicy::Sequential => {
                let query = parser.parse(raw_query, true)?;
                for word in &query.minus_words {
                    if self.doc_contains(id, word) {
                        return Ok((Vec::new(), status));
                    }
                }
                let matched = self.resolve_matches(query.plus_words.iter().copied(), id);
                Ok((matched, status))
            }
            ExecutionPolicy::Parallel => {
                let query = parser.parse(raw_query, false)?;
                if query
                    .minus_words
                    .par_iter()
                    .any(|word| self.doc_contains(id, word))
                {
                    return Ok((Vec::new(), status));
                }
                let mut matched: Vec<&str> = query
                    .plus_words
                    .par_iter()
                    .filter_map(|word| self.resolve_match(word, id))
                    .collect();
                matched.sort_unstable();
                matched.dedup();
                Ok((matched, status))
            }
        }
    }

    /// `ln(document_count / document_frequency)` of one word.
    fn inverse_document_freq(&self, document_freq: usize) -> f64 {
        (self.document_count() as f64 / document_freq as f64).ln()
    }

    fn accumulate_relevance<P>(&self, query: &Query<'_>, predicate: &P) -> BTreeMap<DocId, f64>
    where
        P: Fn(DocId, DocumentStatus, i32) -> bool,
    {
        let mut relevance: BTreeMap<DocId, f64> = BTreeMap::new();
        for word in &query.plus_words {
            let Some(docs) = self.postings_for(word) else {
                continue;
            };
            let idf = self.inverse_document_freq(docs.len());
            for (&id, &tf) in docs {
                let Some(data) = self.documents.get(&id) else {
                    continue;
                };
                if predicate(id, data.status, data.rating) {
                    *relevance.entry(id).or_insert(0.0) += tf * idf;
                }
            }
        }
        self.erase_minus_words(query, &mut relevance);
        relevance
    }

    /// Fans the plus-word iteration over the rayon pool, accumulating into
    /// the sharded map; minus-word exclusion runs sequentially on the merged
    /// result. Agrees with the sequential path up to floating-point
    /// reassociation, which the sort tolerance absorbs.
    fn accumulate_relevance_parallel<P>(
        &self,
        query: &Query<'_>,
        predicate: &P,
    ) -> BTreeMap<DocId, f64>
    where
        P: Fn(DocId, DocumentStatus, i32) -> bool + Sync,
    {
        let accumulator: ConcurrentMap<f64> = ConcurrentMap::new(self.config.shard_count);
        query.plus_words.par_iter().for_each(|word| {
            let Some(docs) = self.postings_for(word) else {
                return;
            };
            let idf = self.inverse_document_freq(docs.len());
            for (&id, &tf) in docs {
                let Some(data) = self.documents.get(&id) else {
                    continue;
                };
                if predicate(id, data.status, data.rating) {
                    *accumulator.at_mut(id) += tf * idf;
                }
            }
        });
        let mut relevance = accumulator.build_ordinary();
        self.erase_minus_words(query, &mut relevance);
        relevance
    }

    fn erase_minus_words(&self, query: &Query<'_>, relevance: &mut BTreeMap<DocId, f64>) {
        for word in &query.minus_words {
            let Some(docs) = self.postings_for(word) else {
                continue;
            };
            for id in docs.keys() {
                relevance.remove(id);
            }
        }
    }

    /// Resolves a query word to the dictionary's copy when the document
    /// contains it, so returned slices outlive the query string.
    fn resolve_match(&self, word: &str, id: DocId) -> Option<&str> {
        let term = self.dictionary.lookup(word)?;
        self.word_frequencies(id)
            .contains_key(&term)
            .then(|| self.dictionary.text(term))
    }

    fn resolve_matches<'a, I>(&self, words: I, id: DocId) -> Vec<&str>
    where
        I: Iterator<Item = &'a str>,
    {
        words
            .filter_map(|word| self.resolve_match(word, id))
            .collect()
    }
}
