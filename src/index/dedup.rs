use std::collections::{BTreeSet, HashSet};

use tracing::info;

use crate::core::types::DocId;
use crate::index::dictionary::TermId;
use crate::index::store::SearchIndex;

/// Removes every document whose distinct-word set duplicates an earlier
/// (lower-id) document. The first occurrence of each word set survives.
/// Returns the removed ids in ascending order; each removal is also reported
/// on the log.
pub fn remove_duplicates(index: &mut SearchIndex) -> Vec<DocId> {
    let mut seen: HashSet<BTreeSet<TermId>> = HashSet::new();
    let mut duplicates = Vec::new();

    for id in index.document_ids() {
        let words: BTreeSet<TermId> = index.word_frequencies(id).keys().copied().collect();
        if !seen.insert(words) {
            duplicates.push(id);
        }
    }

    for &id in &duplicates {
        info!("Found duplicate document id {}", id);
        index.remove_document(id);
    }
    duplicates
}
