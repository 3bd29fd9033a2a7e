use std::collections::HashMap;

/// Dense identifier of an interned term.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TermId(pub u32);

/// Corpus-level term interner.
///
/// Every distinct token is stored exactly once; postings and per-document
/// frequency maps refer to it by `TermId`. Removing a document therefore
/// never invalidates term references held elsewhere in the index.
#[derive(Debug, Default)]
pub struct TermDictionary {
    terms: Vec<String>,
    term_map: HashMap<String, TermId>,
}

impl TermDictionary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the id of `word`, interning it on first sight.
    pub fn intern(&mut self, word: &str) -> TermId {
        if let Some(&id) = self.term_map.get(word) {
            return id;
        }
        let id = TermId(self.terms.len() as u32);
        self.terms.push(word.to_string());
        self.term_map.insert(word.to_string(), id);
        id
    }

    /// Looks a term up without interning it.
    pub fn lookup(&self, word: &str) -> Option<TermId> {
        self.term_map.get(word).copied()
    }

    /// Resolves an id issued by this dictionary back to its text.
    pub fn text(&self, id: TermId) -> &str {
        &self.terms[id.0 as usize]
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }
}
