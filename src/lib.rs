pub mod core;
pub mod analysis;
pub mod query;
pub mod index;
pub mod search;
pub mod parallel;

/*
┌──────────────────────────────── LEXORA STRUCT ARCHITECTURE ────────────────────────────────┐
│                                                                                             │
│  ┌───────────────────────────────────────────────────────────────────────────────────┐     │
│  │                              struct SearchIndex                                    │     │
│  │  ┌─────────────────────────────────────────────────────────────────────────────┐  │     │
│  │  │ config: SearchConfig              // Top-k cutoff, tolerance, shard count   │  │     │
│  │  │ stop_words: StopWordSet           // Words ignored in docs and queries      │  │     │
│  │  │ dictionary: TermDictionary        // Token text -> dense TermId             │  │     │
│  │  │ postings: term -> doc -> tf       // Inverted index                         │  │     │
│  │  │ doc_freqs: doc -> term -> tf      // Mirror of postings, per document       │  │     │
│  │  │ documents: doc -> DocumentData    // Rating, status, original text          │  │     │
│  │  │ document_ids: BTreeSet<DocId>     // Live ids, ascending iteration          │  │     │
│  │  └─────────────────────────────────────────────────────────────────────────────┘  │     │
│  └───────────────────────────────────────────────────────────────────────────────────┘     │
│                                                                                             │
│  query/parser     — raw query -> plus/minus words (stop-filtered, validated)               │
│  search/ranking   — TF-IDF accumulation, predicate filter, sort + truncate                 │
│  parallel/sharded — ConcurrentMap: per-shard locking for parallel accumulation             │
│  parallel/batch   — process_queries: data-parallel query fan-out                           │
│  index/dedup      — remove_duplicates: drop documents with a repeated token set            │
│                                                                                             │
└─────────────────────────────────────────────────────────────────────────────────────────────┘
*/
