/// Tuning knobs of a search index instance.
#[derive(Debug, Clone)]
pub struct SearchConfig {
    /// Result list cutoff for top-k queries.
    pub max_results: usize,
    /// Two relevances closer than this compare equal and fall back to rating.
    pub relevance_tolerance: f64,
    /// Shard count of the concurrent accumulator used by parallel queries.
    pub shard_count: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        SearchConfig {
            max_results: 5,
            relevance_tolerance: 1e-6,
            shard_count: num_cpus::get(),
        }
    }
}
