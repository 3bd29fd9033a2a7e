use rayon::prelude::*;

use crate::core::error::Result;
use crate::core::types::Document;
use crate::index::store::SearchIndex;

/// Runs every query against the index in parallel. Output order matches
/// input order; each entry is the independent top-k result of its query,
/// computed on the sequential ranking path. The index must stay quiescent
/// for the duration of the call.
pub fn process_queries(index: &SearchIndex, queries: &[String]) -> Result<Vec<Vec<Document>>> {
    queries
        .par_iter()
        .map(|query| index.find_top_documents(query))
        .collect()
}

/// Like [`process_queries`], with all per-query results flattened into one
/// list in input order.
pub fn process_queries_joined(index: &SearchIndex, queries: &[String]) -> Result<Vec<Document>> {
    Ok(process_queries(index, queries)?
        .into_iter()
        .flatten()
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::ErrorKind;
    use crate::core::types::{DocId, DocumentStatus};

    fn index_fixture() -> SearchIndex {
        let mut index = SearchIndex::new("the").unwrap();
        index
            .add_document(DocId(1), "cat in the city", DocumentStatus::Actual, &[1])
            .unwrap();
        index
            .add_document(DocId(2), "moon over the city", DocumentStatus::Actual, &[2])
            .unwrap();
        index
            .add_document(DocId(3), "quiet spoon", DocumentStatus::Actual, &[3])
            .unwrap();
        index
    }

    #[test]
    fn test_results_align_with_input_order() {
        let index = index_fixture();
        let queries = vec![
            "cat".to_string(),
            "city".to_string(),
            "spoon".to_string(),
            "absent".to_string(),
        ];
        let results = process_queries(&index, &queries).unwrap();
        assert_eq!(results.len(), 4);
        assert_eq!(results[0].len(), 1);
        assert_eq!(results[0][0].id, DocId(1));
        assert_eq!(results[1].len(), 2);
        assert_eq!(results[2][0].id, DocId(3));
        assert!(results[3].is_empty());
    }

    #[test]
    fn test_joined_flattens_in_order() {
        let index = index_fixture();
        let queries = vec!["cat".to_string(), "spoon".to_string()];
        let joined = process_queries_joined(&index, &queries).unwrap();
        assert_eq!(joined.len(), 2);
        assert_eq!(joined[0].id, DocId(1));
        assert_eq!(joined[1].id, DocId(3));
    }

    #[test]
    fn test_invalid_query_propagates() {
        let index = index_fixture();
        let queries = vec!["cat".to_string(), "--bad".to_string()];
        let err = process_queries(&index, &queries).unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidQuery);
    }
}
