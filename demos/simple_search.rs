/// Lexora end-to-end demo
///
/// Walks through the main index operations:
/// - Adding documents with status and ratings
/// - Top-k search (sequential and parallel)
/// - Match explanation for a single document
/// - Duplicate removal
/// - Batch query processing

use lexora::core::types::{DocId, DocumentStatus};
use lexora::index::dedup::remove_duplicates;
use lexora::index::store::{ExecutionPolicy, SearchIndex};
use lexora::parallel::batch::process_queries_joined;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("Lexora - in-memory TF-IDF search demo\n");

    // Step 1: Build the index
    println!("Step 1: Building index...");
    let mut index = SearchIndex::new("and in at with")?;
    index.add_document(
        DocId(0),
        "white cat and fashionable collar",
        DocumentStatus::Actual,
        &[8, -3],
    )?;
    index.add_document(
        DocId(1),
        "fluffy cat fluffy tail",
        DocumentStatus::Actual,
        &[7, 2, 7],
    )?;
    index.add_document(
        DocId(2),
        "groomed dog expressive eyes",
        DocumentStatus::Actual,
        &[5, -12, 2, 1],
    )?;
    index.add_document(
        DocId(3),
        "groomed starling evgeny",
        DocumentStatus::Banned,
        &[9],
    )?;
    // Same word set as document 1, in another order
    index.add_document(
        DocId(4),
        "fluffy tail fluffy cat",
        DocumentStatus::Actual,
        &[3],
    )?;
    println!("  Indexed {} documents\n", index.document_count());

    // Step 2: Search
    println!("Step 2: Searching 'fluffy groomed cat -collar'...");
    for document in index.find_top_documents("fluffy groomed cat -collar")? {
        println!("  {}", document);
    }
    println!();

    // Step 3: Parallel search with a predicate
    println!("Step 3: Parallel search over even ids...");
    let found = index.find_top_documents_with(
        ExecutionPolicy::Parallel,
        "fluffy groomed cat",
        |id, _status, _rating| id.value() % 2 == 0,
    )?;
    for document in found {
        println!("  {}", document);
    }
    println!();

    // Step 4: Match explanation
    println!("Step 4: Matching 'fluffy cat' against document 1...");
    let (words, status) = index.match_document("fluffy cat", DocId(1))?;
    println!("  matched words = {:?}, status = {:?}\n", words, status);

    // Step 5: Duplicate removal
    println!("Step 5: Removing duplicates...");
    let removed = remove_duplicates(&mut index);
    println!(
        "  Removed {:?}, {} documents remain\n",
        removed,
        index.document_count()
    );

    // Step 6: Batch queries
    println!("Step 6: Processing a query batch...");
    let queries = vec!["fluffy cat".to_string(), "groomed dog".to_string()];
    for document in process_queries_joined(&index, &queries)? {
        println!("  {}", document);
    }

    Ok(())
}
