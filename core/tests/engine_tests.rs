use retriever_core::query::{BooleanQueryProcessor, VectorQueryProcessor};
use retriever_core::{DocId, Document, Error, IndexBuilder, InvertedIndex};

fn doc(id: DocId, body: &str) -> Document {
    Document {
        id,
        title: format!("doc{id}"),
        author: String::new(),
        body: body.to_string(),
    }
}

fn pets_index() -> InvertedIndex {
    let mut builder = IndexBuilder::new();
    builder.index_doc(&doc(1, "Dogs are friendly.")).unwrap();
    builder.index_doc(&doc(2, "Cats are friendly.")).unwrap();
    builder.index_doc(&doc(3, "Parrots can talk.")).unwrap();
    builder.finish()
}

#[test]
fn boolean_single_term_returns_all_matching_docs() {
    let index = pets_index();
    let boolean = BooleanQueryProcessor::new(&index);
    assert_eq!(boolean.run("friendly"), vec![1, 2]);
}

#[test]
fn boolean_conjunction_with_no_common_doc_is_empty() {
    let index = pets_index();
    let boolean = BooleanQueryProcessor::new(&index);
    // "and" is a stopword; no document contains both "dog" and "cat".
    assert_eq!(boolean.run("dogs and cats"), Vec::<DocId>::new());
}

#[test]
fn boolean_missing_term_empties_the_conjunction() {
    let index = pets_index();
    let boolean = BooleanQueryProcessor::new(&index);
    assert_eq!(boolean.run("friendly unicorns"), Vec::<DocId>::new());
}

#[test]
fn boolean_empty_query_is_empty() {
    let index = pets_index();
    let boolean = BooleanQueryProcessor::new(&index);
    assert_eq!(boolean.run(""), Vec::<DocId>::new());
    assert_eq!(boolean.run("the and of"), Vec::<DocId>::new());
}

#[test]
fn boolean_result_is_ascending_and_duplicate_free() {
    let mut builder = IndexBuilder::new();
    for id in [14, 3, 8, 21] {
        builder.index_doc(&doc(id, "turbine blade stress")).unwrap();
    }
    builder.index_doc(&doc(5, "turbine hub")).unwrap();
    let index = builder.finish();
    let boolean = BooleanQueryProcessor::new(&index);

    let hits = boolean.run("turbine blade blade");
    assert_eq!(hits, vec![3, 8, 14, 21]);
}

#[test]
fn vector_ranks_by_lexical_overlap() {
    let index = pets_index();
    let vector = VectorQueryProcessor::new(&index);

    let hits = vector.run("Are dogs friendly?", 2).unwrap();
    assert_eq!(hits.len(), 2);
    // Document 1 shares both "dog" and "friendly" stems with the query,
    // document 2 only "friendly"; document 3 has no overlap at all.
    assert_eq!(hits[0].0, 1);
    assert_eq!(hits[1].0, 2);
    assert!(hits[0].1 > hits[1].1);
    assert!(hits[1].1 > 0.0);
}

#[test]
fn vector_exact_match_scores_one() {
    let index = pets_index();
    let vector = VectorQueryProcessor::new(&index);

    let hits = vector.run("friendly dogs", 1).unwrap();
    assert_eq!(hits[0].0, 1);
    assert!((hits[0].1 - 1.0).abs() < 1e-12);
}

#[test]
fn vector_excludes_docs_without_query_terms() {
    let index = pets_index();
    let vector = VectorQueryProcessor::new(&index);

    let hits = vector.run("dogs", 10).unwrap();
    assert!(hits.iter().all(|(id, _)| *id == 1));
}

#[test]
fn vector_oversized_k_truncates_gracefully() {
    let index = pets_index();
    let vector = VectorQueryProcessor::new(&index);

    let hits = vector.run("friendly", 100).unwrap();
    assert_eq!(hits.len(), 2);
}

#[test]
fn vector_zero_k_is_rejected() {
    let index = pets_index();
    let vector = VectorQueryProcessor::new(&index);
    assert!(matches!(
        vector.run("friendly", 0),
        Err(Error::InvalidConfiguration(_))
    ));
}

#[test]
fn vector_no_overlap_returns_empty() {
    let index = pets_index();
    let vector = VectorQueryProcessor::new(&index);
    assert!(vector.run("submarine", 5).unwrap().is_empty());
    assert!(vector.run("", 5).unwrap().is_empty());
}

#[test]
fn vector_ties_break_by_ascending_doc_id() {
    let mut builder = IndexBuilder::new();
    // Identical bodies give identical similarity scores.
    builder.index_doc(&doc(9, "reactor coolant loop")).unwrap();
    builder.index_doc(&doc(2, "reactor coolant loop")).unwrap();
    builder.index_doc(&doc(5, "reactor coolant loop")).unwrap();
    builder.index_doc(&doc(1, "unrelated text")).unwrap();
    let index = builder.finish();
    let vector = VectorQueryProcessor::new(&index);

    let hits = vector.run("reactor coolant", 3).unwrap();
    let ids: Vec<DocId> = hits.iter().map(|(id, _)| *id).collect();
    assert_eq!(ids, vec![2, 5, 9]);
    assert!((hits[0].1 - hits[2].1).abs() < 1e-12);
}

#[test]
fn vector_query_leaves_index_unchanged() {
    let index = pets_index();
    let n_terms = index.n_terms();
    let vector = VectorQueryProcessor::new(&index);
    vector.run("friendly dogs and cats", 3).unwrap();
    vector.run("parrots", 3).unwrap();

    assert_eq!(index.n_docs(), 3);
    assert_eq!(index.n_terms(), n_terms);
    let boolean = BooleanQueryProcessor::new(&index);
    assert_eq!(boolean.run("friendly"), vec![1, 2]);
}

#[test]
fn term_frequency_matches_occurrence_count() {
    let mut builder = IndexBuilder::new();
    builder
        .index_doc(&doc(1, "shock wave meets shock wave behind the shock"))
        .unwrap();
    let index = builder.finish();

    let entry = index.find("shock").unwrap();
    assert_eq!(entry.posting(1).unwrap().term_freq(), 3);
    assert_eq!(index.find("wave").unwrap().posting(1).unwrap().term_freq(), 2);
}
