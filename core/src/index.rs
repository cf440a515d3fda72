use crate::error::{Error, Result};
use crate::tokenizer;
use crate::{DocId, Document};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Occurrences of one term within one document: the document identifier
/// plus the 0-based positions (over surviving tokens) where the term
/// appears. Positions are ascending once the owning builder has finished.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Posting {
    pub doc_id: DocId,
    pub positions: Vec<u32>,
}

impl Posting {
    fn new(doc_id: DocId) -> Self {
        Self {
            doc_id,
            positions: Vec::new(),
        }
    }

    fn append(&mut self, position: u32) {
        self.positions.push(position);
    }

    /// Raw occurrence count of the term in this document.
    pub fn term_freq(&self) -> u32 {
        self.positions.len() as u32
    }
}

/// Per-term record aggregating postings across the collection.
///
/// The sorted doc-id view is materialized by `sort()`; `IndexBuilder`
/// guarantees that happens before any query can observe the entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TermEntry {
    pub term: String,
    pub(crate) postings: HashMap<DocId, Posting>,
    pub(crate) sorted_doc_ids: Vec<DocId>,
}

impl TermEntry {
    fn new(term: &str) -> Self {
        Self {
            term: term.to_string(),
            postings: HashMap::new(),
            sorted_doc_ids: Vec::new(),
        }
    }

    fn add(&mut self, doc_id: DocId, position: u32) {
        self.postings
            .entry(doc_id)
            .or_insert_with(|| Posting::new(doc_id))
            .append(position);
    }

    fn sort(&mut self) {
        self.sorted_doc_ids = self.postings.keys().copied().collect();
        self.sorted_doc_ids.sort_unstable();
        for posting in self.postings.values_mut() {
            posting.positions.sort_unstable();
        }
    }

    /// Number of documents containing this term.
    pub fn doc_frequency(&self) -> usize {
        self.postings.len()
    }

    pub fn posting(&self, doc_id: DocId) -> Option<&Posting> {
        self.postings.get(&doc_id)
    }

    pub fn postings(&self) -> impl Iterator<Item = &Posting> {
        self.postings.values()
    }

    /// Document identifiers containing this term, ascending.
    pub fn doc_ids(&self) -> &[DocId] {
        &self.sorted_doc_ids
    }
}

/// Mutable accumulation phase of the inverted index. Queries cannot see a
/// builder; the only way to get a queryable [`InvertedIndex`] is
/// [`IndexBuilder::finish`], which sorts every posting list first.
#[derive(Default)]
pub struct IndexBuilder {
    entries: HashMap<String, TermEntry>,
    doc_lengths: HashMap<DocId, u32>,
}

impl IndexBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Index one document: normalize its body and record a posting for
    /// every surviving token position. Indexing the same document
    /// identifier twice is refused rather than silently merged.
    pub fn index_doc(&mut self, doc: &Document) -> Result<()> {
        if self.doc_lengths.contains_key(&doc.id) {
            return Err(Error::DuplicateDocument(doc.id));
        }
        let terms = tokenizer::normalize(&doc.body);
        for (position, term) in terms.iter().enumerate() {
            self.entries
                .entry(term.clone())
                .or_insert_with(|| TermEntry::new(term))
                .add(doc.id, position as u32);
        }
        self.doc_lengths.insert(doc.id, terms.len() as u32);
        tracing::debug!(doc_id = doc.id, tokens = terms.len(), "indexed document");
        Ok(())
    }

    pub fn n_docs(&self) -> u32 {
        self.doc_lengths.len() as u32
    }

    /// Sort every term entry's doc-id view and position lists, precompute
    /// per-document vector norms, and seal the index for querying.
    pub fn finish(mut self) -> InvertedIndex {
        for entry in self.entries.values_mut() {
            entry.sort();
        }
        let n_docs = self.doc_lengths.len() as u32;
        let doc_norms = compute_doc_norms(&self.entries, n_docs);
        tracing::info!(n_docs, n_terms = self.entries.len(), "index built");
        InvertedIndex {
            entries: self.entries,
            n_docs,
            doc_lengths: self.doc_lengths,
            doc_norms,
        }
    }
}

/// Fully built, sorted, read-only inverted index.
#[derive(Debug)]
pub struct InvertedIndex {
    pub(crate) entries: HashMap<String, TermEntry>,
    pub(crate) n_docs: u32,
    pub(crate) doc_lengths: HashMap<DocId, u32>,
    pub(crate) doc_norms: HashMap<DocId, f64>,
}

impl InvertedIndex {
    /// Exact-match term lookup. Absence is an ordinary `None`, never an
    /// error; callers branch on it.
    pub fn find(&self, term: &str) -> Option<&TermEntry> {
        self.entries.get(term)
    }

    pub fn n_docs(&self) -> u32 {
        self.n_docs
    }

    pub fn n_terms(&self) -> usize {
        self.entries.len()
    }

    /// Normalized token count of a document, if it was indexed.
    pub fn doc_length(&self, doc_id: DocId) -> Option<u32> {
        self.doc_lengths.get(&doc_id).copied()
    }

    /// Inverse document frequency: `ln(n_docs / df)`, clamped to 0 when
    /// the term occurs in every document. Absent terms also yield 0;
    /// callers that care should check [`find`](Self::find) first.
    pub fn idf(&self, term: &str) -> f64 {
        let df = self.find(term).map_or(0, TermEntry::doc_frequency);
        idf_value(self.n_docs, df)
    }

    /// Euclidean norm of the document's raw-tf × idf weight vector,
    /// precomputed at build time. 0.0 for unknown documents and for
    /// documents whose every term occurs collection-wide.
    pub(crate) fn doc_norm(&self, doc_id: DocId) -> f64 {
        self.doc_norms.get(&doc_id).copied().unwrap_or(0.0)
    }
}

pub(crate) fn idf_value(n_docs: u32, doc_frequency: usize) -> f64 {
    if doc_frequency == 0 {
        return 0.0;
    }
    let ratio = f64::from(n_docs) / doc_frequency as f64;
    if ratio <= 1.0 {
        0.0
    } else {
        ratio.ln()
    }
}

pub(crate) fn compute_doc_norms(
    entries: &HashMap<String, TermEntry>,
    n_docs: u32,
) -> HashMap<DocId, f64> {
    let mut squared: HashMap<DocId, f64> = HashMap::new();
    for entry in entries.values() {
        let idf = idf_value(n_docs, entry.doc_frequency());
        if idf == 0.0 {
            continue;
        }
        for posting in entry.postings.values() {
            let weight = f64::from(posting.term_freq()) * idf;
            *squared.entry(posting.doc_id).or_insert(0.0) += weight * weight;
        }
    }
    squared
        .into_iter()
        .map(|(doc_id, sum)| (doc_id, sum.sqrt()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(id: DocId, body: &str) -> Document {
        Document {
            id,
            title: format!("doc {id}"),
            author: String::new(),
            body: body.to_string(),
        }
    }

    #[test]
    fn records_positions_over_surviving_tokens() {
        let mut builder = IndexBuilder::new();
        builder.index_doc(&doc(1, "the dog chased the dog")).unwrap();
        let index = builder.finish();

        let entry = index.find("dog").unwrap();
        let posting = entry.posting(1).unwrap();
        // "the" is removed, so surviving positions are 0 and 2.
        assert_eq!(posting.positions, vec![0, 2]);
        assert_eq!(posting.term_freq(), 2);
        assert_eq!(index.doc_length(1), Some(3));
    }

    #[test]
    fn duplicate_doc_id_is_refused() {
        let mut builder = IndexBuilder::new();
        builder.index_doc(&doc(7, "alpha beta")).unwrap();
        let err = builder.index_doc(&doc(7, "gamma")).unwrap_err();
        assert!(matches!(err, Error::DuplicateDocument(7)));
        // First document's postings survive untouched.
        let index = builder.finish();
        assert_eq!(index.n_docs(), 1);
        assert!(index.find("alpha").is_some());
        assert!(index.find("gamma").is_none());
    }

    #[test]
    fn doc_ids_are_ascending_after_finish() {
        let mut builder = IndexBuilder::new();
        for id in [30, 4, 19, 2] {
            builder.index_doc(&doc(id, "shared term here")).unwrap();
        }
        let index = builder.finish();
        assert_eq!(index.find("share").unwrap().doc_ids(), &[2, 4, 19, 30]);
    }

    #[test]
    fn idf_is_zero_for_collection_wide_terms() {
        let mut builder = IndexBuilder::new();
        builder.index_doc(&doc(1, "wing pressure")).unwrap();
        builder.index_doc(&doc(2, "wing lift")).unwrap();
        let index = builder.finish();

        assert_eq!(index.idf("wing"), 0.0);
        let expected = 2.0f64.ln();
        assert!((index.idf("lift") - expected).abs() < 1e-12);
        assert_eq!(index.idf("nonexistent"), 0.0);
    }

    #[test]
    fn idf_non_increasing_in_document_frequency() {
        let mut builder = IndexBuilder::new();
        builder.index_doc(&doc(1, "rare common shared")).unwrap();
        builder.index_doc(&doc(2, "common shared")).unwrap();
        builder.index_doc(&doc(3, "shared")).unwrap();
        let index = builder.finish();

        let rare = index.idf("rare");
        let common = index.idf("common");
        let shared = index.idf("share");
        assert!(rare >= common && common >= shared);
        assert_eq!(shared, 0.0);
    }
}
