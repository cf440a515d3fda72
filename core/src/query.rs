use crate::error::{Error, Result};
use crate::index::InvertedIndex;
use crate::tokenizer;
use crate::DocId;
use std::cmp::Ordering;
use std::collections::HashMap;

/// Conjunctive (AND-semantics) retrieval: a query "A B C" matches the
/// documents containing all three terms.
pub struct BooleanQueryProcessor<'a> {
    index: &'a InvertedIndex,
}

impl<'a> BooleanQueryProcessor<'a> {
    pub fn new(index: &'a InvertedIndex) -> Self {
        Self { index }
    }

    /// Resolve a raw query to the ascending, duplicate-free list of
    /// documents containing every query term. A term missing from the
    /// index empties the whole conjunction, as does a query with no
    /// surviving terms.
    pub fn run(&self, query: &str) -> Vec<DocId> {
        let terms = tokenizer::normalize(query);
        if terms.is_empty() {
            return Vec::new();
        }
        let mut lists = Vec::with_capacity(terms.len());
        for term in &terms {
            match self.index.find(term) {
                Some(entry) => lists.push(entry.doc_ids()),
                None => return Vec::new(),
            }
        }
        let mut result = lists[0].to_vec();
        for list in &lists[1..] {
            result = intersect(&result, list);
            if result.is_empty() {
                break;
            }
        }
        result
    }
}

/// Merge-intersect two ascending doc-id lists.
fn intersect(a: &[DocId], b: &[DocId]) -> Vec<DocId> {
    let mut out = Vec::with_capacity(a.len().min(b.len()));
    let (mut i, mut j) = (0, 0);
    while i < a.len() && j < b.len() {
        match a[i].cmp(&b[j]) {
            Ordering::Less => i += 1,
            Ordering::Greater => j += 1,
            Ordering::Equal => {
                out.push(a[i]);
                i += 1;
                j += 1;
            }
        }
    }
    out
}

/// Ranked retrieval by cosine similarity over raw-tf × idf vectors. The
/// query is a transient pseudo-document; the shared index is never
/// touched by evaluation.
pub struct VectorQueryProcessor<'a> {
    index: &'a InvertedIndex,
}

impl<'a> VectorQueryProcessor<'a> {
    pub fn new(index: &'a InvertedIndex) -> Self {
        Self { index }
    }

    /// Return up to `k` (doc id, similarity) pairs, score descending,
    /// ties broken by ascending doc id. Only documents sharing at least
    /// one term with the query are candidates; fewer than `k` of them is
    /// a short result, not an error.
    pub fn run(&self, query: &str, k: usize) -> Result<Vec<(DocId, f64)>> {
        if k == 0 {
            return Err(Error::InvalidConfiguration(
                "requested result count k must be at least 1".into(),
            ));
        }

        let mut query_tf: HashMap<String, u32> = HashMap::new();
        for term in tokenizer::normalize(query) {
            *query_tf.entry(term).or_insert(0) += 1;
        }

        let mut query_norm_sq = 0.0;
        let mut dots: HashMap<DocId, f64> = HashMap::new();
        for (term, &tf) in &query_tf {
            let Some(entry) = self.index.find(term) else {
                continue;
            };
            let idf = self.index.idf(term);
            let query_weight = f64::from(tf) * idf;
            query_norm_sq += query_weight * query_weight;
            for posting in entry.postings() {
                let doc_weight = f64::from(posting.term_freq()) * idf;
                *dots.entry(posting.doc_id).or_insert(0.0) += query_weight * doc_weight;
            }
        }
        let query_norm = query_norm_sq.sqrt();

        let mut ranked: Vec<(DocId, f64)> = dots
            .into_iter()
            .map(|(doc_id, dot)| {
                let doc_norm = self.index.doc_norm(doc_id);
                let score = if query_norm == 0.0 || doc_norm == 0.0 {
                    0.0
                } else {
                    dot / (query_norm * doc_norm)
                };
                (doc_id, score)
            })
            .collect();
        ranked.sort_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.0.cmp(&b.0))
        });
        ranked.truncate(k);
        Ok(ranked)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn intersect_merges_ascending_lists() {
        assert_eq!(intersect(&[1, 3, 5, 9], &[2, 3, 9, 12]), vec![3, 9]);
        assert_eq!(intersect(&[1, 2], &[3, 4]), Vec::<DocId>::new());
        assert_eq!(intersect(&[], &[1]), Vec::<DocId>::new());
    }
}
