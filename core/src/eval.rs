use crate::error::{Error, Result};
use crate::index::InvertedIndex;
use crate::metrics::{ndcg, Gain};
use crate::query::{BooleanQueryProcessor, VectorQueryProcessor};
use crate::{DocId, Query, QueryId};
use serde::Serialize;
use std::collections::{HashMap, HashSet};

/// Relevance judgments: query id to the set of documents judged relevant.
pub type Qrels = HashMap<QueryId, HashSet<DocId>>;

#[derive(Debug, Clone, Serialize)]
pub struct QueryScore {
    pub query_id: QueryId,
    pub boolean_ndcg: f64,
    pub vector_ndcg: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct EvalReport {
    pub per_query: Vec<QueryScore>,
    pub mean_boolean_ndcg: f64,
    pub mean_vector_ndcg: f64,
}

impl EvalReport {
    /// Paired per-query NDCG sequences, in evaluation order, for an
    /// external significance test over the two models.
    pub fn paired_scores(&self) -> (Vec<f64>, Vec<f64>) {
        let boolean = self.per_query.iter().map(|q| q.boolean_ndcg).collect();
        let vector = self.per_query.iter().map(|q| q.vector_ndcg).collect();
        (boolean, vector)
    }
}

/// Drives sample queries through both retrieval models and scores each
/// result list against the relevance judgments with NDCG.
///
/// NDCG needs a per-document label and score. For every query the harness
/// enumerates the universe `retrieved ∪ relevant` in ascending doc-id
/// order; the label is 1.0 when the judgments mark the document relevant,
/// else 0.0. The boolean model has no native scores, so retrieval itself
/// is the score: 1.0 if the document was retrieved, else 0.0. The vector
/// model uses the cosine similarity it reported, 0.0 for relevant
/// documents it missed.
pub struct EvaluationHarness<'a> {
    boolean: BooleanQueryProcessor<'a>,
    vector: VectorQueryProcessor<'a>,
    k: usize,
    cutoff: usize,
    gain: Gain,
}

impl<'a> EvaluationHarness<'a> {
    pub fn new(index: &'a InvertedIndex, k: usize, cutoff: usize, gain: Gain) -> Result<Self> {
        if k == 0 {
            return Err(Error::InvalidConfiguration(
                "evaluation depth k must be at least 1".into(),
            ));
        }
        if cutoff == 0 {
            return Err(Error::InvalidConfiguration(
                "NDCG cutoff must be at least 1".into(),
            ));
        }
        Ok(Self {
            boolean: BooleanQueryProcessor::new(index),
            vector: VectorQueryProcessor::new(index),
            k,
            cutoff,
            gain,
        })
    }

    /// Evaluate every query that has a judgments entry; queries without
    /// one are skipped with a warning. Means are over evaluated queries.
    pub fn evaluate(&self, queries: &[Query], qrels: &Qrels) -> Result<EvalReport> {
        let mut per_query = Vec::with_capacity(queries.len());
        for query in queries {
            let Some(relevant) = qrels.get(&query.id) else {
                tracing::warn!(query_id = query.id, "no relevance judgments, skipping");
                continue;
            };
            let boolean_ndcg = self.score_boolean(&self.boolean.run(&query.text), relevant)?;
            let vector_ndcg =
                self.score_vector(&self.vector.run(&query.text, self.k)?, relevant)?;
            tracing::debug!(query_id = query.id, boolean_ndcg, vector_ndcg, "query scored");
            per_query.push(QueryScore {
                query_id: query.id,
                boolean_ndcg,
                vector_ndcg,
            });
        }
        let n = per_query.len() as f64;
        let (mean_boolean_ndcg, mean_vector_ndcg) = if per_query.is_empty() {
            (0.0, 0.0)
        } else {
            (
                per_query.iter().map(|q| q.boolean_ndcg).sum::<f64>() / n,
                per_query.iter().map(|q| q.vector_ndcg).sum::<f64>() / n,
            )
        };
        Ok(EvalReport {
            per_query,
            mean_boolean_ndcg,
            mean_vector_ndcg,
        })
    }

    fn score_boolean(&self, retrieved: &[DocId], relevant: &HashSet<DocId>) -> Result<f64> {
        let retrieved_set: HashSet<DocId> = retrieved.iter().copied().collect();
        let universe = universe(&retrieved_set, relevant);
        let labels: Vec<f64> = universe
            .iter()
            .map(|d| f64::from(u8::from(relevant.contains(d))))
            .collect();
        let scores: Vec<f64> = universe
            .iter()
            .map(|d| f64::from(u8::from(retrieved_set.contains(d))))
            .collect();
        ndcg(&labels, &scores, self.cutoff, self.gain)
    }

    fn score_vector(&self, ranked: &[(DocId, f64)], relevant: &HashSet<DocId>) -> Result<f64> {
        let similarity: HashMap<DocId, f64> = ranked.iter().copied().collect();
        let retrieved_set: HashSet<DocId> = similarity.keys().copied().collect();
        let universe = universe(&retrieved_set, relevant);
        let labels: Vec<f64> = universe
            .iter()
            .map(|d| f64::from(u8::from(relevant.contains(d))))
            .collect();
        let scores: Vec<f64> = universe
            .iter()
            .map(|d| similarity.get(d).copied().unwrap_or(0.0))
            .collect();
        ndcg(&labels, &scores, self.cutoff, self.gain)
    }
}

fn universe(retrieved: &HashSet<DocId>, relevant: &HashSet<DocId>) -> Vec<DocId> {
    let mut ids: Vec<DocId> = retrieved.union(relevant).copied().collect();
    ids.sort_unstable();
    ids
}
