use crate::error::{Error, Result};
use std::cmp::Ordering;
use std::str::FromStr;

/// How relevance labels translate into gain at each rank.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gain {
    /// `2^label - 1`; emphasizes highly relevant results.
    Exponential,
    /// The label itself.
    Linear,
}

impl FromStr for Gain {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "exponential" => Ok(Self::Exponential),
            "linear" => Ok(Self::Linear),
            other => Err(Error::InvalidConfiguration(format!(
                "unknown gain mode {other:?} (expected \"exponential\" or \"linear\")"
            ))),
        }
    }
}

impl Gain {
    fn apply(self, label: f64) -> f64 {
        match self {
            Self::Exponential => 2f64.powf(label) - 1.0,
            Self::Linear => label,
        }
    }
}

/// Discounted cumulative gain at `cutoff`.
///
/// `labels` are reordered by descending `scores` (stable, so equal scores
/// keep their input order), truncated to `cutoff`, and each rank's gain is
/// discounted by `log2(rank + 2)`.
pub fn dcg(labels: &[f64], scores: &[f64], cutoff: usize, gain: Gain) -> Result<f64> {
    if cutoff == 0 {
        return Err(Error::InvalidConfiguration(
            "DCG cutoff must be at least 1".into(),
        ));
    }
    if labels.len() != scores.len() {
        return Err(Error::InvalidConfiguration(format!(
            "{} labels paired with {} scores",
            labels.len(),
            scores.len()
        )));
    }
    let mut order: Vec<usize> = (0..scores.len()).collect();
    order.sort_by(|&a, &b| scores[b].partial_cmp(&scores[a]).unwrap_or(Ordering::Equal));
    Ok(order
        .iter()
        .take(cutoff)
        .enumerate()
        .map(|(rank, &i)| gain.apply(labels[i]) / ((rank + 2) as f64).log2())
        .sum())
}

/// Normalized DCG: actual DCG over the DCG of the ideal ranking (labels
/// self-ranked as their own scores). A degenerate ideal of 0 (all labels
/// zero) yields 0.0 rather than NaN.
pub fn ndcg(labels: &[f64], scores: &[f64], cutoff: usize, gain: Gain) -> Result<f64> {
    let ideal = dcg(labels, labels, cutoff, gain)?;
    if ideal == 0.0 {
        return Ok(0.0);
    }
    let actual = dcg(labels, scores, cutoff, gain)?;
    Ok(actual / ideal)
}
