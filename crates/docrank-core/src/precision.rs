use std::collections::BTreeMap;

use crate::error::{Error, Result};
use crate::types::{Answer, GroundTruth};

/// A wrong prediction together with its reference answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Miss {
    pub truth: GroundTruth,
    pub predicted: Answer,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PrecisionReport {
    pub correct: usize,
    pub total: usize,
    /// Misses grouped by question category.
    pub misses: BTreeMap<String, Vec<Miss>>,
}

impl PrecisionReport {
    pub fn precision(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        self.correct as f64 / self.total as f64
    }
}

/// Compare predictions against ground truth, pairwise in file order.
///
/// Both lists must have the same length and agree on qid at every position.
pub fn calculate_precision(truths: &[GroundTruth], predictions: &[Answer]) -> Result<PrecisionReport> {
    if truths.len() != predictions.len() {
        return Err(Error::Dataset(format!(
            "{} ground truths but {} predictions",
            truths.len(),
            predictions.len()
        )));
    }
    let mut report = PrecisionReport { total: truths.len(), ..Default::default() };
    for (truth, pred) in truths.iter().zip(predictions) {
        if truth.qid != pred.qid {
            return Err(Error::Dataset(format!(
                "qid mismatch: ground truth qid={}, prediction qid={}",
                truth.qid, pred.qid
            )));
        }
        if truth.retrieve == pred.retrieve {
            report.correct += 1;
        } else {
            report
                .misses
                .entry(truth.category.clone())
                .or_default()
                .push(Miss { truth: truth.clone(), predicted: *pred });
        }
    }
    Ok(report)
}
