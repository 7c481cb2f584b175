//! Scoring primitives: tension, alignment and explained observations.

use crate::paradigm::Paradigm;
use crate::state::{Beliefs, Observations, belief};

/// Number of conceivable, observed descriptors that contradict `paradigm`.
pub fn tension(observations: &Observations, paradigm: &Paradigm) -> usize {
    paradigm
        .conceivable()
        .iter()
        .filter(|d| match (observations.get(*d), paradigm.prediction(d.as_str())) {
            (Some(&seen), Some(pred)) => seen != pred,
            _ => false,
        })
        .count()
}

/// Mean agreement between graded belief and every prediction of `paradigm`.
///
/// A predicted `1` scores `h`, a predicted `0` scores `1 - h`, missing beliefs
/// count as 0.5. A paradigm with no predictions scores 0.0.
pub fn alignment(beliefs: &Beliefs, paradigm: &Paradigm) -> f64 {
    let predictions = paradigm.predictions();
    if predictions.is_empty() {
        return 0.0;
    }
    let total: f64 = predictions
        .iter()
        .map(|(d, &pred)| {
            let h = belief(beliefs, d.as_str());
            if pred { h } else { 1.0 - h }
        })
        .sum();
    total / predictions.len() as f64
}

/// Number of observed descriptors whose value `paradigm` predicts correctly.
pub fn explained_o(observations: &Observations, paradigm: &Paradigm) -> usize {
    observations
        .iter()
        .filter(|(d, seen)| paradigm.prediction(d.as_str()) == Some(**seen))
        .count()
}
