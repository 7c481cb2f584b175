//! Load-time calibration: ground-truth observations, anomaly thresholds and depths.
//!
//! Runs once while a [`PuzzleData`](crate::puzzle::PuzzleData) is assembled:
//!
//! 1. **O\***: seed observations folded with every non-irrelevant question's
//!    effect in list order (later entries win).
//! 2. **Thresholds**: how many anomalies a paradigm tolerates before a shift
//!    is considered, from anomalies it alone can see plus the fewest it
//!    shares with any rival.
//! 3. **Depths**: a partial order by explanatory power, where a paradigm whose
//!    explained set is strictly contained in another's sits below it.
//!
//! Every function is total over validated paradigms.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use crate::id::{DescriptorId, ParadigmId};
use crate::paradigm::{Paradigm, ParadigmMap};
use crate::question::Question;
use crate::state::Observations;

/// Fold seed observations and every observation effect into the ground truth.
pub fn build_o_star(questions: &[Question], seeds: &[(DescriptorId, bool)]) -> Observations {
    let mut o_star: Observations = seeds.iter().cloned().collect();
    for q in questions {
        for (d, v) in q.effect().observations() {
            o_star.insert(d.clone(), *v);
        }
    }
    o_star
}

/// Conceivable descriptors whose prediction conflicts with `o_star`.
fn conceivable_anomalies<'a>(paradigm: &'a Paradigm, o_star: &Observations) -> BTreeSet<&'a DescriptorId> {
    paradigm
        .conceivable()
        .iter()
        .filter(|d| match (paradigm.prediction(d.as_str()), o_star.get(*d)) {
            (Some(pred), Some(&actual)) => pred != actual,
            _ => false,
        })
        .collect()
}

/// Predicted descriptors whose prediction matches `o_star`.
fn explained<'a>(paradigm: &'a Paradigm, o_star: &Observations) -> BTreeSet<&'a DescriptorId> {
    paradigm
        .predictions()
        .iter()
        .filter(|(d, pred)| o_star.get(*d) == Some(*pred))
        .map(|(d, _)| d)
        .collect()
}

// ---------------------------------------------------------------------------
// Thresholds
// ---------------------------------------------------------------------------

/// Compute `threshold(P) = exclusive(P) + min_{Q≠P} shared(P, Q)` for every paradigm.
///
/// A paradigm with no rivals gets `None`, so tension alone never shifts it.
pub fn compute_thresholds(paradigms: &mut ParadigmMap, o_star: &Observations) {
    let thresholds: BTreeMap<ParadigmId, Option<usize>> = paradigms
        .values()
        .map(|p| (p.id().clone(), threshold_for(p, paradigms, o_star)))
        .collect();

    for (id, threshold) in thresholds {
        if let Some(p) = paradigms.get_mut(&id) {
            p.threshold = threshold;
        }
    }
}

fn threshold_for(paradigm: &Paradigm, paradigms: &ParadigmMap, o_star: &Observations) -> Option<usize> {
    let anomalies = conceivable_anomalies(paradigm, o_star);
    let rivals: Vec<&Paradigm> = paradigms.values().filter(|q| q.id() != paradigm.id()).collect();

    let exclusive = anomalies
        .iter()
        .filter(|d| rivals.iter().all(|q| !q.is_conceivable(d.as_str())))
        .count();

    let min_shared = rivals
        .iter()
        .map(|q| anomalies.iter().filter(|d| q.is_conceivable(d.as_str())).count())
        .min()?;

    Some(exclusive + min_shared)
}

// ---------------------------------------------------------------------------
// Depths
// ---------------------------------------------------------------------------

/// Assign each paradigm its depth in the explained-set containment order.
///
/// Depth is 0 for a paradigm no other paradigm strictly out-explains, else
/// one more than its deepest strict superset.
pub fn compute_depths(paradigms: &mut ParadigmMap, o_star: &Observations) {
    let explained_sets: BTreeMap<&ParadigmId, BTreeSet<&DescriptorId>> = paradigms
        .iter()
        .map(|(id, p)| (id, explained(p, o_star)))
        .collect();

    // Parents of P: paradigms whose explained set strictly contains P's.
    let parents: BTreeMap<&ParadigmId, Vec<&ParadigmId>> = explained_sets
        .iter()
        .map(|(id, set)| {
            let ps = explained_sets
                .iter()
                .filter(|(other, other_set)| other != &id && set.is_subset(other_set) && set.len() < other_set.len())
                .map(|(other, _)| *other)
                .collect();
            (*id, ps)
        })
        .collect();

    let mut memo: BTreeMap<&ParadigmId, usize> = BTreeMap::new();
    for id in parents.keys() {
        depth_of(*id, &parents, &mut memo);
    }

    let depths: Vec<(ParadigmId, usize)> = memo.into_iter().map(|(id, d)| (id.clone(), d)).collect();
    for (id, depth) in depths {
        if let Some(p) = paradigms.get_mut(&id) {
            p.depth = Some(depth);
        }
    }
}

// Strict containment is acyclic, so the recursion terminates.
fn depth_of<'a>(
    id: &'a ParadigmId,
    parents: &BTreeMap<&'a ParadigmId, Vec<&'a ParadigmId>>,
    memo: &mut BTreeMap<&'a ParadigmId, usize>,
) -> usize {
    if let Some(&d) = memo.get(id) {
        return d;
    }
    let depth = parents
        .get(id)
        .into_iter()
        .flatten()
        .map(|&parent| depth_of(parent, parents, memo) + 1)
        .max()
        .unwrap_or(0);
    memo.insert(id, depth);
    depth
}

// ---------------------------------------------------------------------------
// Diagnostics
// ---------------------------------------------------------------------------

/// Per-paradigm calibration summary for authoring tools.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParadigmReport {
    pub id: ParadigmId,
    pub name: String,
    /// Conceivable descriptors contradicted by O\*.
    pub anomalies: Vec<DescriptorId>,
    /// Number of predictions O\* confirms.
    pub explained: usize,
    pub threshold: Option<usize>,
    pub depth: Option<usize>,
}

/// Summarize every paradigm against `o_star`, in id order.
pub fn report(paradigms: &ParadigmMap, o_star: &Observations) -> Vec<ParadigmReport> {
    paradigms
        .values()
        .map(|p| ParadigmReport {
            id: p.id().clone(),
            name: p.name().to_string(),
            anomalies: conceivable_anomalies(p, o_star).into_iter().cloned().collect(),
            explained: explained(p, o_star).len(),
            threshold: p.threshold(),
            depth: p.depth(),
        })
        .collect()
}
