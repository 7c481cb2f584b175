//! Belief propagation along a paradigm's weighted relations.
//!
//! Assimilation only ever moves graded belief (`h`). Committed observations
//! are restored after every pass so a propagated value can never overwrite a
//! crisp fact.

use crate::paradigm::Paradigm;
use crate::state::{Beliefs, Observations, belief, clamp_observed, crisp};

/// Pull every relation target of `descriptor` toward its predicted value.
///
/// For a relation `descriptor → t` with weight `w`, when `paradigm` predicts
/// `t`: `h[t] ← h[t] + w · (pred(t) − h[t])`.
pub fn assimilate_descriptor(beliefs: &mut Beliefs, descriptor: &str, paradigm: &Paradigm) {
    for rel in paradigm.relations_from(descriptor) {
        let Some(pred) = paradigm.prediction(rel.target.as_str()) else {
            continue;
        };
        let current = belief(beliefs, rel.target.as_str());
        let pulled = current + rel.weight * (crisp(pred) - current);
        tracing::trace!(
            source = descriptor,
            target = %rel.target,
            from = current,
            to = pulled,
            "assimilate"
        );
        beliefs.insert(rel.target.clone(), pulled);
    }
}

/// Propagate from every confirmed conceivable observation, then clamp.
pub fn assimilate_from_paradigm(beliefs: &mut Beliefs, observations: &Observations, paradigm: &Paradigm) {
    for (d, &seen) in observations {
        if paradigm.is_conceivable(d.as_str()) && paradigm.prediction(d.as_str()) == Some(seen) {
            assimilate_descriptor(beliefs, d.as_str(), paradigm);
        }
    }
    clamp_observed(beliefs, observations);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::testing::{beliefs, obs, paradigm_with};
    use crate::paradigm::Relation;

    #[test]
    fn pulls_target_toward_prediction() {
        let p = paradigm_with(
            "P1",
            &[("d1", true), ("d2", true)],
            &["d1", "d2"],
            vec![Relation::new("d1", "d2", 0.8)],
        );
        let mut h = beliefs(&[("d1", 0.5), ("d2", 0.5)]);

        assimilate_descriptor(&mut h, "d1", &p);

        assert!((h["d2"] - 0.9).abs() < 1e-12);
        assert_eq!(h["d1"], 0.5);
    }

    #[test]
    fn pulls_toward_zero_prediction() {
        let p = paradigm_with(
            "P1",
            &[("d1", true), ("d2", false)],
            &["d1", "d2"],
            vec![Relation::new("d1", "d2", 0.5)],
        );
        let mut h = beliefs(&[]);

        assimilate_descriptor(&mut h, "d1", &p);

        // Missing belief starts at 0.5.
        assert!((h["d2"] - 0.25).abs() < 1e-12);
    }

    #[test]
    fn no_outgoing_relation_is_a_no_op() {
        let p = paradigm_with(
            "P1",
            &[("d1", true), ("d2", true)],
            &["d1", "d2"],
            vec![Relation::new("d2", "d1", 0.8)],
        );
        let mut h = beliefs(&[("d1", 0.5), ("d2", 0.5)]);
        let before = h.clone();

        assimilate_descriptor(&mut h, "d1", &p);

        assert_eq!(h, before);
    }

    #[test]
    fn observed_values_win_after_propagation() {
        // d1 confirms P1 and pulls d2 toward 1, but d2 is observed as 0.
        let p = paradigm_with(
            "P1",
            &[("d1", true), ("d2", true), ("d3", true)],
            &["d1", "d2", "d3"],
            vec![Relation::new("d1", "d2", 1.0), Relation::new("d1", "d3", 0.5)],
        );
        let o = obs(&[("d1", true), ("d2", false)]);
        let mut h = beliefs(&[("d1", 1.0), ("d2", 0.0), ("d3", 0.5)]);

        assimilate_from_paradigm(&mut h, &o, &p);

        for (d, &v) in &o {
            assert_eq!(h[d], crisp(v));
        }
        assert!((h["d3"] - 0.75).abs() < 1e-12);
    }

    #[test]
    fn contradicting_observation_does_not_propagate() {
        let p = paradigm_with(
            "P1",
            &[("d1", true), ("d2", true)],
            &["d1", "d2"],
            vec![Relation::new("d1", "d2", 0.8)],
        );
        let o = obs(&[("d1", false)]);
        let mut h = beliefs(&[("d1", 0.0), ("d2", 0.5)]);

        assimilate_from_paradigm(&mut h, &o, &p);

        assert_eq!(h["d2"], 0.5);
        assert_eq!(h["d1"], 0.0);
    }

    #[test]
    fn inconceivable_observation_does_not_propagate() {
        // d1 is predicted but outside the conceivable set; relations cannot
        // start there, so propagation is skipped even when it matches.
        let p = paradigm_with("P1", &[("d1", true), ("d2", true)], &["d2"], vec![]);
        let o = obs(&[("d1", true)]);
        let mut h = beliefs(&[("d2", 0.5)]);

        assimilate_from_paradigm(&mut h, &o, &p);

        assert_eq!(h["d1"], 1.0);
        assert_eq!(h["d2"], 0.5);
    }
}
