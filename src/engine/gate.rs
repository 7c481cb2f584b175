//! Question gating: which questions a player may ask.
//!
//! Two admission rules coexist and are intentionally not unified:
//!
//! - [`init_questions`] picks the opening set with an exact rule: every
//!   observation the question would commit must agree with the paradigm,
//!   and at least one must be predicted.
//! - [`open_questions`] refreshes the set during play with a soft rule: a
//!   question opens once graded belief in one of its outcomes comes within
//!   epsilon of that outcome.

use crate::paradigm::{Paradigm, ParadigmMap};
use crate::question::Question;
use crate::state::{GameState, Observations, crisp};

/// Questions available at the start of play under `paradigm`.
///
/// A question is excluded when it references an inconceivable descriptor,
/// when it is restricted to other paradigms, when `observations` is supplied
/// and a prerequisite is unobserved, or when its effect has no predicted
/// match or any predicted conflict. Irrelevant effects never qualify.
pub fn init_questions<'a>(
    paradigm: &Paradigm,
    questions: &'a [Question],
    observations: Option<&Observations>,
) -> Vec<&'a Question> {
    questions
        .iter()
        .filter(|q| !q.is_blocked_by(paradigm.conceivable()))
        .filter(|q| q.allows_paradigm(paradigm.id().as_str()))
        .filter(|q| observations.is_none_or(|o| q.prerequisites_met(o)))
        .filter(|q| {
            let mut has_match = false;
            let mut has_conflict = false;
            for (d, v) in q.effect().observations() {
                match paradigm.prediction(d.as_str()) {
                    Some(pred) if pred == *v => has_match = true,
                    Some(_) => has_conflict = true,
                    None => {}
                }
            }
            has_match && !has_conflict
        })
        .collect()
}

/// Unanswered questions whose outcome graded belief already leans toward.
///
/// When `paradigms` is supplied and contains the active paradigm, questions
/// referencing inconceivable descriptors or restricted to other paradigms
/// are excluded; otherwise no paradigm filtering applies. Prerequisites are
/// checked against the state's observations. A question opens when any
/// observation pair `(d, v)` satisfies `|h[d] − v| < epsilon`.
pub fn open_questions<'a>(
    state: &GameState,
    questions: &'a [Question],
    paradigms: Option<&ParadigmMap>,
    epsilon: f64,
) -> Vec<&'a Question> {
    let current = paradigms.and_then(|m| m.get(&state.current));

    questions
        .iter()
        .filter(|q| !state.is_answered(q.id().as_str()))
        .filter(|q| {
            current.is_none_or(|p| !q.is_blocked_by(p.conceivable()) && q.allows_paradigm(p.id().as_str()))
        })
        .filter(|q| q.prerequisites_met(&state.observations))
        .filter(|q| {
            q.effect()
                .observations()
                .iter()
                .any(|(d, v)| (state.belief(d.as_str()) - crisp(*v)).abs() < epsilon)
        })
        .collect()
}
