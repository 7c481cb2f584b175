//! Belief engine: pure transformations over [`GameState`].
//!
//! The engine owns no state. Every operation takes the session's state by
//! exclusive reference (or by value) together with the immutable puzzle
//! content and settles completely before returning.
//!
//! - [`score`]: tension, alignment, explained observations
//! - [`assimilate`]: belief propagation along relations
//! - [`gate`]: opening-set and in-play question admission
//! - [`reach`]: graph-reachability disclosure, the alternative in-play rule
//! - this module: game initialization, shift selection and the per-answer
//!   [`update`] transition

pub mod assimilate;
pub mod gate;
pub mod reach;
pub mod score;

pub use assimilate::{assimilate_descriptor, assimilate_from_paradigm};
pub use gate::{init_questions, open_questions};
pub use reach::{RelationGraph, open_questions_reachable};
pub use score::{alignment, explained_o, tension};

use std::collections::BTreeSet;

use crate::config::{Disclosure, EngineConfig};
use crate::id::{DescriptorId, ParadigmId};
use crate::paradigm::{Paradigm, ParadigmMap};
use crate::question::{Effect, Question};
use crate::state::{DEFAULT_BELIEF, GameState, crisp};

// ---------------------------------------------------------------------------
// Initialization
// ---------------------------------------------------------------------------

/// Build the opening state.
///
/// Every descriptor in `universe` starts at [`DEFAULT_BELIEF`], seeds are
/// committed as observations, and one assimilation pass runs under the
/// initial paradigm (skipped if `initial` is not in `paradigms`).
pub fn init_game(
    seeds: &[(DescriptorId, bool)],
    paradigms: &ParadigmMap,
    initial: &ParadigmId,
    universe: &[DescriptorId],
) -> GameState {
    let mut state = GameState::new(initial.clone());
    for d in universe {
        state.beliefs.insert(d.clone(), DEFAULT_BELIEF);
    }
    for (d, v) in seeds {
        state.observe(d.clone(), *v);
    }

    match paradigms.get(initial) {
        Some(p) => assimilate_from_paradigm(&mut state.beliefs, &state.observations, p),
        None => tracing::warn!(paradigm = %initial, "initial paradigm missing, skipping assimilation"),
    }
    state
}

// ---------------------------------------------------------------------------
// Paradigm shift
// ---------------------------------------------------------------------------

/// Whether the observations strain `current` past its threshold.
///
/// A paradigm without a threshold never triggers a shift on its own.
pub fn shift_pressure(state: &GameState, current: &Paradigm) -> bool {
    current
        .threshold()
        .is_some_and(|threshold| tension(&state.observations, current) > threshold)
}

/// Pick the paradigm to shift to, if any rival explains more.
///
/// Candidates are paradigms other than `current` whose explained-observation
/// count strictly exceeds `current`'s. The candidate with the highest
/// alignment to the belief vector wins; equal alignments resolve to the
/// lexicographically smallest paradigm id.
pub fn select_shift_target<'a>(
    state: &GameState,
    current: &Paradigm,
    paradigms: &'a ParadigmMap,
) -> Option<&'a Paradigm> {
    let baseline = explained_o(&state.observations, current);

    let mut best: Option<(&Paradigm, f64)> = None;
    for candidate in paradigms.values() {
        if candidate.id() == current.id() || explained_o(&state.observations, candidate) <= baseline {
            continue;
        }
        let score = alignment(&state.beliefs, candidate);
        // Map order is id order, so keeping the incumbent on ties picks the smallest id.
        if best.is_none_or(|(_, top)| score > top) {
            best = Some((candidate, score));
        }
    }
    best.map(|(p, _)| p)
}

// ---------------------------------------------------------------------------
// Update
// ---------------------------------------------------------------------------

/// Apply one answered question and return the refreshed open list.
///
/// Steps, in order:
///
/// 1. commit the effect (irrelevance marks or crisp observations);
/// 2. mark the question answered;
/// 3. assimilate each observation the active paradigm predicts, then clamp;
/// 4. shift paradigm when tension exceeds the active threshold and a rival
///    explains more, re-assimilating under the new paradigm;
/// 5. drop the answered question from `current_open` and append every newly
///    disclosed, unanswered question under the configured rule.
pub fn update(
    state: &mut GameState,
    question: &Question,
    paradigms: &ParadigmMap,
    all_questions: &[Question],
    current_open: &[Question],
    config: &EngineConfig,
) -> Vec<Question> {
    match question.effect() {
        Effect::Irrelevant(ids) => {
            state.irrelevant.extend(ids.iter().cloned());
        }
        Effect::Observation(pairs) => {
            for (d, v) in pairs {
                state.observe(d.clone(), *v);
            }
        }
    }
    state.answered.insert(question.id().clone());

    if let Some(current) = paradigms.get(&state.current) {
        let pairs = question.effect().observations();
        if !pairs.is_empty() {
            for (d, v) in pairs {
                if current.prediction(d.as_str()) == Some(*v) {
                    assimilate_descriptor(&mut state.beliefs, d.as_str(), current);
                }
            }
            state.clamp_observed();
        }

        if shift_pressure(state, current) {
            match select_shift_target(state, current, paradigms) {
                Some(next) => {
                    tracing::info!(
                        from = %current.id(),
                        to = %next.id(),
                        tension = tension(&state.observations, current),
                        threshold = ?current.threshold(),
                        "paradigm shift"
                    );
                    state.current = next.id().clone();
                    assimilate_from_paradigm(&mut state.beliefs, &state.observations, next);
                }
                None => tracing::debug!(
                    paradigm = %current.id(),
                    "tension over threshold but no rival explains more"
                ),
            }
        }
    } else {
        tracing::warn!(paradigm = %state.current, "active paradigm missing, skipping assimilation");
    }

    let mut open: Vec<Question> = current_open
        .iter()
        .filter(|q| q.id() != question.id())
        .cloned()
        .collect();
    let already: BTreeSet<_> = open.iter().map(|q| q.id().clone()).collect();

    let disclosed = match config.disclosure {
        Disclosure::Proximity => open_questions(state, all_questions, Some(paradigms), config.epsilon),
        Disclosure::Reachability => open_questions_reachable(state, all_questions, paradigms),
    };
    let fresh: Vec<Question> = disclosed
        .into_iter()
        .filter(|q| !already.contains(q.id()) && !state.is_answered(q.id().as_str()))
        .cloned()
        .collect();

    tracing::debug!(
        question = %question.id(),
        paradigm = %state.current,
        newly_open = fresh.len(),
        "update settled"
    );
    open.extend(fresh);
    open
}

/// Observed descriptors whose crisp value disagrees with their belief.
///
/// Always empty after any engine call; exposed for invariant checks in
/// tooling and tests.
pub fn unclamped(state: &GameState) -> Vec<&DescriptorId> {
    state
        .observations
        .iter()
        .filter(|(d, v)| state.belief(d.as_str()) != crisp(**v))
        .map(|(d, _)| d)
        .collect()
}

#[cfg(test)]
pub(crate) mod testing {
    //! Shared fixtures for engine unit tests.

    use crate::id::DescriptorId;
    use crate::paradigm::{Paradigm, PredictionMap, Relation};
    use crate::question::{Answer, Outcomes, Question};
    use crate::state::{Beliefs, Observations};

    pub fn d(id: &str) -> DescriptorId {
        DescriptorId::from(id)
    }

    pub fn paradigm_with(id: &str, preds: &[(&str, bool)], conceivable: &[&str], relations: Vec<Relation>) -> Paradigm {
        let predictions: PredictionMap = preds.iter().map(|(k, v)| (d(k), *v)).collect();
        Paradigm::new(id, id, predictions, conceivable.iter().map(|c| d(c)).collect(), relations).unwrap()
    }

    pub fn paradigm(id: &str, preds: &[(&str, bool)], conceivable: &[&str]) -> Paradigm {
        paradigm_with(id, preds, conceivable, vec![])
    }

    pub fn obs(pairs: &[(&str, bool)]) -> Observations {
        pairs.iter().map(|(k, v)| (d(k), *v)).collect()
    }

    pub fn beliefs(pairs: &[(&str, f64)]) -> Beliefs {
        pairs.iter().map(|(k, v)| (d(k), *v)).collect()
    }

    /// A question whose yes-outcome is `yes`, no-outcome the negation, and
    /// irrelevant-outcome the same descriptors.
    pub fn question(id: &str, yes: &[(&str, bool)], answer: Answer) -> Question {
        Question::new(
            id,
            format!("{id}?"),
            Outcomes {
                yes: yes.iter().map(|(k, v)| (d(k), *v)).collect(),
                no: yes.iter().map(|(k, v)| (d(k), !*v)).collect(),
                irrelevant: yes.iter().map(|(k, _)| d(k)).collect(),
            },
            answer,
        )
    }
}
