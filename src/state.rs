//! The player's evolving belief and commitment record.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::id::{DescriptorId, ParadigmId, QuestionId};

/// Graded belief assumed for a descriptor with no entry.
pub const DEFAULT_BELIEF: f64 = 0.5;

/// Descriptor → graded belief in `[0, 1]`.
pub type Beliefs = BTreeMap<DescriptorId, f64>;

/// Descriptor → committed crisp value.
pub type Observations = BTreeMap<DescriptorId, bool>;

/// Belief corresponding to a crisp value (`1.0` or `0.0`).
pub fn crisp(value: bool) -> f64 {
    if value { 1.0 } else { 0.0 }
}

/// Belief held for `descriptor`, defaulting to [`DEFAULT_BELIEF`].
pub fn belief(beliefs: &Beliefs, descriptor: &str) -> f64 {
    beliefs.get(descriptor).copied().unwrap_or(DEFAULT_BELIEF)
}

/// Belief vector, observations, irrelevance marks, active paradigm and
/// answered questions for one play session.
///
/// Mutated in place by [`engine::update`](crate::engine::update); there is no
/// separate state enum, the active paradigm acts as the mode selector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameState {
    /// Graded belief per descriptor (`h`).
    pub beliefs: Beliefs,
    /// Committed crisp observations (`o`).
    pub observations: Observations,
    /// Descriptors marked irrelevant (`r`).
    pub irrelevant: BTreeSet<DescriptorId>,
    /// Active paradigm.
    pub current: ParadigmId,
    pub answered: BTreeSet<QuestionId>,
}

impl GameState {
    /// An empty state under `current`.
    pub fn new(current: impl Into<ParadigmId>) -> Self {
        Self {
            beliefs: Beliefs::new(),
            observations: Observations::new(),
            irrelevant: BTreeSet::new(),
            current: current.into(),
            answered: BTreeSet::new(),
        }
    }

    /// Seed graded beliefs, e.g. for tests and replay tooling.
    pub fn with_beliefs<'a>(mut self, beliefs: impl IntoIterator<Item = (&'a str, f64)>) -> Self {
        self.beliefs
            .extend(beliefs.into_iter().map(|(d, h)| (DescriptorId::from(d), h)));
        self
    }

    pub fn belief(&self, descriptor: &str) -> f64 {
        belief(&self.beliefs, descriptor)
    }

    pub fn observation(&self, descriptor: &str) -> Option<bool> {
        self.observations.get(descriptor).copied()
    }

    pub fn is_answered(&self, question: &str) -> bool {
        self.answered.contains(question)
    }

    /// Commit a crisp observation to both `o` and `h`.
    pub fn observe(&mut self, descriptor: DescriptorId, value: bool) {
        self.beliefs.insert(descriptor.clone(), crisp(value));
        self.observations.insert(descriptor, value);
    }

    /// Force every observed descriptor's belief back to its crisp value.
    pub fn clamp_observed(&mut self) {
        clamp_observed(&mut self.beliefs, &self.observations);
    }
}

/// Force `beliefs[d] = observations[d]` for every observed descriptor.
pub fn clamp_observed(beliefs: &mut Beliefs, observations: &Observations) {
    for (d, &v) in observations {
        beliefs.insert(d.clone(), crisp(v));
    }
}
