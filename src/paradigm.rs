//! Paradigms: competing interpretive frames over the descriptor universe.
//!
//! A paradigm predicts a crisp value for some descriptors, restricts the
//! player's attention to a conceivable subset of them, and carries weighted
//! relations along which confirmed observations propagate belief.
//!
//! Construction validates the two structural invariants (conceivable set is a
//! subset of the predicted descriptors, relation endpoints are conceivable).
//! The derived `threshold` and `depth` fields are filled in by
//! [`precompute`](crate::precompute) when the owning puzzle is assembled.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use crate::error::{ParadigmError, ParadigmResult};
use crate::id::{DescriptorId, ParadigmId};

/// Descriptor → predicted crisp value.
pub type PredictionMap = BTreeMap<DescriptorId, bool>;

// ---------------------------------------------------------------------------
// Relation
// ---------------------------------------------------------------------------

/// Directed weighted influence between two descriptors within one paradigm.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Relation {
    pub source: DescriptorId,
    pub target: DescriptorId,
    /// Pull strength, typically in `[0, 1]`.
    pub weight: f64,
}

impl Relation {
    pub fn new(source: impl Into<DescriptorId>, target: impl Into<DescriptorId>, weight: f64) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            weight,
        }
    }
}

// ---------------------------------------------------------------------------
// Paradigm
// ---------------------------------------------------------------------------

/// A hypothesis that predicts descriptor values and scopes what is conceivable.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Paradigm {
    id: ParadigmId,
    name: String,
    predictions: PredictionMap,
    conceivable: BTreeSet<DescriptorId>,
    relations: Vec<Relation>,
    /// Anomaly count tolerated before a shift is considered.
    pub(crate) threshold: Option<usize>,
    /// Position in the explanatory-power partial order.
    pub(crate) depth: Option<usize>,
}

impl Paradigm {
    /// Build a validated paradigm.
    ///
    /// Fails with [`ParadigmError::ConceivableNotSubset`] naming every conceivable
    /// descriptor that lacks a prediction, or with
    /// [`ParadigmError::RelationOutOfScope`] for the first relation endpoint
    /// outside the conceivable set, or with [`ParadigmError::WeightOutOfRange`]
    /// for a relation weight outside `[0, 1]`.
    pub fn new(
        id: impl Into<ParadigmId>,
        name: impl Into<String>,
        predictions: PredictionMap,
        conceivable: BTreeSet<DescriptorId>,
        relations: Vec<Relation>,
    ) -> ParadigmResult<Self> {
        let paradigm = Self {
            id: id.into(),
            name: name.into(),
            predictions,
            conceivable,
            relations,
            threshold: None,
            depth: None,
        };
        paradigm.validate()?;
        Ok(paradigm)
    }

    fn validate(&self) -> ParadigmResult<()> {
        let missing: Vec<String> = self
            .conceivable
            .iter()
            .filter(|d| !self.predictions.contains_key(*d))
            .map(|d| d.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(ParadigmError::ConceivableNotSubset {
                paradigm: self.id.to_string(),
                ids: missing,
            });
        }

        for rel in &self.relations {
            for end in [&rel.source, &rel.target] {
                if !self.conceivable.contains(end) {
                    return Err(ParadigmError::RelationOutOfScope {
                        paradigm: self.id.to_string(),
                        reference: end.to_string(),
                    });
                }
            }
            if !(0.0..=1.0).contains(&rel.weight) {
                return Err(ParadigmError::WeightOutOfRange {
                    paradigm: self.id.to_string(),
                    from: rel.source.to_string(),
                    to: rel.target.to_string(),
                    weight: rel.weight,
                });
            }
        }
        Ok(())
    }

    /// Override the derived anomaly threshold.
    ///
    /// Puzzle assembly recomputes thresholds, so this is only meaningful for
    /// paradigm maps driven directly through the engine.
    pub fn with_threshold(mut self, threshold: Option<usize>) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn id(&self) -> &ParadigmId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The full prediction map.
    pub fn predictions(&self) -> &PredictionMap {
        &self.predictions
    }

    pub fn conceivable(&self) -> &BTreeSet<DescriptorId> {
        &self.conceivable
    }

    pub fn relations(&self) -> &[Relation] {
        &self.relations
    }

    /// The paradigm's opinion on `descriptor`, or `None` when it has none.
    pub fn prediction(&self, descriptor: &str) -> Option<bool> {
        self.predictions.get(descriptor).copied()
    }

    pub fn is_conceivable(&self, descriptor: &str) -> bool {
        self.conceivable.contains(descriptor)
    }

    /// Relations originating at `descriptor`.
    pub fn relations_from<'a>(&'a self, descriptor: &'a str) -> impl Iterator<Item = &'a Relation> + 'a {
        self.relations.iter().filter(move |r| r.source == descriptor)
    }

    pub fn threshold(&self) -> Option<usize> {
        self.threshold
    }

    pub fn depth(&self) -> Option<usize> {
        self.depth
    }
}

/// Paradigms keyed by id. Ordered so every scan is deterministic.
pub type ParadigmMap = BTreeMap<ParadigmId, Paradigm>;

/// Index a list of paradigms by id.
pub fn paradigm_map(paradigms: impl IntoIterator<Item = Paradigm>) -> ParadigmMap {
    paradigms.into_iter().map(|p| (p.id.clone(), p)).collect()
}
