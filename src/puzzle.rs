//! Immutable authored content for one puzzle, post-precomputation.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::error::{PuzzleError, PuzzleResult};
use crate::id::{DescriptorId, ParadigmId};
use crate::paradigm::{Paradigm, ParadigmMap};
use crate::precompute::{self, ParadigmReport};
use crate::question::Question;
use crate::state::Observations;

/// A display grouping for questions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopicCategory {
    pub id: String,
    pub name: String,
}

/// Everything needed to assemble a [`PuzzleData`], before calibration.
#[derive(Debug, Clone, Default)]
pub struct PuzzleDraft {
    pub id: String,
    pub title: String,
    pub statement: String,
    pub initial_paradigm: ParadigmId,
    /// Crisp observations known from the puzzle statement.
    pub seeds: Vec<(DescriptorId, bool)>,
    /// The full descriptor universe.
    pub descriptors: Vec<DescriptorId>,
    pub paradigms: Vec<Paradigm>,
    pub questions: Vec<Question>,
    pub topics: Vec<TopicCategory>,
}

/// Validated, calibrated puzzle content.
///
/// Paradigm thresholds and depths are computed once in [`PuzzleData::new`]
/// and never touched again.
#[derive(Debug, Clone)]
pub struct PuzzleData {
    id: String,
    title: String,
    statement: String,
    initial_paradigm: ParadigmId,
    seeds: Vec<(DescriptorId, bool)>,
    descriptors: Vec<DescriptorId>,
    paradigms: ParadigmMap,
    questions: Vec<Question>,
    topics: Vec<TopicCategory>,
    o_star: Observations,
}

impl PuzzleData {
    /// Validate ids, then build O\* and calibrate every paradigm.
    pub fn new(draft: PuzzleDraft) -> PuzzleResult<Self> {
        let PuzzleDraft {
            id,
            title,
            statement,
            initial_paradigm,
            seeds,
            descriptors,
            paradigms: paradigm_list,
            questions,
            topics,
        } = draft;

        let mut paradigms = ParadigmMap::new();
        for p in paradigm_list {
            if paradigms.contains_key(p.id()) {
                return Err(PuzzleError::DuplicateId {
                    puzzle: id,
                    kind: "paradigm",
                    id: p.id().to_string(),
                });
            }
            paradigms.insert(p.id().clone(), p);
        }

        let mut seen = BTreeSet::new();
        for q in &questions {
            if !seen.insert(q.id()) {
                return Err(PuzzleError::DuplicateId {
                    puzzle: id.clone(),
                    kind: "question",
                    id: q.id().to_string(),
                });
            }
        }

        if !paradigms.contains_key(&initial_paradigm) {
            return Err(PuzzleError::UnknownInitialParadigm {
                puzzle: id,
                paradigm: initial_paradigm.to_string(),
            });
        }

        let o_star = precompute::build_o_star(&questions, &seeds);
        precompute::compute_thresholds(&mut paradigms, &o_star);
        precompute::compute_depths(&mut paradigms, &o_star);

        tracing::info!(
            puzzle = %id,
            paradigms = paradigms.len(),
            questions = questions.len(),
            descriptors = descriptors.len(),
            "calibrated puzzle"
        );
        for p in paradigms.values() {
            tracing::debug!(
                puzzle = %id,
                paradigm = %p.id(),
                threshold = ?p.threshold(),
                depth = ?p.depth(),
                "paradigm calibration"
            );
        }

        Ok(Self {
            id,
            title,
            statement,
            initial_paradigm,
            seeds,
            descriptors,
            paradigms,
            questions,
            topics,
            o_star,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn statement(&self) -> &str {
        &self.statement
    }

    pub fn initial_paradigm_id(&self) -> &ParadigmId {
        &self.initial_paradigm
    }

    /// The paradigm play starts under.
    pub fn initial_paradigm(&self) -> &Paradigm {
        // Checked in `new`.
        &self.paradigms[&self.initial_paradigm]
    }

    pub fn seeds(&self) -> &[(DescriptorId, bool)] {
        &self.seeds
    }

    pub fn descriptors(&self) -> &[DescriptorId] {
        &self.descriptors
    }

    pub fn paradigms(&self) -> &ParadigmMap {
        &self.paradigms
    }

    pub fn paradigm(&self, id: &str) -> Option<&Paradigm> {
        self.paradigms.get(id)
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn question(&self, id: &str) -> Option<&Question> {
        self.questions.iter().find(|q| q.id() == id)
    }

    pub fn topics(&self) -> &[TopicCategory] {
        &self.topics
    }

    /// Authoring-time ground truth. Never shown to the player.
    pub fn o_star(&self) -> &Observations {
        &self.o_star
    }

    /// Calibration summary per paradigm.
    pub fn report(&self) -> Vec<ParadigmReport> {
        precompute::report(&self.paradigms, &self.o_star)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::paradigm::{PredictionMap, Relation};
    use crate::question::{Answer, Outcomes};

    fn d(id: &str) -> DescriptorId {
        DescriptorId::from(id)
    }

    fn paradigm(id: &str, preds: &[(&str, bool)]) -> Paradigm {
        let predictions: PredictionMap = preds.iter().map(|(k, v)| (d(k), *v)).collect();
        let conceivable = predictions.keys().cloned().collect();
        Paradigm::new(id, id, predictions, conceivable, vec![]).unwrap()
    }

    fn draft() -> PuzzleDraft {
        PuzzleDraft {
            id: "mini".into(),
            title: "Mini".into(),
            statement: "A man walks into a bar.".into(),
            initial_paradigm: ParadigmId::from("P1"),
            seeds: vec![(d("ps1"), true)],
            descriptors: vec![d("d1"), d("d3"), d("ps1")],
            paradigms: vec![
                paradigm("P1", &[("d1", true), ("d3", false)]),
                paradigm("P2", &[("d1", false), ("d3", true)]),
            ],
            questions: vec![Question::new(
                "q1",
                "Was he thirsty?",
                Outcomes {
                    yes: vec![(d("d1"), true)],
                    no: vec![(d("d1"), false)],
                    irrelevant: vec![],
                },
                Answer::No,
            )],
            topics: vec![],
        }
    }

    #[test]
    fn assembly_calibrates_paradigms() {
        let puzzle = PuzzleData::new(draft()).unwrap();

        assert_eq!(puzzle.o_star().get("d1"), Some(&false));
        assert_eq!(puzzle.o_star().get("ps1"), Some(&true));
        // P1 mispredicts d1, shared with P2.
        assert_eq!(puzzle.paradigm("P1").unwrap().threshold(), Some(1));
        assert_eq!(puzzle.paradigm("P2").unwrap().threshold(), Some(0));
        assert_eq!(puzzle.paradigm("P2").unwrap().depth(), Some(0));
        assert_eq!(puzzle.paradigm("P1").unwrap().depth(), Some(1));
        assert_eq!(puzzle.initial_paradigm().id(), "P1");
    }

    #[test]
    fn unknown_initial_paradigm_is_rejected() {
        let mut bad = draft();
        bad.initial_paradigm = ParadigmId::from("P9");
        let err = PuzzleData::new(bad).unwrap_err();
        assert!(matches!(err, PuzzleError::UnknownInitialParadigm { paradigm, .. } if paradigm == "P9"));
    }

    #[test]
    fn duplicate_paradigm_is_rejected() {
        let mut bad = draft();
        bad.paradigms.push(paradigm("P1", &[("d1", true)]));
        let err = PuzzleData::new(bad).unwrap_err();
        assert!(matches!(err, PuzzleError::DuplicateId { kind: "paradigm", .. }));
    }

    #[test]
    fn question_lookup_by_id() {
        let puzzle = PuzzleData::new(draft()).unwrap();
        assert_eq!(puzzle.question("q1").unwrap().text(), "Was he thirsty?");
        assert!(puzzle.question("q2").is_none());
    }

    #[test]
    fn authored_threshold_is_recomputed() {
        let mut custom = draft();
        custom.paradigms = vec![
            paradigm("P1", &[("d1", true), ("d3", false)]).with_threshold(Some(42)),
            Paradigm::new(
                "P2",
                "P2",
                [(d("d1"), false), (d("d3"), true)].into_iter().collect(),
                [d("d1"), d("d3")].into_iter().collect(),
                vec![Relation::new("d1", "d3", 0.5)],
            )
            .unwrap(),
        ];
        let puzzle = PuzzleData::new(custom).unwrap();
        assert_eq!(puzzle.paradigm("P1").unwrap().threshold(), Some(1));
    }
}
