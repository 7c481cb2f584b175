//! Questions: player-facing probes with an authored correct answer.
//!
//! A question carries three authored outcomes (yes, no, irrelevant) but only
//! the one selected by its correct answer ever touches game state. That
//! selection is resolved once, at construction, into an [`Effect`].

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::id::{DescriptorId, ParadigmId, QuestionId};
use crate::state::Observations;

// ---------------------------------------------------------------------------
// Answer
// ---------------------------------------------------------------------------

/// The authored correct answer to a question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Answer {
    Yes,
    No,
    Irrelevant,
}

impl fmt::Display for Answer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Yes => write!(f, "yes"),
            Self::No => write!(f, "no"),
            Self::Irrelevant => write!(f, "irrelevant"),
        }
    }
}

impl FromStr for Answer {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "yes" => Ok(Self::Yes),
            "no" => Ok(Self::No),
            "irrelevant" => Ok(Self::Irrelevant),
            other => Err(format!("unknown answer \"{other}\"")),
        }
    }
}

// ---------------------------------------------------------------------------
// Effect
// ---------------------------------------------------------------------------

/// What answering a question does to the game state.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Effect {
    /// Crisp observations `(descriptor, value)` to commit.
    Observation(Vec<(DescriptorId, bool)>),
    /// Descriptors to mark irrelevant.
    Irrelevant(Vec<DescriptorId>),
}

impl Effect {
    /// Observation pairs, empty for an irrelevant effect.
    pub fn observations(&self) -> &[(DescriptorId, bool)] {
        match self {
            Self::Observation(pairs) => pairs,
            Self::Irrelevant(_) => &[],
        }
    }
}

/// The three authored outcomes of a question.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Outcomes {
    pub yes: Vec<(DescriptorId, bool)>,
    pub no: Vec<(DescriptorId, bool)>,
    pub irrelevant: Vec<DescriptorId>,
}

impl Outcomes {
    fn effect_for(&self, answer: Answer) -> Effect {
        match answer {
            Answer::Yes => Effect::Observation(self.yes.clone()),
            Answer::No => Effect::Observation(self.no.clone()),
            Answer::Irrelevant => Effect::Irrelevant(self.irrelevant.clone()),
        }
    }
}

// ---------------------------------------------------------------------------
// Question
// ---------------------------------------------------------------------------

/// A player-facing yes/no/irrelevant probe.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Question {
    id: QuestionId,
    text: String,
    outcomes: Outcomes,
    answer: Answer,
    effect: Effect,
    is_clear: bool,
    prerequisites: Vec<DescriptorId>,
    related: Vec<DescriptorId>,
    topic: Option<String>,
    paradigms: Vec<ParadigmId>,
}

impl Question {
    /// Create a question; its effect is fixed here from `answer`.
    pub fn new(id: impl Into<QuestionId>, text: impl Into<String>, outcomes: Outcomes, answer: Answer) -> Self {
        let effect = outcomes.effect_for(answer);
        Self {
            id: id.into(),
            text: text.into(),
            outcomes,
            answer,
            effect,
            is_clear: false,
            prerequisites: Vec::new(),
            related: Vec::new(),
            topic: None,
            paradigms: Vec::new(),
        }
    }

    /// Mark this question as the one that solves the puzzle.
    pub fn clearing(mut self, is_clear: bool) -> Self {
        self.is_clear = is_clear;
        self
    }

    /// Descriptors that must already be observed before the question can open.
    pub fn with_prerequisites(mut self, prerequisites: Vec<DescriptorId>) -> Self {
        self.prerequisites = prerequisites;
        self
    }

    pub fn with_related(mut self, related: Vec<DescriptorId>) -> Self {
        self.related = related;
        self
    }

    pub fn with_topic(mut self, topic: Option<String>) -> Self {
        self.topic = topic;
        self
    }

    /// Restrict the question to the listed paradigms (empty = unrestricted).
    pub fn restricted_to(mut self, paradigms: Vec<ParadigmId>) -> Self {
        self.paradigms = paradigms;
        self
    }

    pub fn id(&self) -> &QuestionId {
        &self.id
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn answer(&self) -> Answer {
        self.answer
    }

    pub fn effect(&self) -> &Effect {
        &self.effect
    }

    pub fn is_clear(&self) -> bool {
        self.is_clear
    }

    pub fn prerequisites(&self) -> &[DescriptorId] {
        &self.prerequisites
    }

    pub fn topic(&self) -> Option<&str> {
        self.topic.as_deref()
    }

    pub fn paradigms(&self) -> &[ParadigmId] {
        &self.paradigms
    }

    /// Every descriptor the question mentions: all three outcomes plus related.
    pub fn referenced_descriptors(&self) -> BTreeSet<&DescriptorId> {
        self.outcomes
            .yes
            .iter()
            .chain(&self.outcomes.no)
            .map(|(d, _)| d)
            .chain(&self.outcomes.irrelevant)
            .chain(&self.related)
            .collect()
    }

    /// Whether any referenced descriptor lies outside `conceivable`.
    pub fn is_blocked_by(&self, conceivable: &BTreeSet<DescriptorId>) -> bool {
        self.referenced_descriptors()
            .into_iter()
            .any(|d| !conceivable.contains(d))
    }

    /// Whether the question may be asked while `paradigm` is active.
    pub fn allows_paradigm(&self, paradigm: &str) -> bool {
        self.paradigms.is_empty() || self.paradigms.iter().any(|p| p == paradigm)
    }

    /// Whether every prerequisite descriptor has been observed.
    pub fn prerequisites_met(&self, observations: &Observations) -> bool {
        self.prerequisites.iter().all(|d| observations.contains_key(d))
    }
}
