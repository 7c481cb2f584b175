//! Play sessions: starting a game, answering questions, deriving events.
//!
//! [`start_game`] and [`answer_question`] are stateless use cases over a
//! caller-owned [`GameState`]. [`Session`] bundles one puzzle, its state, the
//! open list and the transcript so front ends only deal in question ids.

use std::collections::BTreeSet;
use std::sync::Arc;

use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::EngineConfig;
use crate::content::{ContentError, PuzzleSource};
use crate::engine;
use crate::history::GameHistory;
use crate::id::{ParadigmId, QuestionId};
use crate::puzzle::{PuzzleData, TopicCategory};
use crate::question::{Answer, Question};
use crate::state::GameState;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors from driving a [`Session`].
#[derive(Debug, Error, Diagnostic)]
pub enum SessionError {
    #[error("question \"{question}\" is not open")]
    #[diagnostic(
        code(lateral::session::not_open),
        help("Only questions in the current open list can be asked. List them with `open_questions()`.")
    )]
    NotOpen { question: String },

    #[error("puzzle \"{puzzle}\" is already cleared")]
    #[diagnostic(
        code(lateral::session::already_cleared),
        help("Start a new session to play the puzzle again.")
    )]
    AlreadyCleared { puzzle: String },

    #[error(transparent)]
    #[diagnostic(transparent)]
    Content(#[from] ContentError),
}

pub type SessionResult<T> = std::result::Result<T, SessionError>;

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

/// Something observable that happened while answering a question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum GameEvent {
    QuestionAnswered { question: QuestionId, answer: Answer },
    ParadigmShifted { from: ParadigmId, to: ParadigmId },
    /// Newly opened ids, sorted.
    QuestionsOpened { ids: Vec<QuestionId> },
    PuzzleCleared,
}

impl std::fmt::Display for GameEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::QuestionAnswered { question, answer } => write!(f, "{question}: {answer}"),
            Self::ParadigmShifted { from, to } => write!(f, "paradigm shift {from} -> {to}"),
            Self::QuestionsOpened { ids } => {
                let joined: Vec<&str> = ids.iter().map(|id| id.as_str()).collect();
                write!(f, "opened {}", joined.join(", "))
            }
            Self::PuzzleCleared => write!(f, "cleared"),
        }
    }
}

// ---------------------------------------------------------------------------
// Use cases
// ---------------------------------------------------------------------------

/// Initial state and opening question set.
#[derive(Debug, Clone)]
pub struct StartGame {
    pub state: GameState,
    pub open: Vec<Question>,
}

/// Initialize a game for `puzzle`.
pub fn start_game(puzzle: &PuzzleData) -> StartGame {
    let state = engine::init_game(
        puzzle.seeds(),
        puzzle.paradigms(),
        puzzle.initial_paradigm_id(),
        puzzle.descriptors(),
    );
    let open: Vec<Question> = engine::init_questions(puzzle.initial_paradigm(), puzzle.questions(), Some(&state.observations))
        .into_iter()
        .cloned()
        .collect();

    tracing::info!(puzzle = %puzzle.id(), open = open.len(), "game started");
    StartGame { state, open }
}

/// The open list after an answer, plus what happened.
#[derive(Debug, Clone)]
pub struct AnswerOutcome {
    pub open: Vec<Question>,
    pub events: Vec<GameEvent>,
}

impl AnswerOutcome {
    pub fn cleared(&self) -> bool {
        self.events.contains(&GameEvent::PuzzleCleared)
    }

    pub fn shifted(&self) -> Option<(&ParadigmId, &ParadigmId)> {
        self.events.iter().find_map(|e| match e {
            GameEvent::ParadigmShifted { from, to } => Some((from, to)),
            _ => None,
        })
    }
}

/// Apply `question` and derive the resulting events.
///
/// Events come in a fixed order: the answer, a shift if the active paradigm
/// changed, the ids newly opened relative to `current_open` (minus the
/// answered question), and a clear marker if `question` is the clearing one.
pub fn answer_question(
    state: &mut GameState,
    question: &Question,
    puzzle: &PuzzleData,
    current_open: &[Question],
    config: &EngineConfig,
) -> AnswerOutcome {
    let previous = state.current.clone();
    let mut events = vec![GameEvent::QuestionAnswered {
        question: question.id().clone(),
        answer: question.answer(),
    }];

    let open = engine::update(state, question, puzzle.paradigms(), puzzle.questions(), current_open, config);

    if state.current != previous {
        events.push(GameEvent::ParadigmShifted {
            from: previous,
            to: state.current.clone(),
        });
    }

    let before: BTreeSet<&QuestionId> = current_open
        .iter()
        .map(|q| q.id())
        .filter(|id| *id != question.id())
        .collect();
    let opened: BTreeSet<&QuestionId> = open.iter().map(|q| q.id()).filter(|id| !before.contains(id)).collect();
    if !opened.is_empty() {
        events.push(GameEvent::QuestionsOpened {
            ids: opened.into_iter().cloned().collect(),
        });
    }

    if question.is_clear() {
        events.push(GameEvent::PuzzleCleared);
    }

    AnswerOutcome { open, events }
}

/// Open questions sharing one topic, each paired with its index in
/// [`Session::open_questions`].
#[derive(Debug, Clone, PartialEq)]
pub struct TopicGroup<'a> {
    /// `None` for questions without a declared topic.
    pub topic: Option<&'a TopicCategory>,
    pub questions: Vec<(usize, &'a Question)>,
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// One asked question, as recorded for history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranscriptEntry {
    pub question: QuestionId,
    pub text: String,
    pub answer: Answer,
}

/// A single play-through of one puzzle.
#[derive(Debug, Clone)]
pub struct Session {
    puzzle: Arc<PuzzleData>,
    config: EngineConfig,
    state: GameState,
    open: Vec<Question>,
    transcript: Vec<TranscriptEntry>,
    cleared: bool,
}

impl Session {
    pub fn start(puzzle: Arc<PuzzleData>, config: EngineConfig) -> Self {
        let StartGame { state, open } = start_game(&puzzle);
        Self {
            puzzle,
            config,
            state,
            open,
            transcript: Vec::new(),
            cleared: false,
        }
    }

    /// Load puzzle `id` from `source` and start playing it.
    pub fn open<S: PuzzleSource + ?Sized>(source: &S, id: &str, config: EngineConfig) -> SessionResult<Self> {
        let puzzle = source.load(id)?;
        Ok(Self::start(Arc::new(puzzle), config))
    }

    /// Ask an open question by id.
    pub fn ask(&mut self, question_id: &str) -> SessionResult<AnswerOutcome> {
        if self.cleared {
            return Err(SessionError::AlreadyCleared {
                puzzle: self.puzzle.id().to_string(),
            });
        }
        let question = self
            .open
            .iter()
            .find(|q| q.id() == question_id)
            .cloned()
            .ok_or_else(|| SessionError::NotOpen {
                question: question_id.to_string(),
            })?;

        let outcome = answer_question(&mut self.state, &question, &self.puzzle, &self.open, &self.config);

        self.transcript.push(TranscriptEntry {
            question: question.id().clone(),
            text: question.text().to_string(),
            answer: question.answer(),
        });
        self.open = outcome.open.clone();
        if outcome.cleared() {
            self.cleared = true;
            tracing::info!(puzzle = %self.puzzle.id(), asked = self.transcript.len(), "puzzle cleared");
        }
        Ok(outcome)
    }

    pub fn puzzle(&self) -> &PuzzleData {
        &self.puzzle
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn open_questions(&self) -> &[Question] {
        &self.open
    }

    /// Open questions grouped by topic in the puzzle's topic order.
    ///
    /// Questions with no topic, or one the puzzle never declared, come last.
    /// Empty groups are left out.
    pub fn open_by_topic(&self) -> Vec<TopicGroup<'_>> {
        let topics = self.puzzle.topics();
        let mut groups: Vec<TopicGroup<'_>> = topics
            .iter()
            .map(|t| TopicGroup {
                topic: Some(t),
                questions: Vec::new(),
            })
            .chain(std::iter::once(TopicGroup {
                topic: None,
                questions: Vec::new(),
            }))
            .collect();

        for (i, q) in self.open.iter().enumerate() {
            let slot = q
                .topic()
                .and_then(|t| topics.iter().position(|c| c.id == t))
                .unwrap_or(topics.len());
            groups[slot].questions.push((i, q));
        }
        groups.retain(|g| !g.questions.is_empty());
        groups
    }

    pub fn is_cleared(&self) -> bool {
        self.cleared
    }

    pub fn transcript(&self) -> &[TranscriptEntry] {
        &self.transcript
    }

    /// Consume the session into a storable history record.
    pub fn into_history(self) -> GameHistory {
        GameHistory {
            puzzle_id: self.puzzle.id().to_string(),
            puzzle_title: self.puzzle.title().to_string(),
            entries: self.transcript,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::parse_puzzle;

    const ELEVATOR: &str = include_str!("../tests/fixtures/elevator.json");

    fn puzzle() -> Arc<PuzzleData> {
        Arc::new(parse_puzzle(ELEVATOR, "elevator").unwrap())
    }

    fn ids(qs: &[Question]) -> Vec<&str> {
        qs.iter().map(|q| q.id().as_str()).collect()
    }

    #[test]
    fn start_opens_questions_consistent_with_initial_paradigm() {
        let puzzle = puzzle();
        let start = start_game(&puzzle);

        assert_eq!(start.state.current, "P1");
        assert!(start.state.observations.is_empty());
        assert_eq!(ids(&start.open), vec!["q1"]);
    }

    #[test]
    fn first_answer_reports_newly_opened() {
        let puzzle = puzzle();
        let StartGame { mut state, open } = start_game(&puzzle);
        let q1 = puzzle.question("q1").unwrap().clone();

        let outcome = answer_question(&mut state, &q1, &puzzle, &open, &EngineConfig::default());

        assert_eq!(
            outcome.events,
            vec![
                GameEvent::QuestionAnswered {
                    question: "q1".into(),
                    answer: Answer::Yes,
                },
                GameEvent::QuestionsOpened {
                    ids: vec!["q2".into(), "q3".into()],
                },
            ]
        );
        assert!(!outcome.cleared());
        assert!(outcome.shifted().is_none());
    }

    #[test]
    fn full_play_through_shifts_then_clears() {
        let mut session = Session::start(puzzle(), EngineConfig::default());

        session.ask("q1").unwrap();
        let quiet = session.ask("q2").unwrap();
        assert_eq!(quiet.events.len(), 1);

        let shift = session.ask("q3").unwrap();
        assert_eq!(shift.shifted().map(|(f, t)| (f.as_str(), t.as_str())), Some(("P1", "P4")));
        assert!(shift.events.contains(&GameEvent::QuestionsOpened { ids: vec!["q4".into()] }));

        let last = session.ask("q4").unwrap();
        assert_eq!(last.events.last(), Some(&GameEvent::PuzzleCleared));
        assert!(session.is_cleared());
        assert_eq!(session.transcript().len(), 4);
    }

    #[test]
    fn asking_closed_question_fails() {
        let mut session = Session::start(puzzle(), EngineConfig::default());
        let err = session.ask("q4").unwrap_err();
        assert!(matches!(err, SessionError::NotOpen { question } if question == "q4"));
        assert!(session.transcript().is_empty());
    }

    #[test]
    fn asking_after_clear_fails() {
        let mut session = Session::start(puzzle(), EngineConfig::default());
        for id in ["q1", "q2", "q3", "q4"] {
            session.ask(id).unwrap();
        }
        assert!(matches!(session.ask("q1"), Err(SessionError::AlreadyCleared { .. })));
    }

    #[test]
    fn open_questions_group_by_declared_topic_order() {
        let mut session = Session::start(puzzle(), EngineConfig::default());
        session.ask("q1").unwrap();
        assert_eq!(ids(session.open_questions()), vec!["q2", "q3"]);

        let groups = session.open_by_topic();
        let layout: Vec<(Option<&str>, Vec<usize>)> = groups
            .iter()
            .map(|g| (g.topic.map(|t| t.id.as_str()), g.questions.iter().map(|(i, _)| *i).collect()))
            .collect();
        // "who" is declared before "how".
        assert_eq!(layout, vec![(Some("who"), vec![1]), (Some("how"), vec![0])]);
    }

    #[test]
    fn untagged_questions_group_last() {
        let json = ELEVATOR.replace(r#""topic_category": "how""#, r#""topic_category": """#);
        let mut session = Session::start(Arc::new(parse_puzzle(&json, "elevator").unwrap()), EngineConfig::default());
        session.ask("q1").unwrap();

        let groups = session.open_by_topic();
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].topic.map(|t| t.name.as_str()), Some("Who"));
        assert!(groups[1].topic.is_none());
        assert_eq!(groups[1].questions[0].1.id(), "q2");
    }

    #[test]
    fn history_carries_transcript() {
        let mut session = Session::start(puzzle(), EngineConfig::default());
        session.ask("q1").unwrap();

        let history = session.into_history();
        assert_eq!(history.puzzle_id, "elevator");
        assert_eq!(history.entries.len(), 1);
        assert_eq!(history.entries[0].answer, Answer::Yes);
    }

    #[test]
    fn event_display() {
        let e = GameEvent::ParadigmShifted {
            from: "P1".into(),
            to: "P2".into(),
        };
        assert_eq!(e.to_string(), "paradigm shift P1 -> P2");
    }
}
