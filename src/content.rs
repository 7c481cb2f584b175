//! Puzzle content: the JSON file format and where puzzles come from.
//!
//! A puzzle file looks like:
//!
//! ```json
//! {
//!   "title": "...",
//!   "statement": "...",
//!   "init_paradigm": "P1",
//!   "ps_values": [["d0", 1]],
//!   "all_descriptor_ids": ["d0", "d1"],
//!   "paradigms": [
//!     { "id": "P1", "name": "...", "p_pred": [["d1", 1]],
//!       "conceivable": ["d1"], "relations": [["d1", "d1", 0.5]] }
//!   ],
//!   "questions": [
//!     { "id": "q1", "text": "...", "ans_yes": [["d1", 1]], "ans_no": [["d1", 0]],
//!       "ans_irrelevant": ["d1"], "correct_answer": "yes" }
//!   ],
//!   "topic_categories": [{ "id": "who", "name": "Who" }]
//! }
//! ```
//!
//! Crisp values are `0`/`1`. Unknown top-level keys (such as the legacy
//! `tension_threshold` and `shift_candidates`) are ignored; thresholds are
//! always recomputed.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use miette::Diagnostic;
use serde::Deserialize;
use thiserror::Error;

use crate::error::{ParadigmError, PuzzleError};
use crate::id::{DescriptorId, ParadigmId};
use crate::paradigm::{Paradigm, PredictionMap, Relation};
use crate::puzzle::{PuzzleData, PuzzleDraft, TopicCategory};
use crate::question::{Answer, Outcomes, Question};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors from reading and decoding puzzle content.
#[derive(Debug, Error, Diagnostic)]
pub enum ContentError {
    #[error("failed to read puzzle file: {path}")]
    #[diagnostic(
        code(lateral::content::io),
        help("Ensure the file exists and is readable.")
    )]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed puzzle JSON in {origin}: {source}")]
    #[diagnostic(
        code(lateral::content::json),
        help(
            "Check the JSON against the puzzle format: crisp pairs are [\"id\", 0|1], \
             relations are [\"source\", \"target\", weight], and correct_answer is one of \
             \"yes\", \"no\" or \"irrelevant\"."
        )
    )]
    Json {
        origin: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("puzzle {puzzle}: {context} gives descriptor \"{descriptor}\" the value {value}, expected 0 or 1")]
    #[diagnostic(
        code(lateral::content::non_crisp),
        help("Predictions, seeds and answer effects are crisp: use 0 or 1.")
    )]
    NonCrispValue {
        puzzle: String,
        context: String,
        descriptor: String,
        value: u8,
    },

    #[error("puzzle {puzzle}: {context} lists descriptor \"{descriptor}\" more than once")]
    #[diagnostic(
        code(lateral::content::duplicate_descriptor),
        help("Each descriptor may appear at most once in a prediction list or answer effect.")
    )]
    DuplicateDescriptor {
        puzzle: String,
        context: String,
        descriptor: String,
    },

    #[error("puzzle \"{id}\" not found in {dir}")]
    #[diagnostic(
        code(lateral::content::not_found),
        help("Puzzles are looked up as <dir>/<id>.json. Use `list()` to see what is available.")
    )]
    NotFound { id: String, dir: String },

    #[error(transparent)]
    #[diagnostic(transparent)]
    Paradigm(#[from] ParadigmError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Puzzle(#[from] PuzzleError),
}

pub type ContentResult<T> = std::result::Result<T, ContentError>;

// ---------------------------------------------------------------------------
// File format
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct PuzzleFile {
    #[serde(default)]
    id: Option<String>,
    title: String,
    statement: String,
    init_paradigm: String,
    #[serde(default)]
    ps_values: Vec<(String, u8)>,
    #[serde(default)]
    all_descriptor_ids: Vec<String>,
    paradigms: Vec<ParadigmFile>,
    questions: Vec<QuestionFile>,
    #[serde(default)]
    topic_categories: Vec<TopicCategory>,
}

#[derive(Debug, Deserialize)]
struct ParadigmFile {
    id: String,
    name: String,
    p_pred: Vec<(String, u8)>,
    conceivable: Vec<String>,
    #[serde(default)]
    relations: Vec<(String, String, f64)>,
}

#[derive(Debug, Deserialize)]
struct QuestionFile {
    id: String,
    text: String,
    ans_yes: Vec<(String, u8)>,
    ans_no: Vec<(String, u8)>,
    #[serde(default)]
    ans_irrelevant: Vec<String>,
    correct_answer: Answer,
    #[serde(default)]
    is_clear: bool,
    #[serde(default)]
    prerequisites: Vec<String>,
    #[serde(default)]
    related_descriptors: Vec<String>,
    #[serde(default)]
    topic_category: Option<String>,
    #[serde(default)]
    paradigms: Vec<String>,
}

/// Convert `[id, 0|1]` pairs, rejecting anything else.
fn crisp_pairs(puzzle: &str, context: &str, pairs: Vec<(String, u8)>) -> ContentResult<Vec<(DescriptorId, bool)>> {
    pairs
        .into_iter()
        .map(|(d, v)| match v {
            0 => Ok((DescriptorId::from(d), false)),
            1 => Ok((DescriptorId::from(d), true)),
            other => Err(ContentError::NonCrispValue {
                puzzle: puzzle.to_string(),
                context: context.to_string(),
                descriptor: d,
                value: other,
            }),
        })
        .collect()
}

/// Like [`crisp_pairs`], but a descriptor may appear only once.
fn unique_crisp_pairs(puzzle: &str, context: &str, pairs: Vec<(String, u8)>) -> ContentResult<Vec<(DescriptorId, bool)>> {
    let pairs = crisp_pairs(puzzle, context, pairs)?;
    let mut seen = BTreeSet::new();
    if let Some((d, _)) = pairs.iter().find(|(d, _)| !seen.insert(d)) {
        return Err(ContentError::DuplicateDescriptor {
            puzzle: puzzle.to_string(),
            context: context.to_string(),
            descriptor: d.to_string(),
        });
    }
    Ok(pairs)
}

fn ids<T: From<String>>(raw: Vec<String>) -> Vec<T> {
    raw.into_iter().map(T::from).collect()
}

impl ParadigmFile {
    fn into_paradigm(self, puzzle: &str) -> ContentResult<Paradigm> {
        let context = format!("paradigm {}", self.id);
        let predictions: PredictionMap = unique_crisp_pairs(puzzle, &context, self.p_pred)?.into_iter().collect();
        let conceivable: BTreeSet<DescriptorId> = self.conceivable.into_iter().map(DescriptorId::from).collect();
        let relations = self
            .relations
            .into_iter()
            .map(|(src, tgt, w)| Relation::new(src, tgt, w))
            .collect();
        Ok(Paradigm::new(self.id, self.name, predictions, conceivable, relations)?)
    }
}

impl QuestionFile {
    fn into_question(self, puzzle: &str, topics: &[TopicCategory]) -> ContentResult<Question> {
        let outcomes = Outcomes {
            yes: unique_crisp_pairs(puzzle, &format!("question {} (yes)", self.id), self.ans_yes)?,
            no: unique_crisp_pairs(puzzle, &format!("question {} (no)", self.id), self.ans_no)?,
            irrelevant: ids(self.ans_irrelevant),
        };

        let topic = self.topic_category.filter(|t| !t.is_empty());
        if let Some(t) = topic.as_ref().filter(|t| !topics.iter().any(|c| &c.id == *t)) {
            tracing::warn!(puzzle, question = %self.id, topic = %t, "question references undeclared topic");
        }

        Ok(Question::new(self.id, self.text, outcomes, self.correct_answer)
            .clearing(self.is_clear)
            .with_prerequisites(ids(self.prerequisites))
            .with_related(ids(self.related_descriptors))
            .with_topic(topic)
            .restricted_to(ids::<ParadigmId>(self.paradigms)))
    }
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

/// Decode a puzzle from JSON text.
///
/// `fallback_id` names the puzzle when the document carries no `id` field,
/// typically the file stem.
pub fn parse_puzzle(json: &str, fallback_id: &str) -> ContentResult<PuzzleData> {
    let file: PuzzleFile = serde_json::from_str(json).map_err(|e| ContentError::Json {
        origin: fallback_id.to_string(),
        source: e,
    })?;
    let id = file.id.unwrap_or_else(|| fallback_id.to_string());

    let seeds = crisp_pairs(&id, "ps_values", file.ps_values)?;
    let paradigms = file
        .paradigms
        .into_iter()
        .map(|p| p.into_paradigm(&id))
        .collect::<ContentResult<Vec<_>>>()?;
    let questions = file
        .questions
        .into_iter()
        .map(|q| q.into_question(&id, &file.topic_categories))
        .collect::<ContentResult<Vec<_>>>()?;

    let draft = PuzzleDraft {
        id,
        title: file.title,
        statement: file.statement,
        initial_paradigm: ParadigmId::from(file.init_paradigm),
        seeds,
        descriptors: ids(file.all_descriptor_ids),
        paradigms,
        questions,
        topics: file.topic_categories,
    };
    Ok(PuzzleData::new(draft)?)
}

/// Read and decode a puzzle file. The file stem is the fallback id.
pub fn load_puzzle(path: &Path) -> ContentResult<PuzzleData> {
    let json = std::fs::read_to_string(path).map_err(|e| ContentError::Io {
        path: path.display().to_string(),
        source: e,
    })?;
    let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or("puzzle");
    parse_puzzle(&json, stem)
}

// ---------------------------------------------------------------------------
// Sources
// ---------------------------------------------------------------------------

/// Somewhere puzzles can be fetched from by id.
pub trait PuzzleSource {
    fn load(&self, id: &str) -> ContentResult<PuzzleData>;

    /// Available puzzle ids, sorted.
    fn list(&self) -> ContentResult<Vec<String>>;
}

/// Puzzles stored as `<root>/<id>.json`.
#[derive(Debug, Clone)]
pub struct DirectorySource {
    root: PathBuf,
}

impl DirectorySource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, id: &str) -> PathBuf {
        self.root.join(format!("{id}.json"))
    }
}

impl PuzzleSource for DirectorySource {
    fn load(&self, id: &str) -> ContentResult<PuzzleData> {
        let path = self.path_for(id);
        if !path.is_file() {
            return Err(ContentError::NotFound {
                id: id.to_string(),
                dir: self.root.display().to_string(),
            });
        }
        load_puzzle(&path)
    }

    fn list(&self) -> ContentResult<Vec<String>> {
        let entries = std::fs::read_dir(&self.root).map_err(|e| ContentError::Io {
            path: self.root.display().to_string(),
            source: e,
        })?;

        let mut ids = Vec::new();
        for entry in entries.flatten() {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            match path.file_stem().and_then(|s| s.to_str()) {
                Some(stem) => ids.push(stem.to_string()),
                None => tracing::warn!(path = %path.display(), "skipping puzzle file with non-UTF-8 name"),
            }
        }
        ids.sort();
        Ok(ids)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ELEVATOR: &str = include_str!("../tests/fixtures/elevator.json");

    const MINIMAL: &str = r#"{
        "title": "Mini",
        "statement": "Something happened.",
        "init_paradigm": "P1",
        "ps_values": [["ps1", 1]],
        "all_descriptor_ids": ["ps1", "d1"],
        "paradigms": [
            {"id": "P1", "name": "One", "p_pred": [["d1", 1]], "conceivable": ["d1"], "relations": []},
            {"id": "P2", "name": "Two", "p_pred": [["d1", 0]], "conceivable": ["d1"], "relations": []}
        ],
        "questions": [
            {"id": "q1", "text": "Did it?", "ans_yes": [["d1", 1]], "ans_no": [["d1", 0]],
             "ans_irrelevant": ["d1"], "correct_answer": "no", "is_clear": true}
        ]
    }"#;

    #[test]
    fn parses_fixture() {
        let puzzle = parse_puzzle(ELEVATOR, "elevator").unwrap();
        assert_eq!(puzzle.id(), "elevator");
        assert_eq!(puzzle.paradigms().len(), 4);
        assert_eq!(puzzle.questions().len(), 4);
        assert_eq!(puzzle.descriptors().len(), 5);
        assert_eq!(puzzle.paradigm("P1").unwrap().threshold(), Some(1));
        assert_eq!(puzzle.paradigm("P4").unwrap().depth(), Some(0));
        assert_eq!(puzzle.paradigm("P1").unwrap().depth(), Some(2));
    }

    #[test]
    fn parses_minimal_with_defaults() {
        let puzzle = parse_puzzle(MINIMAL, "mini").unwrap();
        let q = puzzle.question("q1").unwrap();
        assert_eq!(q.answer(), Answer::No);
        assert!(q.is_clear());
        assert!(q.prerequisites().is_empty());
        assert!(q.topic().is_none());
        assert_eq!(puzzle.seeds(), &[(DescriptorId::from("ps1"), true)]);
        assert!(puzzle.topics().is_empty());
    }

    #[test]
    fn explicit_id_wins_over_fallback() {
        let json = MINIMAL.replacen('{', r#"{"id": "named","#, 1);
        let puzzle = parse_puzzle(&json, "fallback").unwrap();
        assert_eq!(puzzle.id(), "named");
    }

    #[test]
    fn unknown_answer_is_rejected() {
        let json = MINIMAL.replace(r#""correct_answer": "no""#, r#""correct_answer": "maybe""#);
        let err = parse_puzzle(&json, "mini").unwrap_err();
        assert!(matches!(err, ContentError::Json { .. }));
    }

    #[test]
    fn non_crisp_prediction_is_rejected() {
        let json = MINIMAL.replace(r#"[["d1", 1]], "conceivable""#, r#"[["d1", 2]], "conceivable""#);
        let err = parse_puzzle(&json, "mini").unwrap_err();
        assert!(matches!(err, ContentError::NonCrispValue { value: 2, .. }));
    }

    #[test]
    fn repeated_prediction_is_rejected() {
        let json = MINIMAL.replace(r#"[["d1", 1]], "conceivable""#, r#"[["d1", 1], ["d1", 0]], "conceivable""#);
        let err = parse_puzzle(&json, "mini").unwrap_err();
        assert!(matches!(
            err,
            ContentError::DuplicateDescriptor { ref context, ref descriptor, .. }
                if context == "paradigm P1" && descriptor == "d1"
        ));
    }

    #[test]
    fn repeated_answer_effect_is_rejected() {
        let json = MINIMAL.replace(r#""ans_no": [["d1", 0]]"#, r#""ans_no": [["d1", 0], ["d1", 0]]"#);
        let err = parse_puzzle(&json, "mini").unwrap_err();
        assert!(matches!(
            err,
            ContentError::DuplicateDescriptor { ref context, .. } if context == "question q1 (no)"
        ));
    }

    #[test]
    fn paradigm_validation_surfaces() {
        let json = MINIMAL.replace(r#""conceivable": ["d1"], "relations": []}"#, r#""conceivable": ["d1", "d9"], "relations": []}"#);
        let err = parse_puzzle(&json, "mini").unwrap_err();
        assert!(matches!(
            err,
            ContentError::Paradigm(ParadigmError::ConceivableNotSubset { ref ids, .. }) if ids == &["d9".to_string()]
        ));
    }

    #[test]
    fn directory_source_loads_and_lists() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("mini.json"), MINIMAL).unwrap();
        std::fs::write(dir.path().join("elevator.json"), ELEVATOR).unwrap();
        std::fs::write(dir.path().join("notes.txt"), "not a puzzle").unwrap();

        let source = DirectorySource::new(dir.path());
        assert_eq!(source.list().unwrap(), vec!["elevator", "mini"]);
        assert_eq!(source.load("mini").unwrap().title(), "Mini");

        let err = source.load("missing").unwrap_err();
        assert!(matches!(err, ContentError::NotFound { id, .. } if id == "missing"));
    }

    #[test]
    fn load_puzzle_uses_file_stem() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stem-name.json");
        std::fs::write(&path, MINIMAL).unwrap();
        assert_eq!(load_puzzle(&path).unwrap().id(), "stem-name");
    }
}
