//! Rich diagnostic error types for the lateral puzzle engine.
//!
//! Each subsystem defines its own error type with miette `#[diagnostic]` derives,
//! providing error codes and help text so puzzle authors know exactly which
//! piece of content is malformed and how to fix it.
//!
//! The belief engine itself never fails: every error here originates at load
//! time (paradigm construction, puzzle assembly, content parsing) or in the
//! collaborators around the core (configuration, sessions, history).

use miette::Diagnostic;
use thiserror::Error;

use crate::config::ConfigError;
use crate::content::ContentError;
use crate::history::HistoryError;
use crate::session::SessionError;

/// Top-level error type for the lateral engine.
///
/// Each variant wraps a subsystem-specific error, preserving the full diagnostic
/// chain (error codes, help text) through to the user.
#[derive(Debug, Error, Diagnostic)]
pub enum LateralError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Paradigm(#[from] ParadigmError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Puzzle(#[from] PuzzleError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Content(#[from] ContentError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Session(#[from] SessionError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    History(#[from] HistoryError),
}

// ---------------------------------------------------------------------------
// Paradigm errors
// ---------------------------------------------------------------------------

/// Structural violations detected while constructing a [`Paradigm`](crate::paradigm::Paradigm).
#[derive(Debug, Error, Diagnostic, PartialEq)]
pub enum ParadigmError {
    #[error("paradigm {paradigm}: conceivable descriptors without a prediction: {ids:?}")]
    #[diagnostic(
        code(lateral::paradigm::conceivable_not_subset),
        help(
            "Every conceivable descriptor must also appear in the paradigm's prediction map. \
             Either add a 0/1 prediction for the listed descriptors or drop them from the \
             conceivable set."
        )
    )]
    ConceivableNotSubset { paradigm: String, ids: Vec<String> },

    #[error("paradigm {paradigm}: relation references \"{reference}\" outside the conceivable set")]
    #[diagnostic(
        code(lateral::paradigm::relation_out_of_scope),
        help(
            "Relations may only connect descriptors the paradigm can conceive of. \
             Add \"{reference}\" to the conceivable set or remove the relation."
        )
    )]
    RelationOutOfScope { paradigm: String, reference: String },

    #[error("paradigm {paradigm}: relation {from} -> {to} has weight {weight}, expected a value in [0, 1]")]
    #[diagnostic(
        code(lateral::paradigm::weight_out_of_range),
        help("A relation weight is the fraction of the gap to the prediction closed per pull.")
    )]
    WeightOutOfRange {
        paradigm: String,
        from: String,
        to: String,
        weight: f64,
    },
}

/// Result type for paradigm construction.
pub type ParadigmResult<T> = std::result::Result<T, ParadigmError>;

// ---------------------------------------------------------------------------
// Puzzle errors
// ---------------------------------------------------------------------------

/// Errors from assembling a [`PuzzleData`](crate::puzzle::PuzzleData).
#[derive(Debug, Error, Diagnostic, PartialEq)]
pub enum PuzzleError {
    #[error("puzzle {puzzle}: initial paradigm \"{paradigm}\" is not defined")]
    #[diagnostic(
        code(lateral::puzzle::unknown_initial_paradigm),
        help("The `init_paradigm` field must name one of the puzzle's paradigms.")
    )]
    UnknownInitialParadigm { puzzle: String, paradigm: String },

    #[error("puzzle {puzzle}: duplicate {kind} id \"{id}\"")]
    #[diagnostic(
        code(lateral::puzzle::duplicate_id),
        help("Paradigm and question ids must be unique within a puzzle.")
    )]
    DuplicateId {
        puzzle: String,
        kind: &'static str,
        id: String,
    },
}

/// Result type for puzzle assembly.
pub type PuzzleResult<T> = std::result::Result<T, PuzzleError>;

/// Convenience result alias for the lateral engine.
pub type LateralResult<T> = std::result::Result<T, LateralError>;
