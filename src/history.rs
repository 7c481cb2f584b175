//! Solved-puzzle tracking and play transcripts.
//!
//! The JSON store keeps everything in one file:
//!
//! ```json
//! { "solved": ["elevator"], "histories": { "elevator": { ... } } }
//! ```
//!
//! Only the latest transcript per puzzle is kept.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::session::TranscriptEntry;

/// Errors from the history store.
#[derive(Debug, Error, Diagnostic)]
pub enum HistoryError {
    #[error("history I/O failed: {message}")]
    #[diagnostic(
        code(lateral::history::io),
        help("Check that the history file's directory exists and is writable.")
    )]
    Io { message: String },

    #[error("history file {path} is corrupt: {message}")]
    #[diagnostic(
        code(lateral::history::parse),
        help("Move the file aside to start a fresh history.")
    )]
    Parse { path: String, message: String },
}

pub type HistoryResult<T> = std::result::Result<T, HistoryError>;

/// The questions asked during one play-through.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameHistory {
    pub puzzle_id: String,
    pub puzzle_title: String,
    pub entries: Vec<TranscriptEntry>,
}

/// Persistence for solved flags and transcripts.
pub trait HistoryStore {
    fn mark_solved(&mut self, puzzle_id: &str) -> HistoryResult<()>;

    fn is_solved(&self, puzzle_id: &str) -> bool;

    /// Store `history`, replacing any earlier transcript for the same puzzle.
    fn save_history(&mut self, history: GameHistory) -> HistoryResult<()>;

    fn history(&self, puzzle_id: &str) -> Option<&GameHistory>;
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct HistoryFile {
    #[serde(default)]
    solved: BTreeSet<String>,
    #[serde(default)]
    histories: BTreeMap<String, GameHistory>,
}

/// [`HistoryStore`] backed by a single pretty-printed JSON file.
///
/// Every mutation is flushed immediately.
#[derive(Debug)]
pub struct JsonHistoryStore {
    path: PathBuf,
    data: HistoryFile,
}

impl JsonHistoryStore {
    /// Open the store at `path`, starting empty if the file does not exist.
    pub fn open(path: &Path) -> HistoryResult<Self> {
        let data = if path.exists() {
            let raw = std::fs::read_to_string(path).map_err(|e| HistoryError::Io {
                message: format!("read {}: {e}", path.display()),
            })?;
            serde_json::from_str(&raw).map_err(|e| HistoryError::Parse {
                path: path.display().to_string(),
                message: e.to_string(),
            })?
        } else {
            HistoryFile::default()
        };
        Ok(Self {
            path: path.to_path_buf(),
            data,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Solved puzzle ids, sorted.
    pub fn solved(&self) -> impl Iterator<Item = &str> {
        self.data.solved.iter().map(String::as_str)
    }

    fn flush(&self) -> HistoryResult<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| HistoryError::Io {
                message: format!("create dir {}: {e}", parent.display()),
            })?;
        }
        let json = serde_json::to_string_pretty(&self.data).map_err(|e| HistoryError::Io {
            message: format!("serialize history: {e}"),
        })?;
        std::fs::write(&self.path, json).map_err(|e| HistoryError::Io {
            message: format!("write {}: {e}", self.path.display()),
        })
    }
}

impl HistoryStore for JsonHistoryStore {
    fn mark_solved(&mut self, puzzle_id: &str) -> HistoryResult<()> {
        if self.data.solved.insert(puzzle_id.to_string()) {
            tracing::debug!(puzzle = puzzle_id, "marked solved");
            self.flush()?;
        }
        Ok(())
    }

    fn is_solved(&self, puzzle_id: &str) -> bool {
        self.data.solved.contains(puzzle_id)
    }

    fn save_history(&mut self, history: GameHistory) -> HistoryResult<()> {
        tracing::debug!(puzzle = %history.puzzle_id, entries = history.entries.len(), "saving history");
        self.data.histories.insert(history.puzzle_id.clone(), history);
        self.flush()
    }

    fn history(&self, puzzle_id: &str) -> Option<&GameHistory> {
        self.data.histories.get(puzzle_id)
    }
}
