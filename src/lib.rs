// thiserror's #[error("...{field}...")] format strings reference struct fields,
// but the compiler doesn't see through the derive macro and reports false positives.
#![allow(unused_assignments)]

//! # lateral
//!
//! A belief-revision engine for lateral-thinking ("situation") puzzles.
//!
//! The player holds a graded belief for every descriptor of a hidden scenario
//! and reasons inside one paradigm at a time. Answers commit crisp
//! observations, propagate belief along the paradigm's weighted relations,
//! and once enough observations contradict the active paradigm the player
//! shifts to the rival that explains them best.
//!
//! ## Architecture
//!
//! - **Domain** (`paradigm`, `question`, `state`, `puzzle`): validated content and play state
//! - **Precomputation** (`precompute`): ground truth, shift thresholds, paradigm depth
//! - **Belief engine** (`engine`): scoring, assimilation, question gating, update
//! - **Sessions** (`session`): start/answer use cases, events, transcripts
//! - **Collaborators** (`content`, `history`, `config`): JSON puzzles, solved records, TOML config
//!
//! ## Library usage
//!
//! ```no_run
//! use std::path::Path;
//! use std::sync::Arc;
//! use lateral::config::EngineConfig;
//! use lateral::content::load_puzzle;
//! use lateral::session::Session;
//!
//! let puzzle = load_puzzle(Path::new("puzzles/elevator.json")).unwrap();
//! let mut session = Session::start(Arc::new(puzzle), EngineConfig::default());
//! let first = session.open_questions()[0].id().clone();
//! let outcome = session.ask(first.as_str()).unwrap();
//! for event in &outcome.events {
//!     println!("{event}");
//! }
//! ```

pub mod config;
pub mod content;
pub mod engine;
pub mod error;
pub mod history;
pub mod id;
pub mod paradigm;
pub mod precompute;
pub mod puzzle;
pub mod question;
pub mod session;
pub mod state;
