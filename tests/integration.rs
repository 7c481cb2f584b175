//! End-to-end tests for the lateral engine.
//!
//! These drive the fixture puzzle through the public API the way the CLI
//! does: load from disk, play a session to completion, and record history.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use lateral::config::{Disclosure, EngineConfig};
use lateral::content::{DirectorySource, PuzzleSource, load_puzzle};
use lateral::engine;
use lateral::history::{HistoryStore, JsonHistoryStore};
use lateral::session::{GameEvent, Session};

fn fixture() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/elevator.json")
}

/// Ask the first open question until cleared or stuck; return every event.
fn simulate(session: &mut Session) -> Vec<GameEvent> {
    let mut events = Vec::new();
    while !session.is_cleared() {
        let Some(next) = session.open_questions().first().map(|q| q.id().clone()) else {
            break;
        };
        let outcome = session.ask(next.as_str()).unwrap();

        let state = session.state();
        assert!(engine::unclamped(state).is_empty(), "observed beliefs drifted");
        assert!(session.puzzle().paradigm(state.current.as_str()).is_some());
        for q in session.open_questions() {
            assert!(!state.is_answered(q.id().as_str()), "{} is open but answered", q.id());
        }

        events.extend(outcome.events);
    }
    events
}

#[test]
fn simulation_shifts_and_clears() {
    let puzzle = Arc::new(load_puzzle(&fixture()).unwrap());
    let mut session = Session::start(puzzle, EngineConfig::default());

    let events = simulate(&mut session);

    assert!(session.is_cleared());
    assert_eq!(session.state().current, "P4");
    assert_eq!(
        events
            .iter()
            .filter(|e| matches!(e, GameEvent::ParadigmShifted { .. }))
            .count(),
        1
    );
    assert_eq!(events.last(), Some(&GameEvent::PuzzleCleared));
    let asked: Vec<&str> = session.transcript().iter().map(|e| e.question.as_str()).collect();
    assert_eq!(asked, vec!["q1", "q2", "q3", "q4"]);
}

#[test]
fn reachability_disclosure_also_clears() {
    let puzzle = Arc::new(load_puzzle(&fixture()).unwrap());
    let config = EngineConfig::from_toml_str("disclosure = \"reachability\"").unwrap();
    assert_eq!(config.disclosure, Disclosure::Reachability);

    let mut session = Session::start(puzzle, config);
    simulate(&mut session);

    assert!(session.is_cleared());
    assert_eq!(session.state().current, "P4");
}

#[test]
fn play_is_deterministic() {
    let puzzle = Arc::new(load_puzzle(&fixture()).unwrap());
    let mut a = Session::start(Arc::clone(&puzzle), EngineConfig::default());
    let mut b = Session::start(puzzle, EngineConfig::default());

    assert_eq!(simulate(&mut a), simulate(&mut b));
    assert_eq!(a.state(), b.state());
}

#[test]
fn directory_session_records_history() {
    let dir = tempfile::TempDir::new().unwrap();
    let puzzles = dir.path().join("puzzles");
    std::fs::create_dir_all(&puzzles).unwrap();
    std::fs::copy(fixture(), puzzles.join("elevator.json")).unwrap();

    let source = DirectorySource::new(&puzzles);
    assert_eq!(source.list().unwrap(), vec!["elevator"]);

    let mut session = Session::open(&source, "elevator", EngineConfig::default()).unwrap();
    simulate(&mut session);
    assert!(session.is_cleared());

    let history_path = dir.path().join("history.json");
    {
        let mut store = JsonHistoryStore::open(&history_path).unwrap();
        store.mark_solved(session.puzzle().id()).unwrap();
        store.save_history(session.into_history()).unwrap();
    }

    let store = JsonHistoryStore::open(&history_path).unwrap();
    assert!(store.is_solved("elevator"));
    let history = store.history("elevator").unwrap();
    assert_eq!(history.puzzle_title, "The Tenth Floor");
    assert_eq!(history.entries.len(), 4);
}

#[test]
fn missing_puzzle_in_directory_fails() {
    let dir = tempfile::TempDir::new().unwrap();
    let source = DirectorySource::new(dir.path());
    assert!(Session::open(&source, "nowhere", EngineConfig::default()).is_err());
}

#[test]
fn report_matches_calibration() {
    let puzzle = load_puzzle(&fixture()).unwrap();
    let report = puzzle.report();

    let p1 = report.iter().find(|r| r.id == "P1").unwrap();
    let anomalies: Vec<&str> = p1.anomalies.iter().map(|d| d.as_str()).collect();
    assert_eq!(anomalies, vec!["d1", "d3"]);
    assert_eq!(p1.threshold, Some(1));
    assert_eq!(p1.depth, Some(2));

    let p4 = report.iter().find(|r| r.id == "P4").unwrap();
    assert!(p4.anomalies.is_empty());
    assert_eq!(p4.explained, 5);
}
