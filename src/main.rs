//! lateral CLI: play and inspect lateral-thinking puzzles.

use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Parser, Subcommand};
use miette::{IntoDiagnostic, Result};

use lateral::config::EngineConfig;
use lateral::content::{self, DirectorySource, PuzzleSource};
use lateral::error::LateralResult;
use lateral::history::{HistoryStore, JsonHistoryStore};
use lateral::session::{AnswerOutcome, GameEvent, Session};

#[derive(Parser)]
#[command(name = "lateral", version, about = "Belief-revision engine for lateral-thinking puzzles")]
struct Cli {
    /// Engine configuration (TOML).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Where solved puzzles and transcripts are recorded (JSON).
    #[arg(long, global = true)]
    history: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play a puzzle interactively.
    Play {
        /// Puzzle JSON file, or a directory of puzzles together with `--id`.
        puzzle: PathBuf,

        /// Puzzle id when `puzzle` is a directory.
        #[arg(long)]
        id: Option<String>,
    },

    /// Play automatically, always asking the first open question.
    Simulate {
        /// Puzzle JSON file, or a directory of puzzles together with `--id`.
        puzzle: PathBuf,

        /// Puzzle id when `puzzle` is a directory.
        #[arg(long)]
        id: Option<String>,

        /// Print events as JSON lines.
        #[arg(long)]
        json: bool,
    },

    /// Show per-paradigm calibration: threshold, depth and anomalies.
    Inspect {
        /// Puzzle JSON file.
        file: PathBuf,
    },

    /// Validate one or more puzzle files.
    Check {
        /// Puzzle JSON files.
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },

    /// List the puzzles in a directory.
    List {
        /// Directory holding `<id>.json` puzzle files.
        dir: PathBuf,
    },
}

fn main() -> Result<()> {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(3)
                .build(),
        )
    }))
    .ok(); // Ignore error if hook already set (e.g., in tests)

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => EngineConfig::load(path)?,
        None => EngineConfig::default(),
    };
    let mut history = match &cli.history {
        Some(path) => Some(JsonHistoryStore::open(path)?),
        None => None,
    };

    match cli.command {
        Commands::Play { puzzle, id } => {
            let mut session = open_session(&puzzle, id.as_deref(), config)?;
            print_header(&session);
            play(&mut session)?;
            record(history.as_mut(), session)?;
        }

        Commands::Simulate { puzzle, id, json } => {
            let mut session = open_session(&puzzle, id.as_deref(), config)?;
            if !json {
                print_header(&session);
            }
            simulate(&mut session, json)?;
            record(history.as_mut(), session)?;
        }

        Commands::Inspect { file } => {
            let puzzle = content::load_puzzle(&file)?;
            println!("{} ({})", puzzle.title(), puzzle.id());
            println!("  initial paradigm: {}", puzzle.initial_paradigm_id());
            println!("  descriptors: {}  questions: {}", puzzle.descriptors().len(), puzzle.questions().len());
            println!();
            for r in puzzle.report() {
                let threshold = r.threshold.map_or_else(|| "-".to_string(), |t| t.to_string());
                let depth = r.depth.map_or_else(|| "-".to_string(), |d| d.to_string());
                println!("{} \"{}\"", r.id, r.name);
                println!("  threshold: {threshold}  depth: {depth}  explained: {}", r.explained);
                if r.anomalies.is_empty() {
                    println!("  anomalies: none");
                } else {
                    let ids: Vec<&str> = r.anomalies.iter().map(|d| d.as_str()).collect();
                    println!("  anomalies ({}): {}", ids.len(), ids.join(", "));
                }
            }
        }

        Commands::Check { files } => {
            for file in &files {
                let puzzle = content::load_puzzle(file)?;
                println!(
                    "ok {}: {} paradigms, {} questions, {} descriptors",
                    puzzle.id(),
                    puzzle.paradigms().len(),
                    puzzle.questions().len(),
                    puzzle.descriptors().len()
                );
            }
        }

        Commands::List { dir } => {
            let source = DirectorySource::new(dir);
            let ids = source.list()?;
            if ids.is_empty() {
                println!("No puzzles in {}.", source.root().display());
            }
            for id in &ids {
                let mark = match &history {
                    Some(store) if store.is_solved(id) => " [solved]",
                    _ => "",
                };
                match source.load(id) {
                    Ok(puzzle) => println!("  {id}: {}{mark}", puzzle.title()),
                    Err(e) => {
                        tracing::warn!(puzzle = %id, error = %e, "skipping unreadable puzzle");
                        println!("  {id}: <invalid>");
                    }
                }
            }
        }
    }

    Ok(())
}

fn open_session(path: &Path, id: Option<&str>, config: EngineConfig) -> Result<Session> {
    if path.is_dir() {
        let Some(id) = id else {
            miette::bail!("{} is a directory; pass --id to choose a puzzle", path.display());
        };
        Ok(Session::open(&DirectorySource::new(path), id, config)?)
    } else {
        let puzzle = content::load_puzzle(path)?;
        Ok(Session::start(Arc::new(puzzle), config))
    }
}

fn print_header(session: &Session) {
    let puzzle = session.puzzle();
    println!("== {} ==", puzzle.title());
    println!("{}", puzzle.statement());
    let config = session.config();
    tracing::debug!(disclosure = %config.disclosure, epsilon = config.epsilon, "engine configuration");
    println!();
}

fn print_open(session: &Session) {
    println!("Open questions:");
    for group in session.open_by_topic() {
        let heading = group.topic.map_or("Other", |t| t.name.as_str());
        println!("  [{heading}]");
        for (i, q) in group.questions {
            println!("    {}. {}", i + 1, q.text());
        }
    }
}

fn print_outcome(session: &Session, outcome: &AnswerOutcome) {
    for event in &outcome.events {
        match event {
            GameEvent::QuestionAnswered { answer, .. } => println!("-> {answer}"),
            GameEvent::ParadigmShifted { to, .. } => {
                let name = session.puzzle().paradigm(to.as_str()).map_or(to.as_str(), |p| p.name());
                println!("** Your view shifts: {name}");
            }
            GameEvent::QuestionsOpened { ids } => println!("   ({} new question(s))", ids.len()),
            GameEvent::PuzzleCleared => println!("\n*** Solved! ***"),
        }
    }
}

fn play(session: &mut Session) -> Result<()> {
    let stdin = std::io::stdin();
    let mut lines = stdin.lock().lines();

    while !session.is_cleared() {
        if session.open_questions().is_empty() {
            println!("No questions left to ask.");
            break;
        }
        print_open(session);
        print!("Ask (number, q to quit): ");
        std::io::stdout().flush().into_diagnostic()?;

        let Some(line) = lines.next() else { break };
        let line = line.into_diagnostic()?;
        let choice = line.trim();
        if choice.eq_ignore_ascii_case("q") {
            break;
        }
        let picked = choice
            .parse::<usize>()
            .ok()
            .and_then(|n| n.checked_sub(1))
            .and_then(|i| session.open_questions().get(i))
            .map(|q| q.id().clone());
        let Some(question) = picked else {
            println!("Pick a number between 1 and {}.", session.open_questions().len());
            continue;
        };

        let outcome = session.ask(question.as_str())?;
        print_outcome(session, &outcome);
        println!();
    }
    Ok(())
}

fn simulate(session: &mut Session, json: bool) -> Result<()> {
    while !session.is_cleared() {
        let Some(question) = session.open_questions().first().map(|q| q.id().clone()) else {
            if !json {
                println!("Stuck: no open questions remain.");
            }
            break;
        };
        if !json {
            let text = session.open_questions()[0].text().to_string();
            println!("? {text}");
        }
        let outcome = session.ask(question.as_str())?;
        if json {
            for event in &outcome.events {
                println!("{}", serde_json::to_string(event).into_diagnostic()?);
            }
        } else {
            print_outcome(session, &outcome);
        }
    }
    if !json {
        println!("Asked {} question(s).", session.transcript().len());
    }
    Ok(())
}

fn record(store: Option<&mut JsonHistoryStore>, session: Session) -> LateralResult<()> {
    let Some(store) = store else {
        return Ok(());
    };
    if session.is_cleared() {
        store.mark_solved(session.puzzle().id())?;
    }
    store.save_history(session.into_history())?;
    Ok(())
}
