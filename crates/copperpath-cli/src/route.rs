use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use copperpath_board::Board;
use copperpath_router::{RouteEffect, RouteEvent, RouteSettings, RouteState, Router};
use log::{debug, warn};
use std::path::{Path, PathBuf};

#[derive(Args, Debug, Clone)]
#[command(about = "Replay routing events against a board file")]
pub struct RouteArgs {
    /// Board JSON file to route on.
    #[arg(value_name = "BOARD", value_hint = clap::ValueHint::FilePath)]
    pub board: PathBuf,

    /// JSON array of events, e.g. `[{"event": "click", "x": 0, "y": 0}]`.
    #[arg(short, long, value_hint = clap::ValueHint::FilePath)]
    pub events: PathBuf,

    /// Routing rules (TOML). Defaults apply when omitted.
    #[arg(short, long, value_hint = clap::ValueHint::FilePath)]
    pub rules: Option<PathBuf>,

    /// Where to write the routed board. Prints to stdout when omitted.
    #[arg(short, long, value_hint = clap::ValueHint::FilePath)]
    pub output: Option<PathBuf>,

    #[arg(long, help = "Stop at the first event rejected by a clearance check")]
    pub strict: bool,
}

pub fn execute(args: RouteArgs) -> Result<()> {
    let settings = match &args.rules {
        Some(path) => RouteSettings::load(path)?,
        None => RouteSettings::default(),
    };
    let mut board = read_board(&args.board)?;
    let events = read_events(&args.events)?;

    let mut router = Router::new(settings);
    let mut committed = 0;

    for (index, event) in events.into_iter().enumerate() {
        match router.feed_event(event, &mut board) {
            Ok(effects) => {
                for effect in effects {
                    debug!("Event {index}: {effect:?}");
                    if let RouteEffect::Committed(outcome) = effect {
                        committed += 1;
                        eprintln!(
                            "{} {} tracks on {}, removed {}",
                            "Committed".green(),
                            outcome.inserted.len(),
                            outcome.net,
                            outcome.removed.len()
                        );
                    }
                }
            }
            Err(err) if args.strict => {
                return Err(err).with_context(|| format!("Event {index} ({event:?}) rejected"));
            }
            Err(err) => eprintln!("{} event {index}: {err}", "Rejected".yellow()),
        }
    }

    if router.state() == RouteState::Routing {
        warn!("Event script ended mid-route, discarding it");
        router.feed_event(RouteEvent::Abort, &mut board)?;
    }

    let json = board.to_json().context("Failed to serialize board")?;
    match &args.output {
        Some(path) => {
            std::fs::write(path, json + "\n")
                .with_context(|| format!("Failed to write {}", path.display()))?;
            eprintln!(
                "{} {committed} routes to {}",
                "Wrote".green(),
                path.display()
            );
        }
        None => println!("{json}"),
    }

    Ok(())
}

fn read_board(path: &Path) -> Result<Board> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read board {}", path.display()))?;
    Board::from_json(&json).with_context(|| format!("Invalid board file {}", path.display()))
}

fn read_events(path: &Path) -> Result<Vec<RouteEvent>> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read events {}", path.display()))?;
    serde_json::from_str(&json).with_context(|| format!("Invalid event script {}", path.display()))
}
