//! # Inkboard CLI
//!
//! Headless driver for the Inkboard engine: normalises SVG documents,
//! computes import framing and replays recorded input sessions.

use anyhow::Context;
use clap::{Parser, Subcommand};
use inkboard_core::{BoardConfig, InputEvent, Whiteboard};
use kurbo::{Rect, Size};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(name = "inkboard")]
#[command(about = "Headless driver for the Inkboard drawing engine")]
#[command(version)]
struct Cli {
    /// JSON file overriding board constants.
    #[arg(long, global = true, env = "INKBOARD_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Import an SVG and export it again in normalised form.
    Convert { input: PathBuf, output: PathBuf },
    /// Print the transform that frames a document in a viewport.
    Fit {
        input: PathBuf,
        #[arg(long, default_value = "1280")]
        width: f64,
        #[arg(long, default_value = "720")]
        height: f64,
    },
    /// Feed a JSON list of input events into a fresh board and save the result.
    Replay { events: PathBuf, output: PathBuf },
    /// Print stroke count and bounds of a document.
    Info { input: PathBuf },
}

#[derive(Serialize)]
struct DocumentInfo {
    strokes: usize,
    points: usize,
    bounds: Option<Rect>,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Command::Convert { input, output } => {
            let board = open_document(&input, config, None)?;
            let svg = board.save_document()?;
            fs::write(&output, svg)
                .with_context(|| format!("Failed to write {}", output.display()))?;
            log::info!("Wrote {}", output.display());
        }
        Command::Fit {
            input,
            width,
            height,
        } => {
            let board = open_document(&input, config, Some(Size::new(width, height)))?;
            println!("{}", serde_json::to_string_pretty(board.viewport())?);
        }
        Command::Replay { events, output } => {
            let text = fs::read_to_string(&events)
                .with_context(|| format!("Failed to read {}", events.display()))?;
            let recorded: Vec<InputEvent> = serde_json::from_str(&text)
                .with_context(|| format!("Invalid event list in {}", events.display()))?;

            let mut board = Whiteboard::with_config(config);
            log::info!("Replaying {} events", recorded.len());
            for event in recorded {
                board.handle_event(event);
            }
            log::info!("{}", board.status());
            let svg = board.save_document()?;
            fs::write(&output, svg)
                .with_context(|| format!("Failed to write {}", output.display()))?;
            println!("{} strokes -> {}", board.strokes().len(), output.display());
        }
        Command::Info { input } => {
            let board = open_document(&input, config, None)?;
            let store = board.strokes();
            let info = DocumentInfo {
                strokes: store.len(),
                points: store.iter().map(|stroke| stroke.points().len()).sum(),
                bounds: store.bounding_box(),
            };
            println!("{}", serde_json::to_string_pretty(&info)?);
        }
    }

    Ok(())
}

fn load_config(path: Option<&Path>) -> anyhow::Result<BoardConfig> {
    let Some(path) = path else {
        return Ok(BoardConfig::default());
    };
    let json = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config {}", path.display()))?;
    let config = BoardConfig::from_json(&json)
        .with_context(|| format!("Invalid config {}", path.display()))?;
    log::debug!("Loaded config from {}", path.display());
    Ok(config)
}

fn open_document(
    path: &Path,
    config: BoardConfig,
    viewport: Option<Size>,
) -> anyhow::Result<Whiteboard> {
    let text =
        fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let mut board = Whiteboard::with_config(config);
    if let Some(size) = viewport {
        board.on_resize(size);
    }
    let count = board
        .load_document(&text)
        .with_context(|| format!("Failed to load {}", path.display()))?;
    log::info!("Loaded {count} strokes from {}", path.display());
    Ok(board)
}
