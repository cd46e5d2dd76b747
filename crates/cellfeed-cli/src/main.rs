//! cellfeed CLI - replay analytics cell feeds

mod logging;
mod replay;

use std::cell::RefCell;
use std::fs::File;
use std::io::{self, BufReader};
use std::path::{Path, PathBuf};
use std::rc::Rc;

use anyhow::{Context, Result};
use cellfeed::FeedConfig;
use cellfeed_core::{CellCoordinate, CellFormat, GridSource};
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "cellfeed")]
#[command(author, version, about = "Replay and inspect analytics cell feeds")]
struct Cli {
    /// Configuration file (TOML)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Only log errors
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay a JSONL feed script and print the emitted events
    Replay {
        /// Feed script, one message per line
        script: PathBuf,

        /// Row of the observed cell
        #[arg(long)]
        row: Option<u32>,

        /// Column of the observed cell
        #[arg(long)]
        col: Option<u32>,

        /// Cell format (CELL, HISTORY, EXPANDED or a custom name)
        #[arg(short, long, default_value = "CELL")]
        format: CellFormat,

        /// View id of the grid
        #[arg(short, long, default_value = "")]
        source: String,

        /// Label used in diagnostics
        #[arg(short, long)]
        label: Option<String>,

        /// Request calculation logs
        #[arg(long)]
        log: bool,
    },

    /// Print the viewport coordinates requested for a cell
    Coords {
        #[arg(long)]
        row: u32,

        #[arg(long)]
        col: u32,

        #[arg(short, long, default_value = "CELL")]
        format: CellFormat,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(logging::Verbosity::from_flags(cli.verbose, cli.quiet));

    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Replay {
            script,
            row,
            col,
            format,
            source,
            label,
            log,
        } => {
            let mut cell = config.cell(GridSource::portfolio(source), row, col, format);
            cell.log |= log;
            run_replay(&script, cell, label.as_deref())
        }
        Commands::Coords { row, col, format } => {
            let cell = CellCoordinate::new(row, col, format);
            println!("{}", cell.title_probe());
            println!("{cell}");
            Ok(())
        }
    }
}

fn load_config(path: Option<&Path>) -> Result<FeedConfig> {
    match path {
        Some(path) => FeedConfig::load(path)
            .with_context(|| format!("Failed to load config '{}'", path.display())),
        None => Ok(FeedConfig::default()),
    }
}

fn run_replay(script: &Path, cell: cellfeed::CellConfig, label: Option<&str>) -> Result<()> {
    let file =
        File::open(script).with_context(|| format!("Failed to open '{}'", script.display()))?;
    let out = Rc::new(RefCell::new(io::stdout().lock()));

    let summary = replay::replay(BufReader::new(file), out, cell, label)?;

    eprintln!(
        "Replayed {} messages: {} pushes, {} titles, {} fatal events",
        summary.lines, summary.pushes, summary.titles, summary.fatals
    );
    if !summary.live {
        eprintln!("Subscription was torn down");
    }
    Ok(())
}
