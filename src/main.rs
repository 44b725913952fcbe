use std::error::Error;
use std::fs::File;
use std::io::{self, BufReader};
use std::path::{Path, PathBuf};

use clap::Parser;
use log::{LevelFilter, info};
use rbdict::dictionary::{PersistFormat, Session};

/// Case-insensitive word dictionary. Reads commands, one per line, and
/// answers each with a status line on stdout.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Cli {
    /// Read commands from this file instead of stdin.
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Snapshot format used by `! Save` and `! Load`.
    #[arg(short, long, value_enum, default_value_t)]
    format: PersistFormat,

    /// Diagnostics at or above this level go to stderr.
    #[arg(long, default_value = "warn")]
    log_level: LevelFilter,

    /// Also write debug-level diagnostics to this file.
    #[arg(long)]
    log_file: Option<PathBuf>,
}

fn initialize_logging(level: LevelFilter, log_file: Option<&Path>) -> Result<(), Box<dyn Error>> {
    use simplelog::*;

    // stdout carries the protocol, so the terminal logger stays on stderr
    let mut loggers: Vec<Box<dyn SharedLogger>> =
        vec![TermLogger::new(level, Config::default(), TerminalMode::Stderr, ColorChoice::Auto)];
    if let Some(path) = log_file {
        loggers.push(WriteLogger::new(LevelFilter::Debug, Config::default(), File::create(path)?));
    }
    CombinedLogger::init(loggers)?;
    Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    initialize_logging(cli.log_level, cli.log_file.as_deref())?;

    let mut session = Session::new(cli.format);
    let stdout = io::stdout();
    let mut out = stdout.lock();
    match &cli.input {
        Some(path) => {
            info!("reading commands from {}", path.display());
            session.run(BufReader::new(File::open(path)?), &mut out)?;
        }
        None => session.run(io::stdin().lock(), &mut out)?,
    }
    info!("done, {} entries in the dictionary", session.tree().len());
    Ok(())
}
