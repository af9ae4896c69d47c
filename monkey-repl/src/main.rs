//! Read-parse-print loop for monkey.
//!
//! Each line (or the whole of `FILE`) is parsed and printed back in its
//! canonical, fully parenthesized form, which makes the parser's precedence
//! decisions visible.

use std::fs;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::process;

use anyhow::{Context, Result};
use clap::Parser;
use monkey::{parse, ParseErrors, Program};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

const PROMPT: &str = ">> ";

/// Parses monkey source and prints the tree it was parsed into.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Increase log verbosity (-v debug, -vv trace). Overrides RUST_LOG.
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Parse this file instead of starting the interactive prompt.
    file: Option<PathBuf>,
}

fn init_logging(verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

fn render(program: &Program) -> String {
    match program.string() {
        Ok(text) => text,
        Err(e) => format!("error: {}", e),
    }
}

fn print_errors(errors: &ParseErrors) {
    for err in errors.iter() {
        eprintln!("error: {}", err);
    }
}

fn run_file(path: &Path) -> Result<bool> {
    let source = fs::read_to_string(path)
        .with_context(|| format!("failed to read '{}'", path.display()))?;
    info!(path = %path.display(), bytes = source.len(), "parsing file");

    match parse(&source) {
        Ok(program) => {
            println!("{}", render(&program));
            Ok(true)
        }
        Err(errors) => {
            print_errors(&errors);
            Ok(false)
        }
    }
}

fn run_prompt() -> Result<()> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let mut line = String::new();

    loop {
        write!(stdout, "{}", PROMPT)?;
        stdout.flush()?;

        line.clear();
        if stdin.lock().read_line(&mut line)? == 0 {
            debug!("end of input");
            return Ok(());
        }

        match parse(&line) {
            Ok(program) => writeln!(stdout, "{}", render(&program))?,
            Err(errors) => print_errors(&errors),
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    match &args.file {
        Some(path) => {
            if !run_file(path)? {
                process::exit(1);
            }
            Ok(())
        }
        None => run_prompt(),
    }
}
