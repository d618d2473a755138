//! CLI command definitions and handlers

mod init;
mod mine;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use fixtrace::config::MAX_WORKERS;
use std::path::PathBuf;

/// Parse and validate a worker count (1-64)
fn parse_workers(s: &str) -> Result<usize, String> {
    let n: usize = s
        .parse()
        .map_err(|_| format!("'{}' is not a valid number", s))?;
    if n == 0 {
        Err("workers must be at least 1".to_string())
    } else if n > MAX_WORKERS {
        Err(format!("workers cannot exceed {}", MAX_WORKERS))
    } else {
        Ok(n)
    }
}

/// Parse and validate a history window (at least 1)
fn parse_window(s: &str) -> Result<usize, String> {
    let n: usize = s
        .parse()
        .map_err(|_| format!("'{}' is not a valid number", s))?;
    if n == 0 {
        Err("window must be at least 1".to_string())
    } else {
        Ok(n)
    }
}

/// fixtrace - trace bug-fix hunks back to the commits that introduced them
#[derive(Parser, Debug)]
#[command(name = "fixtrace")]
#[command(
    version,
    about = "Trace every blamed hunk to its fix label and the commit that introduced it",
    long_about = "fixtrace blames every tracked file of a git repository, labels each hunk's \
commit as a fix or not from its message, and searches the file's recent first-parent \
history for the nearest earlier commit whose change overlaps the same lines.\n\n\
Run without a subcommand to mine the current directory:\n  \
fixtrace .",
    after_help = "\
Examples:
  fixtrace .                                Mine current repo into ../<repo>_blame_data.csv
  fixtrace /path/to/repo --format json -o - JSON on stdout
  fixtrace . --window 100 --workers 4       Deeper search, fewer workers
  fixtrace init                             Write an example fixtrace.toml"
)]
pub struct Cli {
    /// Path to repository (default: current directory)
    #[arg(global = true, default_value = ".")]
    pub path: PathBuf,

    /// Log level (error, warn, info, debug, trace); RUST_LOG takes precedence
    #[arg(long, global = true, default_value = "warn", value_parser = ["error", "warn", "info", "debug", "trace"])]
    pub log_level: String,

    /// Config file (default: fixtrace.toml or .fixtracerc.json in the current directory)
    #[arg(long, global = true, env = "FIXTRACE_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(flatten)]
    pub mine: MineArgs,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Write an example fixtrace.toml to the current directory
    Init,

    /// Mine a repository into a provenance table (the default command)
    #[command(after_help = "\
Examples:
  fixtrace mine .                           CSV next to the repository
  fixtrace mine . --format json -o out.json JSON to a file
  fixtrace mine . --tracked-only            Only files in the HEAD tree
  fixtrace mine . --full-hash               Full 40-character commit ids")]
    Mine(MineArgs),
}

/// Options for a mining run; unset values come from the config file.
#[derive(Args, Debug, Clone)]
pub struct MineArgs {
    /// Output format: csv or json
    #[arg(long, short = 'f', default_value = "csv", value_parser = ["csv", "json"])]
    pub format: String,

    /// Output file path ('-' for stdout; default: <repo>_blame_data.<ext> next to the repo)
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,

    /// Files processed in parallel (1-64)
    #[arg(long, value_parser = parse_workers)]
    pub workers: Option<usize>,

    /// Hunks processed in parallel within each file (1-64)
    #[arg(long, value_parser = parse_workers)]
    pub hunk_workers: Option<usize>,

    /// History entries searched per hunk
    #[arg(long, value_parser = parse_window)]
    pub window: Option<usize>,

    /// Only mine files in the HEAD tree
    #[arg(long)]
    pub tracked_only: bool,

    /// Write full commit ids instead of 7-character abbreviations
    #[arg(long)]
    pub full_hash: bool,

    /// Hide the progress bar
    #[arg(long)]
    pub no_progress: bool,
}

pub fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Some(Commands::Init) => init::run(),
        Some(Commands::Mine(args)) => mine::run(&cli.path, cli.config.as_deref(), &args),
        None => mine::run(&cli.path, cli.config.as_deref(), &cli.mine),
    }
}
