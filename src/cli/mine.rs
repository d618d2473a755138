//! Mine command - build the provenance table for a repository

use super::MineArgs;
use anyhow::{Context, Result};
use console::style;
use fixtrace::config::{load_config, MinerConfig};
use fixtrace::models::ProvenanceTable;
use fixtrace::pipeline::RepositoryWalker;
use fixtrace::reporters::{self, OutputFormat, ReportOptions};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Instant;
use tracing::debug;

/// Where rendered output goes.
#[derive(Debug, PartialEq, Eq)]
enum Destination {
    Stdout,
    File(PathBuf),
}

/// Run the mine command
pub fn run(path: &Path, config_path: Option<&Path>, args: &MineArgs) -> Result<()> {
    let start = Instant::now();
    let repo_path = path
        .canonicalize()
        .with_context(|| format!("Path does not exist: {}", path.display()))?;

    let cwd = std::env::current_dir().context("Failed to read current directory")?;
    let mut config = load_config(config_path, &cwd)?;
    apply_overrides(&mut config, args);
    config.validate()?;
    debug!("Effective config: {:?}", config);

    let format = OutputFormat::from_str(&args.format)?;
    let destination = destination(args.output.as_deref(), &repo_path, format);

    let walker = RepositoryWalker::new(config).context("Invalid fix keyword vocabulary")?;
    let table = run_walker(&walker, &repo_path, args.no_progress)?;

    let rendered = reporters::render(&table, format, &ReportOptions { full_hash: args.full_hash })?;
    match &destination {
        Destination::Stdout => print!("{}", rendered),
        Destination::File(out) => std::fs::write(out, &rendered)
            .with_context(|| format!("Failed to write {}", out.display()))?,
    }

    print_summary(&table, &destination, start);
    Ok(())
}

/// Command-line values win over the config file.
fn apply_overrides(config: &mut MinerConfig, args: &MineArgs) {
    if let Some(workers) = args.workers {
        config.workers = workers;
    }
    if let Some(hunk_workers) = args.hunk_workers {
        config.hunk_workers = hunk_workers;
    }
    if let Some(window) = args.window {
        config.window = window;
    }
    if args.tracked_only {
        config.tracked_only = true;
    }
}

/// Resolve `-o`, defaulting to `<repo>_blame_data.<ext>` beside the repository.
fn destination(output: Option<&Path>, repo_path: &Path, format: OutputFormat) -> Destination {
    match output {
        Some(out) if out.as_os_str() == "-" => Destination::Stdout,
        Some(out) => Destination::File(out.to_path_buf()),
        None => {
            let name = repo_path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| "repo".to_string());
            let file_name = format!("{}_blame_data.{}", name, format.file_extension());
            let dir = repo_path.parent().unwrap_or(repo_path);
            Destination::File(dir.join(file_name))
        }
    }
}

fn run_walker(walker: &RepositoryWalker, repo_path: &Path, quiet: bool) -> Result<ProvenanceTable> {
    let bar = if quiet {
        ProgressBar::hidden()
    } else {
        ProgressBar::new(0)
    };
    bar.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .expect("valid template")
            .progress_chars("█▓▒░  "),
    );
    bar.set_message("Mining files...");

    let on_progress = |done: usize, total: usize| {
        bar.set_length(total as u64);
        bar.set_position(done as u64);
    };
    let table = walker
        .run_with_progress(repo_path, Some(&on_progress))
        .with_context(|| format!("Failed to mine {}", repo_path.display()))?;

    bar.finish_and_clear();
    Ok(table)
}

/// Summary goes to stderr so stdout output stays clean.
fn print_summary(table: &ProvenanceTable, destination: &Destination, start: Instant) {
    let stats = &table.stats;
    let target = match destination {
        Destination::Stdout => "stdout".to_string(),
        Destination::File(path) => path.display().to_string(),
    };

    eprintln!(
        "{} Saved {} records to {}",
        style("✓").green(),
        style(table.len()).cyan(),
        style(target).cyan()
    );
    eprintln!(
        "  {} files mined, {} without history, {} hunks dropped, {} previous commits resolved ({:.1}s)",
        stats.files_attributed,
        style(stats.files_skipped).dim(),
        style(stats.hunks_dropped).dim(),
        style(stats.resolved).cyan(),
        start.elapsed().as_secs_f64()
    );
    if stats.files_failed > 0 {
        eprintln!(
            "  {} {} files failed while mining (see warnings above)",
            style("!").yellow(),
            stats.files_failed
        );
    }
}
