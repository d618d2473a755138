//! Repository-wide fan-out over files
//!
//! A producer feeds file paths into a bounded channel; each outer worker
//! opens its own repository handle and file processor (with its own hunk
//! pool), and sends one [`FileOutcome`] per file back to the collecting
//! thread.
//!
//! ```text
//! files ─▶ [bounded] ─▶ worker 1..N (GitRepo + FileProcessor) ─▶ [bounded] ─▶ table
//! ```

use super::file::{FileOutcome, FileProcessor};
use super::files::{collect_files, collect_tracked_files, ExcludeRules};
use super::hunk::HunkContext;
use crate::classifier::FixClassifier;
use crate::config::MinerConfig;
use crate::git::{GitError, GitRepo};
use crate::models::ProvenanceTable;
use crate::provenance::ProvenanceSearcher;
use crossbeam_channel::bounded;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::path::Path;
use std::thread;
use tracing::{debug, info, warn};

/// Mines every selected file of a repository into one table.
pub struct RepositoryWalker {
    config: MinerConfig,
    rules: ExcludeRules,
    ctx: HunkContext,
}

impl RepositoryWalker {
    /// Build a walker. Fails only if the fix vocabulary cannot be compiled.
    pub fn new(config: MinerConfig) -> Result<Self, regex::Error> {
        let ctx = HunkContext {
            classifier: FixClassifier::new(&config.keywords)?,
            searcher: ProvenanceSearcher::new(config.window),
        };
        Ok(Self {
            rules: ExcludeRules::from_config(&config.exclude),
            config,
            ctx,
        })
    }

    /// Files that a run over `repo` would process.
    pub fn select_files(&self, repo: &GitRepo) -> Vec<String> {
        if !self.config.tracked_only {
            return collect_files(repo.root(), &self.rules);
        }
        match collect_tracked_files(repo, &self.rules) {
            Ok(files) => files,
            Err(e) => {
                warn!("Could not list tracked files: {}", e);
                Vec::new()
            }
        }
    }

    pub fn run(&self, repo_path: &Path) -> Result<ProvenanceTable, GitError> {
        self.run_with_progress(repo_path, None)
    }

    /// Mine the repository at `repo_path`.
    ///
    /// Only failing to open the repository is an error. Files and hunks that
    /// fail are counted in the table's stats and otherwise skipped.
    /// `progress` receives `(files_done, files_total)` after each file.
    pub fn run_with_progress(
        &self,
        repo_path: &Path,
        progress: Option<&(dyn Fn(usize, usize) + Sync)>,
    ) -> Result<ProvenanceTable, GitError> {
        let repo = GitRepo::open(repo_path)?;
        let root = repo.root().to_path_buf();
        let files = self.select_files(&repo);
        drop(repo);

        let total_files = files.len();
        let num_workers = self.config.workers.clamp(1, total_files.max(1));
        info!(
            "Mining {} files in {} (workers={}, hunk_workers={}, window={})",
            total_files,
            root.display(),
            num_workers,
            self.config.hunk_workers,
            self.config.window
        );

        let mut table = ProvenanceTable::default();
        table.stats.files_total = total_files;

        let (file_tx, file_rx) = bounded::<String>(num_workers * 2);
        let (result_tx, result_rx) = bounded::<FileResult>(num_workers * 2);

        thread::scope(|scope| {
            // Producer: feed file paths
            scope.spawn(move || {
                for file in files {
                    if file_tx.send(file).is_err() {
                        break; // every worker is gone
                    }
                }
            });

            for worker in 0..num_workers {
                let rx = file_rx.clone();
                let tx = result_tx.clone();
                let root = root.as_path();

                scope.spawn(move || {
                    let handle = match GitRepo::open(root) {
                        Ok(handle) => handle,
                        Err(e) => {
                            warn!("Worker {} could not open repository: {}", worker, e);
                            return;
                        }
                    };
                    let processor = match FileProcessor::new(
                        root,
                        self.ctx.clone(),
                        self.config.hunk_workers,
                    ) {
                        Ok(processor) => processor,
                        Err(e) => {
                            warn!("Worker {} could not start its hunk pool: {}", worker, e);
                            return;
                        }
                    };

                    for path in rx {
                        let result = guarded(path, |path| processor.process(&handle, path));
                        if tx.send(result).is_err() {
                            break; // collector closed
                        }
                    }
                });
            }

            // Drop our copies so the channels close once the workers finish
            drop(file_rx);
            drop(result_tx);

            let mut done = 0;
            for result in result_rx {
                done += 1;
                if let Some(cb) = progress {
                    cb(done, total_files);
                }
                absorb(&mut table, result);
            }
        });

        let processed =
            table.stats.files_attributed + table.stats.files_skipped + table.stats.files_failed;
        if processed < total_files {
            warn!(
                "{} of {} files were not processed",
                total_files - processed,
                total_files
            );
        }

        table.sort();
        info!(
            "Mined {} records from {} files ({} skipped, {} failed, {} hunks dropped, {} resolved)",
            table.len(),
            table.stats.files_attributed,
            table.stats.files_skipped,
            table.stats.files_failed,
            table.stats.hunks_dropped,
            table.stats.resolved
        );
        Ok(table)
    }
}

/// What a worker reports for one file.
enum FileResult {
    Done(FileOutcome),
    /// Processing panicked; the file contributes nothing
    Panicked(String),
}

/// Run `process` on one file, turning a panic into [`FileResult::Panicked`]
/// so the worker and the run carry on.
fn guarded<F>(path: String, process: F) -> FileResult
where
    F: FnOnce(&str) -> FileOutcome,
{
    match catch_unwind(AssertUnwindSafe(|| process(&path))) {
        Ok(outcome) => FileResult::Done(outcome),
        Err(_) => FileResult::Panicked(path),
    }
}

fn absorb(table: &mut ProvenanceTable, result: FileResult) {
    let outcome = match result {
        FileResult::Done(outcome) => outcome,
        FileResult::Panicked(path) => {
            warn!("Mining {} panicked; file skipped", path);
            table.stats.files_failed += 1;
            return;
        }
    };
    let stats = &mut table.stats;
    match &outcome.error {
        Some(e) => {
            debug!("Skipped {}: {}", outcome.file, e);
            stats.files_skipped += 1;
        }
        None => stats.files_attributed += 1,
    }
    stats.hunks_dropped += outcome.dropped.len();
    stats.resolved += outcome
        .records
        .iter()
        .filter(|r| r.previous.is_some())
        .count();
    table.records.extend(outcome.records);
}
