//! Per-file processing with an inner hunk pool

use super::hunk::{process_hunk, HunkContext, HunkError};
use crate::git::{GitError, GitRepo, RepoAccess};
use crate::models::{AttributionSpan, ProvenanceRecord};
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Everything one file produced.
///
/// A file without attribution (untracked, deleted, unreadable) carries the
/// error and no records. Individual dropped hunks never hide the records of
/// the others.
#[derive(Debug)]
pub struct FileOutcome {
    pub file: String,
    pub records: Vec<ProvenanceRecord>,
    pub dropped: Vec<HunkError>,
    pub error: Option<GitError>,
}

impl FileOutcome {
    fn unattributed(file: &str, error: GitError) -> Self {
        Self {
            file: file.to_string(),
            records: Vec::new(),
            dropped: Vec::new(),
            error: Some(error),
        }
    }

    /// True when attribution succeeded and no hunk was dropped.
    pub fn is_complete(&self) -> bool {
        self.error.is_none() && self.dropped.is_empty()
    }
}

/// Processes the spans of one file on a bounded thread pool.
///
/// Hunk tasks open their own repository handle per rayon split, since a
/// `git2::Repository` cannot be shared between threads.
pub struct FileProcessor {
    root: PathBuf,
    ctx: HunkContext,
    pool: rayon::ThreadPool,
}

impl FileProcessor {
    pub fn new(
        root: &Path,
        ctx: HunkContext,
        hunk_workers: usize,
    ) -> Result<Self, rayon::ThreadPoolBuildError> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(hunk_workers.max(1))
            .build()?;
        Ok(Self {
            root: root.to_path_buf(),
            ctx,
            pool,
        })
    }

    /// Attribute `path` and build one record per span.
    ///
    /// `repo` serves the attribution and history queries and single-span
    /// files; wider files fan out across the pool. The history list is
    /// fetched once and shared by every span.
    pub fn process(&self, repo: &GitRepo, path: &str) -> FileOutcome {
        let spans = match repo.attribution_spans(path) {
            Ok(spans) => spans,
            Err(e) => {
                debug!("No attribution for {}: {}", path, e);
                return FileOutcome::unattributed(path, e);
            }
        };

        let history = match repo.history(path, self.ctx.searcher.window()) {
            Ok(history) => Some(history),
            Err(e) => {
                debug!("History of {} unavailable, searching per hunk: {}", path, e);
                None
            }
        };
        let history = history.as_deref();

        let results: Vec<Result<ProvenanceRecord, HunkError>> =
            if spans.len() <= 1 || self.pool.current_num_threads() <= 1 {
                spans
                    .iter()
                    .map(|span| process_hunk(repo, span, history, &self.ctx))
                    .collect()
            } else {
                self.pool.install(|| {
                    spans
                        .par_iter()
                        .map_init(
                            || GitRepo::open(&self.root),
                            |handle, span| match handle {
                                Ok(handle) => process_hunk(&*handle, span, history, &self.ctx),
                                Err(e) => Err(handle_error(span, e)),
                            },
                        )
                        .collect()
                })
            };

        let mut outcome = FileOutcome {
            file: path.to_string(),
            records: Vec::with_capacity(results.len()),
            dropped: Vec::new(),
            error: None,
        };
        for result in results {
            match result {
                Ok(record) => outcome.records.push(record),
                Err(e) => {
                    debug!("Dropping hunk: {}", e);
                    outcome.dropped.push(e);
                }
            }
        }
        outcome
    }
}

fn handle_error(span: &AttributionSpan, error: &GitError) -> HunkError {
    HunkError::Handle {
        path: span.path.clone(),
        range: span.range,
        reason: error.to_string(),
    }
}
