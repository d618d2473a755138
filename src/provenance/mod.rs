//! Bounded backward search for the commit that introduced a span
//!
//! Given the commit blame assigned to a span, walk the file's history
//! (most recent first, first parent only, at most `window` entries) from
//! just below that commit and return the first ancestor whose diff to it
//! touches an overlapping line window. That ancestor is the nearest one in
//! history order; older overlapping ancestors are never preferred.
//!
//! The search is deliberately bounded. An introducing commit further back
//! than the window is reported as not found rather than searched for, and
//! content reached only through a merge's second parent is never found.

use crate::git::{GitError, RepoAccess};
use crate::models::{CommitId, LineRange, PreviousCommit};
use tracing::debug;

/// Default history window.
pub const DEFAULT_WINDOW: usize = 50;

/// Result of one provenance search.
#[derive(Debug)]
pub enum Provenance {
    /// Nearest ancestor whose change overlaps the span
    Found(PreviousCommit),
    /// The span's commit is not in the bounded history of the file
    NotInWindow,
    /// No ancestor inside the window overlaps; the span first appears here
    Exhausted,
    /// History could not be listed
    HistoryUnavailable(GitError),
}

/// An ancestor skipped because its diff could not be computed.
#[derive(Debug)]
pub struct SkippedCandidate {
    pub id: CommitId,
    pub error: GitError,
}

/// A search result together with whatever was skipped to reach it.
#[derive(Debug)]
pub struct SearchOutcome {
    pub provenance: Provenance,
    pub skipped: Vec<SkippedCandidate>,
    /// Number of ancestors whose diff was examined
    pub examined: usize,
}

impl SearchOutcome {
    fn new(provenance: Provenance) -> Self {
        Self {
            provenance,
            skipped: Vec::new(),
            examined: 0,
        }
    }

    pub fn previous(&self) -> Option<&PreviousCommit> {
        match &self.provenance {
            Provenance::Found(previous) => Some(previous),
            _ => None,
        }
    }

    pub fn into_previous(self) -> Option<PreviousCommit> {
        match self.provenance {
            Provenance::Found(previous) => Some(previous),
            _ => None,
        }
    }

    /// True when no step of the search failed.
    pub fn is_clean(&self) -> bool {
        self.skipped.is_empty() && !matches!(self.provenance, Provenance::HistoryUnavailable(_))
    }
}

/// Searches file history for the commit that introduced a span.
#[derive(Debug, Clone, Copy)]
pub struct ProvenanceSearcher {
    window: usize,
}

impl ProvenanceSearcher {
    pub fn new(window: usize) -> Self {
        Self { window }
    }

    /// Maximum number of history entries listed per search.
    pub fn window(&self) -> usize {
        self.window
    }

    /// Find the nearest ancestor of `current` whose change to `path`
    /// overlaps `range`.
    ///
    /// History and diff failures degrade the outcome instead of failing.
    /// The only error returned is a failed metadata lookup for the matched
    /// ancestor, since skipping it would report an older, wrong commit.
    pub fn find_previous<R: RepoAccess + ?Sized>(
        &self,
        repo: &R,
        current: CommitId,
        path: &str,
        range: LineRange,
    ) -> Result<SearchOutcome, GitError> {
        match repo.history(path, self.window) {
            Ok(history) => self.search_history(repo, &history, current, path, range),
            Err(e) => {
                debug!("History unavailable for {}: {}", path, e);
                Ok(SearchOutcome::new(Provenance::HistoryUnavailable(e)))
            }
        }
    }

    /// Like [`find_previous`](Self::find_previous), over a history list
    /// already fetched for `path` with this searcher's window.
    ///
    /// The list depends only on the file, so callers resolving many spans
    /// of one file can fetch it once and share it.
    pub fn search_history<R: RepoAccess + ?Sized>(
        &self,
        repo: &R,
        history: &[CommitId],
        current: CommitId,
        path: &str,
        range: LineRange,
    ) -> Result<SearchOutcome, GitError> {
        let history = &history[..history.len().min(self.window)];
        let Some(position) = history.iter().position(|id| *id == current) else {
            return Ok(SearchOutcome::new(Provenance::NotInWindow));
        };

        let mut outcome = SearchOutcome::new(Provenance::Exhausted);
        for &candidate in &history[position + 1..] {
            let overlap = match repo.diff(candidate, current, path) {
                Ok(overlap) => overlap,
                Err(error) => {
                    debug!("Skipping ancestor {} of {}: {}", candidate, current, error);
                    outcome.skipped.push(SkippedCandidate {
                        id: candidate,
                        error,
                    });
                    continue;
                }
            };
            outcome.examined += 1;

            if overlap.intersects(range) {
                let commit = repo.commit(candidate)?;
                outcome.provenance = Provenance::Found(PreviousCommit::from(&commit));
                return Ok(outcome);
            }
        }

        Ok(outcome)
    }
}

impl Default for ProvenanceSearcher {
    fn default() -> Self {
        Self::new(DEFAULT_WINDOW)
    }
}
