//! Per-span record assembly

use crate::classifier::FixClassifier;
use crate::git::{GitError, RepoAccess};
use crate::models::{AttributionSpan, CommitId, LineRange, ProvenanceRecord};
use crate::provenance::ProvenanceSearcher;
use thiserror::Error;
use tracing::debug;

/// Everything a hunk needs besides the repository.
#[derive(Debug, Clone, Default)]
pub struct HunkContext {
    pub classifier: FixClassifier,
    pub searcher: ProvenanceSearcher,
}

/// A span that produced no record.
#[derive(Error, Debug)]
pub enum HunkError {
    #[error("failed to read commit for {path}:{range}")]
    Commit {
        path: String,
        range: LineRange,
        #[source]
        source: GitError,
    },

    #[error("provenance search failed for {path}:{range}")]
    Provenance {
        path: String,
        range: LineRange,
        #[source]
        source: GitError,
    },

    #[error("no repository handle for {path}:{range}: {reason}")]
    Handle {
        path: String,
        range: LineRange,
        reason: String,
    },
}

/// Build the record for one attribution span.
///
/// `history` is the file's history list when the caller already fetched it;
/// with `None` the search lists it itself. Search degradation (history
/// unavailable, skipped ancestors) still yields a record, with the previous
/// commit left empty where nothing was found.
pub fn process_hunk<R: RepoAccess + ?Sized>(
    repo: &R,
    span: &AttributionSpan,
    history: Option<&[CommitId]>,
    ctx: &HunkContext,
) -> Result<ProvenanceRecord, HunkError> {
    let commit = repo.commit(span.commit).map_err(|source| HunkError::Commit {
        path: span.path.clone(),
        range: span.range,
        source,
    })?;

    let message = commit.flat_message();
    let is_fix = ctx.classifier.is_fix(&message);

    let searched = match history {
        Some(history) => {
            ctx.searcher
                .search_history(repo, history, span.commit, &span.path, span.range)
        }
        None => ctx
            .searcher
            .find_previous(repo, span.commit, &span.path, span.range),
    };
    let outcome = searched.map_err(|source| HunkError::Provenance {
        path: span.path.clone(),
        range: span.range,
        source,
    })?;
    if !outcome.is_clean() {
        debug!(
            "Degraded search for {}:{} ({} ancestors skipped)",
            span.path,
            span.range,
            outcome.skipped.len()
        );
    }

    Ok(ProvenanceRecord {
        file: span.path.clone(),
        commit: commit.id,
        author: commit.author,
        message,
        date: commit.time,
        range: span.range,
        previous: outcome.into_previous(),
        is_fix,
    })
}
