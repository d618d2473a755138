//! Error kinds raised by the repository accessor

use crate::models::CommitId;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while reading a repository.
///
/// Only [`GitError::Repository`] and [`GitError::BareRepository`] abort a
/// run; every other kind is absorbed at file, hunk or search-step level.
#[derive(Error, Debug)]
pub enum GitError {
    #[error("failed to open git repository at {}", path.display())]
    Repository {
        path: PathBuf,
        #[source]
        source: git2::Error,
    },

    #[error("repository at {} has no working directory (bare repo?)", path.display())]
    BareRepository { path: PathBuf },

    #[error("failed to resolve the HEAD tree")]
    Head(#[source] git2::Error),

    #[error("no history for {path} at HEAD")]
    FileNotTracked {
        path: String,
        #[source]
        source: git2::Error,
    },

    #[error("commit {id} not found")]
    CommitNotFound {
        id: CommitId,
        #[source]
        source: git2::Error,
    },

    #[error("failed to diff {path} between {from} and {to}")]
    DiffComputation {
        from: CommitId,
        to: CommitId,
        path: String,
        #[source]
        source: git2::Error,
    },

    #[error("failed to list history of {path}")]
    HistoryQuery {
        path: String,
        #[source]
        source: git2::Error,
    },
}

impl GitError {
    /// Whether this error should abort a whole mining run.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            GitError::Repository { .. } | GitError::BareRepository { .. }
        )
    }
}
