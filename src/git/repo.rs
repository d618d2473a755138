//! Repository handle and the accessor seam used by the provenance search

use super::error::GitError;
use crate::models::{git_time, AttributionSpan, ChangeOverlap, Commit, CommitId};
use git2::Repository;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Read-only view of a repository's history.
///
/// Implementations are not required to be `Sync`; concurrent callers each
/// hold their own handle.
pub trait RepoAccess {
    /// Attribution spans for `path` at the current tip.
    fn attribution_spans(&self, path: &str) -> Result<Vec<AttributionSpan>, GitError>;

    /// Look up a commit by id.
    fn commit(&self, id: CommitId) -> Result<Commit, GitError>;

    /// Changed windows of `path` between two commits, in `to`'s line numbers.
    fn diff(&self, from: CommitId, to: CommitId, path: &str) -> Result<ChangeOverlap, GitError>;

    /// Commits touching `path`, most recent first, first parent only,
    /// following renames, at most `limit` entries.
    fn history(&self, path: &str, limit: usize) -> Result<Vec<CommitId>, GitError>;
}

/// A git repository opened through libgit2.
pub struct GitRepo {
    pub(super) repo: Repository,
    root: PathBuf,
}

impl GitRepo {
    /// Open a git repository.
    ///
    /// # Arguments
    /// * `path` - Path to the repository (or any subdirectory)
    pub fn open(path: &Path) -> Result<Self, GitError> {
        let repo = Repository::discover(path).map_err(|source| GitError::Repository {
            path: path.to_path_buf(),
            source,
        })?;
        let root = repo
            .workdir()
            .ok_or_else(|| GitError::BareRepository {
                path: repo.path().to_path_buf(),
            })?
            .to_path_buf();
        debug!("Opened git repository at {:?}", repo.path());
        Ok(Self { repo, root })
    }

    /// Working directory root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Look up a commit and copy out the fields the resolver reads.
    pub fn find_commit(&self, id: CommitId) -> Result<Commit, GitError> {
        let commit = self
            .repo
            .find_commit(id)
            .map_err(|source| GitError::CommitNotFound { id, source })?;
        let author = commit.author().name().unwrap_or("Unknown").to_string();
        Ok(Commit {
            id,
            author,
            time: git_time(&commit.time()),
            message: String::from_utf8_lossy(commit.message_bytes()).into_owned(),
            parents: commit.parent_ids().collect(),
        })
    }

    /// Get the list of all files in the HEAD tree.
    pub fn tracked_files(&self) -> Result<Vec<String>, GitError> {
        let tree = self
            .repo
            .head()
            .and_then(|head| head.peel_to_tree())
            .map_err(GitError::Head)?;

        let mut files = Vec::new();
        tree.walk(git2::TreeWalkMode::PreOrder, |dir, entry| {
            if entry.kind() == Some(git2::ObjectType::Blob) {
                files.push(format!("{}{}", dir, entry.name().unwrap_or("")));
            }
            git2::TreeWalkResult::Ok
        })
        .map_err(GitError::Head)?;

        Ok(files)
    }
}

impl RepoAccess for GitRepo {
    fn attribution_spans(&self, path: &str) -> Result<Vec<AttributionSpan>, GitError> {
        self.blame_spans(path)
    }

    fn commit(&self, id: CommitId) -> Result<Commit, GitError> {
        self.find_commit(id)
    }

    fn diff(&self, from: CommitId, to: CommitId, path: &str) -> Result<ChangeOverlap, GitError> {
        self.diff_file(from, to, path)
    }

    fn history(&self, path: &str, limit: usize) -> Result<Vec<CommitId>, GitError> {
        self.file_history(path, limit)
    }
}

/// Render a repository path with `/` separators.
pub(crate) fn slash_path(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}
