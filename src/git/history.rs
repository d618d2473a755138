//! File history and per-file diffs using libgit2
//!
//! History listing walks first parents only and follows renames, stopping at
//! the commit that added the file or after `limit` entries. Diffs are
//! restricted to one path and reported as hunk windows in new-file lines.

use super::error::GitError;
use super::repo::{slash_path, GitRepo};
use crate::models::{ChangeOverlap, CommitId, HunkWindow};
use git2::{Delta, DiffFindOptions, DiffOptions, Sort, Tree};
use std::path::Path;
use tracing::debug;

/// How one commit changed the tracked path relative to its first parent.
#[derive(Debug, PartialEq, Eq)]
enum FileChange {
    Untouched,
    Modified,
    Added,
    /// Added under this path by renaming the contained old path
    Renamed(String),
}

impl GitRepo {
    /// Get the commits that touched a file, most recent first.
    ///
    /// # Arguments
    /// * `file_path` - Relative path to file within repo, as of HEAD
    /// * `limit` - Maximum number of commits to return
    pub fn file_history(&self, file_path: &str, limit: usize) -> Result<Vec<CommitId>, GitError> {
        let err = |source: git2::Error| GitError::HistoryQuery {
            path: file_path.to_string(),
            source,
        };

        let mut commits = Vec::new();
        if limit == 0 {
            return Ok(commits);
        }

        let mut revwalk = self.repo.revwalk().map_err(err)?;
        revwalk.push_head().map_err(err)?;
        revwalk.simplify_first_parent().map_err(err)?;
        revwalk.set_sorting(Sort::TOPOLOGICAL).map_err(err)?;

        let mut tracked = file_path.to_string();
        for oid_result in revwalk {
            let oid = oid_result.map_err(err)?;
            let commit = self.repo.find_commit(oid).map_err(err)?;

            match self.file_change(&commit, &tracked).map_err(err)? {
                FileChange::Untouched => continue,
                FileChange::Modified => commits.push(oid),
                FileChange::Renamed(old_path) => {
                    debug!("{} was renamed from {} in {}", tracked, old_path, oid);
                    commits.push(oid);
                    tracked = old_path;
                }
                FileChange::Added => {
                    commits.push(oid);
                    break;
                }
            }

            if commits.len() >= limit {
                break;
            }
        }

        Ok(commits)
    }

    /// Diff one file between two commits.
    ///
    /// Returns an empty overlap when the file is identical in both.
    pub fn diff_file(
        &self,
        from: CommitId,
        to: CommitId,
        file_path: &str,
    ) -> Result<ChangeOverlap, GitError> {
        let err = |source: git2::Error| GitError::DiffComputation {
            from,
            to,
            path: file_path.to_string(),
            source,
        };

        let old_tree = self
            .repo
            .find_commit(from)
            .and_then(|c| c.tree())
            .map_err(err)?;
        let new_tree = self
            .repo
            .find_commit(to)
            .and_then(|c| c.tree())
            .map_err(err)?;

        let mut diff_opts = DiffOptions::new();
        diff_opts.pathspec(file_path).disable_pathspec_match(true);

        let diff = self
            .repo
            .diff_tree_to_tree(Some(&old_tree), Some(&new_tree), Some(&mut diff_opts))
            .map_err(err)?;

        let target = Path::new(file_path);
        let mut windows = Vec::new();
        diff.foreach(
            &mut |_, _| true,
            None,
            Some(&mut |delta, hunk| {
                if delta.new_file().path() == Some(target) {
                    windows.push(HunkWindow {
                        start: hunk.new_start(),
                        lines: hunk.new_lines(),
                    });
                }
                true
            }),
            None,
        )
        .map_err(err)?;

        Ok(ChangeOverlap { windows })
    }

    /// Classify how `commit` changed `path` against its first parent.
    fn file_change(&self, commit: &git2::Commit, path: &str) -> Result<FileChange, git2::Error> {
        let parent = commit.parent(0).ok();
        let tree = commit.tree()?;
        let parent_tree = parent.as_ref().map(|p| p.tree()).transpose()?;

        let mut diff_opts = DiffOptions::new();
        diff_opts.pathspec(path).disable_pathspec_match(true);

        let diff =
            self.repo
                .diff_tree_to_tree(parent_tree.as_ref(), Some(&tree), Some(&mut diff_opts))?;

        let status = match diff.deltas().next() {
            Some(delta) => delta.status(),
            None => return Ok(FileChange::Untouched),
        };

        match (status, parent_tree.as_ref()) {
            (Delta::Added, Some(parent_tree)) => Ok(self
                .rename_source(parent_tree, &tree, path)?
                .map_or(FileChange::Added, FileChange::Renamed)),
            (Delta::Added, None) => Ok(FileChange::Added),
            _ => Ok(FileChange::Modified),
        }
    }

    /// Find the old path `path` was renamed from between two trees, if any.
    fn rename_source(&self, old: &Tree, new: &Tree, path: &str) -> Result<Option<String>, git2::Error> {
        let mut diff = self.repo.diff_tree_to_tree(Some(old), Some(new), None)?;

        let mut find_opts = DiffFindOptions::new();
        find_opts.renames(true);
        diff.find_similar(Some(&mut find_opts))?;

        let target = Path::new(path);
        for delta in diff.deltas() {
            if delta.status() != Delta::Renamed || delta.new_file().path() != Some(target) {
                continue;
            }
            return Ok(delta.old_file().path().map(slash_path));
        }
        Ok(None)
    }
}
