//! Repository access via libgit2
//!
//! Provides the primitives the provenance resolver is built on:
//!
//! - Line attribution (blame) for a file at the current tip
//! - Commit lookup by id
//! - Per-file diffs between two commits, as new-side hunk windows
//! - Bounded, first-parent, rename-following file history
//!
//! # Example
//!
//! ```no_run
//! use fixtrace::git::{GitRepo, RepoAccess};
//! use std::path::Path;
//!
//! let repo = GitRepo::open(Path::new("/path/to/repo")).unwrap();
//! let spans = repo.attribution_spans("src/main.rs").unwrap();
//! let history = repo.history("src/main.rs", 50).unwrap();
//! ```
//!
//! A [`GitRepo`] wraps a `git2::Repository`, which is not `Sync`. Every
//! concurrent worker opens its own handle.

pub mod blame;
pub mod error;
pub mod history;
pub mod repo;

#[cfg(test)]
pub(crate) mod test_support;

pub use error::GitError;
pub use repo::{GitRepo, RepoAccess};
