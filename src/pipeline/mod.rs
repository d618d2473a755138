//! Provenance mining pipeline
//!
//! Orchestrates a full run over one repository:
//! 1. Enumerate candidate files (worktree or HEAD tree, minus exclusions)
//! 2. Fan files out across outer workers, each with its own repository handle
//! 3. Attribute each file into spans (blame)
//! 4. Fan spans out across the worker's hunk pool
//! 5. Classify each span's commit and search for its previous commit
//!
//! Failures below the repository level degrade the result instead of
//! aborting: an unattributable file contributes no records, a failing hunk
//! is dropped, and a failing search leaves the previous commit empty.

pub mod file;
pub mod files;
pub mod hunk;
pub mod walker;

pub use file::{FileOutcome, FileProcessor};
pub use files::{collect_files, ExcludeRules};
pub use hunk::{process_hunk, HunkContext, HunkError};
pub use walker::RepositoryWalker;
