//! Line attribution at the current tip
//!
//! Splits a file into the spans libgit2's blame reports, one span per
//! blame hunk, each carrying the commit that last altered it.

use super::error::GitError;
use super::repo::GitRepo;
use crate::models::{AttributionSpan, LineRange};
use std::path::Path;

impl GitRepo {
    /// Get attribution spans for an entire file at HEAD.
    ///
    /// Fails with [`GitError::FileNotTracked`] when the file has no history
    /// at the tip (untracked, ignored, or deleted).
    pub fn blame_spans(&self, file_path: &str) -> Result<Vec<AttributionSpan>, GitError> {
        let blame = self
            .repo
            .blame_file(Path::new(file_path), None)
            .map_err(|source| GitError::FileNotTracked {
                path: file_path.to_string(),
                source,
            })?;

        let mut spans = Vec::with_capacity(blame.len());
        for hunk in blame.iter() {
            let start = hunk.final_start_line() as u32;
            let Some(range) = LineRange::from_start_len(start, hunk.lines_in_hunk() as u32) else {
                continue;
            };
            spans.push(AttributionSpan {
                path: file_path.to_string(),
                range,
                commit: hunk.final_commit_id(),
            });
        }

        Ok(spans)
    }
}
