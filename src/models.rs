//! Core data models for fixtrace
//!
//! These models describe commits as read from history, the attribution
//! spans produced by blame, and the provenance records emitted per span.

use chrono::{DateTime, FixedOffset, Offset, TimeZone, Utc};
use std::fmt;

/// Content-addressed commit identity.
pub type CommitId = git2::Oid;

/// Timestamp format used in every output column (always rendered in UTC).
pub const DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Contiguous, inclusive, 1-based line range.
///
/// Construction goes through [`LineRange::new`] / [`LineRange::from_start_len`],
/// so every value satisfies `1 <= start <= end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LineRange {
    start: u32,
    end: u32,
}

impl LineRange {
    /// Create a range, or `None` if `start` is zero or greater than `end`.
    pub fn new(start: u32, end: u32) -> Option<Self> {
        (start >= 1 && start <= end).then_some(Self { start, end })
    }

    /// Create a range from a start line and a line count.
    pub fn from_start_len(start: u32, len: u32) -> Option<Self> {
        if len == 0 {
            return None;
        }
        Self::new(start, start.checked_add(len - 1)?)
    }

    pub fn start(&self) -> u32 {
        self.start
    }

    pub fn end(&self) -> u32 {
        self.end
    }
}

impl fmt::Display for LineRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}

/// A commit as read from history. Never created by fixtrace, only read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Commit {
    pub id: CommitId,
    /// Author name
    pub author: String,
    /// Commit timestamp with the committer's offset
    pub time: DateTime<FixedOffset>,
    /// Raw commit message
    pub message: String,
    /// Parent ids, first parent first
    pub parents: Vec<CommitId>,
}

impl Commit {
    /// Message trimmed and folded onto one line.
    pub fn flat_message(&self) -> String {
        flatten_message(&self.message)
    }
}

/// Trim a commit message and replace line breaks with spaces.
pub fn flatten_message(message: &str) -> String {
    message.trim().replace("\r\n", " ").replace('\n', " ")
}

/// Convert a libgit2 timestamp into a chrono timestamp carrying its offset.
pub fn git_time(time: &git2::Time) -> DateTime<FixedOffset> {
    let offset = FixedOffset::east_opt(time.offset_minutes() * 60).unwrap_or(Utc.fix());
    match offset.timestamp_opt(time.seconds(), 0).single() {
        Some(dt) => dt,
        None => DateTime::<Utc>::default().with_timezone(&offset),
    }
}

/// Render a timestamp as `YYYY-MM-DD HH:MM:SS` in UTC.
pub fn format_utc(time: &DateTime<FixedOffset>) -> String {
    time.with_timezone(&Utc).format(DATE_FORMAT).to_string()
}

/// Lines of a file at the current tip last altered by one commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributionSpan {
    /// Repository-relative path, `/`-separated
    pub path: String,
    pub range: LineRange,
    pub commit: CommitId,
}

/// One diff hunk window in new-file coordinates.
///
/// `lines` may be zero for pure deletions, in which case the window ends
/// one line before it starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HunkWindow {
    pub start: u32,
    pub lines: u32,
}

impl HunkWindow {
    /// Interval intersection with `range`.
    pub fn overlaps(&self, range: LineRange) -> bool {
        let start = i64::from(self.start);
        let end = start + i64::from(self.lines) - 1;
        !(end < i64::from(range.start()) || start > i64::from(range.end()))
    }
}

/// Changed windows between two commits, restricted to one file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeOverlap {
    pub windows: Vec<HunkWindow>,
}

impl ChangeOverlap {
    pub fn is_empty(&self) -> bool {
        self.windows.is_empty()
    }

    /// Whether any changed window intersects `range`.
    pub fn intersects(&self, range: LineRange) -> bool {
        self.windows.iter().any(|w| w.overlaps(range))
    }
}

/// The commit judged to have introduced a span's region.
///
/// Kept as one value so the id/author/date triple is either fully present
/// or fully absent on a record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviousCommit {
    pub id: CommitId,
    pub author: String,
    pub time: DateTime<FixedOffset>,
}

impl From<&Commit> for PreviousCommit {
    fn from(commit: &Commit) -> Self {
        Self {
            id: commit.id,
            author: commit.author.clone(),
            time: commit.time,
        }
    }
}

/// One output row: a span, its commit, fix label and resolved previous commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvenanceRecord {
    pub file: String,
    pub commit: CommitId,
    pub author: String,
    /// Flattened commit message
    pub message: String,
    pub date: DateTime<FixedOffset>,
    pub range: LineRange,
    pub previous: Option<PreviousCommit>,
    pub is_fix: bool,
}

impl ProvenanceRecord {
    /// Keyword label as written to output (0 or 1).
    pub fn label(&self) -> u8 {
        u8::from(self.is_fix)
    }

    fn sort_key(&self) -> (&str, LineRange, CommitId) {
        (&self.file, self.range, self.commit)
    }
}

/// Counters collected over one mining run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunStats {
    /// Files selected for processing
    pub files_total: usize,
    /// Files that produced at least one attribution span
    pub files_attributed: usize,
    /// Files with no history at the tip (untracked, deleted, unreadable)
    pub files_skipped: usize,
    /// Files whose processing panicked
    pub files_failed: usize,
    /// Spans dropped because their hunk could not be processed
    pub hunks_dropped: usize,
    /// Records whose previous commit was resolved
    pub resolved: usize,
}

/// All records produced by one run over a repository.
#[derive(Debug, Clone, Default)]
pub struct ProvenanceTable {
    pub records: Vec<ProvenanceRecord>,
    pub stats: RunStats,
}

impl ProvenanceTable {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Order records by file, then line range, then commit.
    pub fn sort(&mut self) {
        self.records.sort_by(|a, b| a.sort_key().cmp(&b.sort_key()));
    }

    /// Records for one file, in table order.
    #[cfg(test)]
    pub fn for_file<'a>(&'a self, file: &'a str) -> impl Iterator<Item = &'a ProvenanceRecord> {
        self.records.iter().filter(move |r| r.file == file)
    }
}
