//! Output reporters for provenance tables
//!
//! Supports two output formats:
//! - `csv` - One header row plus one row per record
//! - `json` - Array of objects keyed by column name
//!
//! Both formats share the same columns, in this order:
//! File, Commit, Author, Commit Message, Start Line, End Line,
//! Previous Author, Previous Commit, Keyword Label, Commit Date,
//! Previous Commit Date.

mod csv;
mod json;

use crate::models::{format_utc, CommitId, ProvenanceRecord, ProvenanceTable};
use anyhow::{anyhow, Result};
use serde::Serialize;
use std::str::FromStr;

/// Output column names, in order.
pub const COLUMNS: [&str; 11] = [
    "File",
    "Commit",
    "Author",
    "Commit Message",
    "Start Line",
    "End Line",
    "Previous Author",
    "Previous Commit",
    "Keyword Label",
    "Commit Date",
    "Previous Commit Date",
];

/// Abbreviated commit id length.
pub const SHORT_HASH_LEN: usize = 7;

/// Supported output formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Csv,
    Json,
}

impl OutputFormat {
    /// Recommended file extension for a format
    pub fn file_extension(self) -> &'static str {
        match self {
            OutputFormat::Csv => "csv",
            OutputFormat::Json => "json",
        }
    }
}

impl FromStr for OutputFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "csv" => Ok(OutputFormat::Csv),
            "json" => Ok(OutputFormat::Json),
            _ => Err(anyhow!("Unknown format '{}'. Valid formats: csv, json", s)),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Csv => write!(f, "csv"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

/// Rendering switches shared by all formats.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReportOptions {
    /// Write full 40-character commit ids instead of abbreviated ones
    pub full_hash: bool,
}

impl ReportOptions {
    fn commit_id(&self, id: CommitId) -> String {
        let mut hex = id.to_string();
        if !self.full_hash {
            hex.truncate(SHORT_HASH_LEN);
        }
        hex
    }
}

/// One output row with every column already formatted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportRow<'a> {
    #[serde(rename = "File")]
    pub file: &'a str,
    #[serde(rename = "Commit")]
    pub commit: String,
    #[serde(rename = "Author")]
    pub author: &'a str,
    #[serde(rename = "Commit Message")]
    pub message: &'a str,
    #[serde(rename = "Start Line")]
    pub start_line: u32,
    #[serde(rename = "End Line")]
    pub end_line: u32,
    #[serde(rename = "Previous Author")]
    pub previous_author: Option<&'a str>,
    #[serde(rename = "Previous Commit")]
    pub previous_commit: Option<String>,
    #[serde(rename = "Keyword Label")]
    pub keyword_label: u8,
    #[serde(rename = "Commit Date")]
    pub commit_date: String,
    #[serde(rename = "Previous Commit Date")]
    pub previous_date: Option<String>,
}

impl<'a> ReportRow<'a> {
    pub fn new(record: &'a ProvenanceRecord, opts: &ReportOptions) -> Self {
        let previous = record.previous.as_ref();
        Self {
            file: &record.file,
            commit: opts.commit_id(record.commit),
            author: &record.author,
            message: &record.message,
            start_line: record.range.start(),
            end_line: record.range.end(),
            previous_author: previous.map(|p| p.author.as_str()),
            previous_commit: previous.map(|p| opts.commit_id(p.id)),
            keyword_label: record.label(),
            commit_date: format_utc(&record.date),
            previous_date: previous.map(|p| format_utc(&p.time)),
        }
    }

    /// Column values in [`COLUMNS`] order; absent values are empty.
    pub fn cells(&self) -> [String; 11] {
        [
            self.file.to_string(),
            self.commit.clone(),
            self.author.to_string(),
            self.message.to_string(),
            self.start_line.to_string(),
            self.end_line.to_string(),
            self.previous_author.unwrap_or_default().to_string(),
            self.previous_commit.clone().unwrap_or_default(),
            self.keyword_label.to_string(),
            self.commit_date.clone(),
            self.previous_date.clone().unwrap_or_default(),
        ]
    }
}

/// Format every record of a table, in table order.
pub fn rows<'a>(table: &'a ProvenanceTable, opts: &ReportOptions) -> Vec<ReportRow<'a>> {
    table
        .records
        .iter()
        .map(|record| ReportRow::new(record, opts))
        .collect()
}

/// Render a provenance table in the specified format
pub fn render(table: &ProvenanceTable, format: OutputFormat, opts: &ReportOptions) -> Result<String> {
    let rows = rows(table, opts);
    match format {
        OutputFormat::Csv => Ok(csv::render(&rows)),
        OutputFormat::Json => json::render(&rows),
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::models::{git_time, LineRange, PreviousCommit, RunStats};

    /// A fix with a resolved previous commit, and an initial import without one.
    pub(crate) fn test_table() -> ProvenanceTable {
        let fix_id = CommitId::from_str("c2c2c2c2c2c2c2c2c2c2c2c2c2c2c2c2c2c2c2c2").expect("oid");
        let base_id = CommitId::from_str("a1a1a1a1a1a1a1a1a1a1a1a1a1a1a1a1a1a1a1a1").expect("oid");

        let records = vec![
            ProvenanceRecord {
                file: "src/module.rs".into(),
                commit: fix_id,
                author: "Bob".into(),
                message: "fix null pointer, \"again\"".into(),
                date: git_time(&git2::Time::new(1_700_086_400, 60)),
                range: LineRange::new(10, 12).expect("range"),
                previous: Some(PreviousCommit {
                    id: base_id,
                    author: "Alice".into(),
                    time: git_time(&git2::Time::new(1_700_000_000, 0)),
                }),
                is_fix: true,
            },
            ProvenanceRecord {
                file: "src/module.rs".into(),
                commit: base_id,
                author: "Alice".into(),
                message: "initial import".into(),
                date: git_time(&git2::Time::new(1_700_000_000, 0)),
                range: LineRange::new(13, 20).expect("range"),
                previous: None,
                is_fix: false,
            },
        ];

        ProvenanceTable {
            records,
            stats: RunStats::default(),
        }
    }

    #[test]
    fn test_format_parsing() {
        assert_eq!(OutputFormat::from_str("csv").unwrap(), OutputFormat::Csv);
        assert_eq!(OutputFormat::from_str("JSON").unwrap(), OutputFormat::Json);
        assert!(OutputFormat::from_str("sarif").is_err());
        assert_eq!(OutputFormat::Json.to_string(), "json");
        assert_eq!(OutputFormat::default().file_extension(), "csv");
    }

    #[test]
    fn test_row_formatting() {
        let table = test_table();
        let rows = rows(&table, &ReportOptions::default());

        let fix = &rows[0];
        assert_eq!(fix.commit, "c2c2c2c");
        assert_eq!(fix.previous_commit.as_deref(), Some("a1a1a1a"));
        assert_eq!(fix.previous_author, Some("Alice"));
        assert_eq!(fix.keyword_label, 1);
        // +01:00 offset rendered in UTC
        assert_eq!(fix.commit_date, "2023-11-15 22:13:20");
        assert_eq!(fix.previous_date.as_deref(), Some("2023-11-14 22:13:20"));

        let cells = rows[1].cells();
        assert_eq!(cells[6], "");
        assert_eq!(cells[7], "");
        assert_eq!(cells[10], "");
        assert_eq!(cells[8], "0");
    }

    #[test]
    fn test_full_hash() {
        let table = test_table();
        let rows = rows(&table, &ReportOptions { full_hash: true });
        assert_eq!(rows[0].commit.len(), 40);
    }
}
