//! JSON reporter
//!
//! Outputs the records as a pretty-printed array of objects keyed by column
//! name. Absent previous-commit fields are `null`.

use super::ReportRow;
use anyhow::Result;

/// Render rows as JSON
pub fn render(rows: &[ReportRow<'_>]) -> Result<String> {
    Ok(serde_json::to_string_pretty(rows)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reporters::tests::test_table;
    use crate::reporters::{rows, ReportOptions, COLUMNS};

    #[test]
    fn test_json_render_valid() {
        let table = test_table();
        let json_str = render(&rows(&table, &ReportOptions::default())).expect("render JSON");
        let parsed: serde_json::Value = serde_json::from_str(&json_str).expect("parse JSON");
        let records = parsed.as_array().expect("records array");
        assert_eq!(records.len(), 2);

        let fix = records[0].as_object().expect("object");
        for column in COLUMNS {
            assert!(fix.contains_key(column), "missing column {}", column);
        }
        assert_eq!(fix["Previous Author"], "Alice");
        assert_eq!(fix["Start Line"], 10);
        assert_eq!(fix["Keyword Label"], 1);

        let base = &records[1];
        assert!(base["Previous Author"].is_null());
        assert!(base["Previous Commit"].is_null());
        assert!(base["Previous Commit Date"].is_null());
    }

    #[test]
    fn test_json_empty_table() {
        let json_str = render(&[]).expect("render JSON");
        let parsed: serde_json::Value = serde_json::from_str(&json_str).expect("parse JSON");
        assert_eq!(parsed.as_array().expect("records array").len(), 0);
    }
}
