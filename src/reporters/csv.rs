//! CSV reporter
//!
//! Writes a header row followed by one row per record. Fields containing a
//! comma, double quote, CR or LF are quoted, with embedded quotes doubled.

use super::{ReportRow, COLUMNS};

/// Render rows as CSV
pub fn render(rows: &[ReportRow<'_>]) -> String {
    let mut out = String::new();
    push_row(&mut out, COLUMNS.iter().copied());
    for row in rows {
        let cells = row.cells();
        push_row(&mut out, cells.iter().map(String::as_str));
    }
    out
}

fn push_row<'a>(out: &mut String, cells: impl Iterator<Item = &'a str>) {
    for (i, cell) in cells.enumerate() {
        if i > 0 {
            out.push(',');
        }
        push_field(out, cell);
    }
    out.push('\n');
}

fn push_field(out: &mut String, field: &str) {
    if !field.contains([',', '"', '\r', '\n']) {
        out.push_str(field);
        return;
    }
    out.push('"');
    out.push_str(&field.replace('"', "\"\""));
    out.push('"');
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reporters::tests::test_table;
    use crate::reporters::{rows, ReportOptions};

    #[test]
    fn test_csv_header_and_rows() {
        let table = test_table();
        let csv = render(&rows(&table, &ReportOptions::default()));
        let lines: Vec<&str> = csv.lines().collect();

        assert_eq!(lines.len(), 3);
        assert_eq!(
            lines[0],
            "File,Commit,Author,Commit Message,Start Line,End Line,Previous Author,\
             Previous Commit,Keyword Label,Commit Date,Previous Commit Date"
        );
        assert_eq!(
            lines[1],
            "src/module.rs,c2c2c2c,Bob,\"fix null pointer, \"\"again\"\"\",10,12,Alice,\
             a1a1a1a,1,2023-11-15 22:13:20,2023-11-14 22:13:20"
        );
        assert_eq!(
            lines[2],
            "src/module.rs,a1a1a1a,Alice,initial import,13,20,,,0,2023-11-14 22:13:20,"
        );
    }

    #[test]
    fn test_csv_empty_table_has_header() {
        let csv = render(&[]);
        assert_eq!(csv.lines().count(), 1);
        assert!(csv.ends_with("Previous Commit Date\n"));
    }

    #[test]
    fn test_field_quoting() {
        let mut out = String::new();
        push_field(&mut out, "plain");
        push_field(&mut out, "line\nbreak");
        assert_eq!(out, "plain\"line\nbreak\"");
    }
}
