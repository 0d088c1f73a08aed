//! Offline schedule CSV checker.
//!
//! Staff export the schedule from a spreadsheet and want to know whether it
//! will load before they upload it. [`preview_csv`] runs the same tabular
//! parser the site uses and reports what it saw; the rows can be written out
//! as JSON for the JSON source. Nothing here is persisted anywhere else.

use super::entry::SCHEDULE_FIELDS;
use crate::table::{Record, Table, TableError, parse_table};

/// Parsed view of a local schedule CSV.
#[derive(Debug, Clone, PartialEq)]
pub struct SchedulePreview {
    pub table: Table,
    /// Expected schedule columns absent from the header row.
    pub missing_headers: Vec<&'static str>,
}

/// Parse a schedule CSV for preview.
pub fn preview_csv(text: &str) -> Result<SchedulePreview, TableError> {
    let table = parse_table(text)?;
    let missing_headers = SCHEDULE_FIELDS
        .iter()
        .copied()
        .filter(|field| !table.headers.iter().any(|h| h.eq_ignore_ascii_case(field)))
        .collect();
    Ok(SchedulePreview {
        table,
        missing_headers,
    })
}

impl SchedulePreview {
    pub fn rows(&self) -> &[Record] {
        &self.table.rows
    }

    /// One-line summary of the parse.
    pub fn status_message(&self) -> String {
        if self.table.warnings.is_empty() {
            format!(
                "Loaded {} row(s). Preview below and write JSON if needed.",
                self.table.rows.len()
            )
        } else {
            format!(
                "Parsed with {} warning(s). Review the preview below.",
                self.table.warnings.len()
            )
        }
    }

    /// Rows as pretty-printed JSON, keys in column order.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&self.table.rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_csv_summary() {
        let preview = preview_csv(
            "status,title,description,days,times,gender,ages,openings,\
             starts,ends,session,tuition,fees\n\
             Open,Choir,Sing,Sat,10am,Co-ed,8-12,10,9/13,12/6,Fall,$150,$0\n",
        )
        .unwrap();
        assert!(preview.missing_headers.is_empty());
        assert_eq!(
            preview.status_message(),
            "Loaded 1 row(s). Preview below and write JSON if needed."
        );
    }

    #[test]
    fn missing_headers_listed() {
        let preview = preview_csv("Title,Days\nChoir,Sat\n").unwrap();
        assert!(!preview.missing_headers.contains(&"title"));
        assert!(preview.missing_headers.contains(&"status"));
        assert!(preview.missing_headers.contains(&"fees"));
        assert_eq!(preview.missing_headers.len(), SCHEDULE_FIELDS.len() - 2);
    }

    #[test]
    fn warnings_change_summary() {
        let preview = preview_csv("title,days\nChoir\n").unwrap();
        assert_eq!(
            preview.status_message(),
            "Parsed with 1 warning(s). Review the preview below."
        );
    }

    #[test]
    fn json_keeps_column_order() {
        let preview = preview_csv("title,days\nChoir,Sat\n").unwrap();
        let json = preview.to_json().unwrap();
        let title_at = json.find("\"title\"").unwrap();
        let days_at = json.find("\"days\"").unwrap();
        assert!(title_at < days_at);
        assert!(json.starts_with('['));
    }

    #[test]
    fn header_only_is_error() {
        assert_eq!(preview_csv("title\n"), Err(TableError::Empty));
    }
}
