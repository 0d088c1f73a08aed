//! Schedule sources and how each one is attempted.
//!
//! A load walks an ordered list of [`ScheduleSource`]s and stops at the first
//! that produces entries. Each source turns its raw text into sanitized
//! [`ClassScheduleEntry`] values the same way:
//!
//! - rows without a title are skipped (noted in the warnings),
//! - a title seen twice keeps its first row (noted in the warnings),
//! - a source whose rows all lack titles fails with [`SourceError::NoTitledRows`].

use std::collections::HashSet;

use serde_json::Value;
use thiserror::Error;

use super::entry::ClassScheduleEntry;
use crate::fetch::{Fetch, FetchError};
use crate::sanitize::{sanitize, sanitize_value};
use crate::table::{TableError, parse_table};

/// The schedule shipped with the application, used when every live source fails.
pub const BUNDLED_SCHEDULE: &str = include_str!("../../data/class_schedule_fallback.json");

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SourceError {
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error(transparent)]
    Table(#[from] TableError),
    #[error("invalid JSON: {0}")]
    Json(String),
    #[error("unexpected JSON schedule format (expected an array)")]
    NotAnArray,
    #[error("no rows with a title")]
    NoTitledRows,
}

/// One place a schedule can come from.
#[derive(Debug, Clone, PartialEq)]
pub enum ScheduleSource {
    RemoteCsv(String),
    RemoteJson(String),
    Bundled,
}

/// Entries produced by a successful attempt, plus non-fatal notes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SourceData {
    pub entries: Vec<ClassScheduleEntry>,
    pub warnings: Vec<String>,
}

impl ScheduleSource {
    /// Short name used in diagnostics.
    pub fn name(&self) -> &'static str {
        match self {
            ScheduleSource::RemoteCsv(_) => "CSV",
            ScheduleSource::RemoteJson(_) => "JSON",
            ScheduleSource::Bundled => "bundled",
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, ScheduleSource::Bundled)
    }

    /// Try this source once.
    pub async fn attempt<F: Fetch>(&self, fetcher: &F) -> Result<SourceData, SourceError> {
        match self {
            ScheduleSource::RemoteCsv(url) => {
                let text = fetcher.fetch_text(url).await?;
                parse_csv_schedule(&text)
            }
            ScheduleSource::RemoteJson(url) => {
                let text = fetcher.fetch_text(url).await?;
                parse_json_schedule(&text)
            }
            ScheduleSource::Bundled => Ok(bundled_schedule()),
        }
    }
}

/// Parse schedule CSV text into sanitized entries.
pub fn parse_csv_schedule(text: &str) -> Result<SourceData, SourceError> {
    let table = parse_table(text)?;
    let mut collector = EntryCollector::new(table.warnings);
    for (i, row) in table.rows.into_iter().enumerate() {
        let clean = row.map_values(sanitize);
        collector.push(ClassScheduleEntry::from_record(&clean), || {
            format!("Row {}", i + 2)
        });
    }
    collector.finish()
}

/// Parse a schedule JSON array into sanitized entries.
///
/// An empty array is a valid (empty) schedule.
pub fn parse_json_schedule(text: &str) -> Result<SourceData, SourceError> {
    let value: Value = serde_json::from_str(text).map_err(|e| SourceError::Json(e.to_string()))?;
    let Value::Array(items) = value else {
        return Err(SourceError::NotAnArray);
    };
    let mut collector = EntryCollector::new(Vec::new());
    for (i, item) in items.into_iter().enumerate() {
        let clean = sanitize_value(item);
        collector.push(ClassScheduleEntry::from_json(&clean), || {
            format!("Item {}", i + 1)
        });
    }
    collector.finish()
}

/// The bundled schedule, sanitized like any other source.
pub fn bundled_schedule() -> SourceData {
    match parse_json_schedule(BUNDLED_SCHEDULE) {
        Ok(data) => data,
        Err(e) => {
            log::error!("bundled schedule is unusable: {e}");
            SourceData::default()
        }
    }
}

struct EntryCollector {
    data: SourceData,
    seen_titles: HashSet<String>,
    rows: usize,
}

impl EntryCollector {
    fn new(warnings: Vec<String>) -> Self {
        Self {
            data: SourceData {
                entries: Vec::new(),
                warnings,
            },
            seen_titles: HashSet::new(),
            rows: 0,
        }
    }

    fn push(&mut self, entry: Option<ClassScheduleEntry>, position: impl FnOnce() -> String) {
        self.rows += 1;
        match entry {
            None => self
                .data
                .warnings
                .push(format!("{}: missing title, skipped", position())),
            Some(entry) if !self.seen_titles.insert(entry.title.clone()) => {
                self.data.warnings.push(format!(
                    "{}: duplicate title {:?}, keeping the first",
                    position(),
                    entry.title
                ));
            }
            Some(entry) => self.data.entries.push(entry),
        }
    }

    fn finish(self) -> Result<SourceData, SourceError> {
        if self.rows > 0 && self.data.entries.is_empty() {
            return Err(SourceError::NoTitledRows);
        }
        Ok(self.data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schedule::entry::ScheduleStatus;
    use crate::test_helpers::StubFetcher;

    const CSV: &str = "\
status,title,description,days,times,gender,ages,openings,starts,ends,session,tuition,fees
Open,Youth Choir,<b>Sing</b><script>x()</script>,Sat,10am,Co-ed,8-12,10,9/13,12/6,Fall,$150,
Waitlist,Teen Acting Lab,Scenes,Wed,6pm,Co-ed,13-18,0,9/10,11/19,Fall,$220,$25
";

    #[test]
    fn csv_rows_become_sanitized_entries() {
        let data = parse_csv_schedule(CSV).unwrap();
        assert_eq!(data.entries.len(), 2);
        assert_eq!(data.entries[0].title, "Youth Choir");
        assert_eq!(data.entries[0].description, "<b>Sing</b>");
        assert_eq!(data.entries[1].status, ScheduleStatus::Waitlist);
        assert!(data.warnings.is_empty());
    }

    #[test]
    fn csv_header_only_fails_with_empty_table() {
        assert_eq!(
            parse_csv_schedule("status,title\n"),
            Err(SourceError::Table(TableError::Empty))
        );
    }

    #[test]
    fn csv_untitled_rows_skipped_with_warning() {
        let data = parse_csv_schedule("title,days\nChoir,Mon\n,Tue\n").unwrap();
        assert_eq!(data.entries.len(), 1);
        assert_eq!(data.warnings, vec!["Row 3: missing title, skipped"]);
    }

    #[test]
    fn csv_all_untitled_fails() {
        assert_eq!(
            parse_csv_schedule("title,days\n,Mon\n<script>x</script>,Tue\n"),
            Err(SourceError::NoTitledRows)
        );
    }

    #[test]
    fn duplicate_titles_keep_first() {
        let data = parse_csv_schedule("title,days\nChoir,Mon\nChoir,Tue\n").unwrap();
        assert_eq!(data.entries.len(), 1);
        assert_eq!(data.entries[0].days, "Mon");
        assert!(data.warnings[0].contains("duplicate title"));
    }

    #[test]
    fn json_must_be_array() {
        assert_eq!(
            parse_json_schedule(r#"{"title": "Choir"}"#),
            Err(SourceError::NotAnArray)
        );
        assert!(matches!(parse_json_schedule("not json"), Err(SourceError::Json(_))));
    }

    #[test]
    fn json_empty_array_is_empty_schedule() {
        let data = parse_json_schedule("[]").unwrap();
        assert!(data.entries.is_empty());
    }

    #[test]
    fn json_values_sanitized() {
        let data =
            parse_json_schedule(r#"[{"title": "Choir<img src=x onerror=y>", "openings": 4}]"#)
                .unwrap();
        assert_eq!(data.entries[0].title, "Choir");
        assert_eq!(data.entries[0].openings, "4");
    }

    #[test]
    fn bundled_schedule_is_valid() {
        let data = bundled_schedule();
        assert!(!data.entries.is_empty());
        assert!(data.warnings.is_empty());
        assert!(data.entries.iter().all(|e| !e.title.is_empty()));
    }

    #[tokio::test]
    async fn remote_csv_attempt_uses_fetcher() {
        let fetcher = StubFetcher::new().with_text("/s.csv", "title\nChoir\n");
        let data = ScheduleSource::RemoteCsv("/s.csv".into())
            .attempt(&fetcher)
            .await
            .unwrap();
        assert_eq!(data.entries[0].title, "Choir");
        assert_eq!(fetcher.requests(), vec!["/s.csv"]);
    }

    #[tokio::test]
    async fn remote_failure_is_fetch_error() {
        let fetcher = StubFetcher::new().with_status("/s.json", 500);
        let err = ScheduleSource::RemoteJson("/s.json".into())
            .attempt(&fetcher)
            .await
            .unwrap_err();
        assert!(matches!(err, SourceError::Fetch(FetchError::Status { status: 500, .. })));
    }

    #[tokio::test]
    async fn bundled_attempt_never_fetches() {
        let fetcher = StubFetcher::new();
        assert!(ScheduleSource::Bundled.attempt(&fetcher).await.is_ok());
        assert!(fetcher.requests().is_empty());
    }
}
