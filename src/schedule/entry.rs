//! Class schedule records.
//!
//! Every field is a string so consumers never null-check: anything missing,
//! unknown, or `null` in the source becomes `""`. Numbers and booleans in
//! JSON sources are written out as text (`"openings": 12` → `"12"`).

use serde::{Serialize, Serializer};
use serde_json::Value;

use crate::table::Record;

/// Column names in the order the schedule spreadsheet uses them.
pub const SCHEDULE_FIELDS: [&str; 13] = [
    "status",
    "title",
    "description",
    "days",
    "times",
    "gender",
    "ages",
    "openings",
    "starts",
    "ends",
    "session",
    "tuition",
    "fees",
];

/// Enrollment status. Anything unrecognized is kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScheduleStatus {
    Open,
    Waitlist,
    Closed,
    Other(String),
}

impl Default for ScheduleStatus {
    fn default() -> Self {
        ScheduleStatus::Other(String::new())
    }
}

impl ScheduleStatus {
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        match trimmed.to_ascii_lowercase().as_str() {
            "open" => ScheduleStatus::Open,
            "waitlist" | "wait list" | "waitlisted" => ScheduleStatus::Waitlist,
            "closed" => ScheduleStatus::Closed,
            _ => ScheduleStatus::Other(trimmed.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            ScheduleStatus::Open => "Open",
            ScheduleStatus::Waitlist => "Waitlist",
            ScheduleStatus::Closed => "Closed",
            ScheduleStatus::Other(text) => text,
        }
    }
}

impl Serialize for ScheduleStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// One class offering.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ClassScheduleEntry {
    pub status: ScheduleStatus,
    pub title: String,
    pub description: String,
    pub days: String,
    pub times: String,
    pub gender: String,
    pub ages: String,
    pub openings: String,
    pub starts: String,
    pub ends: String,
    pub session: String,
    pub tuition: String,
    pub fees: String,
}

impl ClassScheduleEntry {
    /// Build an entry from a field lookup. Returns `None` when the title is empty.
    fn from_lookup(get: impl Fn(&str) -> String) -> Option<Self> {
        let title = get("title").trim().to_string();
        if title.is_empty() {
            return None;
        }
        Some(Self {
            status: ScheduleStatus::parse(&get("status")),
            title,
            description: get("description"),
            days: get("days"),
            times: get("times"),
            gender: get("gender"),
            ages: get("ages"),
            openings: get("openings"),
            starts: get("starts"),
            ends: get("ends"),
            session: get("session"),
            tuition: get("tuition"),
            fees: get("fees"),
        })
    }

    /// Build an entry from a parsed CSV row (headers matched case-insensitively).
    pub fn from_record(record: &Record) -> Option<Self> {
        Self::from_lookup(|field| {
            record
                .get_ignore_case(field)
                .unwrap_or_default()
                .to_string()
        })
    }

    /// Build an entry from a JSON object. Non-objects yield `None`.
    pub fn from_json(value: &Value) -> Option<Self> {
        let object = value.as_object()?;
        Self::from_lookup(|field| {
            let found = object.get(field).or_else(|| {
                object
                    .iter()
                    .find(|(k, _)| k.eq_ignore_ascii_case(field))
                    .map(|(_, v)| v)
            });
            found.map(value_text).unwrap_or_default()
        })
    }
}

/// Render a scalar JSON value as text; `null`, arrays and objects become `""`.
fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null | Value::Array(_) | Value::Object(_) => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn status_parse_known_and_free_text() {
        assert_eq!(ScheduleStatus::parse(" open "), ScheduleStatus::Open);
        assert_eq!(ScheduleStatus::parse("Wait List"), ScheduleStatus::Waitlist);
        assert_eq!(ScheduleStatus::parse("CLOSED"), ScheduleStatus::Closed);
        assert_eq!(
            ScheduleStatus::parse("Opens in June"),
            ScheduleStatus::Other("Opens in June".into())
        );
        assert_eq!(ScheduleStatus::parse("").as_str(), "");
    }

    #[test]
    fn record_missing_fields_default_to_empty() {
        let record: Record = [("Title", "Choir"), ("days", "Mon")].into_iter().collect();
        let entry = ClassScheduleEntry::from_record(&record).unwrap();
        assert_eq!(entry.title, "Choir");
        assert_eq!(entry.days, "Mon");
        assert_eq!(entry.tuition, "");
        assert_eq!(entry.status, ScheduleStatus::default());
    }

    #[test]
    fn record_without_title_rejected() {
        let record: Record = [("title", "  "), ("days", "Mon")].into_iter().collect();
        assert!(ClassScheduleEntry::from_record(&record).is_none());
    }

    #[test]
    fn json_scalars_coerced_to_text() {
        let value = json!({"title": "Choir", "openings": 12, "fees": null, "session": true});
        let entry = ClassScheduleEntry::from_json(&value).unwrap();
        assert_eq!(entry.openings, "12");
        assert_eq!(entry.fees, "");
        assert_eq!(entry.session, "true");
    }

    #[test]
    fn json_non_object_rejected() {
        assert!(ClassScheduleEntry::from_json(&json!("Choir")).is_none());
        assert!(ClassScheduleEntry::from_json(&json!({"days": "Mon"})).is_none());
    }

    #[test]
    fn serializes_status_as_text() {
        let entry = ClassScheduleEntry {
            status: ScheduleStatus::Waitlist,
            title: "Choir".into(),
            ..Default::default()
        };
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["status"], "Waitlist");
        assert_eq!(json["fees"], "");
    }
}
