use crate::mood::MoodCategory;
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// An entry ready to be inserted into the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JournalEntry {
    #[serde(rename = "dt")]
    pub date: NaiveDate,
    pub note: String,
    pub sentiment: MoodCategory,
    #[serde(rename = "user_id")]
    pub owner_id: String,
}

impl JournalEntry {
    pub fn new(date: NaiveDate, note: String, sentiment: MoodCategory, owner_id: String) -> Self {
        JournalEntry {
            date,
            note,
            sentiment,
            owner_id,
        }
    }
}

/// Store-assigned key. Tables hand out either integers or uuids.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecordId {
    Number(i64),
    Text(String),
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordId::Number(n) => write!(f, "{n}"),
            RecordId::Text(s) => f.write_str(s),
        }
    }
}

/// A row as read back from the store.
///
/// `sentiment` stays a raw tag so rows written by other clients still
/// render.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoodRecord {
    pub id: RecordId,
    pub dt: String,
    pub note: String,
    pub sentiment: String,
    pub user_id: String,
}

impl MoodRecord {
    pub fn from_entry(id: RecordId, entry: &JournalEntry) -> Self {
        MoodRecord {
            id,
            dt: day_string(entry.date),
            note: entry.note.clone(),
            sentiment: entry.sentiment.to_string(),
            user_id: entry.owner_id.clone(),
        }
    }
}

/// Calendar day of `instant` in UTC.
pub fn day_of<Tz: TimeZone>(instant: &DateTime<Tz>) -> NaiveDate {
    instant.with_timezone(&Utc).date_naive()
}

pub fn day_string(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::FixedOffset;

    #[test]
    fn entry_serializes_with_store_field_names() {
        let entry = JournalEntry::new(
            NaiveDate::from_ymd_opt(2024, 3, 9).unwrap(),
            "I feel calm".to_string(),
            MoodCategory::Calm,
            "RE-71904/24".to_string(),
        );
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "dt": "2024-03-09",
                "note": "I feel calm",
                "sentiment": "calm",
                "user_id": "RE-71904/24",
            })
        );
    }

    #[test]
    fn record_ids_accept_numbers_and_strings() {
        let rows: Vec<MoodRecord> = serde_json::from_str(
            r#"[
                {"id": 7, "dt": "2024-03-09", "note": "a", "sentiment": "sad", "user_id": "u"},
                {"id": "5f0c", "dt": "2024-03-08", "note": "b", "sentiment": "odd", "user_id": "u"}
            ]"#,
        )
        .unwrap();
        assert_eq!(rows[0].id, RecordId::Number(7));
        assert_eq!(rows[1].id.to_string(), "5f0c");
        assert_eq!(rows[1].sentiment, "odd");
    }

    #[test]
    fn day_is_truncated_in_utc() {
        let east = FixedOffset::east_opt(10 * 3600).unwrap();
        let morning = east.with_ymd_and_hms(2024, 5, 2, 8, 30, 0).unwrap();
        assert_eq!(day_string(day_of(&morning)), "2024-05-01");
    }
}
