use crate::error::JournalError;
use crate::journal_entry::JournalEntry;
use crate::mood::{detect_moods, MoodCategory};
use chrono::NaiveDate;

/// Picks the sentiment to store for `note`.
///
/// A note has to name at most one mood. None detected falls back to
/// `Neutral`; two or more is rejected so the user rewrites the note.
pub fn resolve_sentiment(note: &str) -> Result<MoodCategory, JournalError> {
    if note.trim().is_empty() {
        return Err(JournalError::EmptyNote);
    }

    let detected = detect_moods(note);
    match detected.as_slice() {
        [] => Ok(MoodCategory::Neutral),
        [mood] => Ok(*mood),
        _ => Err(JournalError::AmbiguousMood(detected)),
    }
}

pub fn prepare_entry(note: &str, date: NaiveDate, owner_id: &str) -> Result<JournalEntry, JournalError> {
    let sentiment = resolve_sentiment(note)?;
    Ok(JournalEntry::new(
        date,
        note.to_string(),
        sentiment,
        owner_id.to_string(),
    ))
}
