use crate::mood::MoodCategory;
use thiserror::Error;

/// Failure reported by the record store. The message is shown as-is.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct StoreError(pub String);

impl From<reqwest::Error> for StoreError {
    fn from(e: reqwest::Error) -> Self {
        StoreError(e.to_string())
    }
}

/// Everything that can go wrong on the login and save paths.
///
/// `Display` is the text the user sees.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum JournalError {
    #[error("Please write something before saving your mood.")]
    EmptyNote,

    #[error(
        "Please describe only one main mood at a time.\nDetected moods: {}",
        join_moods(.0)
    )]
    AmbiguousMood(Vec<MoodCategory>),

    #[error("Contract number must look like RE-71904/24")]
    MalformedIdentifier,

    #[error("Password must be at least 6 characters.")]
    ShortPassword,

    #[error("Please log in first.")]
    NotLoggedIn,

    #[error(transparent)]
    Store(#[from] StoreError),
}

fn join_moods(moods: &[MoodCategory]) -> String {
    moods
        .iter()
        .map(|m| m.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}
