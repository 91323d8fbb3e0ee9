use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MoodCategory {
    Ecstatic,
    Happy,
    Excited,
    Calm,
    Grateful,
    Proud,
    InLove,
    Hopeful,
    Stressed,
    Anxious,
    Angry,
    Frustrated,
    Sad,
    Lonely,
    Tired,
    Bored,
    Confused,
    Afraid,
    Neutral,
}

impl MoodCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            MoodCategory::Ecstatic => "ecstatic",
            MoodCategory::Happy => "happy",
            MoodCategory::Excited => "excited",
            MoodCategory::Calm => "calm",
            MoodCategory::Grateful => "grateful",
            MoodCategory::Proud => "proud",
            MoodCategory::InLove => "in_love",
            MoodCategory::Hopeful => "hopeful",
            MoodCategory::Stressed => "stressed",
            MoodCategory::Anxious => "anxious",
            MoodCategory::Angry => "angry",
            MoodCategory::Frustrated => "frustrated",
            MoodCategory::Sad => "sad",
            MoodCategory::Lonely => "lonely",
            MoodCategory::Tired => "tired",
            MoodCategory::Bored => "bored",
            MoodCategory::Confused => "confused",
            MoodCategory::Afraid => "afraid",
            MoodCategory::Neutral => "neutral",
        }
    }
}

impl fmt::Display for MoodCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown mood tag: {0}")]
pub struct UnknownMood(pub String);

impl FromStr for MoodCategory {
    type Err = UnknownMood;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MOOD_RULES
            .iter()
            .map(|rule| rule.mood)
            .chain(std::iter::once(MoodCategory::Neutral))
            .find(|mood| mood.as_str() == s)
            .ok_or_else(|| UnknownMood(s.to_string()))
    }
}

/// Keywords that flag a single mood. Matched as lower-case substrings.
#[derive(Debug)]
pub struct KeywordRule {
    pub mood: MoodCategory,
    pub keywords: &'static [&'static str],
}

pub static MOOD_RULES: &[KeywordRule] = &[
    KeywordRule {
        mood: MoodCategory::Ecstatic,
        keywords: &["ecstatic", "overjoyed", "elated", "thrilled", "euphoric"],
    },
    KeywordRule {
        mood: MoodCategory::Happy,
        keywords: &[
            "happy",
            "joy",
            "joyful",
            "glad",
            "delighted",
            "content",
            "satisfied",
            "good",
            "cheerful",
            "smiling",
        ],
    },
    KeywordRule {
        mood: MoodCategory::Excited,
        keywords: &[
            "excited",
            "pumped",
            "hyped",
            "energized",
            "motivated",
            "enthusiastic",
        ],
    },
    KeywordRule {
        mood: MoodCategory::Calm,
        keywords: &["calm", "relaxed", "chill", "peaceful", "at ease"],
    },
    KeywordRule {
        mood: MoodCategory::Grateful,
        keywords: &["grateful", "thankful", "appreciative", "blessed"],
    },
    KeywordRule {
        mood: MoodCategory::Proud,
        keywords: &["proud", "accomplished", "achieved", "successful"],
    },
    KeywordRule {
        mood: MoodCategory::InLove,
        keywords: &["in love", "loving", "affection", "crush", "romantic"],
    },
    KeywordRule {
        mood: MoodCategory::Hopeful,
        keywords: &["hopeful", "optimistic", "confident about the future"],
    },
    KeywordRule {
        mood: MoodCategory::Stressed,
        keywords: &["stressed", "under pressure", "overwhelmed", "burned out"],
    },
    KeywordRule {
        mood: MoodCategory::Anxious,
        keywords: &["anxious", "worried", "nervous", "tense", "on edge", "panic"],
    },
    KeywordRule {
        mood: MoodCategory::Angry,
        keywords: &["angry", "mad", "furious", "irritated", "annoyed", "pissed"],
    },
    KeywordRule {
        mood: MoodCategory::Frustrated,
        keywords: &["frustrated", "stuck", "fed up"],
    },
    KeywordRule {
        mood: MoodCategory::Sad,
        keywords: &["sad", "down", "unhappy", "blue", "depressed", "miserable"],
    },
    KeywordRule {
        mood: MoodCategory::Lonely,
        keywords: &["lonely", "alone", "isolated"],
    },
    KeywordRule {
        mood: MoodCategory::Tired,
        keywords: &["tired", "exhausted", "drained", "sleepy", "fatigued"],
    },
    KeywordRule {
        mood: MoodCategory::Bored,
        keywords: &["bored", "boring", "nothing to do"],
    },
    KeywordRule {
        mood: MoodCategory::Confused,
        keywords: &["confused", "lost", "don't understand", "uncertain"],
    },
    KeywordRule {
        mood: MoodCategory::Afraid,
        keywords: &["afraid", "scared", "terrified", "fearful"],
    },
];

/// Returns every mood whose keywords occur in `text`, in table order.
///
/// Matching is plain substring containment on the lower-cased text, so a
/// keyword buried inside a longer word still counts ("unhappy" hits both
/// `sad` and `happy`).
pub fn detect_moods<'a>(text: impl Into<Option<&'a str>>) -> Vec<MoodCategory> {
    let Some(text) = text.into() else {
        return Vec::new();
    };
    let text = text.to_lowercase();

    MOOD_RULES
        .iter()
        .filter(|rule| rule.keywords.iter().any(|k| text.contains(*k)))
        .map(|rule| rule.mood)
        .collect()
}

/// First detected mood, or `Neutral`. Not used when saving.
#[allow(dead_code)]
pub fn sentiment<'a>(text: impl Into<Option<&'a str>>) -> MoodCategory {
    detect_moods(text)
        .first()
        .copied()
        .unwrap_or(MoodCategory::Neutral)
}
