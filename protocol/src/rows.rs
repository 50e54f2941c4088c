use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Row of `puzzle_completions` or `emoji_completions`.
///
/// The emoji table has no `puzzle_id` column, so the field is left out of the payload when absent.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionRow {
    pub team_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub puzzle_id: Option<u32>,
    pub completed_at: DateTime<Utc>,
    #[serde(default)]
    pub duration_seconds: Option<u32>,
}

/// Row of `forehead_words`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordRow {
    pub id: String,
    pub word: String,
    #[serde(default)]
    pub last_seen_at: Option<DateTime<Utc>>,
}

/// Body of the `PATCH` that bumps a word's recency.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordTouch {
    pub last_seen_at: DateTime<Utc>,
}
