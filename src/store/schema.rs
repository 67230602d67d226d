use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::session::result::QuizResult;
use crate::session::setup::{QuizConfiguration, ScoringMode};

/// Storage key holding the JSON array of past results.
pub const HISTORY_KEY: &str = "mind_maze_results";

pub const UNKNOWN_CATEGORY: &str = "unknown";

/// One saved quiz: the result plus when, what and how it was played. The
/// score is fixed at save time.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub id: i64,
    pub date: DateTime<Utc>,
    pub category: String,
    pub mode: String,
    pub score: u32,
    #[serde(flatten)]
    pub result: QuizResult,
}

impl HistoryEntry {
    pub fn new(
        id: i64,
        date: DateTime<Utc>,
        config: &QuizConfiguration,
        mode: ScoringMode,
        result: QuizResult,
        score: u32,
    ) -> Self {
        Self {
            id,
            date,
            category: config.category.id().to_string(),
            mode: mode.as_str().to_string(),
            score,
            result,
        }
    }

    /// Fraction correct, 0.0 when the entry has no questions.
    pub fn accuracy(&self) -> f64 {
        self.result.accuracy()
    }

    pub fn share_text(&self) -> String {
        format!(
            "I scored {} points in Mind Maze's {} quiz on {}! I got {} correct out of {} questions.",
            self.score,
            self.mode,
            self.category,
            self.result.correct_answers,
            self.result.total_questions
        )
    }
}

/// Shape accepted when reading. Older entries may lack any of the metadata.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredEntry {
    #[serde(default)]
    id: Option<i64>,
    #[serde(default)]
    date: Option<String>,
    #[serde(default)]
    category: Option<String>,
    #[serde(default)]
    mode: Option<String>,
    #[serde(default)]
    score: Option<u32>,
    #[serde(flatten)]
    result: QuizResult,
}

/// Decode one stored element, filling gaps the way older saves expect:
/// unknown category, standard mode, ten points per correct answer.
pub fn entry_from_value(value: Value, fallback_id: i64, now: DateTime<Utc>) -> Option<HistoryEntry> {
    let stored: StoredEntry = serde_json::from_value(value).ok()?;
    let date = stored
        .date
        .as_deref()
        .and_then(|d| DateTime::parse_from_rfc3339(d).ok())
        .map(|d| d.with_timezone(&Utc))
        .unwrap_or(now);
    let score = stored
        .score
        .unwrap_or(stored.result.correct_answers * crate::engine::scoring::POINTS_PER_CORRECT);
    Some(HistoryEntry {
        id: stored.id.unwrap_or(fallback_id),
        date,
        category: stored
            .category
            .filter(|c| !c.is_empty())
            .unwrap_or_else(|| UNKNOWN_CATEGORY.to_string()),
        mode: stored
            .mode
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| ScoringMode::Standard.as_str().to_string()),
        score,
        result: stored.result,
    })
}
