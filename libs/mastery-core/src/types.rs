//! Core types for mastery scheduling.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Learning progress of a single item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProgressStatus {
    NotStarted,
    InProgress,
    Completed,
    Mastered,
}

impl Default for ProgressStatus {
    fn default() -> Self {
        Self::NotStarted
    }
}

impl ProgressStatus {
    /// Get the status name as stored.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotStarted => "NOT_STARTED",
            Self::InProgress => "IN_PROGRESS",
            Self::Completed => "COMPLETED",
            Self::Mastered => "MASTERED",
        }
    }

    /// Parse from stored name.
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "NOT_STARTED" => Some(Self::NotStarted),
            "IN_PROGRESS" => Some(Self::InProgress),
            "COMPLETED" => Some(Self::Completed),
            "MASTERED" => Some(Self::Mastered),
            _ => None,
        }
    }

    /// Completed or better.
    pub fn is_completed(self) -> bool {
        matches!(self, Self::Completed | Self::Mastered)
    }
}

/// Self-reported confidence attached to an answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Confidence {
    Guess,
    SomewhatSure,
    Confident,
}

/// Question format the answer was given in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionKind {
    Binary,
    MultipleChoice,
    QuestionAnswer,
}

/// Identity of a mastery record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RecordKey {
    pub user_id: String,
    pub item_id: String,
}

impl RecordKey {
    pub fn new(user_id: impl Into<String>, item_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            item_id: item_id.into(),
        }
    }
}

/// Per-user, per-item learning state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MasteryRecord {
    pub user_id: String,
    pub item_id: String,
    pub mastery_score: f64,
    pub status: ProgressStatus,
    pub ease_factor: f64,
    pub interval_days: f64,
    pub due_at: DateTime<Utc>,
    pub consecutive_correct: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_reviewed_at: Option<DateTime<Utc>>,
    pub attempt_count: u32,
    /// Optimistic concurrency token; bumped by every successful save.
    pub revision: u64,
}

impl MasteryRecord {
    /// Fresh record for an item seen for the first time.
    pub fn new(
        user_id: impl Into<String>,
        item_id: impl Into<String>,
        now: DateTime<Utc>,
        initial_ease: f64,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            item_id: item_id.into(),
            mastery_score: 0.0,
            status: ProgressStatus::NotStarted,
            ease_factor: initial_ease,
            interval_days: 0.0,
            due_at: now,
            consecutive_correct: 0,
            last_reviewed_at: None,
            attempt_count: 0,
            revision: 0,
        }
    }

    pub fn key(&self) -> RecordKey {
        RecordKey::new(self.user_id.clone(), self.item_id.clone())
    }

    /// Whether the item is eligible for review at `as_of`.
    pub fn is_due(&self, as_of: DateTime<Utc>) -> bool {
        self.due_at <= as_of
    }
}

/// Earliest record timestamp, 0001-01-01T00:00:00Z, in epoch milliseconds.
pub const MIN_RECORD_TIMESTAMP_MS: i64 = -62_135_596_800_000;
/// Latest record timestamp, 9999-12-31T23:59:59.999Z, in epoch milliseconds.
pub const MAX_RECORD_TIMESTAMP_MS: i64 = 253_402_300_799_999;

/// Whether `ts` falls in the four-digit-year range every store can hold.
pub fn is_storable_timestamp(ts: DateTime<Utc>) -> bool {
    (MIN_RECORD_TIMESTAMP_MS..=MAX_RECORD_TIMESTAMP_MS).contains(&ts.timestamp_millis())
}

/// An evaluated answer, consumed once by the scheduler.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewOutcome {
    pub item_id: String,
    pub user_id: String,
    pub is_correct: bool,
    #[serde(default)]
    pub confidence: Option<Confidence>,
    pub answered_at: DateTime<Utc>,
    #[serde(default)]
    pub question_kind: Option<QuestionKind>,
}

impl ReviewOutcome {
    pub fn new(
        user_id: impl Into<String>,
        item_id: impl Into<String>,
        is_correct: bool,
        confidence: Option<Confidence>,
        answered_at: DateTime<Utc>,
    ) -> Self {
        Self {
            item_id: item_id.into(),
            user_id: user_id.into(),
            is_correct,
            confidence,
            answered_at,
            question_kind: None,
        }
    }

    /// Learn-mode "I understand" confirmation.
    pub fn understood(
        user_id: impl Into<String>,
        item_id: impl Into<String>,
        answered_at: DateTime<Utc>,
    ) -> Self {
        Self::new(user_id, item_id, true, None, answered_at)
    }

    pub fn with_question_kind(mut self, kind: QuestionKind) -> Self {
        self.question_kind = Some(kind);
        self
    }
}
