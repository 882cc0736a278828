//! Error types for mastery-core.

use chrono::{DateTime, Utc};
use thiserror::Error;

/// Result type alias using SchedulerError.
pub type Result<T> = std::result::Result<T, SchedulerError>;

/// Errors raised by a `MasteryStore` implementation.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage unavailable: {0}")]
    Unavailable(String),

    #[error("revision conflict for {user_id}/{item_id}: expected revision {expected_revision}")]
    Conflict {
        user_id: String,
        item_id: String,
        expected_revision: u64,
    },

    #[error("corrupt record: {0}")]
    Corrupt(String),
}

/// Errors surfaced by the scheduler and planner.
#[derive(Debug, Error)]
pub enum SchedulerError {
    #[error(transparent)]
    Storage(StoreError),

    #[error("outcome for {user_id}/{item_id} answered at {answered_at} precedes last review at {last_reviewed_at}")]
    OutOfOrderUpdate {
        user_id: String,
        item_id: String,
        answered_at: DateTime<Utc>,
        last_reviewed_at: DateTime<Utc>,
    },

    #[error("invalid outcome for {user_id}/{item_id}: {reason}")]
    InvalidOutcome {
        user_id: String,
        item_id: String,
        reason: String,
    },

    #[error("concurrent update for {user_id}/{item_id}")]
    ConcurrentUpdate { user_id: String, item_id: String },

    #[error("scheduling unavailable after {attempts} attempts")]
    Unavailable { attempts: u32 },

    #[error("invalid config: {0}")]
    InvalidConfig(#[from] ConfigError),
}

impl From<StoreError> for SchedulerError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Conflict {
                user_id, item_id, ..
            } => Self::ConcurrentUpdate { user_id, item_id },
            other => Self::Storage(other),
        }
    }
}

/// Configuration value outside its allowed range.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{field} must be within [{min}, {max}], got {value}")]
    OutOfRange {
        field: &'static str,
        min: f64,
        max: f64,
        value: f64,
    },

    #[error("{field} must be at least 1")]
    Zero { field: &'static str },

    #[error("max_ease ({max}) must not be below min_ease ({min})")]
    EaseBounds { min: f64, max: f64 },

    #[error("cannot parse {field}: {value}")]
    Parse { field: &'static str, value: String },
}
