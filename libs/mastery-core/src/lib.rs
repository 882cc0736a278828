//! Mastery scheduling core shared by every caller of the learning service.
//!
//! Provides:
//! - Mastery records and review outcomes (types)
//! - The SM-2 family mastery update rule (algorithm)
//! - A storage seam with an in-memory implementation (store)
//! - Outcome recording with optimistic concurrency (scheduler)
//! - Session planning and progress rollups (planner, progress)

pub mod algorithm;
pub mod config;
pub mod context;
pub mod error;
pub mod planner;
pub mod progress;
pub mod scheduler;
pub mod store;
pub mod types;

pub use algorithm::{format_mastery_change, MasteryAlgorithm, SchedulingResult};
pub use config::SchedulerConfig;
pub use context::RequestContext;
pub use error::{ConfigError, Result, SchedulerError, StoreError};
pub use planner::SessionPlanner;
pub use progress::{summarize_progress, ProgressSummary};
pub use scheduler::ReviewScheduler;
pub use store::{InMemoryMasteryStore, MasteryStore};
pub use types::{
    is_storable_timestamp, Confidence, MasteryRecord, ProgressStatus, QuestionKind, RecordKey,
    ReviewOutcome, MAX_RECORD_TIMESTAMP_MS, MIN_RECORD_TIMESTAMP_MS,
};
