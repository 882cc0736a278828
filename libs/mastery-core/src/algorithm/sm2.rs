//! SM-2 family update rule extended with a mastery score.
//!
//! Correct answers raise mastery (scaled by confidence), grow the ease factor and
//! multiply the interval; incorrect answers apply a flat penalty, shrink the ease
//! factor and reset the interval to one day.

use super::{MasteryAlgorithm, SchedulingResult, MS_PER_DAY};
use crate::config::SchedulerConfig;
use crate::error::{Result, SchedulerError};
use crate::types::{MasteryRecord, ProgressStatus, ReviewOutcome};
use chrono::Duration;

/// Mastery-aware SM-2 with configurable parameters.
#[derive(Debug, Clone, Default)]
pub struct MasterySm2 {
    config: SchedulerConfig,
}

impl MasterySm2 {
    pub fn new(config: SchedulerConfig) -> Self {
        Self { config }
    }

    /// Status implied by the given state.
    pub fn derive_status(&self, score: f64, streak: u32, attempts: u32) -> ProgressStatus {
        if attempts == 0 {
            ProgressStatus::NotStarted
        } else if score >= self.config.mastery_threshold
            && streak >= self.config.mastery_streak_requirement
        {
            ProgressStatus::Mastered
        } else if score >= self.config.completion_threshold {
            ProgressStatus::Completed
        } else {
            ProgressStatus::InProgress
        }
    }

    fn next_ease(&self, ease: f64, correct: bool) -> f64 {
        if correct {
            (ease + self.config.ease_step_correct).min(self.config.max_ease)
        } else {
            (ease - self.config.ease_step_incorrect).max(self.config.min_ease)
        }
    }

    fn next_interval(&self, previous: f64, ease: f64, correct: bool, streak: u32) -> f64 {
        // First correct answer after a reset (or ever) restarts the ladder.
        if !correct || streak == 1 {
            return 1.0;
        }
        (previous.max(1.0) * ease).min(self.config.max_interval_days)
    }
}

impl MasteryAlgorithm for MasterySm2 {
    fn name(&self) -> &'static str {
        "mastery_sm2"
    }

    fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    fn schedule(&self, record: &MasteryRecord, outcome: &ReviewOutcome) -> Result<SchedulingResult> {
        let correct = outcome.is_correct;

        let (delta, streak) = if correct {
            let base = self.config.correct_base_delta(outcome.question_kind);
            (
                base * self.config.confidence_multiplier(outcome.confidence),
                record.consecutive_correct.saturating_add(1),
            )
        } else {
            (-self.config.incorrect_delta, 0)
        };

        let score = round_score((record.mastery_score + delta).clamp(0.0, 1.0));
        let ease = self.next_ease(record.ease_factor, correct);
        let interval = self.next_interval(record.interval_days, ease, correct, streak);
        let step = Duration::milliseconds((interval * MS_PER_DAY).round() as i64);
        let due_at = outcome.answered_at.checked_add_signed(step).ok_or_else(|| {
            SchedulerError::InvalidOutcome {
                user_id: outcome.user_id.clone(),
                item_id: outcome.item_id.clone(),
                reason: format!("due date overflows {} + {interval} days", outcome.answered_at),
            }
        })?;
        let attempts = record.attempt_count.saturating_add(1);

        Ok(SchedulingResult {
            record: MasteryRecord {
                user_id: record.user_id.clone(),
                item_id: record.item_id.clone(),
                mastery_score: score,
                status: self.derive_status(score, streak, attempts),
                ease_factor: ease,
                interval_days: interval,
                due_at,
                consecutive_correct: streak,
                last_reviewed_at: Some(outcome.answered_at),
                attempt_count: attempts,
                revision: record.revision,
            },
            previous_score: record.mastery_score,
            mastery_change: round_score(score - record.mastery_score),
        })
    }
}

/// Round to six decimals so repeated fixed steps land exactly on thresholds.
fn round_score(value: f64) -> f64 {
    (value * 1e6).round() / 1e6
}
