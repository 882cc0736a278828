//! Applies review outcomes to stored mastery records.

use crate::algorithm::sm2::MasterySm2;
use crate::algorithm::{MasteryAlgorithm, SchedulingResult, MS_PER_DAY};
use crate::config::SchedulerConfig;
use crate::context::RequestContext;
use crate::error::{Result, SchedulerError};
use crate::store::MasteryStore;
use crate::types::{is_storable_timestamp, MasteryRecord, ReviewOutcome};
use chrono::Duration;
use std::sync::Arc;

/// Read-modify-write front end over a `MasteryStore`.
///
/// Writes to the same key are serialized through the store's revision check;
/// a lost race is retried against a fresh read up to `max_retries` times.
pub struct ReviewScheduler {
    store: Arc<dyn MasteryStore>,
    algorithm: Box<dyn MasteryAlgorithm>,
}

impl ReviewScheduler {
    pub fn new(store: Arc<dyn MasteryStore>, config: SchedulerConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            store,
            algorithm: Box::new(MasterySm2::new(config)),
        })
    }

    pub fn with_algorithm(
        store: Arc<dyn MasteryStore>,
        algorithm: Box<dyn MasteryAlgorithm>,
    ) -> Result<Self> {
        algorithm.config().validate()?;
        Ok(Self { store, algorithm })
    }

    pub fn config(&self) -> &SchedulerConfig {
        self.algorithm.config()
    }

    pub fn store(&self) -> &Arc<dyn MasteryStore> {
        &self.store
    }

    /// Apply an outcome and return the persisted record.
    pub fn record_outcome(
        &self,
        ctx: &RequestContext,
        outcome: &ReviewOutcome,
    ) -> Result<MasteryRecord> {
        self.record_outcome_detailed(ctx, outcome)
            .map(|result| result.record)
    }

    /// Apply an outcome, also reporting the score movement.
    pub fn record_outcome_detailed(
        &self,
        ctx: &RequestContext,
        outcome: &ReviewOutcome,
    ) -> Result<SchedulingResult> {
        let _span = ctx.span("record_outcome").entered();
        self.check_answered_at(outcome)?;
        let max_retries = self.config().max_retries;
        let mut attempt = 0;

        loop {
            attempt += 1;
            match self.apply_once(outcome) {
                Err(SchedulerError::ConcurrentUpdate { user_id, item_id }) => {
                    if attempt > max_retries {
                        tracing::error!(
                            user_id = %user_id,
                            item_id = %item_id,
                            attempts = attempt,
                            "giving up on contended mastery record"
                        );
                        return Err(SchedulerError::Unavailable { attempts: attempt });
                    }
                    tracing::warn!(
                        user_id = %user_id,
                        item_id = %item_id,
                        attempt,
                        "revision conflict, retrying"
                    );
                }
                other => return other,
            }
        }
    }

    /// Rejects outcomes whose timestamps, or any due date derived from them,
    /// would leave the storable range. Runs before the record is created.
    fn check_answered_at(&self, outcome: &ReviewOutcome) -> Result<()> {
        let horizon = Duration::milliseconds((self.config().max_interval_days * MS_PER_DAY).ceil() as i64);
        let latest_due = outcome.answered_at.checked_add_signed(horizon);
        if is_storable_timestamp(outcome.answered_at) && latest_due.is_some_and(is_storable_timestamp) {
            return Ok(());
        }
        tracing::warn!(
            user_id = %outcome.user_id,
            item_id = %outcome.item_id,
            answered_at = %outcome.answered_at,
            "rejecting outcome outside schedulable range"
        );
        Err(SchedulerError::InvalidOutcome {
            user_id: outcome.user_id.clone(),
            item_id: outcome.item_id.clone(),
            reason: format!("answered_at {} is outside the schedulable range", outcome.answered_at),
        })
    }

    fn apply_once(&self, outcome: &ReviewOutcome) -> Result<SchedulingResult> {
        let current = self.store.get_or_create(
            &outcome.user_id,
            &outcome.item_id,
            outcome.answered_at,
            self.config().initial_ease,
        )?;

        if let Some(last_reviewed_at) = current.last_reviewed_at {
            if outcome.answered_at < last_reviewed_at {
                return Err(SchedulerError::OutOfOrderUpdate {
                    user_id: outcome.user_id.clone(),
                    item_id: outcome.item_id.clone(),
                    answered_at: outcome.answered_at,
                    last_reviewed_at,
                });
            }
        }

        let mut result = self.algorithm.schedule(&current, outcome)?;
        result.record = self.store.save(&result.record)?;

        tracing::debug!(
            user_id = %outcome.user_id,
            item_id = %outcome.item_id,
            correct = outcome.is_correct,
            from = result.previous_score,
            to = result.record.mastery_score,
            interval_days = result.record.interval_days,
            status = result.record.status.as_str(),
            "recorded outcome"
        );
        Ok(result)
    }
}
