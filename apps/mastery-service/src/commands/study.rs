//! Review and session commands.

use super::CommandError;
use crate::state::AppState;
use chrono::{DateTime, Utc};
use mastery_core::{MasteryRecord, MasteryStore, RequestContext, ReviewOutcome};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
pub struct ReviewResponse {
    pub record: MasteryRecord,
    pub previous_score: f64,
    /// Signed delta as shown to the learner, e.g. "+0.10".
    pub mastery_change: String,
}

#[derive(Debug, Deserialize)]
pub struct MarkUnderstoodRequest {
    pub user_id: String,
    pub item_id: String,
    #[serde(default)]
    pub answered_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
pub struct PlanSessionRequest {
    pub user_id: String,
    pub candidate_item_ids: Vec<String>,
    pub target_size: usize,
    #[serde(default)]
    pub as_of: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
pub struct WeaknessSessionRequest {
    pub user_id: String,
    pub target_size: usize,
}

#[derive(Debug, Deserialize)]
pub struct RecordRequest {
    pub user_id: String,
    pub item_id: String,
}

#[derive(Debug, Serialize)]
pub struct PlanResponse {
    pub item_ids: Vec<String>,
    /// Nothing due and nothing new to introduce.
    pub all_caught_up: bool,
}

impl From<Vec<String>> for PlanResponse {
    fn from(item_ids: Vec<String>) -> Self {
        Self {
            all_caught_up: item_ids.is_empty(),
            item_ids,
        }
    }
}

/// Apply an evaluated quiz answer.
pub fn record_outcome(
    state: &AppState,
    ctx: &RequestContext,
    outcome: &ReviewOutcome,
) -> Result<ReviewResponse, CommandError> {
    let result = state.scheduler.record_outcome_detailed(ctx, outcome)?;
    Ok(ReviewResponse {
        mastery_change: result.mastery_change_label(),
        previous_score: result.previous_score,
        record: result.record,
    })
}

/// Learn-mode confirmation: a correct answer without stated confidence.
pub fn mark_understood(
    state: &AppState,
    ctx: &RequestContext,
    request: MarkUnderstoodRequest,
) -> Result<ReviewResponse, CommandError> {
    let answered_at = request.answered_at.unwrap_or_else(Utc::now);
    let outcome = ReviewOutcome::understood(request.user_id, request.item_id, answered_at);
    record_outcome(state, ctx, &outcome)
}

/// Next batch of due and new items.
pub fn plan_session(
    state: &AppState,
    ctx: &RequestContext,
    request: PlanSessionRequest,
) -> Result<PlanResponse, CommandError> {
    let as_of = request.as_of.unwrap_or_else(Utc::now);
    let item_ids = state.planner.plan_session(
        ctx,
        &request.user_id,
        &request.candidate_item_ids,
        request.target_size,
        as_of,
    )?;
    Ok(item_ids.into())
}

/// Lowest-mastery items for a weakness drill.
pub fn plan_weakness_session(
    state: &AppState,
    ctx: &RequestContext,
    request: WeaknessSessionRequest,
) -> Result<PlanResponse, CommandError> {
    let item_ids = state
        .planner
        .plan_weakness_session(ctx, &request.user_id, request.target_size)?;
    Ok(item_ids.into())
}

/// Stored record, if the item was ever exposed.
pub fn get_record(
    state: &AppState,
    request: RecordRequest,
) -> Result<Option<MasteryRecord>, CommandError> {
    state
        .store
        .get(&request.user_id, &request.item_id)
        .map_err(Into::into)
}
