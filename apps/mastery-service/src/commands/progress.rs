//! Progress summary command.

use super::CommandError;
use crate::state::AppState;
use mastery_core::{summarize_progress, ProgressSummary};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct ProgressRequest {
    pub user_id: String,
    pub item_ids: Vec<String>,
}

/// Completion and mastery percentages over a course's items.
pub fn progress(state: &AppState, request: ProgressRequest) -> Result<ProgressSummary, CommandError> {
    summarize_progress(state.store.as_ref(), &request.user_id, &request.item_ids).map_err(Into::into)
}
