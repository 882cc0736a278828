//! Commands exposed to callers over the line protocol.
//!
//! Each input line is one JSON request tagged by `op`; each output line is
//! `{"ok": ...}` or `{"error": {"kind": ..., "message": ...}}`.

pub mod progress;
pub mod study;

use crate::state::AppState;
use mastery_core::{RequestContext, ReviewOutcome, SchedulerError, StoreError};
use serde::{Deserialize, Serialize};

pub use progress::{progress, ProgressRequest};
pub use study::{
    get_record, mark_understood, plan_session, plan_weakness_session, record_outcome,
    MarkUnderstoodRequest, PlanResponse, PlanSessionRequest, RecordRequest, ReviewResponse,
    WeaknessSessionRequest,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandError {
    pub kind: String,
    pub message: String,
}

impl CommandError {
    pub fn new(kind: &str, message: impl Into<String>) -> Self {
        Self {
            kind: kind.to_string(),
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new("bad_request", message)
    }
}

impl From<SchedulerError> for CommandError {
    fn from(e: SchedulerError) -> Self {
        let kind = match &e {
            SchedulerError::Storage(_) => "storage",
            SchedulerError::OutOfOrderUpdate { .. } => "out_of_order",
            SchedulerError::InvalidOutcome { .. } => "invalid_outcome",
            SchedulerError::ConcurrentUpdate { .. } | SchedulerError::Unavailable { .. } => {
                "unavailable"
            }
            SchedulerError::InvalidConfig(_) => "config",
        };
        Self::new(kind, e.to_string())
    }
}

impl From<StoreError> for CommandError {
    fn from(e: StoreError) -> Self {
        SchedulerError::from(e).into()
    }
}

/// A single decoded request line.
#[derive(Debug, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Request {
    RecordOutcome(ReviewOutcome),
    MarkUnderstood(MarkUnderstoodRequest),
    PlanSession(PlanSessionRequest),
    PlanWeaknessSession(WeaknessSessionRequest),
    GetRecord(RecordRequest),
    Progress(ProgressRequest),
}

impl Request {
    fn user_id(&self) -> &str {
        match self {
            Self::RecordOutcome(r) => &r.user_id,
            Self::MarkUnderstood(r) => &r.user_id,
            Self::PlanSession(r) => &r.user_id,
            Self::PlanWeaknessSession(r) => &r.user_id,
            Self::GetRecord(r) => &r.user_id,
            Self::Progress(r) => &r.user_id,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Response {
    Ok(serde_json::Value),
    Error(CommandError),
}

/// Run one request against the state.
pub fn dispatch(state: &AppState, request: Request) -> Result<serde_json::Value, CommandError> {
    let ctx = RequestContext::for_actor(request.user_id());
    let value = match request {
        Request::RecordOutcome(outcome) => to_value(record_outcome(state, &ctx, &outcome)?),
        Request::MarkUnderstood(req) => to_value(mark_understood(state, &ctx, req)?),
        Request::PlanSession(req) => to_value(plan_session(state, &ctx, req)?),
        Request::PlanWeaknessSession(req) => to_value(plan_weakness_session(state, &ctx, req)?),
        Request::GetRecord(req) => to_value(get_record(state, req)?),
        Request::Progress(req) => to_value(progress(state, req)?),
    };
    value.map_err(|e| CommandError::new("internal", e.to_string()))
}

/// Decode, run and encode a single protocol line.
pub fn handle_line(state: &AppState, line: &str) -> String {
    let response = match serde_json::from_str::<Request>(line) {
        Ok(request) => match dispatch(state, request) {
            Ok(value) => Response::Ok(value),
            Err(err) => {
                tracing::warn!(kind = %err.kind, message = %err.message, "command failed");
                Response::Error(err)
            }
        },
        Err(e) => Response::Error(CommandError::bad_request(e.to_string())),
    };
    serde_json::to_string(&response).unwrap_or_else(|e| {
        tracing::error!(error = %e, "cannot encode response");
        ENCODE_FAILED_LINE.to_string()
    })
}

/// Sent when a response cannot be serialized.
const ENCODE_FAILED_LINE: &str =
    r#"{"error":{"kind":"internal","message":"response could not be encoded"}}"#;

fn to_value<T: Serialize>(value: T) -> serde_json::Result<serde_json::Value> {
    serde_json::to_value(value)
}
