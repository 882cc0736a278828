//! Common test utilities and fixtures for integration tests.
//!
//! Every context runs against its own in-memory SQLite database, so tests
//! need no external services and can run in parallel.

#![allow(dead_code)]

use chrono::{DateTime, Duration, TimeZone, Utc};
use mastery_core::{MasteryRecord, MasteryStore, ProgressStatus, SchedulerConfig};
use mastery_service::commands::handle_line;
use mastery_service::db::SqliteMasteryStore;
use mastery_service::state::AppState;
use serde_json::Value;

/// Test context holding the service state.
pub struct TestContext {
    pub state: AppState,
}

impl TestContext {
    pub fn new() -> Self {
        Self::with_config(SchedulerConfig::default())
    }

    pub fn with_config(config: SchedulerConfig) -> Self {
        let store = SqliteMasteryStore::open_in_memory().expect("Failed to open in-memory database");
        let state = AppState::new(store, config).expect("Failed to build state");
        Self { state }
    }

    /// Send one protocol line and decode the response.
    pub fn send(&self, request: Value) -> Value {
        let line = handle_line(&self.state, &request.to_string());
        serde_json::from_str(&line).expect("response is JSON")
    }

    /// Send and unwrap the `ok` payload.
    pub fn send_ok(&self, request: Value) -> Value {
        let response = self.send(request);
        match response.get("ok") {
            Some(value) => value.clone(),
            None => panic!("expected ok response, got {response}"),
        }
    }

    /// Store a reviewed record directly, bypassing the scheduler.
    pub fn seed(&self, record: MasteryRecord) -> MasteryRecord {
        let created = self
            .state
            .store
            .get_or_create(&record.user_id, &record.item_id, record.due_at, record.ease_factor)
            .expect("create record");
        self.state
            .store
            .save(&MasteryRecord {
                revision: created.revision,
                ..record
            })
            .expect("seed record")
    }
}

/// Fixed reference instant for all tests.
pub fn t() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 9, 14, 15, 0, 0).unwrap()
}

/// A previously reviewed record due at `due_at`.
pub fn reviewed(user_id: &str, item_id: &str, due_at: DateTime<Utc>, score: f64) -> MasteryRecord {
    MasteryRecord {
        mastery_score: score,
        status: ProgressStatus::InProgress,
        interval_days: 1.0,
        attempt_count: 1,
        consecutive_correct: 1,
        last_reviewed_at: Some(due_at - Duration::days(1)),
        ..MasteryRecord::new(user_id, item_id, due_at, 2.5)
    }
}
