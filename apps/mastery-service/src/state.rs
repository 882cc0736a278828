//! Application state.

use crate::db::SqliteMasteryStore;
use mastery_core::{MasteryStore, ReviewScheduler, SchedulerConfig, SchedulerError, SessionPlanner};
use std::sync::Arc;

/// Shared service state: one store, and the scheduler and planner over it.
pub struct AppState {
    pub store: Arc<SqliteMasteryStore>,
    pub scheduler: ReviewScheduler,
    pub planner: SessionPlanner,
}

impl AppState {
    pub fn new(store: SqliteMasteryStore, config: SchedulerConfig) -> Result<Self, SchedulerError> {
        let store = Arc::new(store);
        let shared: Arc<dyn MasteryStore> = store.clone();
        Ok(Self {
            scheduler: ReviewScheduler::new(shared.clone(), config)?,
            planner: SessionPlanner::new(shared),
            store,
        })
    }
}
