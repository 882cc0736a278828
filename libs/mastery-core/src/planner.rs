//! Session building: due reviews first, then new introductions.

use crate::context::RequestContext;
use crate::error::Result;
use crate::store::MasteryStore;
use chrono::{DateTime, Utc};
use std::sync::Arc;

/// Deterministic selector of items for a practice or learn session.
pub struct SessionPlanner {
    store: Arc<dyn MasteryStore>,
}

impl SessionPlanner {
    pub fn new(store: Arc<dyn MasteryStore>) -> Self {
        Self { store }
    }

    /// Item ids for the next session, at most `target_size` long.
    ///
    /// Due items come first (most overdue first), followed by unseen
    /// candidates in the order given. An empty result means nothing is due
    /// and no candidate is left to introduce.
    pub fn plan_session(
        &self,
        ctx: &RequestContext,
        user_id: &str,
        candidate_item_ids: &[String],
        target_size: usize,
        as_of: DateTime<Utc>,
    ) -> Result<Vec<String>> {
        let _span = ctx.span("plan_session").entered();
        if target_size == 0 {
            return Ok(Vec::new());
        }

        let due = self.store.list_due_for_user(user_id, as_of, target_size)?;
        let mut plan: Vec<String> = due.into_iter().map(|record| record.item_id).collect();
        let due_count = plan.len();

        if plan.len() < target_size {
            let unseen = self.store.list_unseen_for_user(
                user_id,
                candidate_item_ids,
                target_size - plan.len(),
            )?;
            plan.extend(unseen);
        }
        plan.truncate(target_size);

        tracing::debug!(
            user_id,
            due = due_count,
            new = plan.len() - due_count,
            "planned session"
        );
        Ok(plan)
    }

    /// Lowest-mastery attempted items that are not yet mastered.
    pub fn plan_weakness_session(
        &self,
        ctx: &RequestContext,
        user_id: &str,
        target_size: usize,
    ) -> Result<Vec<String>> {
        let _span = ctx.span("plan_weakness_session").entered();
        let weak = self.store.list_weakest_for_user(user_id, target_size)?;
        Ok(weak.into_iter().map(|record| record.item_id).collect())
    }
}
