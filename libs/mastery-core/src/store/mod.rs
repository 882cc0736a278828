//! Persistence seam for mastery records.

pub mod memory;

use crate::error::StoreError;
use crate::types::MasteryRecord;
use chrono::{DateTime, Utc};

pub use memory::InMemoryMasteryStore;

type Result<T> = std::result::Result<T, StoreError>;

/// Keyed access to mastery records.
///
/// Implementations must create at most one record per `(user_id, item_id)` and
/// treat `save` as a compare-and-swap on `MasteryRecord::revision`.
pub trait MasteryStore: Send + Sync {
    fn get(&self, user_id: &str, item_id: &str) -> Result<Option<MasteryRecord>>;

    /// Load the record, creating a default one (due at `now`) if absent.
    fn get_or_create(
        &self,
        user_id: &str,
        item_id: &str,
        now: DateTime<Utc>,
        initial_ease: f64,
    ) -> Result<MasteryRecord>;

    /// Upsert `record` if the stored revision still equals `record.revision`.
    ///
    /// Returns the stored record with its revision bumped by one. A record that
    /// does not exist yet is inserted only when `record.revision == 0`.
    fn save(&self, record: &MasteryRecord) -> Result<MasteryRecord>;

    /// Records due at `as_of`, most overdue first, ties broken by item id.
    fn list_due_for_user(
        &self,
        user_id: &str,
        as_of: DateTime<Utc>,
        limit: usize,
    ) -> Result<Vec<MasteryRecord>>;

    /// Candidates without a record, in candidate order.
    fn list_unseen_for_user(
        &self,
        user_id: &str,
        candidate_item_ids: &[String],
        limit: usize,
    ) -> Result<Vec<String>>;

    /// Attempted, non-mastered records with the lowest score first, ties by item id.
    fn list_weakest_for_user(&self, user_id: &str, limit: usize) -> Result<Vec<MasteryRecord>>;
}
