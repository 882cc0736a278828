//! In-process store backed by a locked hash map.

use super::{MasteryStore, Result};
use crate::error::StoreError;
use crate::types::{MasteryRecord, ProgressStatus, RecordKey};
use chrono::{DateTime, Utc};
use std::collections::{HashMap, HashSet};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Thread-safe in-memory `MasteryStore`.
#[derive(Debug, Default)]
pub struct InMemoryMasteryStore {
    records: RwLock<HashMap<RecordKey, MasteryRecord>>,
}

impl InMemoryMasteryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records.
    pub fn len(&self) -> Result<usize> {
        Ok(self.read()?.len())
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.read()?.is_empty())
    }

    /// Insert or replace a record without a revision check (fixtures, imports).
    pub fn insert(&self, record: MasteryRecord) -> Result<()> {
        self.write()?.insert(record.key(), record);
        Ok(())
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, HashMap<RecordKey, MasteryRecord>>> {
        self.records
            .read()
            .map_err(|_| StoreError::Unavailable("mastery store lock poisoned".into()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, HashMap<RecordKey, MasteryRecord>>> {
        self.records
            .write()
            .map_err(|_| StoreError::Unavailable("mastery store lock poisoned".into()))
    }
}

impl MasteryStore for InMemoryMasteryStore {
    fn get(&self, user_id: &str, item_id: &str) -> Result<Option<MasteryRecord>> {
        Ok(self.read()?.get(&RecordKey::new(user_id, item_id)).cloned())
    }

    fn get_or_create(
        &self,
        user_id: &str,
        item_id: &str,
        now: DateTime<Utc>,
        initial_ease: f64,
    ) -> Result<MasteryRecord> {
        if let Some(record) = self.get(user_id, item_id)? {
            return Ok(record);
        }
        let mut records = self.write()?;
        let record = records
            .entry(RecordKey::new(user_id, item_id))
            .or_insert_with(|| MasteryRecord::new(user_id, item_id, now, initial_ease));
        Ok(record.clone())
    }

    fn save(&self, record: &MasteryRecord) -> Result<MasteryRecord> {
        let mut records = self.write()?;
        let key = record.key();
        let stored_revision = records.get(&key).map(|r| r.revision).unwrap_or(0);
        if stored_revision != record.revision {
            return Err(StoreError::Conflict {
                user_id: key.user_id,
                item_id: key.item_id,
                expected_revision: record.revision,
            });
        }
        let saved = MasteryRecord {
            revision: record.revision + 1,
            ..record.clone()
        };
        records.insert(key, saved.clone());
        Ok(saved)
    }

    fn list_due_for_user(
        &self,
        user_id: &str,
        as_of: DateTime<Utc>,
        limit: usize,
    ) -> Result<Vec<MasteryRecord>> {
        let records = self.read()?;
        let mut due: Vec<MasteryRecord> = records
            .values()
            .filter(|r| r.user_id == user_id && r.is_due(as_of))
            .cloned()
            .collect();
        due.sort_by(|a, b| a.due_at.cmp(&b.due_at).then_with(|| a.item_id.cmp(&b.item_id)));
        due.truncate(limit);
        Ok(due)
    }

    fn list_unseen_for_user(
        &self,
        user_id: &str,
        candidate_item_ids: &[String],
        limit: usize,
    ) -> Result<Vec<String>> {
        let records = self.read()?;
        let mut seen = HashSet::new();
        let unseen = candidate_item_ids
            .iter()
            .filter(|id| seen.insert(id.as_str()))
            .filter(|id| !records.contains_key(&RecordKey::new(user_id, id.as_str())))
            .take(limit)
            .cloned()
            .collect();
        Ok(unseen)
    }

    fn list_weakest_for_user(&self, user_id: &str, limit: usize) -> Result<Vec<MasteryRecord>> {
        let records = self.read()?;
        let mut weak: Vec<MasteryRecord> = records
            .values()
            .filter(|r| {
                r.user_id == user_id && r.attempt_count > 0 && r.status != ProgressStatus::Mastered
            })
            .cloned()
            .collect();
        weak.sort_by(|a, b| {
            a.mastery_score
                .total_cmp(&b.mastery_score)
                .then_with(|| a.item_id.cmp(&b.item_id))
        });
        weak.truncate(limit);
        Ok(weak)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use std::sync::{Arc, Barrier};
    use std::thread;

    fn t() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 5, 10, 12, 0, 0).unwrap()
    }

    fn record_due(item: &str, due_at: DateTime<Utc>) -> MasteryRecord {
        MasteryRecord {
            due_at,
            attempt_count: 1,
            last_reviewed_at: Some(due_at - Duration::days(1)),
            status: ProgressStatus::InProgress,
            ..MasteryRecord::new("u1", item, due_at, 2.5)
        }
    }

    #[test]
    fn get_or_create_is_idempotent() {
        let store = InMemoryMasteryStore::new();
        let first = store.get_or_create("u1", "ip1", t(), 2.5).unwrap();
        let second = store
            .get_or_create("u1", "ip1", t() + Duration::hours(3), 2.5)
            .unwrap();
        assert_eq!(first, second);
        assert_eq!(store.len().unwrap(), 1);
        assert_eq!(first.due_at, t());
    }

    #[test]
    fn concurrent_first_exposure_creates_one_record() {
        let store = Arc::new(InMemoryMasteryStore::new());
        let barrier = Arc::new(Barrier::new(8));
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let store = Arc::clone(&store);
                let barrier = Arc::clone(&barrier);
                thread::spawn(move || {
                    barrier.wait();
                    store
                        .get_or_create("u1", "ip1", t() + Duration::seconds(i), 2.5)
                        .unwrap()
                })
            })
            .collect();
        let created: Vec<MasteryRecord> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert_eq!(store.len().unwrap(), 1);
        assert!(created.windows(2).all(|w| w[0] == w[1]));
    }

    #[test]
    fn save_bumps_revision_and_rejects_stale_writes() {
        let store = InMemoryMasteryStore::new();
        let record = store.get_or_create("u1", "ip1", t(), 2.5).unwrap();
        let saved = store.save(&record).unwrap();
        assert_eq!(saved.revision, 1);

        let err = store.save(&record).unwrap_err();
        assert!(matches!(err, StoreError::Conflict { expected_revision: 0, .. }));

        let saved_again = store.save(&saved).unwrap();
        assert_eq!(saved_again.revision, 2);
    }

    #[test]
    fn save_inserts_missing_record_at_revision_zero() {
        let store = InMemoryMasteryStore::new();
        let record = MasteryRecord::new("u1", "ip9", t(), 2.5);
        assert_eq!(store.save(&record).unwrap().revision, 1);

        let stale = MasteryRecord {
            revision: 3,
            ..MasteryRecord::new("u1", "ip10", t(), 2.5)
        };
        assert!(store.save(&stale).is_err());
        assert!(store.get("u1", "ip10").unwrap().is_none());
    }

    #[test]
    fn due_list_orders_by_due_then_item() {
        let store = InMemoryMasteryStore::new();
        store.insert(record_due("c", t() - Duration::days(1))).unwrap();
        store.insert(record_due("b", t() - Duration::days(2))).unwrap();
        store.insert(record_due("a", t() + Duration::days(1))).unwrap();
        store.insert(record_due("d", t() - Duration::days(1))).unwrap();
        store
            .insert(MasteryRecord::new("u2", "z", t() - Duration::days(9), 2.5))
            .unwrap();

        let due = store.list_due_for_user("u1", t(), 2).unwrap();
        let ids: Vec<&str> = due.iter().map(|r| r.item_id.as_str()).collect();
        assert_eq!(ids, vec!["b", "c"]);

        let all = store.list_due_for_user("u1", t(), 10).unwrap();
        let ids: Vec<&str> = all.iter().map(|r| r.item_id.as_str()).collect();
        assert_eq!(ids, vec!["b", "c", "d"]);
    }

    #[test]
    fn unseen_keeps_candidate_order() {
        let store = InMemoryMasteryStore::new();
        store.get_or_create("u1", "ip2", t(), 2.5).unwrap();
        store.get_or_create("u2", "ip3", t(), 2.5).unwrap();
        let candidates: Vec<String> = ["ip4", "ip2", "ip3", "ip1", "ip4"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let unseen = store.list_unseen_for_user("u1", &candidates, 10).unwrap();
        assert_eq!(unseen, vec!["ip4", "ip3", "ip1"]);
        let capped = store.list_unseen_for_user("u1", &candidates, 2).unwrap();
        assert_eq!(capped, vec!["ip4", "ip3"]);
    }

    #[test]
    fn weakest_skips_unattempted_and_mastered() {
        let store = InMemoryMasteryStore::new();
        store.get_or_create("u1", "fresh", t(), 2.5).unwrap();
        for (item, score, status) in [
            ("b", 0.4, ProgressStatus::InProgress),
            ("a", 0.4, ProgressStatus::InProgress),
            ("m", 0.95, ProgressStatus::Mastered),
            ("c", 0.1, ProgressStatus::InProgress),
        ] {
            store
                .insert(MasteryRecord {
                    mastery_score: score,
                    status,
                    ..record_due(item, t())
                })
                .unwrap();
        }
        let weak = store.list_weakest_for_user("u1", 10).unwrap();
        let ids: Vec<&str> = weak.iter().map(|r| r.item_id.as_str()).collect();
        assert_eq!(ids, vec!["c", "a", "b"]);
    }

    #[test]
    fn poisoned_lock_is_reported_not_hidden() {
        let store = Arc::new(InMemoryMasteryStore::new());
        let holder = Arc::clone(&store);
        let _ = thread::spawn(move || {
            let _guard = holder.records.write().unwrap();
            panic!("writer died holding the lock");
        })
        .join();

        assert!(matches!(store.len(), Err(StoreError::Unavailable(_))));
        assert!(matches!(store.is_empty(), Err(StoreError::Unavailable(_))));
    }
}
