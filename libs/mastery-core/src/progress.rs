//! Course-level progress rollups.

use crate::error::Result;
use crate::store::MasteryStore;
use crate::types::ProgressStatus;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Aggregate progress of one user over a set of items.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProgressSummary {
    pub total: usize,
    pub unseen: usize,
    pub in_progress: usize,
    pub completed: usize,
    pub mastered: usize,
    /// Share of items completed or mastered, 0-100.
    pub completion_percent: u32,
    /// Mean mastery score with unseen items counted as zero, 0-100.
    pub mastery_percent: u32,
}

/// Summarize `user_id`'s progress over `item_ids`. Duplicate ids count once.
pub fn summarize_progress(
    store: &dyn MasteryStore,
    user_id: &str,
    item_ids: &[String],
) -> Result<ProgressSummary> {
    let mut summary = ProgressSummary::default();
    let mut score_sum = 0.0;
    let mut seen_ids = HashSet::new();

    for item_id in item_ids {
        if !seen_ids.insert(item_id.as_str()) {
            continue;
        }
        summary.total += 1;
        let Some(record) = store.get(user_id, item_id)? else {
            summary.unseen += 1;
            continue;
        };
        score_sum += record.mastery_score;
        match record.status {
            ProgressStatus::NotStarted => summary.unseen += 1,
            ProgressStatus::InProgress => summary.in_progress += 1,
            ProgressStatus::Completed => summary.completed += 1,
            ProgressStatus::Mastered => {
                summary.completed += 1;
                summary.mastered += 1;
            }
        }
    }

    if summary.total > 0 {
        let total = summary.total as f64;
        summary.completion_percent = to_percent(summary.completed as f64 / total);
        summary.mastery_percent = to_percent(score_sum / total);
    }
    Ok(summary)
}

fn to_percent(ratio: f64) -> u32 {
    (ratio * 100.0).round().clamp(0.0, 100.0) as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemoryMasteryStore;
    use crate::types::MasteryRecord;
    use chrono::{TimeZone, Utc};
    use pretty_assertions::assert_eq;

    fn with_score(item: &str, score: f64, status: ProgressStatus) -> MasteryRecord {
        let now = Utc.with_ymd_and_hms(2026, 1, 20, 7, 0, 0).unwrap();
        MasteryRecord {
            mastery_score: score,
            status,
            attempt_count: 3,
            last_reviewed_at: Some(now),
            ..MasteryRecord::new("u1", item, now, 2.5)
        }
    }

    #[test]
    fn empty_item_list_is_all_zero() {
        let store = InMemoryMasteryStore::new();
        let summary = summarize_progress(&store, "u1", &[]).unwrap();
        assert_eq!(summary, ProgressSummary::default());
    }

    #[test]
    fn counts_and_percentages() {
        let store = InMemoryMasteryStore::new();
        store.insert(with_score("a", 0.95, ProgressStatus::Mastered)).unwrap();
        store.insert(with_score("b", 0.65, ProgressStatus::Completed)).unwrap();
        store.insert(with_score("c", 0.2, ProgressStatus::InProgress)).unwrap();
        store
            .insert(MasteryRecord::new("u1", "d", Utc.with_ymd_and_hms(2026, 1, 20, 7, 0, 0).unwrap(), 2.5))
            .unwrap();

        let items: Vec<String> = ["a", "b", "c", "d", "e", "a"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let summary = summarize_progress(&store, "u1", &items).unwrap();
        assert_eq!(
            summary,
            ProgressSummary {
                total: 5,
                unseen: 2,
                in_progress: 1,
                completed: 2,
                mastered: 1,
                completion_percent: 40,
                mastery_percent: 36,
            }
        );
    }
}
