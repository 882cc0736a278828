//! Mastery update rules.

pub mod sm2;

use crate::config::SchedulerConfig;
use crate::error::Result;
use crate::types::{MasteryRecord, ReviewOutcome};

pub(crate) const MS_PER_DAY: f64 = 86_400_000.0;

/// Result of applying one outcome to a record.
#[derive(Debug, Clone, PartialEq)]
pub struct SchedulingResult {
    pub record: MasteryRecord,
    pub previous_score: f64,
    /// Actual score movement after clamping.
    pub mastery_change: f64,
}

impl SchedulingResult {
    /// Signed two-decimal label, e.g. `+0.10`.
    pub fn mastery_change_label(&self) -> String {
        format_mastery_change(self.mastery_change)
    }
}

/// Format a mastery delta the way tool output reports it.
pub fn format_mastery_change(change: f64) -> String {
    format!("{:+.2}", change)
}

/// Trait for mastery scheduling rules.
pub trait MasteryAlgorithm: Send + Sync {
    /// Algorithm identifier.
    fn name(&self) -> &'static str;

    /// Compute the updated record after an outcome. Does not check ordering.
    ///
    /// Fails with `InvalidOutcome` when the next due date is not representable.
    fn schedule(&self, record: &MasteryRecord, outcome: &ReviewOutcome) -> Result<SchedulingResult>;

    /// Parameters the rule runs with.
    fn config(&self) -> &SchedulerConfig;
}

/// Get algorithm by name.
pub fn get_algorithm(name: &str, config: SchedulerConfig) -> Option<Box<dyn MasteryAlgorithm>> {
    match name {
        "mastery_sm2" => Some(Box::new(sm2::MasterySm2::new(config))),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_signed_two_decimals() {
        assert_eq!(format_mastery_change(0.1), "+0.10");
        assert_eq!(format_mastery_change(-0.15), "-0.15");
        assert_eq!(format_mastery_change(0.0), "+0.00");
    }

    #[test]
    fn unknown_algorithm_is_none() {
        assert!(get_algorithm("fsrs", SchedulerConfig::default()).is_none());
        let algorithm = get_algorithm("mastery_sm2", SchedulerConfig::default());
        assert_eq!(algorithm.map(|a| a.name()), Some("mastery_sm2"));
    }
}
