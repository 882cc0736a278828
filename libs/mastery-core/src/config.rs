//! Scheduler tuning parameters.

use crate::error::ConfigError;
use crate::types::{Confidence, QuestionKind};
use serde::{Deserialize, Serialize};

/// Every numeric constant of the update rule, with production defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    pub correct_delta: f64,
    /// Magnitude of the penalty; applied as a subtraction.
    pub incorrect_delta: f64,
    pub guess_multiplier: f64,
    pub somewhat_sure_multiplier: f64,
    pub confident_multiplier: f64,
    pub binary_boost: f64,
    pub multiple_choice_boost: f64,
    pub question_answer_boost: f64,
    pub initial_ease: f64,
    pub min_ease: f64,
    pub max_ease: f64,
    pub ease_step_correct: f64,
    pub ease_step_incorrect: f64,
    pub max_interval_days: f64,
    pub mastery_threshold: f64,
    pub mastery_streak_requirement: u32,
    pub completion_threshold: f64,
    pub max_retries: u32,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            correct_delta: 0.10,
            incorrect_delta: 0.15,
            guess_multiplier: 0.6,
            somewhat_sure_multiplier: 1.0,
            confident_multiplier: 1.2,
            binary_boost: 0.05,
            multiple_choice_boost: 0.10,
            question_answer_boost: 0.15,
            initial_ease: 2.5,
            min_ease: 1.3,
            max_ease: 3.0,
            ease_step_correct: 0.05,
            ease_step_incorrect: 0.2,
            max_interval_days: 180.0,
            mastery_threshold: 0.9,
            mastery_streak_requirement: 3,
            completion_threshold: 0.6,
            max_retries: 3,
        }
    }
}

/// Hard floor of the ease factor.
pub const EASE_FLOOR: f64 = 1.3;

impl SchedulerConfig {
    /// Multiplier applied to a correct answer's delta. No confidence counts as somewhat sure.
    pub fn confidence_multiplier(&self, confidence: Option<Confidence>) -> f64 {
        match confidence {
            Some(Confidence::Guess) => self.guess_multiplier,
            Some(Confidence::SomewhatSure) | None => self.somewhat_sure_multiplier,
            Some(Confidence::Confident) => self.confident_multiplier,
        }
    }

    /// Unscaled mastery gain for a correct answer.
    pub fn correct_base_delta(&self, kind: Option<QuestionKind>) -> f64 {
        match kind {
            Some(QuestionKind::Binary) => self.binary_boost,
            Some(QuestionKind::MultipleChoice) => self.multiple_choice_boost,
            Some(QuestionKind::QuestionAnswer) => self.question_answer_boost,
            None => self.correct_delta,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for (field, value) in [
            ("correct_delta", self.correct_delta),
            ("incorrect_delta", self.incorrect_delta),
            ("binary_boost", self.binary_boost),
            ("multiple_choice_boost", self.multiple_choice_boost),
            ("question_answer_boost", self.question_answer_boost),
            ("mastery_threshold", self.mastery_threshold),
            ("completion_threshold", self.completion_threshold),
        ] {
            check_range(field, value, 0.0, 1.0)?;
        }

        for (field, value) in [
            ("guess_multiplier", self.guess_multiplier),
            ("somewhat_sure_multiplier", self.somewhat_sure_multiplier),
            ("confident_multiplier", self.confident_multiplier),
            ("ease_step_correct", self.ease_step_correct),
            ("ease_step_incorrect", self.ease_step_incorrect),
        ] {
            check_range(field, value, 0.0, 10.0)?;
        }

        check_range("min_ease", self.min_ease, EASE_FLOOR, 10.0)?;
        check_range("max_ease", self.max_ease, EASE_FLOOR, 10.0)?;
        if self.max_ease < self.min_ease {
            return Err(ConfigError::EaseBounds {
                min: self.min_ease,
                max: self.max_ease,
            });
        }
        check_range("initial_ease", self.initial_ease, self.min_ease, self.max_ease)?;
        check_range("max_interval_days", self.max_interval_days, 1.0, 36500.0)?;

        if self.mastery_streak_requirement == 0 {
            return Err(ConfigError::Zero {
                field: "mastery_streak_requirement",
            });
        }
        if self.max_retries == 0 {
            return Err(ConfigError::Zero {
                field: "max_retries",
            });
        }
        Ok(())
    }
}

fn check_range(field: &'static str, value: f64, min: f64, max: f64) -> Result<(), ConfigError> {
    if value.is_nan() || value < min || value > max {
        return Err(ConfigError::OutOfRange {
            field,
            min,
            max,
            value,
        });
    }
    Ok(())
}
