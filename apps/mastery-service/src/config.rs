//! Service configuration read from the environment.

use mastery_core::{ConfigError, SchedulerConfig};
use std::path::PathBuf;
use std::str::FromStr;

/// Runtime settings of the mastery service.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub db_path: PathBuf,
    pub log_filter: String,
    pub scheduler: SchedulerConfig,
}

impl ServiceConfig {
    /// Build from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut scheduler = SchedulerConfig::default();
        if let Some(v) = parse_var(&lookup, "MASTERY_THRESHOLD")? {
            scheduler.mastery_threshold = v;
        }
        if let Some(v) = parse_var(&lookup, "MASTERY_STREAK")? {
            scheduler.mastery_streak_requirement = v;
        }
        if let Some(v) = parse_var(&lookup, "COMPLETION_THRESHOLD")? {
            scheduler.completion_threshold = v;
        }
        if let Some(v) = parse_var(&lookup, "MAX_INTERVAL_DAYS")? {
            scheduler.max_interval_days = v;
        }
        if let Some(v) = parse_var(&lookup, "SCHEDULER_MAX_RETRIES")? {
            scheduler.max_retries = v;
        }
        scheduler.validate()?;

        Ok(Self {
            db_path: lookup("MASTERY_DB_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(default_db_path),
            log_filter: lookup("RUST_LOG").unwrap_or_else(|| "info".into()),
            scheduler,
        })
    }
}

fn default_db_path() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("mastery-scheduler")
        .join("mastery.db")
}

fn parse_var<F, T>(lookup: &F, field: &'static str) -> Result<Option<T>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(field) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::Parse { field, value: raw }),
    }
}
