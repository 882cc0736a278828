//! SQLite schema definitions.

/// Current schema version for migrations.
pub const SCHEMA_VERSION: i32 = 1;

/// Complete schema for the mastery database.
pub const SCHEMA: &str = r#"
-- One row per (user, learnable item), created on first exposure
CREATE TABLE IF NOT EXISTS mastery_records (
    user_id TEXT NOT NULL,
    item_id TEXT NOT NULL,
    mastery_score REAL NOT NULL DEFAULT 0 CHECK (mastery_score >= 0 AND mastery_score <= 1),
    status TEXT NOT NULL DEFAULT 'NOT_STARTED',
    ease_factor REAL NOT NULL,
    interval_days REAL NOT NULL DEFAULT 0,
    due_at TEXT NOT NULL,
    consecutive_correct INTEGER NOT NULL DEFAULT 0,
    last_reviewed_at TEXT,
    attempt_count INTEGER NOT NULL DEFAULT 0,
    revision INTEGER NOT NULL DEFAULT 0,
    PRIMARY KEY (user_id, item_id)
);

-- Schema version tracking
CREATE TABLE IF NOT EXISTS schema_version (
    version INTEGER PRIMARY KEY
);

-- Indexes
CREATE INDEX IF NOT EXISTS idx_mastery_due ON mastery_records(user_id, due_at, item_id);
CREATE INDEX IF NOT EXISTS idx_mastery_score ON mastery_records(user_id, mastery_score);
"#;
