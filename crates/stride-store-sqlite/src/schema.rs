//! SQL schema for the Stride SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.
//!
//! Timestamps are fixed-width RFC 3339 strings in UTC with microsecond
//! precision, so lexical comparison in SQL matches chronological order.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

-- Raw footsteps, written by ingestion only.
CREATE TABLE IF NOT EXISTS footsteps (
    footstep_id INTEGER PRIMARY KEY AUTOINCREMENT,
    wearable_id TEXT NOT NULL,
    floor_id    TEXT,
    time        TEXT NOT NULL,
    x           REAL,            -- mm; NULL when the step was not localised
    y           REAL
);

-- Assignments are never deleted; unlinking sets end_time.
CREATE TABLE IF NOT EXISTS wearable_assignments (
    assignment_id TEXT PRIMARY KEY,
    user_id       TEXT NOT NULL,
    wearable_id   TEXT NOT NULL,
    begin_time    TEXT NOT NULL,
    end_time      TEXT,          -- NULL while active
    CHECK (end_time IS NULL OR begin_time <= end_time)
);

CREATE TABLE IF NOT EXISTS fall_risk_profiles (
    profile_id                TEXT PRIMARY KEY,
    wearable_id               TEXT NOT NULL,
    floor_id                  TEXT,
    creation_time             TEXT NOT NULL,
    begin_time                TEXT NOT NULL,
    end_time                  TEXT NOT NULL,
    walking_speed             REAL NOT NULL,   -- mm/s
    step_length               REAL NOT NULL,   -- mm
    step_frequency            REAL NOT NULL,   -- strides/s
    rms_vertical_acceleration REAL,
    hidden                    INTEGER NOT NULL DEFAULT 0,
    CHECK (begin_time <= end_time)
);

-- At most one note per profile; an empty note is stored as no row.
CREATE TABLE IF NOT EXISTS fall_risk_profile_notes (
    profile_id TEXT PRIMARY KEY REFERENCES fall_risk_profiles(profile_id),
    value      TEXT NOT NULL,
    created_at TEXT NOT NULL,
    updated_at TEXT,
    created_by TEXT NOT NULL
);

-- A removed profile stays in fall_risk_profiles for audit.
CREATE TABLE IF NOT EXISTS fall_risk_profile_removals (
    profile_id          TEXT PRIMARY KEY REFERENCES fall_risk_profiles(profile_id),
    reason              TEXT NOT NULL,   -- 'protocol' | 'duplicate' | 'sensor' | 'application' | 'other'
    specification_other TEXT,
    removed_by          TEXT NOT NULL,
    removed_at          TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS footsteps_wearable_time_idx   ON footsteps(wearable_id, time);
CREATE INDEX IF NOT EXISTS assignments_user_idx          ON wearable_assignments(user_id, begin_time);
CREATE INDEX IF NOT EXISTS profiles_wearable_created_idx ON fall_risk_profiles(wearable_id, creation_time);
CREATE INDEX IF NOT EXISTS profiles_wearable_span_idx    ON fall_risk_profiles(wearable_id, begin_time, end_time);

PRAGMA user_version = 1;
";
