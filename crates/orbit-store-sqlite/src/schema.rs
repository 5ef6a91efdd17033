//! SQL schema for the Orbit SQLite store.
//!
//! Executed once at connection startup. The version is stamped into
//! `PRAGMA user_version`; a database carrying a higher version is refused
//! rather than misread.

/// Version written by [`SCHEMA`].
pub const SCHEMA_VERSION: i64 = 1;

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS relationships (
    relationship_id  TEXT PRIMARY KEY,
    created_at       TEXT NOT NULL,
    name             TEXT NOT NULL,
    role             TEXT NOT NULL DEFAULT '',
    kind             TEXT NOT NULL,   -- 'family' | 'work' | 'friend' | ...
    contact          TEXT,
    avatar           TEXT,
    zone             INTEGER NOT NULL CHECK (zone BETWEEN 1 AND 5),
    temperature      INTEGER NOT NULL CHECK (temperature BETWEEN 0 AND 100),
    last_interaction TEXT,
    trust            INTEGER NOT NULL,
    communication    INTEGER NOT NULL,
    frequency        INTEGER NOT NULL,
    satisfaction     INTEGER NOT NULL,
    rqs_json         TEXT             -- JSON-encoded RqsResult or NULL
);

-- History is strictly append-only.
-- No UPDATE is ever issued against this table; rows go only with their
-- relationship.
CREATE TABLE IF NOT EXISTS history (
    entry_id         TEXT PRIMARY KEY,
    relationship_id  TEXT NOT NULL
                     REFERENCES relationships(relationship_id) ON DELETE CASCADE,
    date             TEXT NOT NULL,   -- RFC 3339 UTC, fixed nanosecond width
    temperature      INTEGER NOT NULL,
    oxytocin         INTEGER,
    cortisol         INTEGER,
    title            TEXT,
    description      TEXT,
    event            TEXT
);

CREATE INDEX IF NOT EXISTS history_relationship_idx
    ON history(relationship_id, date);

PRAGMA user_version = 1;
";
