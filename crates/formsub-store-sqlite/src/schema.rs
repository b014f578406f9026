//! SQL schema for the formsub SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;

-- Submissions are strictly append-only.
-- No UPDATE or DELETE is ever issued against this table.
CREATE TABLE IF NOT EXISTS submissions (
    seq           INTEGER PRIMARY KEY AUTOINCREMENT,  -- insertion order
    id            TEXT    NOT NULL UNIQUE,
    submitted_at  TEXT    NOT NULL,   -- fixed-width RFC 3339 UTC; server-assigned
    form_data     TEXT    NOT NULL    -- JSON object, null entries omitted
);

CREATE INDEX IF NOT EXISTS submissions_submitted_idx
    ON submissions(submitted_at DESC, seq ASC);

PRAGMA user_version = 1;
";
