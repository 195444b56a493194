//! SQL schema for the Lapse SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

-- One row per run. Opened IN_PROGRESS, closed exactly once.
CREATE TABLE IF NOT EXISTS runs (
    run_id             INTEGER PRIMARY KEY AUTOINCREMENT,
    started_at         TEXT NOT NULL,   -- RFC 3339 UTC
    finished_at        TEXT,            -- NULL while in progress
    status             TEXT NOT NULL
                       CHECK (status IN ('IN_PROGRESS', 'SUCCESS', 'SUCCESS_WITH_ERRORS', 'FAILED')),
    inserted_count     INTEGER NOT NULL DEFAULT 0,
    updated_count      INTEGER NOT NULL DEFAULT 0,
    unchanged_count    INTEGER NOT NULL DEFAULT 0,
    error_count        INTEGER NOT NULL DEFAULT 0,
    fetch_failed_count INTEGER NOT NULL DEFAULT 0,
    message            TEXT NOT NULL DEFAULT ''
);

-- Terminal ledger entries are frozen.
CREATE TRIGGER IF NOT EXISTS runs_terminal_frozen
BEFORE UPDATE ON runs
WHEN OLD.status != 'IN_PROGRESS'
BEGIN
    SELECT RAISE(ABORT, 'run ledger entry is already terminal');
END;

CREATE TABLE IF NOT EXISTS products (
    product_id   INTEGER PRIMARY KEY AUTOINCREMENT,
    year         INTEGER NOT NULL CHECK (year BETWEEN 1900 AND 9999),
    product_name TEXT NOT NULL CHECK (length(product_name) BETWEEN 1 AND 500),
    support_end  TEXT NOT NULL CHECK (length(support_end) <= 100),
    product_url  TEXT CHECK (product_url IS NULL OR length(product_url) <= 500),
    run_id       INTEGER REFERENCES runs(run_id),
    collected_at TEXT NOT NULL,     -- RFC 3339 UTC; store-assigned
    UNIQUE (product_name, year)
);

CREATE INDEX IF NOT EXISTS products_year_idx ON products(year);
CREATE INDEX IF NOT EXISTS products_run_idx  ON products(run_id);

PRAGMA user_version = 1;
";
