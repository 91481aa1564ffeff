//! Database schema definitions
//!
//! This module contains the SQL schema for the Aisle-Walker job store.

/// SQL schema for the database
pub const SCHEMA_SQL: &str = r#"
-- Submitted crawl jobs and their outcomes
CREATE TABLE IF NOT EXISTS jobs (
    id TEXT PRIMARY KEY,
    domains TEXT NOT NULL,
    status TEXT NOT NULL,
    submitted_at TEXT NOT NULL,
    finished_at TEXT,
    config_hash TEXT,
    results TEXT,
    error TEXT
);

CREATE INDEX IF NOT EXISTS idx_jobs_status ON jobs(status);
CREATE INDEX IF NOT EXISTS idx_jobs_submitted ON jobs(submitted_at);
"#;

/// Initializes the database schema
pub fn initialize_schema(conn: &rusqlite::Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(SCHEMA_SQL)?;
    Ok(())
}
