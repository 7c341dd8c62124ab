//! Table and index definitions.
//!
//! The `rest` column holds the cookie's [`Extensions`](crate::cookies::Extensions)
//! as a JSON object (`{"HttpOnly": null, "SameSite": "Lax"}`). Boolean
//! attributes are stored as `0`/`1`.

use std::time::Duration;

use r2d2_sqlite::rusqlite::{self, Connection, Transaction};

use crate::config::JournalMode;
use crate::errors::Result;

const CREATE_COOKIE_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS cookies (
    id                 INTEGER PRIMARY KEY AUTOINCREMENT,
    version            INTEGER NOT NULL DEFAULT 0,
    name               TEXT    NOT NULL,
    value              TEXT,
    port               TEXT,
    port_specified     INTEGER NOT NULL DEFAULT 0,
    domain             TEXT    NOT NULL,
    domain_specified   INTEGER NOT NULL DEFAULT 0,
    domain_initial_dot INTEGER NOT NULL DEFAULT 0,
    path               TEXT    NOT NULL,
    path_specified     INTEGER NOT NULL DEFAULT 0,
    secure             INTEGER NOT NULL DEFAULT 0,
    expires            INTEGER,
    discard            INTEGER NOT NULL DEFAULT 0,
    comment            TEXT,
    comment_url        TEXT,
    rfc2109            INTEGER NOT NULL DEFAULT 0,
    rest               TEXT
);
CREATE INDEX IF NOT EXISTS idx_cookies_domain ON cookies (domain);
"#;

/// Creates the cookie table and its domain index if they do not exist yet.
pub(super) fn ensure_schema(tx: &Transaction<'_>) -> Result<()> {
    log::debug!("ensuring cookie schema");
    tx.execute_batch(CREATE_COOKIE_TABLE)?;
    Ok(())
}

/// Per-connection setup, run by the pool for every new connection.
pub(super) fn configure_connection(
    conn: &mut Connection,
    busy_timeout: Duration,
    journal_mode: JournalMode,
) -> rusqlite::Result<()> {
    conn.busy_timeout(busy_timeout)?;
    // journal_mode reports the resulting mode as a row; in-memory databases stay "memory".
    let mode: String = conn.pragma_update_and_check(None, "journal_mode", journal_mode.pragma_value(), |row| {
        row.get(0)
    })?;
    log::trace!("journal_mode is {mode}");
    conn.pragma_update(None, "foreign_keys", "ON")?;
    Ok(())
}
