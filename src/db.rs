//! SQLite helpers shared by the account, document and chat stores.
//!
//! Every store opens its own connection per call; concurrent writers are
//! serialised by SQLite itself (WAL journal plus a busy timeout).

use rusqlite::{Connection, ErrorCode};
use std::time::Duration;

pub const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Open a connection with the busy timeout applied.
pub fn open(db_path: &str) -> rusqlite::Result<Connection> {
    let conn = Connection::open(db_path)?;
    conn.busy_timeout(BUSY_TIMEOUT)?;
    Ok(conn)
}

/// Switch the database to WAL. Persistent, so once per schema init is enough.
pub fn enable_wal(conn: &Connection) -> rusqlite::Result<()> {
    conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| {
        row.get::<_, String>(0)
    })?;
    conn.pragma_update(None, "synchronous", "NORMAL")?;
    Ok(())
}

pub fn is_unique_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _) if e.code == ErrorCode::ConstraintViolation
    )
}
