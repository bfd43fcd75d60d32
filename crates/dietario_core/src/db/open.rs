//! Connection bootstrap utilities for SQLite.
//!
//! # Responsibility
//! - Open file or in-memory SQLite connections.
//! - Create the containing directory for file databases when missing.
//! - Configure connection pragmas required by repository behavior.
//!
//! # Invariants
//! - Returned connections have `foreign_keys=ON`.
//! - `close_db` releases the connection exactly once; repositories own the
//!   connection for their whole lifetime and release it by move.

use super::{DbError, DbResult};
use log::{error, info};
use rusqlite::Connection;
use std::path::Path;
use std::time::{Duration, Instant};

/// Opens a SQLite database file, creating parent directories if needed.
///
/// # Side effects
/// - Creates the containing directory of `path` when it does not exist.
/// - Emits `db_open` logging events with duration and status.
pub fn open_db(path: impl AsRef<Path>) -> DbResult<Connection> {
    let started_at = Instant::now();
    let path = path.as_ref();
    info!("event=db_open module=db status=start mode=file");

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent).map_err(|source| DbError::CreateDir {
                path: parent.to_path_buf(),
                source,
            })?;
        }
    }

    let conn = match Connection::open(path) {
        Ok(conn) => conn,
        Err(err) => {
            error!(
                "event=db_open module=db status=error mode=file duration_ms={} error={}",
                started_at.elapsed().as_millis(),
                err
            );
            return Err(err.into());
        }
    };

    configure_connection(&conn)?;
    info!(
        "event=db_open module=db status=ok mode=file duration_ms={}",
        started_at.elapsed().as_millis()
    );
    Ok(conn)
}

/// Opens an in-memory SQLite database, configured like a file connection.
pub fn open_db_in_memory() -> DbResult<Connection> {
    info!("event=db_open module=db status=start mode=memory");
    let conn = Connection::open_in_memory()?;
    configure_connection(&conn)?;
    info!("event=db_open module=db status=ok mode=memory");
    Ok(conn)
}

/// Closes a connection, reporting any flush failure instead of dropping it.
///
/// Takes the connection by value so a closed connection cannot be reused.
pub fn close_db(conn: Connection) -> DbResult<()> {
    conn.close().map_err(|(_, err)| {
        error!("event=db_close module=db status=error error={err}");
        DbError::Close(err)
    })?;
    info!("event=db_close module=db status=ok");
    Ok(())
}

fn configure_connection(conn: &Connection) -> DbResult<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.busy_timeout(Duration::from_secs(5))?;
    Ok(())
}
