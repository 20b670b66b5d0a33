use std::fs;
use std::path::{Path, PathBuf};

use rusqlite::Connection;
use tracing::warn;

use crate::error::CloError;

use super::migrations;

/// Open (creating if needed) the store at `path` and bring its schema up to date.
pub fn open_store(path: &Path) -> Result<Connection, CloError> {
    create_parent_dir(path)?;
    Ok(open_sqlite(path)?)
}

/// Like [`open_store`], but a file SQLite rejects as "not a database" is
/// moved aside to `<name>.corrupt` and replaced with a fresh one. Any other
/// failure (locked, unreadable) is returned untouched.
pub fn open_or_replace_store(path: &Path) -> Result<Connection, CloError> {
    create_parent_dir(path)?;
    match open_sqlite(path) {
        Ok(conn) => Ok(conn),
        Err(e) if is_not_a_database(&e) && path.exists() => {
            let backup = corrupt_path(path);
            warn!(path = %path.display(), backup = %backup.display(), error = %e, "replacing unreadable store");
            fs::rename(path, &backup)?;
            Ok(open_sqlite(path)?)
        }
        Err(e) => Err(e.into()),
    }
}

fn create_parent_dir(path: &Path) -> Result<(), CloError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}

fn open_sqlite(path: &Path) -> rusqlite::Result<Connection> {
    let conn = Connection::open(path)?;
    configure_connection(&conn)?;
    migrations::run_migrations(&conn)?;
    Ok(conn)
}

fn is_not_a_database(e: &rusqlite::Error) -> bool {
    matches!(
        e,
        rusqlite::Error::SqliteFailure(err, _) if err.code == rusqlite::ErrorCode::NotADatabase
    )
}

fn corrupt_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".corrupt");
    path.with_file_name(name)
}

fn configure_connection(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        "PRAGMA journal_mode=DELETE;
         PRAGMA busy_timeout=5000;",
    )
}
