//! Opening the shared SQLite file behind an r2d2 pool.

use std::time::Duration;

use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::Connection;
use thiserror::Error;

use crate::migrations::{run_migrations, MigrationError};

/// Pool of connections to one SQLite file.
pub type DbPool = Pool<SqliteConnectionManager>;

/// Knobs read from the `[database]` config section.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DbRuntimeSettings {
    /// How long a connection waits on a locked database, in milliseconds.
    pub busy_timeout_ms: u64,

    /// Upper bound on open connections.
    pub pool_max_size: u32,
}

impl Default for DbRuntimeSettings {
    fn default() -> Self {
        Self {
            busy_timeout_ms: 5_000,
            pool_max_size: 8,
        }
    }
}

#[derive(Debug, Error)]
pub enum PoolError {
    /// The path does not name a file that every pooled connection can share.
    #[error("database path must name a file, got {0:?}")]
    NotAFile(String),

    #[error("could not open database pool: {0}")]
    Open(#[from] r2d2::Error),

    #[error(transparent)]
    Migration(#[from] MigrationError),
}

/// Opens `db_path`, brings its schema up to date and returns the pool.
///
/// Each pooled connection opens the file on its own, so in-memory paths are
/// refused: every connection would get a separate empty database.
///
/// # Errors
///
/// Returns [`PoolError::NotAFile`] for blank or in-memory paths, and
/// [`PoolError::Open`] or [`PoolError::Migration`] when the file cannot be
/// opened or migrated.
pub fn open_database(db_path: &str, settings: DbRuntimeSettings) -> Result<DbPool, PoolError> {
    let path = db_path.trim();
    if path.is_empty() || path == ":memory:" || path.starts_with("file::memory:") {
        return Err(PoolError::NotAFile(db_path.to_string()));
    }

    let busy_timeout = Duration::from_millis(settings.busy_timeout_ms);
    let manager = SqliteConnectionManager::file(path)
        .with_init(move |conn| configure_connection(conn, busy_timeout));
    let pool = Pool::builder()
        .max_size(settings.pool_max_size)
        .build(manager)?;

    let applied = run_migrations(&*pool.get()?)?;
    tracing::info!(
        path,
        applied,
        max_size = settings.pool_max_size,
        "database ready"
    );

    Ok(pool)
}

/// WAL journaling, enforced foreign keys and a busy wait on every connection.
fn configure_connection(conn: &mut Connection, busy_timeout: Duration) -> rusqlite::Result<()> {
    let mode: String =
        conn.pragma_update_and_check(None, "journal_mode", "wal", |row| row.get(0))?;
    if !mode.eq_ignore_ascii_case("wal") {
        tracing::warn!(journal_mode = %mode, "sqlite kept a non-WAL journal");
    }
    conn.pragma_update(None, "foreign_keys", true)?;
    conn.busy_timeout(busy_timeout)
}
