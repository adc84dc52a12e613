//! Schema migrations, versioned by SQLite's `user_version` header field.
//!
//! Step `n` (1-based) moves the schema to version `n`. A database at version
//! `v` gets every step after `v`, each in its own transaction together with
//! the version bump.

use rusqlite::Connection;
use thiserror::Error;

type Step = (&'static str, &'static str);

/// Append-only; a step's position is its schema version.
const STEPS: &[Step] = &[
    ("001_clubs", include_str!("migrations/001_clubs.sql")),
    ("002_events", include_str!("migrations/002_events.sql")),
    ("003_members", include_str!("migrations/003_members.sql")),
    (
        "004_event_registrations",
        include_str!("migrations/004_event_registrations.sql"),
    ),
];

/// Schema version after every step has run.
pub const LATEST_VERSION: usize = STEPS.len();

#[derive(Debug, Error)]
pub enum MigrationError {
    #[error("could not read schema version: {0}")]
    Version(#[source] rusqlite::Error),

    /// The file was written by a build with more steps than this one.
    #[error("schema version {found} is newer than this build supports ({known})")]
    NewerSchema { found: usize, known: usize },

    #[error("migration {name} failed: {source}")]
    Step {
        name: &'static str,
        #[source]
        source: rusqlite::Error,
    },
}

/// Brings `conn` up to [`LATEST_VERSION`] and returns how many steps ran.
///
/// # Errors
///
/// A failed step is rolled back and reported as [`MigrationError::Step`];
/// steps before it stay applied.
pub fn run_migrations(conn: &Connection) -> Result<usize, MigrationError> {
    apply(conn, STEPS)
}

/// Reads the schema version stored in the database header.
pub fn schema_version(conn: &Connection) -> Result<usize, MigrationError> {
    let version: i64 = conn
        .pragma_query_value(None, "user_version", |row| row.get(0))
        .map_err(MigrationError::Version)?;
    Ok(usize::try_from(version).unwrap_or(0))
}

fn apply(conn: &Connection, steps: &[Step]) -> Result<usize, MigrationError> {
    let current = schema_version(conn)?;
    if current > steps.len() {
        return Err(MigrationError::NewerSchema {
            found: current,
            known: steps.len(),
        });
    }

    for (index, &(name, sql)) in steps.iter().enumerate().skip(current) {
        let version = index + 1;
        let failed = |source: rusqlite::Error| MigrationError::Step { name, source };

        let tx = conn.unchecked_transaction().map_err(failed)?;
        tx.execute_batch(sql).map_err(failed)?;
        tx.pragma_update(None, "user_version", version as i64)
            .map_err(failed)?;
        tx.commit().map_err(failed)?;

        tracing::info!(migration = name, version, "applied migration");
    }

    Ok(steps.len() - current)
}
