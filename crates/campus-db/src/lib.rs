//! Database layer for Campus Live.
//!
//! One SQLite file, pooled with `r2d2`, holding the CRUD side of the
//! platform: clubs, events, members and attendance registrations.
//! [`open_database`] migrates the file before handing out the pool.
//!
//! Live announcements are not stored here; they exist only in the
//! `campus-live` update store and are lost on restart.

mod migrations;
mod pool;

pub use migrations::{run_migrations, schema_version, MigrationError, LATEST_VERSION};
pub use pool::{open_database, DbPool, DbRuntimeSettings, PoolError};
