//! Club persistence: registration and login.

use rusqlite::{params, Connection, ErrorCode, OptionalExtension, Row};
use serde::{Deserialize, Serialize};

use crate::error::AuthError;
use crate::password::{hash_password, verify_password};

/// A registered club. The password hash never leaves this module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Club {
    pub id: i64,
    pub name: String,
    pub email: String,
    /// Creation timestamp (SQLite `datetime('now')`, UTC).
    pub created_at: String,
}

/// The public part of a club returned alongside a token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClubSummary {
    pub id: i64,
    pub name: String,
}

impl From<&Club> for ClubSummary {
    fn from(club: &Club) -> Self {
        Self {
            id: club.id,
            name: club.name.clone(),
        }
    }
}

/// Registers a new club.
///
/// Name and email are trimmed; the password is taken as given.
///
/// # Errors
///
/// - [`AuthError::MissingFields`] if any field is blank.
/// - [`AuthError::AlreadyRegistered`] if the email is taken.
pub fn register_club(
    conn: &Connection,
    name: &str,
    email: &str,
    password: &str,
) -> Result<Club, AuthError> {
    let name = name.trim();
    let email = email.trim();
    if name.is_empty() || email.is_empty() || password.is_empty() {
        return Err(AuthError::MissingFields("All fields required"));
    }

    let hash = hash_password(password)?;
    let inserted = conn.execute(
        "INSERT INTO clubs (name, email, password_hash) VALUES (?1, ?2, ?3)",
        params![name, email, hash],
    );
    match inserted {
        Ok(_) => {}
        Err(rusqlite::Error::SqliteFailure(e, _)) if e.code == ErrorCode::ConstraintViolation => {
            tracing::debug!(email, "club registration rejected: email taken");
            return Err(AuthError::AlreadyRegistered);
        }
        Err(e) => return Err(e.into()),
    }

    let id = conn.last_insert_rowid();
    let club = conn.query_row(
        "SELECT id, name, email, created_at FROM clubs WHERE id = ?1",
        [id],
        map_row_to_club,
    )?;
    tracing::info!(club_id = club.id, name = %club.name, "club registered");
    Ok(club)
}

/// Checks an email/password pair and returns the club.
///
/// # Errors
///
/// - [`AuthError::MissingFields`] if either field is blank.
/// - [`AuthError::InvalidCredentials`] for an unknown email or a wrong
///   password.
pub fn login(conn: &Connection, email: &str, password: &str) -> Result<Club, AuthError> {
    let email = email.trim();
    if email.is_empty() || password.is_empty() {
        return Err(AuthError::MissingFields("Email and password required"));
    }

    let row = conn
        .query_row(
            "SELECT id, name, email, created_at, password_hash FROM clubs WHERE email = ?1",
            [email],
            |row| Ok((map_row_to_club(row)?, row.get::<_, String>(4)?)),
        )
        .optional()?;

    let Some((club, hash)) = row else {
        return Err(AuthError::InvalidCredentials);
    };
    if !verify_password(password, &hash)? {
        tracing::debug!(club_id = club.id, "login rejected: wrong password");
        return Err(AuthError::InvalidCredentials);
    }
    Ok(club)
}

/// Looks up a club by id.
pub fn find_club(conn: &Connection, id: i64) -> Result<Option<Club>, AuthError> {
    let club = conn
        .query_row(
            "SELECT id, name, email, created_at FROM clubs WHERE id = ?1",
            [id],
            map_row_to_club,
        )
        .optional()?;
    Ok(club)
}

fn map_row_to_club(row: &Row) -> rusqlite::Result<Club> {
    Ok(Club {
        id: row.get(0)?,
        name: row.get(1)?,
        email: row.get(2)?,
        created_at: row.get(3)?,
    })
}
