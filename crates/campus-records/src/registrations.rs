//! Student registrations for events.

use rusqlite::{params, Connection, ErrorCode, Row};
use serde::{Deserialize, Serialize};

use crate::error::RecordError;
use crate::events::get_event;
use crate::required;

/// Residence recorded when the form leaves it blank.
pub const DEFAULT_RESIDENCE: &str = "Hosteller";

/// Registration form as submitted by a student.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistrationInput {
    pub name: String,
    pub roll: String,
    pub email: String,
    pub group: String,
    pub semester: String,
    pub year: String,
    pub residence: String,
}

/// A stored registration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Registration {
    pub id: i64,
    pub event_id: i64,
    pub name: String,
    pub roll: String,
    pub email: String,
    pub group: String,
    pub semester: String,
    pub year: String,
    pub residence: String,
    pub created_at: String,
}

/// Registers a student for an event and bumps its attendee count.
///
/// Both writes happen in one transaction. Returns the new attendee count.
///
/// # Errors
///
/// - [`RecordError::Validation`] for a missing field or an email that does
///   not look like one.
/// - [`RecordError::NotFound`] if the event does not exist.
/// - [`RecordError::Conflict`] if this roll number is already registered
///   for the event.
pub fn register_attendee(
    conn: &mut Connection,
    event_id: i64,
    input: &RegistrationInput,
) -> Result<i64, RecordError> {
    let name = required(&input.name, "name is required")?;
    let roll = required(&input.roll, "roll is required")?;
    let email = required(&input.email, "email is required")?;
    if !looks_like_email(&email) {
        return Err(RecordError::Validation("email is invalid".to_string()));
    }
    let semester = required(&input.semester, "semester is required")?;
    let year = required(&input.year, "year is required")?;
    let residence = match input.residence.trim() {
        "" => DEFAULT_RESIDENCE,
        other => other,
    };

    let tx = conn.transaction()?;
    get_event(&tx, event_id)?;

    let inserted = tx.execute(
        "INSERT INTO event_registrations
            (event_id, name, roll, email, student_group, semester, year, residence)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            event_id,
            name,
            roll,
            email,
            input.group.trim(),
            semester,
            year,
            residence
        ],
    );
    match inserted {
        Ok(_) => {}
        Err(rusqlite::Error::SqliteFailure(e, _)) if e.code == ErrorCode::ConstraintViolation => {
            return Err(RecordError::Conflict(format!(
                "roll {roll} is already registered for this event"
            )));
        }
        Err(e) => return Err(e.into()),
    }

    tx.execute(
        "UPDATE events SET attendees = attendees + 1 WHERE id = ?1",
        [event_id],
    )?;
    let attendees: i64 = tx.query_row(
        "SELECT attendees FROM events WHERE id = ?1",
        [event_id],
        |row| row.get(0),
    )?;
    tx.commit()?;

    tracing::info!(event_id, attendees, "attendee registered");
    Ok(attendees)
}

/// Lists an event's registrations in submission order.
pub fn list_registrations(
    conn: &Connection,
    event_id: i64,
) -> Result<Vec<Registration>, RecordError> {
    let mut stmt = conn.prepare(
        "SELECT id, event_id, name, roll, email, student_group, semester, year, residence, created_at
         FROM event_registrations WHERE event_id = ?1 ORDER BY id ASC",
    )?;
    let rows = stmt.query_map([event_id], map_row_to_registration)?;
    let mut registrations = Vec::new();
    for row in rows {
        registrations.push(row?);
    }
    Ok(registrations)
}

/// One `@`, something before it, and a dotted domain after it.
fn looks_like_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && !email.contains(char::is_whitespace)
        && domain
            .split_once('.')
            .is_some_and(|(host, tld)| !host.is_empty() && !tld.is_empty() && !tld.ends_with('.'))
}

fn map_row_to_registration(row: &Row) -> rusqlite::Result<Registration> {
    Ok(Registration {
        id: row.get(0)?,
        event_id: row.get(1)?,
        name: row.get(2)?,
        roll: row.get(3)?,
        email: row.get(4)?,
        group: row.get(5)?,
        semester: row.get(6)?,
        year: row.get(7)?,
        residence: row.get(8)?,
        created_at: row.get(9)?,
    })
}
