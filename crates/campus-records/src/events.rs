//! Event CRUD.

use rusqlite::{params, Connection, OptionalExtension, Row};
use serde::{Deserialize, Serialize};

use crate::error::RecordError;
use crate::required;

/// A club event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRecord {
    pub id: i64,
    /// Owning club.
    pub club_id: i64,
    pub title: String,
    /// Calendar date as entered, `YYYY-MM-DD`. Listings sort on it.
    pub date: String,
    pub time: String,
    pub location: String,
    /// Number of registered attendees.
    pub attendees: i64,
    pub description: String,
    /// Image URL or data URI.
    pub image: String,
    pub created_at: String,
    pub updated_at: String,
}

/// Body of an event creation request.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NewEvent {
    pub title: String,
    pub date: String,
    pub time: String,
    pub location: String,
    pub attendees: Option<i64>,
    pub description: String,
    pub image: String,
}

/// Partial update. `None` fields are left untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EventPatch {
    pub title: Option<String>,
    pub date: Option<String>,
    pub time: Option<String>,
    pub location: Option<String>,
    pub attendees: Option<i64>,
    pub description: Option<String>,
    pub image: Option<String>,
}

const EVENT_COLUMNS: &str = "id, club_id, title, date, time, location, attendees, description, \
                             image, created_at, updated_at";

/// Creates an event owned by `club_id`.
///
/// # Errors
///
/// [`RecordError::Validation`] if title or date is blank or `attendees` is
/// negative.
pub fn create_event(
    conn: &Connection,
    club_id: i64,
    input: &NewEvent,
) -> Result<EventRecord, RecordError> {
    let title = required(&input.title, "title is required")?;
    let date = required(&input.date, "date is required")?;
    let attendees = check_attendees(input.attendees)?.unwrap_or(0);

    conn.execute(
        "INSERT INTO events (club_id, title, date, time, location, attendees, description, image)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            club_id,
            title,
            date,
            input.time.trim(),
            input.location.trim(),
            attendees,
            input.description,
            input.image,
        ],
    )?;
    let event = get_event(conn, conn.last_insert_rowid())?;
    tracing::info!(event_id = event.id, club_id, title = %event.title, "event created");
    Ok(event)
}

/// Lists every event, earliest date first.
pub fn list_events(conn: &Connection) -> Result<Vec<EventRecord>, RecordError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {EVENT_COLUMNS} FROM events ORDER BY date ASC, id ASC"
    ))?;
    let rows = stmt.query_map([], map_row_to_event)?;
    let mut events = Vec::new();
    for row in rows {
        events.push(row?);
    }
    Ok(events)
}

/// Retrieves one event.
pub fn get_event(conn: &Connection, id: i64) -> Result<EventRecord, RecordError> {
    conn.query_row(
        &format!("SELECT {EVENT_COLUMNS} FROM events WHERE id = ?1"),
        [id],
        map_row_to_event,
    )
    .optional()?
    .ok_or_else(|| RecordError::NotFound(format!("event {id}")))
}

/// Applies `patch` to an event owned by `club_id` in one UPDATE.
///
/// # Errors
///
/// [`RecordError::NotFound`], [`RecordError::Forbidden`] for another club's
/// event, [`RecordError::Validation`] for a blank title/date or a negative
/// attendee count.
pub fn update_event(
    conn: &Connection,
    club_id: i64,
    id: i64,
    patch: &EventPatch,
) -> Result<EventRecord, RecordError> {
    ensure_owner(conn, club_id, id)?;

    let mut set_parts: Vec<String> = Vec::new();
    let mut values: Vec<Box<dyn rusqlite::types::ToSql>> = Vec::new();

    if let Some(title) = &patch.title {
        values.push(Box::new(required(title, "title is required")?));
        set_parts.push(format!("title = ?{}", values.len()));
    }
    if let Some(date) = &patch.date {
        values.push(Box::new(required(date, "date is required")?));
        set_parts.push(format!("date = ?{}", values.len()));
    }
    if let Some(time) = &patch.time {
        values.push(Box::new(time.trim().to_string()));
        set_parts.push(format!("time = ?{}", values.len()));
    }
    if let Some(location) = &patch.location {
        values.push(Box::new(location.trim().to_string()));
        set_parts.push(format!("location = ?{}", values.len()));
    }
    if let Some(attendees) = check_attendees(patch.attendees)? {
        values.push(Box::new(attendees));
        set_parts.push(format!("attendees = ?{}", values.len()));
    }
    if let Some(description) = &patch.description {
        values.push(Box::new(description.clone()));
        set_parts.push(format!("description = ?{}", values.len()));
    }
    if let Some(image) = &patch.image {
        values.push(Box::new(image.clone()));
        set_parts.push(format!("image = ?{}", values.len()));
    }

    if !set_parts.is_empty() {
        set_parts.push("updated_at = datetime('now')".to_string());
        values.push(Box::new(id));
        let sql = format!(
            "UPDATE events SET {} WHERE id = ?{}",
            set_parts.join(", "),
            values.len()
        );
        let params: Vec<&dyn rusqlite::types::ToSql> = values.iter().map(|v| v.as_ref()).collect();
        conn.execute(&sql, params.as_slice())?;
        tracing::info!(event_id = id, club_id, "event updated");
    }

    get_event(conn, id)
}

/// Deletes an event owned by `club_id` and returns it as it was.
///
/// Its registrations go with it.
pub fn delete_event(conn: &Connection, club_id: i64, id: i64) -> Result<EventRecord, RecordError> {
    let event = ensure_owner(conn, club_id, id)?;
    conn.execute("DELETE FROM events WHERE id = ?1", [id])?;
    tracing::info!(event_id = id, club_id, "event deleted");
    Ok(event)
}

fn ensure_owner(conn: &Connection, club_id: i64, id: i64) -> Result<EventRecord, RecordError> {
    let event = get_event(conn, id)?;
    if event.club_id != club_id {
        tracing::warn!(event_id = id, owner = event.club_id, club_id, "event write by non-owner");
        return Err(RecordError::Forbidden(format!("event {id}")));
    }
    Ok(event)
}

fn check_attendees(attendees: Option<i64>) -> Result<Option<i64>, RecordError> {
    match attendees {
        Some(n) if n < 0 => Err(RecordError::Validation(
            "attendees cannot be negative".to_string(),
        )),
        other => Ok(other),
    }
}

fn map_row_to_event(row: &Row) -> rusqlite::Result<EventRecord> {
    Ok(EventRecord {
        id: row.get(0)?,
        club_id: row.get(1)?,
        title: row.get(2)?,
        date: row.get(3)?,
        time: row.get(4)?,
        location: row.get(5)?,
        attendees: row.get(6)?,
        description: row.get(7)?,
        image: row.get(8)?,
        created_at: row.get(9)?,
        updated_at: row.get(10)?,
    })
}
