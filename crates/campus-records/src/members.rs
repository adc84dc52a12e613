//! Club member rosters.

use rusqlite::{params, Connection, OptionalExtension, Row};
use serde::{Deserialize, Serialize};

use crate::error::RecordError;
use crate::required;

/// Role assigned when none is given.
const DEFAULT_ROLE: &str = "member";

/// One entry on a club's roster.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemberRecord {
    pub id: i64,
    pub club_id: i64,
    pub name: String,
    pub email: String,
    pub role: String,
    /// Free-form details (roll number, department, year, ...), always a
    /// JSON object.
    pub meta: serde_json::Value,
    pub created_at: String,
}

/// Body of a member creation request.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NewMember {
    pub name: String,
    pub email: String,
    pub role: Option<String>,
    pub meta: Option<serde_json::Value>,
}

/// Adds a member to `club_id`'s roster.
///
/// A blank or missing role becomes `"member"`; a missing `meta` becomes `{}`.
pub fn create_member(
    conn: &Connection,
    club_id: i64,
    input: &NewMember,
) -> Result<MemberRecord, RecordError> {
    let name = required(&input.name, "name is required")?;
    let role = input
        .role
        .as_deref()
        .map(str::trim)
        .filter(|role| !role.is_empty())
        .unwrap_or(DEFAULT_ROLE);
    let meta = match &input.meta {
        None | Some(serde_json::Value::Null) => serde_json::Value::Object(Default::default()),
        Some(value @ serde_json::Value::Object(_)) => value.clone(),
        Some(_) => {
            return Err(RecordError::Validation(
                "meta must be a JSON object".to_string(),
            ))
        }
    };
    let meta_json = serde_json::to_string(&meta)?;

    conn.execute(
        "INSERT INTO members (club_id, name, email, role, meta_json) VALUES (?1, ?2, ?3, ?4, ?5)",
        params![club_id, name, input.email.trim(), role, meta_json],
    )?;
    let id = conn.last_insert_rowid();
    tracing::info!(member_id = id, club_id, "member added");
    get_member(conn, id)?.ok_or_else(|| RecordError::NotFound(format!("member {id}")))
}

/// Lists members, optionally restricted to one club, oldest first.
pub fn list_members(
    conn: &Connection,
    club_id: Option<i64>,
) -> Result<Vec<MemberRecord>, RecordError> {
    let mut stmt = conn.prepare(
        "SELECT id, club_id, name, email, role, meta_json, created_at
         FROM members WHERE ?1 IS NULL OR club_id = ?1 ORDER BY id ASC",
    )?;
    let rows = stmt.query_map([club_id], map_row_to_member)?;
    let mut members = Vec::new();
    for row in rows {
        members.push(row??);
    }
    Ok(members)
}

/// Removes a member from `club_id`'s roster.
pub fn delete_member(conn: &Connection, club_id: i64, id: i64) -> Result<(), RecordError> {
    let member =
        get_member(conn, id)?.ok_or_else(|| RecordError::NotFound(format!("member {id}")))?;
    if member.club_id != club_id {
        return Err(RecordError::Forbidden(format!("member {id}")));
    }
    conn.execute("DELETE FROM members WHERE id = ?1", [id])?;
    tracing::info!(member_id = id, club_id, "member removed");
    Ok(())
}

fn get_member(conn: &Connection, id: i64) -> Result<Option<MemberRecord>, RecordError> {
    conn.query_row(
        "SELECT id, club_id, name, email, role, meta_json, created_at FROM members WHERE id = ?1",
        [id],
        map_row_to_member,
    )
    .optional()?
    .transpose()
}

/// Rows decode in two stages: SQLite columns, then the meta JSON.
fn map_row_to_member(row: &Row) -> rusqlite::Result<Result<MemberRecord, RecordError>> {
    let meta_json: String = row.get(5)?;
    let record = MemberRecord {
        id: row.get(0)?,
        club_id: row.get(1)?,
        name: row.get(2)?,
        email: row.get(3)?,
        role: row.get(4)?,
        meta: serde_json::Value::Null,
        created_at: row.get(6)?,
    };
    Ok(serde_json::from_str(&meta_json)
        .map(|meta| MemberRecord { meta, ..record })
        .map_err(RecordError::from))
}
