//! Events, member rosters and attendance registrations for Campus Live.
//!
//! Plain rusqlite CRUD over the tables created by `campus-db`. Every write
//! that belongs to a club takes the acting club's id and refuses to touch
//! rows owned by another club.

mod error;
mod events;
mod members;
mod registrations;

pub use error::RecordError;
pub use events::{
    create_event, delete_event, get_event, list_events, update_event, EventPatch, EventRecord,
    NewEvent,
};
pub use members::{create_member, delete_member, list_members, MemberRecord, NewMember};
pub use registrations::{
    list_registrations, register_attendee, Registration, RegistrationInput, DEFAULT_RESIDENCE,
};

/// Trims `value` and rejects it if nothing is left.
pub(crate) fn required(value: &str, message: &str) -> Result<String, RecordError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(RecordError::Validation(message.to_string()));
    }
    Ok(trimmed.to_string())
}
