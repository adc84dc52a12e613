//! Shared types for the Campus Live platform.
//!
//! This crate holds the records and wire frames that cross crate
//! boundaries: the announcement record pushed to observers, the tagged
//! frames carried over the live socket, and the authorization seam
//! ([`Authorizer`]) through which the mutation gateway consumes a
//! credential decision without knowing how credentials are issued.
//!
//! Nothing here touches the database or the network.

use serde::{Deserialize, Serialize};

/// A single live announcement.
///
/// Records are assigned a sequence `id` by the update store at append time
/// and are immutable afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnnouncementRecord {
    /// Sequence number, starting at 1 and increasing by exactly 1.
    pub id: u64,
    /// Short label naming the subject (a club or an activity).
    pub event: String,
    /// Free-text announcement body. Older clients send this as `message`.
    #[serde(alias = "message")]
    pub update: String,
}

impl AnnouncementRecord {
    /// Builds a record with an already-assigned sequence id.
    pub fn new(id: u64, event: impl Into<String>, update: impl Into<String>) -> Self {
        Self {
            id,
            event: event.into(),
            update: update.into(),
        }
    }
}

/// A frame sent from the server to a live observer.
///
/// Every frame carries an explicit `kind` discriminant so that clients
/// never have to infer intent from the payload shape.
///
/// ```json
/// {"kind":"snapshot","records":[{"id":1,"event":"Seminar","update":"Starts at 5 PM"}]}
/// {"kind":"increment","record":{"id":2,"event":"Workshop","update":"Room 204"}}
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LiveFrame {
    /// The full history, oldest first. Sent once, as the first frame.
    Snapshot {
        /// Records in insertion order.
        records: Vec<AnnouncementRecord>,
    },
    /// One newly published record.
    Increment {
        /// The appended record.
        record: AnnouncementRecord,
    },
}

impl LiveFrame {
    /// Returns the wire label of this frame.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Snapshot { .. } => "snapshot",
            Self::Increment { .. } => "increment",
        }
    }
}

/// The club on whose behalf a mutation is performed.
///
/// Produced by an [`Authorizer`] after a credential check. It is an actor
/// identity only; the live channel itself is unauthenticated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActorIdentity {
    /// Club database id.
    pub club_id: i64,
    /// Club display name.
    pub name: String,
    /// Club contact email.
    pub email: String,
}

/// Reasons an [`Authorizer`] refuses a credential.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthRejection {
    /// No credential was presented.
    #[error("missing credential")]
    Missing,
    /// The credential could not be parsed.
    #[error("malformed credential")]
    Malformed,
    /// The credential failed verification (bad signature, expired, ...).
    #[error("invalid credential: {0}")]
    Invalid(String),
}

/// Authorization collaborator consumed by the mutation gateway.
///
/// Implementations turn an opaque bearer credential into an
/// [`ActorIdentity`], or reject it.
pub trait Authorizer: Send + Sync {
    /// Verifies `token` and returns the acting identity.
    fn verify(&self, token: &str) -> Result<ActorIdentity, AuthRejection>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_frame_is_tagged() {
        let frame = LiveFrame::Snapshot {
            records: vec![AnnouncementRecord::new(1, "Seminar", "Starts at 5 PM")],
        };
        let json = serde_json::to_value(&frame).unwrap();
        assert_eq!(json["kind"], "snapshot");
        assert_eq!(json["records"][0]["id"], 1);
        assert_eq!(json["records"][0]["update"], "Starts at 5 PM");
    }

    #[test]
    fn empty_snapshot_is_not_confused_with_an_increment() {
        let frame: LiveFrame = serde_json::from_str(r#"{"kind":"snapshot","records":[]}"#).unwrap();
        assert_eq!(frame, LiveFrame::Snapshot { records: vec![] });
    }

    #[test]
    fn increment_frame_is_tagged() {
        let frame = LiveFrame::Increment {
            record: AnnouncementRecord::new(2, "Workshop", "Room 204"),
        };
        let json = serde_json::to_string(&frame).unwrap();
        assert_eq!(
            json,
            r#"{"kind":"increment","record":{"id":2,"event":"Workshop","update":"Room 204"}}"#
        );
        assert_eq!(frame.kind(), "increment");
    }

    #[test]
    fn record_accepts_message_alias() {
        let record: AnnouncementRecord =
            serde_json::from_str(r#"{"id":3,"event":"Drama Club","message":"Auditions today"}"#)
                .unwrap();
        assert_eq!(record.update, "Auditions today");
    }

    #[test]
    fn untagged_payload_is_rejected() {
        let result = serde_json::from_str::<LiveFrame>(r#"[{"id":1,"event":"a","update":"b"}]"#);
        assert!(result.is_err());
    }
}
