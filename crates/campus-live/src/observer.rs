//! Client-side reconciliation of live frames into a display view.
//!
//! [`ObserverSession`] is a pure state machine driven by transport
//! callbacks (`on_open`, `on_text`, `on_error`, `on_close`). It owns no
//! socket, so the same fold runs in the command-line watcher, in tests
//! against an in-process [`crate::Subscription`], and against a real
//! WebSocket.

use std::collections::VecDeque;

use campus_types::{AnnouncementRecord, LiveFrame};

/// Connection lifecycle of an observer session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    /// The transport is being established.
    Connecting,
    /// Frames are being received.
    Open,
    /// The transport is gone. Nothing is retried.
    Closed(CloseCause),
}

/// Why a session ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CloseCause {
    /// The peer or the local side closed the connection.
    Disconnected,
    /// The transport reported an error.
    Error(String),
}

/// What a frame did to the view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameOutcome {
    /// A snapshot replaced the whole view with `len` records.
    Replaced {
        /// Number of records now in the view.
        len: usize,
    },
    /// An increment was prepended.
    Prepended,
    /// The session was not open; the frame was dropped.
    Ignored,
}

/// Errors surfaced while folding a frame.
#[derive(Debug, thiserror::Error)]
pub enum ObserverError {
    /// The payload was not a valid tagged live frame.
    #[error("undecodable live frame: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Newest-first view of the announcements an observer has received.
///
/// Records are not deduplicated: a record delivered twice shows up twice.
#[derive(Debug, Clone)]
pub struct ObserverSession {
    state: SessionState,
    view: VecDeque<AnnouncementRecord>,
    snapshots_seen: usize,
}

impl ObserverSession {
    /// Starts a session in the `Connecting` state with an empty view.
    pub fn new() -> Self {
        Self {
            state: SessionState::Connecting,
            view: VecDeque::new(),
            snapshots_seen: 0,
        }
    }

    /// The transport is open.
    ///
    /// Has no effect once the session is closed.
    pub fn on_open(&mut self) {
        if self.state == SessionState::Connecting {
            self.state = SessionState::Open;
        }
    }

    /// Decodes a text payload and folds it into the view.
    ///
    /// # Errors
    ///
    /// Returns [`ObserverError::Decode`] if `text` is not a tagged frame.
    /// The view is left as it was.
    pub fn on_text(&mut self, text: &str) -> Result<FrameOutcome, ObserverError> {
        let frame: LiveFrame = serde_json::from_str(text)?;
        Ok(self.apply(frame))
    }

    /// Folds an already-decoded frame into the view.
    pub fn apply(&mut self, frame: LiveFrame) -> FrameOutcome {
        if self.state != SessionState::Open {
            tracing::debug!(kind = frame.kind(), state = ?self.state, "ignoring frame outside open session");
            return FrameOutcome::Ignored;
        }

        match frame {
            LiveFrame::Snapshot { records } => {
                self.view = records.into_iter().rev().collect();
                self.snapshots_seen += 1;
                FrameOutcome::Replaced {
                    len: self.view.len(),
                }
            }
            LiveFrame::Increment { record } => {
                self.view.push_front(record);
                FrameOutcome::Prepended
            }
        }
    }

    /// The transport reported an error. The session is closed.
    pub fn on_error(&mut self, message: impl Into<String>) {
        if !self.is_closed() {
            self.state = SessionState::Closed(CloseCause::Error(message.into()));
        }
    }

    /// The transport closed. An earlier error cause is kept.
    pub fn on_close(&mut self) {
        if !self.is_closed() {
            self.state = SessionState::Closed(CloseCause::Disconnected);
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Whether the session has reached `Closed`.
    pub fn is_closed(&self) -> bool {
        matches!(self.state, SessionState::Closed(_))
    }

    /// Records in display order, newest first.
    pub fn view(&self) -> &VecDeque<AnnouncementRecord> {
        &self.view
    }

    /// How many snapshots have been applied.
    pub fn snapshots_seen(&self) -> usize {
        self.snapshots_seen
    }

    /// Human-readable status line for display.
    pub fn status_label(&self) -> &'static str {
        match &self.state {
            SessionState::Connecting => "Connecting...",
            SessionState::Open => "Connected",
            SessionState::Closed(CloseCause::Error(_)) => "Error",
            SessionState::Closed(CloseCause::Disconnected) => "Disconnected",
        }
    }
}

impl Default for ObserverSession {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: u64, event: &str, update: &str) -> AnnouncementRecord {
        AnnouncementRecord::new(id, event, update)
    }

    fn open_session() -> ObserverSession {
        let mut session = ObserverSession::new();
        session.on_open();
        session
    }

    #[test]
    fn lifecycle_labels() {
        let mut session = ObserverSession::new();
        assert_eq!(session.status_label(), "Connecting...");
        session.on_open();
        assert_eq!(session.status_label(), "Connected");
        session.on_close();
        assert_eq!(session.status_label(), "Disconnected");
    }

    #[test]
    fn error_then_close_keeps_error() {
        let mut session = open_session();
        session.on_error("connection reset");
        session.on_close();
        assert_eq!(
            session.state(),
            &SessionState::Closed(CloseCause::Error("connection reset".to_string()))
        );
        assert_eq!(session.status_label(), "Error");
    }

    #[test]
    fn snapshot_is_reversed_into_the_view() {
        let mut session = open_session();
        let outcome = session.apply(LiveFrame::Snapshot {
            records: vec![record(1, "a", "1"), record(2, "b", "2"), record(3, "c", "3")],
        });
        assert_eq!(outcome, FrameOutcome::Replaced { len: 3 });
        let ids: Vec<u64> = session.view().iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![3, 2, 1]);
    }

    #[test]
    fn increments_are_prepended() {
        let mut session = open_session();
        session.apply(LiveFrame::Snapshot {
            records: vec![record(1, "a", "1")],
        });
        session.apply(LiveFrame::Increment {
            record: record(2, "b", "2"),
        });
        session.apply(LiveFrame::Increment {
            record: record(3, "c", "3"),
        });
        let ids: Vec<u64> = session.view().iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![3, 2, 1]);
    }

    #[test]
    fn second_snapshot_replaces_and_duplicates_are_kept() {
        let mut session = open_session();
        session.apply(LiveFrame::Snapshot {
            records: vec![record(1, "a", "1")],
        });
        session.apply(LiveFrame::Increment {
            record: record(1, "a", "1"),
        });
        assert_eq!(session.view().len(), 2, "no deduplication");

        session.apply(LiveFrame::Snapshot {
            records: vec![record(1, "a", "1"), record(2, "b", "2")],
        });
        assert_eq!(session.snapshots_seen(), 2);
        let ids: Vec<u64> = session.view().iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![2, 1]);
    }

    #[test]
    fn empty_snapshot_clears_the_view() {
        let mut session = open_session();
        session.apply(LiveFrame::Increment {
            record: record(5, "x", "y"),
        });
        let outcome = session.on_text(r#"{"kind":"snapshot","records":[]}"#).unwrap();
        assert_eq!(outcome, FrameOutcome::Replaced { len: 0 });
        assert!(session.view().is_empty());
    }

    #[test]
    fn malformed_text_leaves_the_view_untouched() {
        let mut session = open_session();
        session
            .on_text(r#"{"kind":"increment","record":{"id":1,"event":"a","update":"b"}}"#)
            .unwrap();
        let err = session.on_text("[1,2,3]").unwrap_err();
        assert!(matches!(err, ObserverError::Decode(_)));
        assert_eq!(session.view().len(), 1);
    }

    #[test]
    fn frames_after_close_are_ignored() {
        let mut session = open_session();
        session.on_close();
        let outcome = session.apply(LiveFrame::Increment {
            record: record(1, "a", "b"),
        });
        assert_eq!(outcome, FrameOutcome::Ignored);
        assert!(session.view().is_empty());
    }

    #[test]
    fn open_after_close_does_not_reopen() {
        let mut session = ObserverSession::new();
        session.on_error("refused");
        session.on_open();
        assert!(session.is_closed());
    }
}
