//! Plain-text rendering of an observer session.

use campus_live::ObserverSession;
use std::fmt::Write;

/// Renders the status line followed by the view, newest first.
pub fn render(session: &ObserverSession) -> String {
    let mut out = format!("[{}] {} update(s)\n", session.status_label(), session.view().len());
    if session.view().is_empty() {
        out.push_str("  (no updates yet)\n");
    }
    for record in session.view() {
        let _ = writeln!(out, "  #{:<4} {}: {}", record.id, record.event, record.update);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use campus_types::{AnnouncementRecord, LiveFrame};

    #[test]
    fn renders_newest_first() {
        let mut session = ObserverSession::new();
        session.on_open();
        session.apply(LiveFrame::Snapshot {
            records: vec![
                AnnouncementRecord::new(1, "Seminar", "Starts at 5 PM"),
                AnnouncementRecord::new(2, "Workshop", "Room 204"),
            ],
        });
        let text = render(&session);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "[Connected] 2 update(s)");
        assert!(lines[1].contains("Workshop: Room 204"));
        assert!(lines[2].contains("Seminar: Starts at 5 PM"));
    }

    #[test]
    fn renders_empty_view() {
        let session = ObserverSession::new();
        assert_eq!(render(&session), "[Connecting...] 0 update(s)\n  (no updates yet)\n");
    }
}
