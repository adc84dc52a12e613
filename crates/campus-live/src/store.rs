//! The in-memory update store.

use campus_types::AnnouncementRecord;

/// Append-only, insertion-ordered sequence of announcement records.
///
/// Ids are assigned as `len + 1`, so they start at 1 and grow by exactly 1
/// per append. There is no delete and no capacity bound; the store lives
/// as long as the process does.
///
/// The store is not synchronized on its own. [`crate::LiveService`] owns it
/// behind the sequencer lock together with the broadcast hub.
#[derive(Debug, Default)]
pub struct UpdateStore {
    records: Vec<AnnouncementRecord>,
}

impl UpdateStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-filled with `(event, update)` pairs, numbered
    /// from 1 in the given order. Used once at process start.
    pub fn seeded<I, E, U>(seed: I) -> Self
    where
        I: IntoIterator<Item = (E, U)>,
        E: Into<String>,
        U: Into<String>,
    {
        let mut store = Self::new();
        for (event, update) in seed {
            store.append(event, update);
        }
        store
    }

    /// Appends a record and returns it with its freshly assigned id.
    pub fn append(
        &mut self,
        event: impl Into<String>,
        update: impl Into<String>,
    ) -> AnnouncementRecord {
        let id = self.records.len() as u64 + 1;
        let record = AnnouncementRecord::new(id, event, update);
        self.records.push(record.clone());
        record
    }

    /// Returns a copy of every record, oldest first.
    pub fn snapshot(&self) -> Vec<AnnouncementRecord> {
        self.records.clone()
    }

    /// Returns a copy of the records whose id is greater than `after`.
    pub fn since(&self, after: u64) -> Vec<AnnouncementRecord> {
        // Ids are dense and start at 1, so record `n` sits at index `n - 1`.
        let start = usize::try_from(after)
            .unwrap_or(usize::MAX)
            .min(self.records.len());
        self.records[start..].to_vec()
    }

    /// Number of records appended so far.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether nothing has been appended yet.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_start_at_one_and_increase_by_one() {
        let mut store = UpdateStore::new();
        let ids: Vec<u64> = (0..5)
            .map(|i| store.append(format!("club-{i}"), "news").id)
            .collect();
        assert_eq!(ids, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn snapshot_is_a_detached_copy() {
        let mut store = UpdateStore::new();
        store.append("Seminar", "Starts at 5 PM");

        let mut snapshot = store.snapshot();
        snapshot.clear();
        snapshot.push(AnnouncementRecord::new(99, "forged", "record"));

        assert_eq!(store.len(), 1);
        assert_eq!(store.snapshot()[0].event, "Seminar");
    }

    #[test]
    fn snapshot_preserves_insertion_order() {
        let mut store = UpdateStore::new();
        store.append("a", "1");
        store.append("b", "2");
        store.append("c", "3");
        let events: Vec<String> = store.snapshot().into_iter().map(|r| r.event).collect();
        assert_eq!(events, vec!["a", "b", "c"]);
    }

    #[test]
    fn seeded_store_continues_numbering() {
        let mut store = UpdateStore::seeded([
            ("Seminar", "Starts at 5 PM"),
            ("Photography Club", "New event announced"),
        ]);
        assert_eq!(store.len(), 2);
        assert_eq!(store.append("Workshop", "Room 204").id, 3);
    }

    #[test]
    fn since_returns_the_tail() {
        let mut store = UpdateStore::new();
        for i in 0..4 {
            store.append("e", format!("u{i}"));
        }
        let ids: Vec<u64> = store.since(2).into_iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![3, 4]);
        assert_eq!(store.since(0).len(), 4);
        assert!(store.since(4).is_empty());
        assert!(store.since(u64::MAX).is_empty());
    }
}
