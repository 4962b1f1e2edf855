//! ItemStore: append-only ordinal → record map for one grouping key
//!
//! Ordinals are one-based. The forward frontier only moves through
//! [`ItemStore::append_page`]; look-behind windows land at their true
//! ordinals through [`ItemStore::insert_window`] without moving it.
//!
//! The forward chain is authoritative. Its assignments never change, and a
//! window record that disagrees with it (a different record at the frontier
//! ordinal, or the same record further ahead) is evicted so ordinals keep
//! matching the source's order.

use std::collections::HashMap;
use std::ops::Range;
use std::sync::Arc;

use ferrex_model::{Record, RecordId};
use tracing::warn;

/// One record handed to the virtualization layer, with its ordinal.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchItem {
    pub index: usize,
    pub record: Arc<Record>,
}

impl BatchItem {
    pub fn id(&self) -> RecordId {
        self.record.id
    }
}

#[derive(Debug)]
pub struct ItemStore {
    by_index: HashMap<usize, Arc<Record>>,
    positions: HashMap<RecordId, usize>,
    /// Next ordinal the forward chain will assign.
    frontier: usize,
}

impl Default for ItemStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ItemStore {
    pub fn new() -> Self {
        Self {
            by_index: HashMap::new(),
            positions: HashMap::new(),
            frontier: 1,
        }
    }

    /// Assign the next contiguous range at the forward frontier.
    ///
    /// Records already placed at the same ordinal by a window are accepted
    /// as-is. A record the forward chain already assigned is dropped without
    /// consuming an ordinal, which keeps the mapping bijective.
    pub fn append_page(&mut self, records: Vec<Record>) -> Range<usize> {
        let start = self.frontier;
        let mut next = start;

        for record in records {
            match self.positions.get(&record.id).copied() {
                Some(existing) if existing == next => {
                    next += 1;
                    continue;
                }
                Some(existing) if existing < next => {
                    warn!(
                        "Dropping duplicate record {} at ordinal {}; already assigned to {}",
                        record.id, next, existing
                    );
                    continue;
                }
                Some(existing) => {
                    warn!(
                        "Window placed {} at ordinal {}; moving it to {}",
                        record.id, existing, next
                    );
                    self.evict(existing);
                }
                None => {}
            }

            if let Some(occupant) = self.by_index.get(&next) {
                warn!(
                    "Evicting window record {} from ordinal {} for {}",
                    occupant.id, next, record.id
                );
                self.evict(next);
            }

            self.assign(next, record);
            next += 1;
        }

        self.frontier = next;
        start..next
    }

    /// Place a look-behind window starting at ordinal `start`.
    ///
    /// Returns how many records were newly assigned. Existing assignments
    /// always win.
    pub fn insert_window(&mut self, start: usize, records: Vec<Record>) -> usize {
        let start = start.max(1);
        let mut inserted = 0;

        for (offset, record) in records.into_iter().enumerate() {
            let index = start + offset;
            if let Some(occupant) = self.by_index.get(&index) {
                if occupant.id != record.id {
                    warn!(
                        "Window record {} conflicts with {} at ordinal {}; keeping existing",
                        record.id, occupant.id, index
                    );
                }
                continue;
            }
            if let Some(existing) = self.positions.get(&record.id) {
                warn!(
                    "Window record {} already assigned to {}; skipping ordinal {}",
                    record.id, existing, index
                );
                continue;
            }
            self.assign(index, record);
            inserted += 1;
        }

        inserted
    }

    fn assign(&mut self, index: usize, record: Record) {
        self.positions.insert(record.id, index);
        self.by_index.insert(index, Arc::new(record));
    }

    fn evict(&mut self, index: usize) {
        if let Some(record) = self.by_index.remove(&index) {
            self.positions.remove(&record.id);
        }
    }

    pub fn has(&self, index: usize) -> bool {
        self.by_index.contains_key(&index)
    }

    pub fn get(&self, index: usize) -> Option<&Arc<Record>> {
        self.by_index.get(&index)
    }

    pub fn index_of(&self, id: &RecordId) -> Option<usize> {
        self.positions.get(id).copied()
    }

    pub fn record(&self, id: &RecordId) -> Option<&Arc<Record>> {
        self.index_of(id).and_then(|index| self.by_index.get(&index))
    }

    /// Number of assigned ordinals, windows included.
    pub fn len(&self) -> usize {
        self.by_index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_index.is_empty()
    }

    /// Length of the prefix `1..=n` delivered by the forward chain.
    pub fn contiguous_len(&self) -> usize {
        self.frontier - 1
    }

    /// Items for the ordinal range, skipping anything unassigned.
    pub fn records_in(&self, range: Range<usize>) -> Vec<BatchItem> {
        range
            .filter_map(|index| {
                self.by_index.get(&index).map(|record| BatchItem {
                    index,
                    record: Arc::clone(record),
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ferrex_model::{GroupKey, MediaRef};

    fn record(n: usize) -> Record {
        Record::new(
            RecordId(uuid::Uuid::from_u128(n as u128)),
            GroupKey::from("group"),
            MediaRef::image(format!("https://media.invalid/{n}.jpg")),
        )
    }

    fn records(range: Range<usize>) -> Vec<Record> {
        range.map(record).collect()
    }

    #[test]
    fn appends_are_contiguous_and_increasing() {
        let mut store = ItemStore::new();
        let first = store.append_page(records(0..3));
        let second = store.append_page(records(3..8));
        let empty = store.append_page(Vec::new());

        assert_eq!(first, 1..4);
        assert_eq!(second, 4..9);
        assert_eq!(empty, 9..9);
        assert_eq!(store.contiguous_len(), 8);

        for (n, index) in (0..8).zip(1..9) {
            let stored = store.get(index).expect("assigned ordinal");
            assert_eq!(**stored, record(n));
            assert_eq!(store.index_of(&record(n).id), Some(index));
        }
        assert!(!store.has(0));
        assert!(!store.has(9));
    }

    #[test]
    fn window_does_not_move_frontier() {
        let mut store = ItemStore::new();
        store.append_page(records(0..10));

        let inserted = store.insert_window(45, records(44..54));

        assert_eq!(inserted, 10);
        assert_eq!(store.contiguous_len(), 10);
        assert!(store.has(50));
        assert!(!store.has(30));
        assert_eq!(store.len(), 20);
    }

    #[test]
    fn forward_chain_accepts_records_already_placed_by_window() {
        let mut store = ItemStore::new();
        store.append_page(records(0..10));
        store.insert_window(12, records(11..16));

        let range = store.append_page(records(10..20));

        assert_eq!(range, 11..21);
        assert_eq!(store.len(), 20);
        assert_eq!(store.index_of(&record(13).id), Some(14));
    }

    #[test]
    fn misaligned_window_yields_to_forward_chain() {
        let mut store = ItemStore::new();
        store.append_page(records(0..10));
        // One slot early: record(n) belongs at n + 1.
        store.insert_window(11, records(11..14));

        let range = store.append_page(records(10..15));

        assert_eq!(range, 11..16);
        assert_eq!(store.len(), 15);
        for n in 10..15 {
            assert_eq!(store.index_of(&record(n).id), Some(n + 1));
            assert_eq!(**store.get(n + 1).expect("forward ordinal"), record(n));
        }
    }

    #[test]
    fn window_record_ahead_of_frontier_is_moved_back() {
        let mut store = ItemStore::new();
        store.append_page(records(0..2));
        store.insert_window(8, records(2..3));

        let range = store.append_page(records(2..4));

        assert_eq!(range, 3..5);
        assert_eq!(store.index_of(&record(2).id), Some(3));
        assert!(!store.has(8));
        assert_eq!(store.len(), 4);
    }

    #[test]
    fn duplicate_identity_is_dropped_without_consuming_an_ordinal() {
        let mut store = ItemStore::new();
        store.append_page(records(0..3));

        let mut page = records(3..5);
        page.insert(1, record(0));
        let range = store.append_page(page);

        assert_eq!(range, 4..6);
        assert_eq!(store.index_of(&record(0).id), Some(1));
        assert_eq!(store.index_of(&record(4).id), Some(5));
    }

    #[test]
    fn window_never_overwrites_existing_assignment() {
        let mut store = ItemStore::new();
        store.append_page(records(0..5));

        let inserted = store.insert_window(3, records(100..104));

        assert_eq!(inserted, 1);
        assert_eq!(**store.get(3).expect("kept"), record(2));
        assert_eq!(store.index_of(&record(103).id), Some(6));
    }

    #[test]
    fn records_in_skips_gaps() {
        let mut store = ItemStore::new();
        store.append_page(records(0..2));
        store.insert_window(5, records(4..6));

        let items = store.records_in(1..7);
        let indices: Vec<usize> = items.iter().map(|item| item.index).collect();
        assert_eq!(indices, vec![1, 2, 5, 6]);
    }
}
