//! In-memory page source
//!
//! Serves records for any number of grouping keys from plain vectors. Next
//! cursors are the zero-based offset of the following page, so the source
//! supports both cursor continuation and offset seeks. Used by the
//! `carousel-sim` binary and by tests.

use std::collections::HashMap;

use async_trait::async_trait;
use ferrex_contracts::source::{PageSource, SourceError};
use ferrex_model::{Cursor, GroupKey, MediaRef, Page, PageRequest, PageStart, Record, RecordId};
use parking_lot::RwLock;
use tracing::trace;
use uuid::Uuid;

#[derive(Debug)]
pub struct MemorySource {
    groups: RwLock<HashMap<GroupKey, Vec<Record>>>,
    report_total: bool,
}

impl Default for MemorySource {
    fn default() -> Self {
        Self::new()
    }
}

impl MemorySource {
    pub fn new() -> Self {
        Self {
            groups: RwLock::new(HashMap::new()),
            report_total: true,
        }
    }

    /// Stop reporting `total_count`, as cursor-only backends do.
    pub fn without_totals(mut self) -> Self {
        self.report_total = false;
        self
    }

    pub fn with_group(self, group: GroupKey, records: Vec<Record>) -> Self {
        self.insert_group(group, records);
        self
    }

    /// Replace the records served for `group`.
    pub fn insert_group(&self, group: GroupKey, records: Vec<Record>) {
        self.groups.write().insert(group, records);
    }

    /// `count` image records for `group` with identities derived from the
    /// group name and ordinal, so repeated runs see the same ids.
    pub fn synthetic(group: &GroupKey, count: usize) -> Vec<Record> {
        (1..=count)
            .map(|ordinal| synthetic_record(group, ordinal))
            .collect()
    }

    pub fn group_len(&self, group: &GroupKey) -> usize {
        self.groups.read().get(group).map_or(0, Vec::len)
    }

    fn offset_of(start: &PageStart) -> Result<usize, SourceError> {
        match start {
            PageStart::After(None) => Ok(0),
            PageStart::After(Some(cursor)) => cursor
                .as_str()
                .parse()
                .map_err(|_| SourceError::InvalidCursor(cursor.as_str().to_string())),
            PageStart::Offset(offset) => Ok(*offset),
        }
    }
}

/// Deterministic record for `ordinal` (one-based) within `group`.
pub fn synthetic_record(group: &GroupKey, ordinal: usize) -> Record {
    let name = format!("{}/{}", group.as_str(), ordinal);
    let id = RecordId(Uuid::new_v5(&Uuid::NAMESPACE_OID, name.as_bytes()));
    Record::new(
        id,
        group.clone(),
        MediaRef::image(format!("memory://{name}.jpg")),
    )
    .with_size(1280, 720)
}

#[async_trait]
impl PageSource for MemorySource {
    async fn fetch_page(&self, request: &PageRequest) -> Result<Page, SourceError> {
        let offset = Self::offset_of(&request.start)?;
        let groups = self.groups.read();
        let Some(records) = groups.get(&request.group) else {
            return Ok(Page {
                records: Vec::new(),
                next_cursor: None,
                total_count: self.report_total.then_some(0),
            });
        };

        let total = records.len();
        let start = offset.min(total);
        let end = (start + request.page_size).min(total);
        trace!(
            "Memory source serving {}..{} of {} for {}",
            start, end, total, request.group
        );
        Ok(Page {
            records: records[start..end].to_vec(),
            next_cursor: (end < total).then(|| Cursor::new(end.to_string())),
            total_count: self.report_total.then_some(total),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(group: &GroupKey, start: PageStart, page_size: usize) -> PageRequest {
        PageRequest {
            group: group.clone(),
            start,
            page_size,
        }
    }

    #[tokio::test]
    async fn cursor_chain_walks_to_the_end() {
        let group = GroupKey::from("photos");
        let source = MemorySource::new()
            .with_group(group.clone(), MemorySource::synthetic(&group, 25));

        let first = source
            .fetch_page(&request(&group, PageStart::After(None), 10))
            .await
            .unwrap();
        assert_eq!(first.len(), 10);
        assert_eq!(first.total_count, Some(25));

        let second = source
            .fetch_page(&request(&group, PageStart::After(first.next_cursor), 10))
            .await
            .unwrap();
        let third = source
            .fetch_page(&request(&group, PageStart::After(second.next_cursor), 10))
            .await
            .unwrap();
        assert_eq!(third.len(), 5);
        assert!(!third.has_more());
    }

    #[tokio::test]
    async fn offset_seek_and_bad_cursor() {
        let group = GroupKey::from("photos");
        let records = MemorySource::synthetic(&group, 50);
        let expected = records[44].id;
        let source = MemorySource::new().without_totals().with_group(group.clone(), records);

        let window = source
            .fetch_page(&request(&group, PageStart::Offset(44), 5))
            .await
            .unwrap();
        assert_eq!(window.records[0].id, expected);
        assert_eq!(window.total_count, None);

        let err = source
            .fetch_page(&request(
                &group,
                PageStart::After(Some(Cursor::new("nope"))),
                5,
            ))
            .await
            .unwrap_err();
        assert_eq!(err, SourceError::InvalidCursor("nope".into()));
    }

    #[test]
    fn synthetic_ids_are_stable_and_group_scoped() {
        let a = GroupKey::from("a");
        let b = GroupKey::from("b");
        assert_eq!(synthetic_record(&a, 3).id, synthetic_record(&a, 3).id);
        assert_ne!(synthetic_record(&a, 3).id, synthetic_record(&b, 3).id);
    }
}
