use crate::ids::GroupKey;
use crate::record::Record;

/// Opaque backend pagination token denoting "next page".
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Cursor(pub String);

impl Cursor {
    pub fn new(token: impl Into<String>) -> Self {
        Cursor(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Where a page fetch begins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageStart {
    /// Continue the forward cursor chain. `None` requests the first page.
    After(Option<Cursor>),
    /// Start at a zero-based offset into the group's ordering. Used for
    /// look-behind windows when the user seeks past the loaded range.
    Offset(usize),
}

/// Arguments for one fetch against the page source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    pub group: GroupKey,
    pub start: PageStart,
    pub page_size: usize,
}

impl PageRequest {
    pub fn first(group: GroupKey, page_size: usize) -> Self {
        Self {
            group,
            start: PageStart::After(None),
            page_size,
        }
    }

    /// Zero-based offset of the first record, when the request is anchored.
    pub fn offset(&self) -> Option<usize> {
        match self.start {
            PageStart::Offset(offset) => Some(offset),
            PageStart::After(_) => None,
        }
    }
}

/// An ordered batch of records returned by one fetch.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Page {
    pub records: Vec<Record>,
    pub next_cursor: Option<Cursor>,
    /// Total records in the group, when the backend reports it.
    pub total_count: Option<usize>,
}

impl Page {
    pub fn has_more(&self) -> bool {
        self.next_cursor.is_some()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
