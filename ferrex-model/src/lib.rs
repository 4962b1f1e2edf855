//! Plain data shared by the Ferrex carousel crates.
//!
//! Nothing in here performs I/O. Records are produced by a page source
//! (see `ferrex-contracts`), stored by the carousel engine, and handed to
//! render backends by reference.

#![allow(missing_docs)]

pub mod ids;
pub mod page;
pub mod record;

pub use ids::{ElementId, GroupKey, RecordId};
pub use page::{Cursor, Page, PageRequest, PageStart};
pub use record::{Dims, MediaKind, MediaRef, Record};
