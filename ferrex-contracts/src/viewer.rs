//! Viewer / modal focus surface

use ferrex_model::{Record, RecordId};
use std::fmt::Debug;

/// The externally observed "current item". The carousel reads the current
/// identity and pushes focus changes; it never touches viewer internals.
pub trait Viewer: Send + Sync + Debug {
    fn current(&self) -> Option<RecordId>;

    fn set_focus(&self, record: &Record);
}
