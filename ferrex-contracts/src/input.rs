//! Input focus arbitration

use std::fmt::Debug;

/// Shared arbiter answering whether an editable element (text box, number
/// field) currently owns keyboard focus. Carousel navigation keys are
/// ignored while it does.
pub trait InputFocusArbiter: Send + Sync + Debug {
    fn editable_focused(&self) -> bool;
}

/// Arbiter that never reports an editable focus. Useful for hosts without
/// text inputs and for headless runs.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoEditableFocus;

impl InputFocusArbiter for NoEditableFocus {
    fn editable_focused(&self) -> bool {
        false
    }
}
