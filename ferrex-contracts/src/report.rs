//! Error reporting collaborator

use std::error::Error;
use std::fmt::Debug;

/// Receives failures that must not cross the render boundary: page fetch
/// errors and per-item renderer failures.
pub trait ErrorSink: Send + Sync + Debug {
    fn report(&self, context: &str, error: &(dyn Error + Send + Sync + 'static));
}
