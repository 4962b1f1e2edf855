//! Trait surfaces the carousel engine consumes from its host.
//!
//! The engine never reaches past these calls into transport, drawing, or
//! viewer internals.

#![allow(missing_docs)]

pub mod input;
pub mod render;
pub mod report;
pub mod source;
pub mod viewer;

/// Frequently used collaborator traits for engine and host crates.
pub mod prelude {
    pub use super::input::InputFocusArbiter;
    pub use super::render::{RenderBackend, RenderError, Renderer};
    pub use super::report::ErrorSink;
    pub use super::source::{PageSource, SourceError};
    pub use super::viewer::Viewer;
}
