//! Per-item render backend

use ferrex_model::{Dims, ElementId, Record};
use std::fmt::Debug;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RenderError {
    #[error("Unsupported media: {0}")]
    Unsupported(String),
    #[error("Failed to create renderer: {0}")]
    Create(String),
    #[error("Failed to attach renderer to {element}: {reason}")]
    Attach { element: ElementId, reason: String },
}

/// A live, resource-holding render instance for one record.
pub trait Renderer: Send + Debug {
    /// Attach (or reattach) into `element` at the given size.
    fn attach(
        &mut self,
        element: ElementId,
        dims: Dims,
    ) -> Result<(), RenderError>;

    /// Stop drawing but keep resources so a later attach is cheap.
    fn disable(&mut self);

    /// Release every resource. Called exactly once per renderer.
    fn destroy(&mut self);
}

/// Factory for renderers, typically one per media technology stack.
pub trait RenderBackend: Send + Sync + Debug {
    fn create_renderer(
        &self,
        record: &Record,
    ) -> Result<Box<dyn Renderer>, RenderError>;
}
