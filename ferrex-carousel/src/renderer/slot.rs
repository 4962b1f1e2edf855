//! RendererSlot: one live renderer with an explicit lifecycle
//!
//! Transition table (`→ state` forwards the call to the renderer, `noop`
//! changes nothing, `refused` returns an error):
//!
//! | from \ op  | Attach     | Disable    | Destroy     |
//! |------------|------------|------------|-------------|
//! | Unattached | → Attached | noop       | → Destroyed |
//! | Attached   | → Attached | → Disabled | → Destroyed |
//! | Disabled   | → Attached | noop       | → Destroyed |
//! | Destroyed  | refused    | refused    | refused     |

use ferrex_contracts::render::Renderer;
use ferrex_model::{Dims, ElementId, RecordId};
use tracing::trace;

use crate::error::{CarouselError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SlotState {
    #[default]
    Unattached,
    Attached,
    Disabled,
    Destroyed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotOp {
    Attach,
    Disable,
    Destroy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Call the renderer, then move to the state.
    Forward(SlotState),
    Noop,
}

/// Look up the transition for `op` in `from`. `None` means refused.
pub const fn transition(from: SlotState, op: SlotOp) -> Option<Transition> {
    use SlotOp::*;
    use SlotState::*;
    match (from, op) {
        (Destroyed, _) => None,
        (_, Destroy) => Some(Transition::Forward(Destroyed)),
        (_, Attach) => Some(Transition::Forward(Attached)),
        (Attached, Disable) => Some(Transition::Forward(Disabled)),
        (Unattached | Disabled, Disable) => Some(Transition::Noop),
    }
}

#[derive(Debug)]
pub struct RendererSlot {
    id: RecordId,
    renderer: Box<dyn Renderer>,
    state: SlotState,
    element: Option<ElementId>,
}

impl RendererSlot {
    pub fn new(id: RecordId, renderer: Box<dyn Renderer>) -> Self {
        Self {
            id,
            renderer,
            state: SlotState::Unattached,
            element: None,
        }
    }

    pub fn id(&self) -> RecordId {
        self.id
    }

    pub fn state(&self) -> SlotState {
        self.state
    }

    pub fn element(&self) -> Option<ElementId> {
        self.element
    }

    fn step(&self, op: SlotOp) -> Result<Transition> {
        transition(self.state, op)
            .ok_or(CarouselError::SlotDestroyed { id: self.id })
    }

    /// Attach or reattach. On renderer failure the slot keeps its previous
    /// state.
    pub fn attach(&mut self, element: ElementId, dims: Dims) -> Result<()> {
        if let Transition::Forward(next) = self.step(SlotOp::Attach)? {
            self.renderer.attach(element, dims).map_err(|source| {
                CarouselError::Renderer {
                    id: self.id,
                    source,
                }
            })?;
            trace!("Slot {} {:?} -> {:?} in {}", self.id, self.state, next, element);
            self.state = next;
            self.element = Some(element);
        }
        Ok(())
    }

    pub fn disable(&mut self) -> Result<()> {
        if let Transition::Forward(next) = self.step(SlotOp::Disable)? {
            self.renderer.disable();
            self.state = next;
        }
        Ok(())
    }

    pub fn destroy(&mut self) -> Result<()> {
        if let Transition::Forward(next) = self.step(SlotOp::Destroy)? {
            self.renderer.destroy();
            self.state = next;
            self.element = None;
        }
        Ok(())
    }
}

impl Drop for RendererSlot {
    fn drop(&mut self) {
        if self.state != SlotState::Destroyed {
            self.renderer.destroy();
            self.state = SlotState::Destroyed;
        }
    }
}
