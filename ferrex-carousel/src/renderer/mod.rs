//! VirtualRenderer: the windowing engine's side of the carousel
//!
//! The virtualization layer pulls batches through [`VirtualRenderer::get`]
//! and drives per-item renderers through [`VirtualRenderer::render`].
//! Renderer slots are keyed by record identity and survive scrolling out of
//! view; they are destroyed only on teardown.

pub mod batch;
pub mod keyboard;
pub mod slot;

use std::collections::HashMap;
use std::sync::Arc;

use ferrex_contracts::prelude::{ErrorSink, RenderBackend};
use ferrex_model::{Dims, ElementId, RecordId};
use tracing::{debug, error, trace, warn};

use crate::error::CarouselError;
use crate::focus::{FocusController, FocusOutcome, FocusTarget};
use crate::session::{FetchStatus, Session};
use batch::{BatchFuture, RenderBatch};
use keyboard::{KeyOutcome, KeyboardNavigator, NavKey};
use slot::{RendererSlot, SlotState};

/// What a `render` call did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderOutcome {
    /// A new slot was created and attached.
    Attached,
    /// An existing slot was attached again.
    Reattached,
    /// An existing slot was disabled.
    Hidden,
    /// Nothing to do on this pass.
    Skipped,
    /// Creation or attach failed; reported to the error sink.
    Failed,
}

#[derive(Debug)]
pub struct VirtualRenderer {
    session: Session,
    backend: Arc<dyn RenderBackend>,
    errors: Arc<dyn ErrorSink>,
    slots: HashMap<RecordId, RendererSlot>,
    keyboard: KeyboardNavigator,
    torn_down: bool,
}

impl VirtualRenderer {
    pub fn new(
        session: Session,
        backend: Arc<dyn RenderBackend>,
        errors: Arc<dyn ErrorSink>,
        keyboard: KeyboardNavigator,
    ) -> Self {
        Self {
            session,
            backend,
            errors,
            slots: HashMap::new(),
            keyboard,
            torn_down: false,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Request the batch for `page_key`.
    ///
    /// Resolves immediately when records landed since the last answer or
    /// when the source is exhausted; otherwise parks the request and asks
    /// the pager for more.
    ///
    /// # Panics
    ///
    /// Panics if called while a previous request is still parked.
    pub fn get(&mut self, page_key: u32) -> BatchFuture {
        let parked = {
            let mut state = self.session.lock();
            if state.closed {
                return BatchFuture::ready(
                    page_key,
                    Err(CarouselError::Cancelled { page_key }),
                );
            }
            if page_key <= 1 {
                state.resolved = 0;
            }
            if state.store.contiguous_len() > state.resolved || !state.has_more() {
                let batch = state.take_batch(page_key);
                trace!(
                    "Page {} resolved immediately with {} items",
                    page_key,
                    batch.len()
                );
                return BatchFuture::ready(page_key, Ok(batch));
            }
            state.pending.park(page_key)
        };

        let status = self.session.load_more();
        trace!("Page {} parked; load_more -> {:?}", page_key, status);
        BatchFuture::waiting(page_key, parked)
    }

    /// Re-issue the forward fetch for a parked request, e.g. after the
    /// previous attempt failed. Returns `None` when nothing is parked.
    pub fn retry_pending(&self) -> Option<FetchStatus> {
        self.session.pending_page_key()?;
        Some(self.session.load_more())
    }

    /// Attach, reattach, or hide the renderer for `id`.
    ///
    /// Soft passes only touch existing slots. New slots are created lazily
    /// on a hard, visible pass.
    pub fn render(
        &mut self,
        id: RecordId,
        element: ElementId,
        dims: Dims,
        soft: bool,
        hide: bool,
    ) -> RenderOutcome {
        if self.torn_down {
            trace!("Render for {} after teardown ignored", id);
            return RenderOutcome::Skipped;
        }

        if let Some(slot) = self.slots.get_mut(&id) {
            let result = if hide {
                slot.disable().map(|_| RenderOutcome::Hidden)
            } else {
                slot.attach(element, dims).map(|_| RenderOutcome::Reattached)
            };
            return result.unwrap_or_else(|err| {
                report(self.errors.as_ref(), "renderer", &err);
                RenderOutcome::Failed
            });
        }

        if soft || hide {
            return RenderOutcome::Skipped;
        }

        let Some((_, record)) = self.session.locate(&id) else {
            warn!(
                "Render requested for {} which is not in group {}",
                id,
                self.session.group()
            );
            return RenderOutcome::Skipped;
        };

        let renderer = match self.backend.create_renderer(&record) {
            Ok(renderer) => renderer,
            Err(source) => {
                let err = CarouselError::Renderer { id, source };
                report(self.errors.as_ref(), "renderer construction", &err);
                return RenderOutcome::Failed;
            }
        };

        let mut slot = RendererSlot::new(id, renderer);
        let outcome = match slot.attach(element, dims) {
            Ok(()) => RenderOutcome::Attached,
            Err(err) => {
                report(self.errors.as_ref(), "renderer attach", &err);
                RenderOutcome::Failed
            }
        };
        self.slots.insert(id, slot);
        outcome
    }

    pub fn on_item_click(
        &mut self,
        id: RecordId,
        focus: &mut FocusController,
    ) -> FocusOutcome {
        self.keyboard.reset();
        focus.set_focus(FocusTarget::Identity(id))
    }

    pub fn on_key(&mut self, key: NavKey, focus: &mut FocusController) -> KeyOutcome {
        if self.torn_down {
            return KeyOutcome::Ignored;
        }
        self.keyboard.handle(key, focus)
    }

    pub fn slot_state(&self, id: &RecordId) -> Option<SlotState> {
        self.slots.get(id).map(RendererSlot::state)
    }

    pub fn live_slots(&self) -> usize {
        self.slots.len()
    }

    /// Clear the pending request, stop the pager, and destroy every slot.
    /// Returns the number of slots destroyed. Idempotent.
    pub fn teardown(&mut self) -> usize {
        if self.torn_down {
            return 0;
        }
        self.torn_down = true;
        self.session.teardown();

        let mut destroyed = 0;
        for (id, mut slot) in self.slots.drain() {
            match slot.destroy() {
                Ok(()) => destroyed += 1,
                Err(err) => debug!("Slot {} already destroyed: {}", id, err),
            }
        }
        debug!(
            "Renderer for group {} torn down; {} slots destroyed",
            self.session.group(),
            destroyed
        );
        destroyed
    }

    /// Convenience for hosts that want the next batch without tracking keys.
    pub async fn fetch_batch(&mut self, page_key: u32) -> Result<RenderBatch, CarouselError> {
        self.get(page_key).await
    }
}

impl Drop for VirtualRenderer {
    fn drop(&mut self) {
        self.teardown();
    }
}

fn report(errors: &dyn ErrorSink, context: &str, err: &CarouselError) {
    error!("{}: {}", context, err);
    errors.report(context, err);
}
