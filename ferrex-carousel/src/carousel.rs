//! Carousel facade
//!
//! Owns the per-group session, renderer and the focus controller, and wires
//! them to the injected collaborators. A grouping-key change tears the old
//! renderer down (destroying every slot) before the new session exists, so
//! no fetch for the new key can start while old slots are alive.

use std::sync::Arc;

use ferrex_contracts::prelude::{
    ErrorSink, InputFocusArbiter, PageSource, RenderBackend, Viewer,
};
use ferrex_model::{Dims, ElementId, GroupKey, RecordId};
use tracing::{debug, info};

use crate::config::CarouselConfig;
use crate::error::{CarouselError, Result};
use crate::focus::input::InputState;
use crate::focus::{
    ExternalFocus, FocusController, FocusOutcome, FocusTarget, FocusedItem,
    JumpOutcome, StepDirection, StepOutcome,
};
use crate::renderer::batch::BatchFuture;
use crate::renderer::keyboard::{KeyBindings, KeyOutcome, KeyboardNavigator, NavKey};
use crate::renderer::slot::SlotState;
use crate::renderer::{RenderOutcome, VirtualRenderer};
use crate::session::{FetchStatus, Session};

/// Collaborators the host provides.
#[derive(Debug, Clone)]
pub struct CarouselDeps {
    pub source: Arc<dyn PageSource>,
    pub backend: Arc<dyn RenderBackend>,
    pub viewer: Arc<dyn Viewer>,
    pub arbiter: Arc<dyn InputFocusArbiter>,
    pub errors: Arc<dyn ErrorSink>,
}

#[derive(Debug)]
pub struct Carousel {
    config: CarouselConfig,
    bindings: KeyBindings,
    deps: CarouselDeps,
    renderer: Option<VirtualRenderer>,
    focus: FocusController,
}

impl Carousel {
    /// Validate `config` and build an unmounted carousel.
    pub fn new(config: CarouselConfig, deps: CarouselDeps) -> Result<Self> {
        config.validate()?;
        let bindings = config.key_bindings()?;
        let focus = FocusController::new(
            Arc::clone(&deps.viewer),
            config.look_behind_items(),
        );
        Ok(Self {
            config,
            bindings,
            deps,
            renderer: None,
            focus,
        })
    }

    pub fn config(&self) -> &CarouselConfig {
        &self.config
    }

    pub fn is_mounted(&self) -> bool {
        self.renderer.is_some()
    }

    pub fn group(&self) -> Option<&GroupKey> {
        self.renderer.as_ref().map(|renderer| renderer.session().group())
    }

    pub fn session(&self) -> Option<&Session> {
        self.renderer.as_ref().map(VirtualRenderer::session)
    }

    /// Start a fresh session for `group`. Any previous session is torn down
    /// first. No fetch is issued until the first `get`.
    pub fn mount(&mut self, group: GroupKey) {
        self.unmount();

        let session = Session::new(
            group.clone(),
            Arc::clone(&self.deps.source),
            Arc::clone(&self.deps.errors),
            self.config.page_size(),
        );
        let keyboard = KeyboardNavigator::new(
            self.bindings,
            Arc::clone(&self.deps.arbiter),
            self.config.autoscroll(),
        );
        self.focus.rebind(Some(session.clone()));
        self.renderer = Some(VirtualRenderer::new(
            session,
            Arc::clone(&self.deps.backend),
            Arc::clone(&self.deps.errors),
            keyboard,
        ));
        info!(
            "Carousel mounted for group {} (page size {})",
            group,
            self.config.page_size()
        );
    }

    /// Switch grouping keys. Returns false when `group` is already mounted.
    pub fn set_group(&mut self, group: GroupKey) -> bool {
        if self.group() == Some(&group) {
            return false;
        }
        self.mount(group);
        true
    }

    /// Tear down the active session. Returns the number of slots destroyed.
    pub fn unmount(&mut self) -> usize {
        let Some(mut renderer) = self.renderer.take() else {
            return 0;
        };
        let destroyed = renderer.teardown();
        self.focus.rebind(None);
        debug!(
            "Carousel unmounted from group {} ({} slots destroyed)",
            renderer.session().group(),
            destroyed
        );
        destroyed
    }

    /// Batch request from the virtualization layer. Resolves to
    /// `Cancelled` when nothing is mounted.
    pub fn get(&mut self, page_key: u32) -> BatchFuture {
        match self.renderer.as_mut() {
            Some(renderer) => renderer.get(page_key),
            None => BatchFuture::ready(
                page_key,
                Err(CarouselError::Cancelled { page_key }),
            ),
        }
    }

    pub fn retry_pending(&self) -> Option<FetchStatus> {
        self.renderer.as_ref()?.retry_pending()
    }

    pub fn render(
        &mut self,
        id: RecordId,
        element: ElementId,
        dims: Dims,
        soft: bool,
        hide: bool,
    ) -> RenderOutcome {
        match self.renderer.as_mut() {
            Some(renderer) => renderer.render(id, element, dims, soft, hide),
            None => RenderOutcome::Skipped,
        }
    }

    pub fn slot_state(&self, id: &RecordId) -> Option<SlotState> {
        self.renderer.as_ref()?.slot_state(id)
    }

    pub fn live_slots(&self) -> usize {
        self.renderer.as_ref().map_or(0, VirtualRenderer::live_slots)
    }

    pub fn on_item_click(&mut self, id: RecordId) -> FocusOutcome {
        match self.renderer.as_mut() {
            Some(renderer) => renderer.on_item_click(id, &mut self.focus),
            None => self.focus.set_focus(FocusTarget::Identity(id)),
        }
    }

    pub fn on_key(&mut self, key: NavKey) -> KeyOutcome {
        match self.renderer.as_mut() {
            Some(renderer) => renderer.on_key(key, &mut self.focus),
            None => KeyOutcome::Ignored,
        }
    }

    pub fn set_focus(&mut self, target: FocusTarget) -> FocusOutcome {
        self.focus.set_focus(target)
    }

    pub fn step(&mut self, direction: StepDirection) -> StepOutcome {
        self.focus.step(direction)
    }

    pub fn jump(&mut self, raw_input: &str) -> JumpOutcome {
        self.focus.jump(raw_input)
    }

    pub fn blur_jump_input(&mut self) {
        self.focus.blur_input();
    }

    pub fn jump_input_state(&self) -> InputState {
        self.focus.input_state()
    }

    pub fn on_external_focus(&mut self, event: ExternalFocus) -> FocusOutcome {
        self.focus.on_external_focus(event)
    }

    /// Apply a deferred focus target if its record has landed.
    pub fn sync(&mut self) -> Option<FocusOutcome> {
        self.focus.sync()
    }

    /// Wait for the next page to land, then apply any deferred focus.
    /// Returns `None` when nothing is mounted or no deferred target could
    /// be applied yet.
    pub async fn store_changed(&mut self) -> Option<FocusOutcome> {
        if !self.focus.store_changed().await {
            return None;
        }
        self.focus.sync()
    }

    pub fn current(&self) -> Option<FocusedItem> {
        self.focus.current()
    }

    pub fn deferred_focus(&self) -> Option<usize> {
        self.focus.deferred()
    }

    pub fn total_count(&self) -> Option<usize> {
        self.session()?.total_count()
    }

    /// Upper bound for pagination-bar input.
    pub fn upper_bound(&self) -> usize {
        self.session().map_or(0, Session::upper_bound)
    }
}

impl Drop for Carousel {
    fn drop(&mut self) {
        self.unmount();
    }
}
