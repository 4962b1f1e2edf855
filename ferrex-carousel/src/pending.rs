//! Single-slot pending batch request
//!
//! When the virtualization layer asks for a batch that isn't loaded yet,
//! its resolver is parked here until the pager lands more data. The slot
//! holds at most one resolver; parking a second one before the first is
//! resolved or cleared is a programming error and panics.

use tokio::sync::oneshot;
use tracing::debug;

use crate::renderer::batch::RenderBatch;

#[derive(Debug)]
pub struct PendingRequest {
    page_key: u32,
    tx: oneshot::Sender<RenderBatch>,
}

impl PendingRequest {
    pub fn page_key(&self) -> u32 {
        self.page_key
    }

    /// Hand the batch to the waiting caller. A caller that has already gone
    /// away is not an error.
    pub fn resolve(self, batch: RenderBatch) {
        if self.tx.send(batch).is_err() {
            debug!(
                "Batch receiver for page {} dropped before resolution",
                self.page_key
            );
        }
    }
}

#[derive(Debug, Default)]
pub struct PendingSlot {
    slot: Option<PendingRequest>,
}

impl PendingSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Park a resolver for `page_key`.
    ///
    /// # Panics
    ///
    /// Panics if a request is already parked.
    pub fn park(&mut self, page_key: u32) -> oneshot::Receiver<RenderBatch> {
        if let Some(existing) = &self.slot {
            panic!(
                "pending batch request for page {} parked while page {} is still unresolved",
                page_key, existing.page_key
            );
        }
        let (tx, rx) = oneshot::channel();
        self.slot = Some(PendingRequest { page_key, tx });
        rx
    }

    pub fn take(&mut self) -> Option<PendingRequest> {
        self.slot.take()
    }

    /// Drop the parked resolver without resolving it. Returns whether one
    /// was parked.
    pub fn clear(&mut self) -> bool {
        self.slot.take().is_some()
    }

    pub fn page_key(&self) -> Option<u32> {
        self.slot.as_ref().map(PendingRequest::page_key)
    }

    pub fn is_parked(&self) -> bool {
        self.slot.is_some()
    }
}
