//! Render batches and the future handed back by `VirtualRenderer::get`

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use tokio::sync::oneshot;

use crate::error::{CarouselError, Result};
use crate::store::BatchItem;

/// Answer to one batch request from the virtualization layer.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderBatch {
    pub page_key: u32,
    /// Records not yet handed out, in ordinal order.
    pub items: Vec<BatchItem>,
    /// Key to request next, or `None` once the source is exhausted.
    pub next_request_key: Option<u32>,
}

impl RenderBatch {
    pub fn empty(page_key: u32, next_request_key: Option<u32>) -> Self {
        Self {
            page_key,
            items: Vec::new(),
            next_request_key,
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[derive(Debug)]
enum BatchState {
    Ready(Option<Result<RenderBatch>>),
    Waiting(oneshot::Receiver<RenderBatch>),
}

/// Resolves with the batch once data is available. Resolves to
/// [`CarouselError::Cancelled`] when the session is torn down first.
#[derive(Debug)]
#[must_use = "the batch is only delivered when the future is awaited"]
pub struct BatchFuture {
    page_key: u32,
    state: BatchState,
}

impl BatchFuture {
    pub(crate) fn ready(page_key: u32, result: Result<RenderBatch>) -> Self {
        Self {
            page_key,
            state: BatchState::Ready(Some(result)),
        }
    }

    pub(crate) fn waiting(
        page_key: u32,
        rx: oneshot::Receiver<RenderBatch>,
    ) -> Self {
        Self {
            page_key,
            state: BatchState::Waiting(rx),
        }
    }

    pub fn page_key(&self) -> u32 {
        self.page_key
    }

    /// True when the request was parked waiting for a fetch.
    pub fn is_parked(&self) -> bool {
        matches!(self.state, BatchState::Waiting(_))
    }
}

impl Future for BatchFuture {
    type Output = Result<RenderBatch>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let page_key = self.page_key;
        match &mut self.state {
            BatchState::Ready(result) => Poll::Ready(
                result
                    .take()
                    .unwrap_or(Err(CarouselError::Cancelled { page_key })),
            ),
            BatchState::Waiting(rx) => Pin::new(rx)
                .poll(cx)
                .map(|received| {
                    received.map_err(|_| CarouselError::Cancelled { page_key })
                }),
        }
    }
}
