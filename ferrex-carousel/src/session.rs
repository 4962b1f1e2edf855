//! Session: the ItemStore / CursorPager pair for one grouping key
//!
//! A session is created on mount or grouping-key change and torn down as a
//! unit. Its state is shared with the fetch task behind a
//! `parking_lot::Mutex` that is never held across an `.await`.

use std::sync::Arc;

use ferrex_contracts::prelude::{ErrorSink, PageSource};
use ferrex_model::{GroupKey, Page, PageRequest, Record, RecordId};
use parking_lot::{Mutex, MutexGuard};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, error, trace};

use crate::error::CarouselError;
use crate::pager::{CursorPager, FetchPlan, PagerDecision};
use crate::pending::PendingSlot;
use crate::renderer::batch::RenderBatch;
use crate::store::ItemStore;

/// Outcome of asking the session to fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchStatus {
    Issued,
    Coalesced,
    Queued,
    Exhausted,
    Closed,
}

/// Latest notification on the store-change channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StoreChange {
    /// Bumped every time a fetch finishes, successfully or not.
    pub generation: u64,
    /// The fetch that just failed, if the most recent one did.
    pub failed: Option<FetchPlan>,
}

#[derive(Debug)]
pub(crate) struct SessionState {
    pub(crate) store: ItemStore,
    pub(crate) pager: CursorPager,
    pub(crate) pending: PendingSlot,
    /// Contiguous records already handed to the virtualization layer.
    pub(crate) resolved: usize,
    pub(crate) closed: bool,
}

impl SessionState {
    pub(crate) fn has_more(&self) -> bool {
        self.pager.has_more(self.store.contiguous_len())
    }

    /// Everything past the resolved count, advancing it.
    pub(crate) fn take_batch(&mut self, page_key: u32) -> RenderBatch {
        let end = self.store.contiguous_len();
        let items = self.store.records_in(self.resolved + 1..end + 1);
        self.resolved = end;
        let next_request_key = self.has_more().then(|| page_key + 1);
        RenderBatch {
            page_key,
            items,
            next_request_key,
        }
    }

    fn resolve_pending(&mut self) {
        if let Some(request) = self.pending.take() {
            let batch = self.take_batch(request.page_key());
            trace!(
                "Resolving parked page {} with {} items",
                batch.page_key,
                batch.len()
            );
            request.resolve(batch);
        }
    }

    fn apply_page(&mut self, plan: FetchPlan, page: Page) -> std::ops::Range<usize> {
        self.pager.on_page(plan, &page);
        match plan {
            FetchPlan::Next => {
                let range = self.store.append_page(page.records);
                // Resolve even on an empty delta so the caller asks again
                // instead of waiting on a fetch nobody issues.
                self.resolve_pending();
                range
            }
            FetchPlan::Window { anchor } => {
                let len = page.records.len();
                self.store.insert_window(anchor, page.records);
                anchor..anchor + len
            }
        }
    }
}

#[derive(Debug)]
struct Shared {
    group: GroupKey,
    source: Arc<dyn PageSource>,
    errors: Arc<dyn ErrorSink>,
    state: Mutex<SessionState>,
    changes: watch::Sender<StoreChange>,
    task: Mutex<Option<JoinHandle<()>>>,
}

/// Cheap, cloneable handle to one grouping key's store and pager.
///
/// Fetches are spawned onto the ambient tokio runtime, so fetch-triggering
/// calls must happen inside one.
#[derive(Debug, Clone)]
pub struct Session {
    shared: Arc<Shared>,
}

impl Session {
    pub fn new(
        group: GroupKey,
        source: Arc<dyn PageSource>,
        errors: Arc<dyn ErrorSink>,
        page_size: usize,
    ) -> Self {
        let (changes, _) = watch::channel(StoreChange::default());
        let state = SessionState {
            store: ItemStore::new(),
            pager: CursorPager::new(group.clone(), page_size),
            pending: PendingSlot::new(),
            resolved: 0,
            closed: false,
        };
        Self {
            shared: Arc::new(Shared {
                group,
                source,
                errors,
                state: Mutex::new(state),
                changes,
                task: Mutex::new(None),
            }),
        }
    }

    pub fn group(&self) -> &GroupKey {
        &self.shared.group
    }

    pub(crate) fn lock(&self) -> MutexGuard<'_, SessionState> {
        self.shared.state.lock()
    }

    /// Continue the forward cursor chain. No-op while the same fetch runs.
    pub fn load_more(&self) -> FetchStatus {
        self.request(FetchPlan::Next)
    }

    /// Load a window starting at the one-based ordinal `anchor`.
    pub fn load_window(&self, anchor: usize) -> FetchStatus {
        self.request(FetchPlan::Window {
            anchor: anchor.max(1),
        })
    }

    fn request(&self, plan: FetchPlan) -> FetchStatus {
        let request = {
            let mut state = self.lock();
            if state.closed {
                return FetchStatus::Closed;
            }
            match state.pager.request(plan) {
                PagerDecision::Issue(request) => request,
                PagerDecision::Coalesced => return FetchStatus::Coalesced,
                PagerDecision::Queued => return FetchStatus::Queued,
                PagerDecision::Exhausted => return FetchStatus::Exhausted,
            }
        };

        debug!(
            "Fetching {:?} for group {} ({:?})",
            plan, self.shared.group, request.start
        );
        let handle =
            tokio::spawn(run_fetches(Arc::clone(&self.shared), plan, request));
        *self.shared.task.lock() = Some(handle);
        FetchStatus::Issued
    }

    /// Close the session: clear any parked request without resolving it and
    /// abort the in-flight fetch. Returns whether a request was parked.
    pub fn teardown(&self) -> bool {
        let cleared = {
            let mut state = self.lock();
            if state.closed {
                return false;
            }
            state.closed = true;
            state.pending.clear()
        };
        if let Some(handle) = self.shared.task.lock().take() {
            handle.abort();
        }
        debug!(
            "Session for group {} torn down (pending cleared: {})",
            self.shared.group, cleared
        );
        cleared
    }

    pub fn is_closed(&self) -> bool {
        self.lock().closed
    }

    /// Receiver notified every time a fetch lands in the store or fails.
    pub fn subscribe(&self) -> watch::Receiver<StoreChange> {
        self.shared.changes.subscribe()
    }

    pub fn record_at(&self, index: usize) -> Option<Arc<Record>> {
        self.lock().store.get(index).cloned()
    }

    pub fn locate(&self, id: &RecordId) -> Option<(usize, Arc<Record>)> {
        let state = self.lock();
        let index = state.store.index_of(id)?;
        state.store.get(index).map(|record| (index, Arc::clone(record)))
    }

    pub fn contiguous_len(&self) -> usize {
        self.lock().store.contiguous_len()
    }

    pub fn loaded_len(&self) -> usize {
        self.lock().store.len()
    }

    pub fn page_size(&self) -> usize {
        self.lock().pager.page_size()
    }

    pub fn total_count(&self) -> Option<usize> {
        self.lock().pager.total_count()
    }

    pub fn has_more(&self) -> bool {
        self.lock().has_more()
    }

    pub fn fetch_in_flight(&self) -> bool {
        self.lock().pager.in_flight().is_some()
    }

    pub fn fetches_issued(&self) -> usize {
        self.lock().pager.fetches_issued()
    }

    pub fn pending_page_key(&self) -> Option<u32> {
        self.lock().pending.page_key()
    }

    /// Highest ordinal navigation may target: the known total, or the
    /// loaded prefix once the source is exhausted, or unbounded.
    pub fn upper_bound(&self) -> usize {
        let state = self.lock();
        match state.pager.total_count() {
            Some(total) => total,
            None if state.has_more() => usize::MAX,
            None => state.store.contiguous_len(),
        }
    }
}

async fn run_fetches(
    shared: Arc<Shared>,
    mut plan: FetchPlan,
    mut request: PageRequest,
) {
    loop {
        let result = shared.source.fetch_page(&request).await;

        let (next, failure) = {
            let mut state = shared.state.lock();
            if state.closed {
                debug!(
                    "Dropping {:?} result for closed session {}",
                    plan, shared.group
                );
                return;
            }
            let failure = match result {
                Ok(page) => {
                    let fetched = page.len();
                    let range = state.apply_page(plan, page);
                    debug!(
                        "Group {}: {:?} landed {} records at {:?}",
                        shared.group, plan, fetched, range
                    );
                    None
                }
                Err(source) => Some(CarouselError::Fetch {
                    group: shared.group.clone(),
                    source,
                }),
            };
            (state.pager.finish(), failure)
        };

        let failed = failure.map(|err| {
            error!("{err}");
            shared.errors.report("page fetch", &err);
            plan
        });
        shared.changes.send_modify(|change| {
            change.generation += 1;
            change.failed = failed;
        });

        match next {
            Some((queued_plan, queued_request)) => {
                plan = queued_plan;
                request = queued_request;
            }
            None => break,
        }
    }
}
