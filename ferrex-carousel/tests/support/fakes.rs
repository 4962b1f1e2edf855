use std::collections::HashSet;
use std::error::Error;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use ferrex_carousel::MemorySource;
use ferrex_contracts::prelude::{
    ErrorSink, InputFocusArbiter, PageSource, RenderBackend, RenderError,
    Renderer, SourceError, Viewer,
};
use ferrex_model::{
    Dims, ElementId, GroupKey, Page, PageRequest, Record, RecordId,
};
use parking_lot::Mutex;
use tokio::sync::Semaphore;

/// Everything the fakes observed, in order. Shared between the source and
/// the render backend so tests can assert cross-collaborator ordering.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    Fetch(PageRequest),
    Created(RecordId),
    Attached(RecordId, ElementId),
    Disabled(RecordId),
    Destroyed(RecordId),
}

#[derive(Debug, Default)]
pub struct Journal(Mutex<Vec<Event>>);

impl Journal {
    pub fn push(&self, event: Event) {
        self.0.lock().push(event);
    }

    pub fn events(&self) -> Vec<Event> {
        self.0.lock().clone()
    }

    pub fn fetches(&self) -> Vec<PageRequest> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                Event::Fetch(request) => Some(request),
                _ => None,
            })
            .collect()
    }

    pub fn count(&self, matches: impl Fn(&Event) -> bool) -> usize {
        self.0.lock().iter().filter(|event| matches(event)).count()
    }

    pub fn clear(&self) {
        self.0.lock().clear();
    }
}

/// Page source that can hold fetches until released and fail on demand.
#[derive(Debug)]
pub struct GatedSource {
    inner: MemorySource,
    journal: Arc<Journal>,
    gate: Option<Semaphore>,
    failures: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl GatedSource {
    /// Fetches complete as soon as they are polled.
    pub fn open(inner: MemorySource, journal: Arc<Journal>) -> Self {
        Self::build(inner, journal, None)
    }

    /// Fetches block until [`GatedSource::release`] hands out permits.
    pub fn gated(inner: MemorySource, journal: Arc<Journal>) -> Self {
        Self::build(inner, journal, Some(Semaphore::new(0)))
    }

    fn build(
        inner: MemorySource,
        journal: Arc<Journal>,
        gate: Option<Semaphore>,
    ) -> Self {
        Self {
            inner,
            journal,
            gate,
            failures: AtomicUsize::new(0),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
        }
    }

    pub fn release(&self, fetches: usize) {
        if let Some(gate) = &self.gate {
            gate.add_permits(fetches);
        }
    }

    /// Make the next `count` fetches fail with a transport error.
    pub fn fail_next(&self, count: usize) {
        self.failures.store(count, Ordering::SeqCst);
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::SeqCst)
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    pub fn insert_group(&self, group: GroupKey, records: Vec<Record>) {
        self.inner.insert_group(group, records);
    }
}

#[async_trait]
impl PageSource for GatedSource {
    async fn fetch_page(&self, request: &PageRequest) -> Result<Page, SourceError> {
        self.journal.push(Event::Fetch(request.clone()));
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        if let Some(gate) = &self.gate {
            match gate.acquire().await {
                Ok(permit) => permit.forget(),
                Err(_) => {
                    self.in_flight.fetch_sub(1, Ordering::SeqCst);
                    return Err(SourceError::Other("gate closed".into()));
                }
            }
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        let failing = self
            .failures
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |left| {
                left.checked_sub(1)
            })
            .is_ok();
        if failing {
            return Err(SourceError::Transport("connection reset".into()));
        }
        self.inner.fetch_page(request).await
    }
}

#[derive(Debug)]
struct RecordingRenderer {
    id: RecordId,
    journal: Arc<Journal>,
    fail_attach: bool,
}

impl Renderer for RecordingRenderer {
    fn attach(&mut self, element: ElementId, _dims: Dims) -> Result<(), RenderError> {
        if self.fail_attach {
            return Err(RenderError::Attach {
                element,
                reason: "element detached".into(),
            });
        }
        self.journal.push(Event::Attached(self.id, element));
        Ok(())
    }

    fn disable(&mut self) {
        self.journal.push(Event::Disabled(self.id));
    }

    fn destroy(&mut self) {
        self.journal.push(Event::Destroyed(self.id));
    }
}

#[derive(Debug)]
pub struct RecordingBackend {
    journal: Arc<Journal>,
    fail_create: Mutex<HashSet<RecordId>>,
    fail_attach: Mutex<HashSet<RecordId>>,
}

impl RecordingBackend {
    pub fn new(journal: Arc<Journal>) -> Self {
        Self {
            journal,
            fail_create: Mutex::new(HashSet::new()),
            fail_attach: Mutex::new(HashSet::new()),
        }
    }

    pub fn fail_create_for(&self, id: RecordId) {
        self.fail_create.lock().insert(id);
    }

    pub fn fail_attach_for(&self, id: RecordId) {
        self.fail_attach.lock().insert(id);
    }
}

impl RenderBackend for RecordingBackend {
    fn create_renderer(
        &self,
        record: &Record,
    ) -> Result<Box<dyn Renderer>, RenderError> {
        if self.fail_create.lock().contains(&record.id) {
            return Err(RenderError::Unsupported(record.media.url.clone()));
        }
        self.journal.push(Event::Created(record.id));
        Ok(Box::new(RecordingRenderer {
            id: record.id,
            journal: Arc::clone(&self.journal),
            fail_attach: self.fail_attach.lock().contains(&record.id),
        }))
    }
}

#[derive(Debug, Default)]
pub struct RecordingViewer {
    current: Mutex<Option<RecordId>>,
    calls: Mutex<Vec<RecordId>>,
}

impl RecordingViewer {
    pub fn calls(&self) -> Vec<RecordId> {
        self.calls.lock().clone()
    }

    /// The viewer moved on its own, without going through the carousel.
    pub fn move_externally(&self, id: RecordId) {
        *self.current.lock() = Some(id);
    }
}

impl Viewer for RecordingViewer {
    fn current(&self) -> Option<RecordId> {
        *self.current.lock()
    }

    fn set_focus(&self, record: &Record) {
        self.calls.lock().push(record.id);
        *self.current.lock() = Some(record.id);
    }
}

#[derive(Debug, Default)]
pub struct ToggleArbiter(AtomicBool);

impl ToggleArbiter {
    pub fn set_editing(&self, editing: bool) {
        self.0.store(editing, Ordering::SeqCst);
    }
}

impl InputFocusArbiter for ToggleArbiter {
    fn editable_focused(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

#[derive(Debug, Default)]
pub struct CollectingSink(Mutex<Vec<(String, String)>>);

impl CollectingSink {
    pub fn reports(&self) -> Vec<(String, String)> {
        self.0.lock().clone()
    }

    pub fn contexts(&self) -> Vec<String> {
        self.0.lock().iter().map(|(context, _)| context.clone()).collect()
    }
}

impl ErrorSink for CollectingSink {
    fn report(&self, context: &str, error: &(dyn Error + Send + Sync + 'static)) {
        self.0.lock().push((context.to_string(), error.to_string()));
    }
}
