#![allow(dead_code)]

pub mod fakes;

use std::sync::Arc;
use std::time::Duration;

use ferrex_carousel::{
    Carousel, CarouselConfig, CarouselDeps, MemorySource, RenderBatch,
    RenderOutcome,
};
use ferrex_model::{Dims, ElementId, GroupKey, Record, RecordId};

use fakes::{
    CollectingSink, GatedSource, Journal, RecordingBackend, RecordingViewer,
    ToggleArbiter,
};

pub const CARD: Dims = Dims::new(200.0, 300.0);

/// Carousel wired to recording fakes.
pub struct Harness {
    pub carousel: Carousel,
    pub journal: Arc<Journal>,
    pub source: Arc<GatedSource>,
    pub backend: Arc<RecordingBackend>,
    pub viewer: Arc<RecordingViewer>,
    pub arbiter: Arc<ToggleArbiter>,
    pub errors: Arc<CollectingSink>,
}

#[derive(Debug, Clone)]
pub struct HarnessOptions {
    pub groups: Vec<(GroupKey, usize)>,
    pub gated: bool,
    pub report_totals: bool,
    pub config: CarouselConfig,
}

impl Default for HarnessOptions {
    fn default() -> Self {
        Self {
            groups: vec![(GroupKey::from("library"), 200)],
            gated: false,
            report_totals: true,
            config: CarouselConfig {
                page_size: Some(10),
                ..CarouselConfig::default()
            },
        }
    }
}

impl HarnessOptions {
    pub fn group(mut self, name: &str, count: usize) -> Self {
        self.groups.push((GroupKey::from(name), count));
        self
    }

    pub fn only_group(mut self, name: &str, count: usize) -> Self {
        self.groups = vec![(GroupKey::from(name), count)];
        self
    }

    pub fn gated(mut self) -> Self {
        self.gated = true;
        self
    }

    pub fn without_totals(mut self) -> Self {
        self.report_totals = false;
        self
    }

    pub fn page_size(mut self, page_size: usize) -> Self {
        self.config.page_size = Some(page_size);
        self
    }
}

impl Harness {
    /// Build and mount the first configured group.
    pub fn mounted(options: HarnessOptions) -> Self {
        let mut harness = Self::new(options.clone());
        let (first, _) = options.groups.first().expect("at least one group").clone();
        harness.carousel.mount(first);
        harness
    }

    pub fn new(options: HarnessOptions) -> Self {
        let mut memory = MemorySource::new();
        if !options.report_totals {
            memory = memory.without_totals();
        }
        for (group, count) in &options.groups {
            memory.insert_group(group.clone(), MemorySource::synthetic(group, *count));
        }

        let journal = Arc::new(Journal::default());
        let source = Arc::new(if options.gated {
            GatedSource::gated(memory, Arc::clone(&journal))
        } else {
            GatedSource::open(memory, Arc::clone(&journal))
        });
        let backend = Arc::new(RecordingBackend::new(Arc::clone(&journal)));
        let viewer = Arc::new(RecordingViewer::default());
        let arbiter = Arc::new(ToggleArbiter::default());
        let errors = Arc::new(CollectingSink::default());

        let deps = CarouselDeps {
            source: source.clone(),
            backend: backend.clone(),
            viewer: viewer.clone(),
            arbiter: arbiter.clone(),
            errors: errors.clone(),
        };
        let carousel = Carousel::new(options.config, deps).expect("valid test config");

        Self {
            carousel,
            journal,
            source,
            backend,
            viewer,
            arbiter,
            errors,
        }
    }

    /// Request `page_key` and wait for it, letting the fetch task run.
    pub async fn batch(&mut self, page_key: u32) -> RenderBatch {
        let future = self.carousel.get(page_key);
        within(future).await.expect("batch resolves")
    }

    /// Load every forward page until `contiguous_len >= count`.
    pub async fn load_at_least(&mut self, count: usize) {
        let mut page_key = 1;
        loop {
            let batch = self.batch(page_key).await;
            let loaded = self.session().contiguous_len();
            match batch.next_request_key {
                Some(next) if loaded < count => page_key = next,
                _ => break,
            }
        }
    }

    pub fn session(&self) -> &ferrex_carousel::Session {
        self.carousel.session().expect("mounted")
    }

    pub fn id_at(&self, index: usize) -> RecordId {
        self.record_at(index).id
    }

    pub fn record_at(&self, index: usize) -> Arc<Record> {
        self.session()
            .record_at(index)
            .unwrap_or_else(|| panic!("record #{index} not loaded"))
    }

    pub fn render(&mut self, index: usize, soft: bool, hide: bool) -> RenderOutcome {
        let id = self.id_at(index);
        self.carousel
            .render(id, ElementId(index as u64), CARD, soft, hide)
    }

    /// Wait until no fetch is running for the mounted session.
    pub async fn idle(&self) {
        let session = self.session().clone();
        eventually(move || !session.fetch_in_flight()).await;
    }
}

/// Await `future` with a generous timeout.
pub async fn within<F: std::future::Future>(future: F) -> F::Output {
    tokio::time::timeout(Duration::from_secs(5), future)
        .await
        .expect("timed out")
}

/// Yield to spawned tasks until `check` holds.
pub async fn eventually(mut check: impl FnMut() -> bool) {
    within(async {
        while !check() {
            tokio::task::yield_now().await;
        }
    })
    .await;
}

/// Give spawned tasks a few scheduler turns.
pub async fn settle() {
    for _ in 0..16 {
        tokio::task::yield_now().await;
    }
}
