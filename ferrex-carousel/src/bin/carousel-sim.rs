//! Replays a scripted navigation sequence against an in-memory carousel
//! and logs every focus change, batch and scroll request.

use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result, anyhow, bail};
use clap::Parser;
use ferrex_carousel::constants;
use ferrex_carousel::logging::init_tracing;
use ferrex_carousel::{
    Carousel, CarouselConfig, CarouselDeps, FocusOutcome, JumpOutcome,
    KeyOutcome, MemorySource, NavKey, RenderOutcome, StepDirection,
    StepOutcome,
};
use ferrex_contracts::input::NoEditableFocus;
use ferrex_contracts::prelude::{
    ErrorSink, RenderBackend, RenderError, Renderer, Viewer,
};
use ferrex_model::{Dims, ElementId, GroupKey, Record, RecordId};
use parking_lot::Mutex;
use tracing::{debug, error, info, warn};

#[derive(Parser)]
#[command(
    name = "carousel-sim",
    about = "Replay scripted navigation against an in-memory carousel"
)]
struct Cli {
    /// Grouping key to mount
    #[arg(long, default_value = "library")]
    group: String,
    /// Synthetic records served for the group
    #[arg(long, default_value_t = 200)]
    items: usize,
    /// Forward pages drained before the script runs
    #[arg(long, default_value_t = 1)]
    warm_pages: usize,
    /// Don't report total counts, like a cursor-only backend
    #[arg(long)]
    no_totals: bool,
    /// TOML or JSON config; falls back to $CAROUSEL_CONFIG_PATH
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long)]
    page_size: Option<usize>,
    /// Comma separated steps: next, prev, jump:N, click:N, key:NAME, group:NAME
    #[arg(long, default_value = "next,next,jump:40,prev")]
    script: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Action {
    Next,
    Prev,
    Jump(String),
    Click(usize),
    Key(NavKey),
    Group(String),
}

impl FromStr for Action {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        let (verb, arg) = match s.split_once(':') {
            Some((verb, arg)) => (verb, Some(arg)),
            None => (s, None),
        };
        let action = match (verb, arg) {
            ("next", None) => Action::Next,
            ("prev", None) => Action::Prev,
            ("jump", Some(raw)) => Action::Jump(raw.to_string()),
            ("click", Some(raw)) => Action::Click(
                raw.parse::<usize>()
                    .with_context(|| format!("bad click index '{raw}'"))?,
            ),
            ("key", Some(raw)) => Action::Key(
                raw.parse::<NavKey>()
                    .map_err(|key| anyhow!("unknown key '{key}'"))?,
            ),
            ("group", Some(raw)) if !raw.is_empty() => {
                Action::Group(raw.to_string())
            }
            _ => bail!("unrecognised script step '{s}'"),
        };
        Ok(action)
    }
}

fn parse_script(script: &str) -> Result<Vec<Action>> {
    script
        .split(',')
        .filter(|step| !step.trim().is_empty())
        .map(str::parse)
        .collect()
}

#[derive(Debug)]
struct LogRenderer {
    id: RecordId,
}

impl Renderer for LogRenderer {
    fn attach(&mut self, element: ElementId, dims: Dims) -> Result<(), RenderError> {
        debug!(
            "attach {} -> {} ({}x{})",
            self.id, element, dims.width, dims.height
        );
        Ok(())
    }

    fn disable(&mut self) {
        debug!("disable {}", self.id);
    }

    fn destroy(&mut self) {
        debug!("destroy {}", self.id);
    }
}

#[derive(Debug)]
struct LogBackend;

impl RenderBackend for LogBackend {
    fn create_renderer(
        &self,
        record: &Record,
    ) -> Result<Box<dyn Renderer>, RenderError> {
        Ok(Box::new(LogRenderer { id: record.id }))
    }
}

#[derive(Debug, Default)]
struct LogViewer {
    current: Mutex<Option<RecordId>>,
}

impl Viewer for LogViewer {
    fn current(&self) -> Option<RecordId> {
        *self.current.lock()
    }

    fn set_focus(&self, record: &Record) {
        info!("viewer now shows {} ({})", record.id, record.media.url);
        *self.current.lock() = Some(record.id);
    }
}

#[derive(Debug)]
struct LogSink;

impl ErrorSink for LogSink {
    fn report(
        &self,
        context: &str,
        error: &(dyn std::error::Error + Send + Sync + 'static),
    ) {
        error!("{context}: {error}");
    }
}

struct Sim {
    carousel: Carousel,
    dims: Dims,
    next_key: Option<u32>,
}

impl Sim {
    /// Pull the next batch and attach a renderer for every item in it.
    async fn drain_batch(&mut self) -> Result<bool> {
        let Some(page_key) = self.next_key else {
            return Ok(false);
        };
        let batch = self
            .carousel
            .get(page_key)
            .await
            .with_context(|| format!("batch {page_key} failed"))?;
        for item in &batch.items {
            let element = ElementId(item.index as u64);
            if self.carousel.render(item.id(), element, self.dims, false, false)
                == RenderOutcome::Failed
            {
                warn!("renderer for #{} failed", item.index);
            }
        }
        info!(
            "batch {} -> {} items (next {:?})",
            page_key,
            batch.len(),
            batch.next_request_key
        );
        self.next_key = batch.next_request_key;
        Ok(true)
    }

    /// Let deferred focus land, giving up after a few store changes.
    async fn settle(&mut self) {
        for _ in 0..4 {
            if self.carousel.deferred_focus().is_none() {
                return;
            }
            let waited = tokio::time::timeout(
                Duration::from_secs(2),
                self.carousel.store_changed(),
            )
            .await;
            match waited {
                Ok(Some(FocusOutcome::Changed(item))) => {
                    info!("deferred focus landed on #{}", item.index);
                    return;
                }
                Ok(_) => continue,
                Err(_) => {
                    warn!("timed out waiting for deferred focus");
                    return;
                }
            }
        }
    }

    async fn run(&mut self, action: &Action) -> Result<()> {
        match action {
            Action::Next | Action::Prev => {
                let direction = if *action == Action::Next {
                    StepDirection::Next
                } else {
                    StepDirection::Prev
                };
                match self.carousel.step(direction) {
                    StepOutcome::Moved(item) => info!("{direction:?} -> #{}", item.index),
                    StepOutcome::Loading { target, fetch } => {
                        info!("{direction:?} -> #{target} loading ({fetch:?})");
                        self.settle().await;
                    }
                    other => info!("{direction:?} -> {other:?}"),
                }
            }
            Action::Jump(raw) => match self.carousel.jump(raw) {
                JumpOutcome::Focus(FocusOutcome::Deferred { index, fetch }) => {
                    info!("jump {raw} -> #{index} loading ({fetch:?})");
                    self.settle().await;
                }
                JumpOutcome::Focus(outcome) => info!("jump {raw} -> {outcome:?}"),
                JumpOutcome::Rejected(err) => warn!("jump {raw} rejected: {err}"),
            },
            Action::Click(index) => {
                let session = self
                    .carousel
                    .session()
                    .context("nothing mounted")?;
                let Some(record) = session.record_at(*index) else {
                    warn!("click on #{index} which is not loaded");
                    return Ok(());
                };
                let outcome = self.carousel.on_item_click(record.id);
                info!("click #{index} -> {outcome:?}");
            }
            Action::Key(key) => match self.carousel.on_key(*key) {
                KeyOutcome::Stepped { step, scroll } => {
                    info!("key {key:?} -> {step:?}");
                    if let Some(scroll) = scroll {
                        info!(
                            "scroll {:?} by {} items ({}px)",
                            scroll.direction, scroll.items, scroll.pixels
                        );
                    }
                    if matches!(step, StepOutcome::Loading { .. }) {
                        self.settle().await;
                    }
                }
                other => info!("key {key:?} -> {other:?}"),
            },
            Action::Group(name) => {
                let before = self.carousel.live_slots();
                if self.carousel.set_group(GroupKey::new(name.as_str())) {
                    info!("switched to group {name}; {before} slots released");
                    self.next_key = Some(1);
                    self.drain_batch().await?;
                }
            }
        }
        Ok(())
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing(constants::logging::DEFAULT_FILTER)
        .map_err(|err| anyhow!("failed to install tracing subscriber: {err}"))?;

    let cli = Cli::parse();
    let script = parse_script(&cli.script)?;

    let mut config = match cli.config.as_deref() {
        Some(path) => CarouselConfig::load_from_path(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => {
            let (config, source) = CarouselConfig::load_from_env()?;
            debug!("carousel config source: {source:?}");
            config
        }
    };
    if let Some(page_size) = cli.page_size {
        config.page_size = Some(page_size);
    }

    let group = GroupKey::new(cli.group.as_str());
    let mut source = MemorySource::new();
    if cli.no_totals {
        source = source.without_totals();
    }
    source.insert_group(group.clone(), MemorySource::synthetic(&group, cli.items));
    for action in &script {
        if let Action::Group(name) = action {
            let other = GroupKey::new(name.as_str());
            source.insert_group(other.clone(), MemorySource::synthetic(&other, cli.items));
        }
    }

    let dims = Dims::new(config.item_width(), config.item_width() * 1.5);
    let deps = CarouselDeps {
        source: Arc::new(source),
        backend: Arc::new(LogBackend),
        viewer: Arc::new(LogViewer::default()),
        arbiter: Arc::new(NoEditableFocus),
        errors: Arc::new(LogSink),
    };
    let mut carousel = Carousel::new(config, deps)?;
    carousel.mount(group);

    let mut sim = Sim {
        carousel,
        dims,
        next_key: Some(1),
    };
    for _ in 0..cli.warm_pages.max(1) {
        if !sim.drain_batch().await? {
            break;
        }
    }

    for action in &script {
        sim.run(action).await?;
    }

    let upper = sim.carousel.upper_bound();
    info!(
        "done: focus {:?}, total {:?}, upper bound {}, {} live slots",
        sim.carousel.current().map(|item| item.index),
        sim.carousel.total_count(),
        upper,
        sim.carousel.live_slots()
    );
    sim.carousel.unmount();
    Ok(())
}
