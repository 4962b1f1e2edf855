//! FocusController: the single externally observed "current item"
//!
//! Click, keyboard step, direct jump, and out-of-band viewer changes all
//! funnel through here. Targets that are not loaded yet are deferred and
//! prefetched; [`FocusController::sync`] applies them once the store grows.

pub mod input;

use std::sync::Arc;

use ferrex_contracts::viewer::Viewer;
use ferrex_model::{GroupKey, Record, RecordId};
use tokio::sync::watch;
use tracing::{debug, warn};

use crate::session::{FetchStatus, Session, StoreChange};
use input::{InputState, JumpError, JumpInput};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepDirection {
    Prev,
    Next,
}

impl StepDirection {
    pub fn delta(self) -> isize {
        match self {
            StepDirection::Prev => -1,
            StepDirection::Next => 1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FocusedItem {
    pub index: usize,
    pub id: RecordId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusTarget {
    Index(usize),
    Identity(RecordId),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FocusRejection {
    /// No session is mounted.
    Detached,
    /// The record belongs to a different grouping key.
    ForeignGroup { expected: GroupKey, found: GroupKey },
    UnknownIdentity(RecordId),
    OutOfRange { index: usize, upper: usize },
    /// The fetch toward a deferred target failed.
    FetchFailed { index: usize },
    /// Fetching finished without producing a deferred target.
    NotLoaded { index: usize },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FocusOutcome {
    Changed(FocusedItem),
    Unchanged,
    /// Target not loaded; a fetch toward it was requested.
    Deferred { index: usize, fetch: FetchStatus },
    Rejected(FocusRejection),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    Moved(FocusedItem),
    /// Already at the first or last index.
    Boundary,
    Loading { target: usize, fetch: FetchStatus },
    Detached,
}

impl StepOutcome {
    pub fn moved(&self) -> bool {
        matches!(self, StepOutcome::Moved(_) | StepOutcome::Loading { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JumpOutcome {
    Focus(FocusOutcome),
    Rejected(JumpError),
}

/// Focus change reported by the viewer out-of-band.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalFocus {
    pub id: RecordId,
    pub group: GroupKey,
    /// Ordinal of the record when the viewer knows it.
    pub index_hint: Option<usize>,
}

/// A target waiting for its page to land.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct DeferredFocus {
    index: usize,
    /// Identity reported by the viewer. Resolves ahead of `index`, which is
    /// then only the prefetch anchor.
    id: Option<RecordId>,
    /// Store generation seen when the target was deferred.
    since: u64,
}

#[derive(Debug)]
pub struct FocusController {
    session: Option<Session>,
    viewer: Arc<dyn Viewer>,
    changes: Option<watch::Receiver<StoreChange>>,
    current: Option<FocusedItem>,
    deferred: Option<DeferredFocus>,
    look_behind: usize,
    input: JumpInput,
}

impl FocusController {
    pub fn new(viewer: Arc<dyn Viewer>, look_behind: usize) -> Self {
        Self {
            session: None,
            viewer,
            changes: None,
            current: None,
            deferred: None,
            look_behind,
            input: JumpInput::new(),
        }
    }

    /// Point the controller at a new session (or none, on unmount). Focus
    /// from the previous grouping key never carries over.
    pub fn rebind(&mut self, session: Option<Session>) {
        self.changes = session.as_ref().map(Session::subscribe);
        self.session = session;
        self.current = None;
        self.deferred = None;
        self.input.blur();
    }

    pub fn current(&self) -> Option<FocusedItem> {
        self.current
    }

    pub fn deferred(&self) -> Option<usize> {
        self.deferred.map(|target| target.index)
    }

    pub fn input_state(&self) -> InputState {
        self.input.state()
    }

    pub fn set_focus(&mut self, target: FocusTarget) -> FocusOutcome {
        let Some(session) = self.session.clone() else {
            return FocusOutcome::Rejected(FocusRejection::Detached);
        };

        let (index, record) = match target {
            FocusTarget::Index(index) => {
                let upper = session.upper_bound();
                if index == 0 || index > upper {
                    return FocusOutcome::Rejected(FocusRejection::OutOfRange {
                        index,
                        upper,
                    });
                }
                match session.record_at(index) {
                    Some(record) => (index, record),
                    None => {
                        self.defer(index, None);
                        let fetch = self.prefetch(&session, index);
                        return FocusOutcome::Deferred { index, fetch };
                    }
                }
            }
            FocusTarget::Identity(id) => match session.locate(&id) {
                Some(found) => found,
                None => {
                    return FocusOutcome::Rejected(
                        FocusRejection::UnknownIdentity(id),
                    );
                }
            },
        };

        self.apply(&session, index, &record)
    }

    /// Move one step, clamped to `1..=total`. Unloaded neighbours are
    /// prefetched and focused once they land.
    pub fn step(&mut self, direction: StepDirection) -> StepOutcome {
        let Some(session) = self.session.clone() else {
            return StepOutcome::Detached;
        };

        let base = self
            .deferred()
            .or(self.current.map(|item| item.index))
            .unwrap_or(0);
        let upper = session.upper_bound();
        let target = base as isize + direction.delta();
        if target < 1 || target as usize > upper {
            return StepOutcome::Boundary;
        }
        let target = target as usize;

        match self.set_focus(FocusTarget::Index(target)) {
            FocusOutcome::Changed(item) => StepOutcome::Moved(item),
            FocusOutcome::Deferred { index, fetch } => {
                StepOutcome::Loading { target: index, fetch }
            }
            FocusOutcome::Unchanged => StepOutcome::Boundary,
            FocusOutcome::Rejected(reason) => {
                debug!("Step to {} rejected: {:?}", target, reason);
                StepOutcome::Boundary
            }
        }
    }

    /// Validate raw text from the pagination bar and jump to it.
    pub fn jump(&mut self, raw_input: &str) -> JumpOutcome {
        let Some(session) = self.session.as_ref() else {
            return JumpOutcome::Focus(FocusOutcome::Rejected(
                FocusRejection::Detached,
            ));
        };
        match self.input.commit(raw_input, session.upper_bound()) {
            Ok(index) => JumpOutcome::Focus(self.set_focus(FocusTarget::Index(index))),
            Err(err) => {
                debug!("Jump input rejected: {}", err);
                JumpOutcome::Rejected(err)
            }
        }
    }

    pub fn blur_input(&mut self) {
        self.input.blur();
    }

    /// The viewer moved on its own. Adopt the change if it belongs to this
    /// session, prefetching toward it when it isn't loaded.
    pub fn on_external_focus(&mut self, event: ExternalFocus) -> FocusOutcome {
        let Some(session) = self.session.clone() else {
            return FocusOutcome::Rejected(FocusRejection::Detached);
        };
        if &event.group != session.group() {
            warn!(
                "Ignoring external focus {} from group {} (active {})",
                event.id,
                event.group,
                session.group()
            );
            return FocusOutcome::Rejected(FocusRejection::ForeignGroup {
                expected: session.group().clone(),
                found: event.group,
            });
        }

        if let Some((index, record)) = session.locate(&event.id) {
            return self.apply(&session, index, &record);
        }

        match event.index_hint {
            Some(index) if session.record_at(index).is_some() => {
                debug!(
                    "External focus {} hinted at #{} which holds another record",
                    event.id, index
                );
                FocusOutcome::Rejected(FocusRejection::UnknownIdentity(event.id))
            }
            Some(index) if index >= 1 => {
                self.defer(index, Some(event.id));
                let fetch = self.prefetch(&session, index);
                FocusOutcome::Deferred { index, fetch }
            }
            _ => FocusOutcome::Rejected(FocusRejection::UnknownIdentity(event.id)),
        }
    }

    /// Apply a deferred target if the store now holds it.
    ///
    /// Once a fetch has finished since the deferral and nothing else is in
    /// flight, a target that is still missing is dropped and reported as
    /// rejected so callers stop waiting on it.
    pub fn sync(&mut self) -> Option<FocusOutcome> {
        let change = self
            .changes
            .as_mut()
            .map(|changes| *changes.borrow_and_update())
            .unwrap_or_default();
        let target = self.deferred?;
        let session = self.session.clone()?;

        let found = match target.id {
            Some(id) => session.locate(&id),
            None => session
                .record_at(target.index)
                .map(|record| (target.index, record)),
        };
        if let Some((index, record)) = found {
            self.deferred = None;
            return Some(self.apply(&session, index, &record));
        }

        if change.generation <= target.since || session.fetch_in_flight() {
            return None;
        }
        self.deferred = None;
        let reason = match (change.failed, target.id) {
            (Some(_), _) => FocusRejection::FetchFailed {
                index: target.index,
            },
            (None, Some(id)) => FocusRejection::UnknownIdentity(id),
            (None, None) => FocusRejection::NotLoaded {
                index: target.index,
            },
        };
        warn!("Dropping deferred focus on #{}: {:?}", target.index, reason);
        Some(FocusOutcome::Rejected(reason))
    }

    /// Wait until the next fetch lands or fails. Returns false when the
    /// session is gone.
    pub async fn store_changed(&mut self) -> bool {
        match self.changes.as_mut() {
            Some(changes) => changes.changed().await.is_ok(),
            None => false,
        }
    }

    /// Remember the pending target. Changes that landed before this point
    /// cannot contain it, so they are marked seen.
    fn defer(&mut self, index: usize, id: Option<RecordId>) {
        let since = self
            .changes
            .as_mut()
            .map_or(0, |changes| changes.borrow_and_update().generation);
        self.deferred = Some(DeferredFocus { index, id, since });
    }

    fn apply(
        &mut self,
        session: &Session,
        index: usize,
        record: &Record,
    ) -> FocusOutcome {
        if &record.group != session.group() {
            warn!(
                "Refusing focus on {} from group {} (active {})",
                record.id,
                record.group,
                session.group()
            );
            return FocusOutcome::Rejected(FocusRejection::ForeignGroup {
                expected: session.group().clone(),
                found: record.group.clone(),
            });
        }

        self.deferred = None;
        let item = FocusedItem {
            index,
            id: record.id,
        };
        if self.current.map(|current| current.id) == Some(record.id) {
            self.current = Some(item);
            return FocusOutcome::Unchanged;
        }

        self.current = Some(item);
        if self.viewer.current() != Some(record.id) {
            self.viewer.set_focus(record);
        }
        debug!("Focus -> #{} ({})", index, record.id);
        FocusOutcome::Changed(item)
    }

    /// Fetch toward `target`: a forward page when it is the next ordinal,
    /// otherwise a window starting up to `look_behind` items before it so
    /// that stepping back from the target is already warm. The window never
    /// starts so early that it ends before `target`.
    fn prefetch(&self, session: &Session, target: usize) -> FetchStatus {
        if target == session.contiguous_len() + 1 {
            session.load_more()
        } else {
            let behind = target.saturating_sub(self.look_behind);
            let covering = (target + 1).saturating_sub(session.page_size());
            session.load_window(behind.max(covering).max(1))
        }
    }
}
