//! CursorPager: owns the forward cursor and the single in-flight slot
//!
//! The pager is a plain state machine. [`Session`](crate::session::Session)
//! asks it whether a fetch may start, runs the fetch, and reports back. Only
//! one fetch is ever in flight; further requests either coalesce into the
//! running one or wait in a queue that the fetch task drains when it
//! finishes.

use ferrex_model::{Cursor, GroupKey, Page, PageRequest, PageStart};

/// What a fetch is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchPlan {
    /// Continue the forward cursor chain.
    Next,
    /// Load a window starting at the given one-based ordinal.
    Window { anchor: usize },
}

/// Result of asking the pager for a fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PagerDecision {
    /// Start this request now.
    Issue(PageRequest),
    /// The same fetch is already running or queued.
    Coalesced,
    /// Another fetch is running; this one runs after it.
    Queued,
    /// The forward chain has no more pages.
    Exhausted,
}

#[derive(Debug)]
pub struct CursorPager {
    group: GroupKey,
    page_size: usize,
    cursor: Option<Cursor>,
    exhausted: bool,
    total: Option<usize>,
    in_flight: Option<FetchPlan>,
    queued_next: bool,
    queued_window: Option<usize>,
    fetches_issued: usize,
}

impl CursorPager {
    pub fn new(group: GroupKey, page_size: usize) -> Self {
        Self {
            group,
            page_size: page_size.max(1),
            cursor: None,
            exhausted: false,
            total: None,
            in_flight: None,
            queued_next: false,
            queued_window: None,
            fetches_issued: 0,
        }
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn total_count(&self) -> Option<usize> {
        self.total
    }

    pub fn in_flight(&self) -> Option<FetchPlan> {
        self.in_flight
    }

    pub fn fetches_issued(&self) -> usize {
        self.fetches_issued
    }

    /// Whether the forward chain can still grow past `loaded` records.
    pub fn has_more(&self, loaded: usize) -> bool {
        !self.exhausted && self.total.is_none_or(|total| loaded < total)
    }

    pub fn request(&mut self, plan: FetchPlan) -> PagerDecision {
        if plan == FetchPlan::Next && self.exhausted {
            return PagerDecision::Exhausted;
        }

        let Some(running) = self.in_flight else {
            return self.issue(plan);
        };

        match plan {
            FetchPlan::Next if running == FetchPlan::Next || self.queued_next => {
                PagerDecision::Coalesced
            }
            FetchPlan::Next => {
                self.queued_next = true;
                PagerDecision::Queued
            }
            FetchPlan::Window { anchor }
                if running == plan || self.queued_window == Some(anchor) =>
            {
                PagerDecision::Coalesced
            }
            FetchPlan::Window { anchor } => {
                // Latest seek wins; older windows are stale once the user moved on.
                self.queued_window = Some(anchor);
                PagerDecision::Queued
            }
        }
    }

    /// Record a successful page. Must be called before [`Self::finish`].
    pub fn on_page(&mut self, plan: FetchPlan, page: &Page) {
        if let Some(total) = page.total_count {
            self.total = Some(total);
        }
        if plan == FetchPlan::Next {
            self.cursor = page.next_cursor.clone();
            if self.cursor.is_none() {
                self.exhausted = true;
            }
        }
    }

    /// Release the in-flight slot and hand back the next queued request,
    /// which the caller must run immediately.
    pub fn finish(&mut self) -> Option<(FetchPlan, PageRequest)> {
        self.in_flight = None;

        if let Some(anchor) = self.queued_window.take() {
            let plan = FetchPlan::Window { anchor };
            return Some((plan, self.start(plan)));
        }
        if std::mem::take(&mut self.queued_next) && !self.exhausted {
            return Some((FetchPlan::Next, self.start(FetchPlan::Next)));
        }
        None
    }

    fn issue(&mut self, plan: FetchPlan) -> PagerDecision {
        PagerDecision::Issue(self.start(plan))
    }

    fn start(&mut self, plan: FetchPlan) -> PageRequest {
        self.in_flight = Some(plan);
        self.fetches_issued += 1;
        let start = match plan {
            FetchPlan::Next => PageStart::After(self.cursor.clone()),
            FetchPlan::Window { anchor } => {
                PageStart::Offset(anchor.saturating_sub(1))
            }
        };
        PageRequest {
            group: self.group.clone(),
            start,
            page_size: self.page_size,
        }
    }
}
